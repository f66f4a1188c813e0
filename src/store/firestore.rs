//! Firestore REST client
//!
//! Reads documents through `{endpoint}/projects/{project}/databases/{db}/documents`
//! using service-account credentials.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::token::TokenSource;
use super::{Document, DocumentStore, Fields, ServiceAccountKey, StoreError};
use crate::settings::Settings;

const PAGE_SIZE: &str = "300";

/// Firestore client for one project database
pub struct FirestoreClient {
    http: reqwest::Client,
    documents_url: Url,
    tokens: TokenSource,
}

impl FirestoreClient {
    /// Load credentials, build the client and obtain a first access token.
    ///
    /// Fetching the token up front makes bad keys and unreachable endpoints
    /// fail here rather than on the first lookup.
    pub async fn connect(settings: &Settings) -> Result<Self, StoreError> {
        let credential_path = settings.credential_path.as_deref().ok_or_else(|| {
            StoreError::Credentials("credential_path is not configured".to_string())
        })?;

        let key = ServiceAccountKey::load(credential_path)?;
        let project_id = settings
            .project_id
            .clone()
            .unwrap_or_else(|| key.project_id.clone());

        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(concat!("joybank-viewer/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let documents_url =
            documents_base_url(&settings.endpoint_url, &project_id, &settings.database_id)?;
        let tokens = TokenSource::new(http.clone(), key)?;
        tokens.access_token().await?;

        tracing::info!("Connected to project {} ({})", project_id, settings.database_id);

        Ok(Self {
            http,
            documents_url,
            tokens,
        })
    }

    fn document_url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.documents_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.documents_url.to_string()))?
            .extend(segments);
        Ok(url)
    }

    /// GET a URL and decode the JSON body; any non-success status is an error
    async fn get_json<T>(&self, url: Url) -> Result<T, StoreError>
    where
        T: serde::de::DeserializeOwned,
    {
        let token = self.tokens.access_token().await?;

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            return Err(StoreError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))
    }

    /// Like `get_json`, but a 404 is `Ok(None)`
    async fn get_json_opt<T>(&self, url: Url) -> Result<Option<T>, StoreError>
    where
        T: serde::de::DeserializeOwned,
    {
        match self.get_json(url).await {
            Ok(value) => Ok(Some(value)),
            Err(StoreError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.document_url(&[collection])?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", PAGE_SIZE);
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            // An empty collection lists as `{}`; a 404 means the project or
            // database is wrong and is reported as an error.
            let page: ListDocumentsResponse = self.get_json(url).await?;

            for raw in page.documents {
                documents.push(raw.into_document());
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!("Listed {} documents in {}", documents.len(), collection);
        Ok(documents)
    }

    async fn get_document(&self, path: &[&str]) -> Result<Option<Fields>, StoreError> {
        let url = self.document_url(path)?;
        let raw = self.get_json_opt::<RawDocument>(url).await?;
        Ok(raw.map(|doc| decode_fields(doc.fields)))
    }
}

fn documents_base_url(endpoint: &str, project_id: &str, database_id: &str) -> Result<Url, StoreError> {
    let mut url = Url::parse(endpoint).map_err(|e| StoreError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
    url.path_segments_mut()
        .map_err(|_| StoreError::InvalidUrl(endpoint.to_string()))?
        .pop_if_empty()
        .extend(["projects", project_id, "databases", database_id, "documents"]);
    Ok(url)
}

// --- Wire format ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: HashMap<String, FirestoreValue>,
}

impl RawDocument {
    fn into_document(self) -> Document {
        let id = self
            .name
            .rsplit('/')
            .next()
            .unwrap_or(&self.name)
            .to_string();
        Document::new(id, decode_fields(self.fields))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// A typed Firestore value (`{"integerValue": "5"}`, `{"stringValue": "x"}`, ...)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum FirestoreValue {
    NullValue,
    BooleanValue(bool),
    IntegerValue(String),
    DoubleValue(serde_json::Value),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(GeoPoint),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Deserialize)]
struct GeoPoint {
    #[serde(default)]
    latitude: f64,
    #[serde(default)]
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ArrayValue {
    #[serde(default)]
    values: Vec<FirestoreValue>,
}

#[derive(Debug, Deserialize)]
struct MapValue {
    #[serde(default)]
    fields: HashMap<String, FirestoreValue>,
}

fn decode_fields(fields: HashMap<String, FirestoreValue>) -> Fields {
    fields
        .into_iter()
        .map(|(name, value)| (name, value.into_json()))
        .collect()
}

impl FirestoreValue {
    fn into_json(self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            FirestoreValue::NullValue => Value::Null,
            FirestoreValue::BooleanValue(b) => Value::Bool(b),
            // int64 travels as a decimal string
            FirestoreValue::IntegerValue(s) => match s.parse::<i64>() {
                Ok(n) => Value::from(n),
                Err(_) => Value::String(s),
            },
            // NaN and infinities travel as strings
            FirestoreValue::DoubleValue(v) => v,
            FirestoreValue::TimestampValue(s)
            | FirestoreValue::StringValue(s)
            | FirestoreValue::BytesValue(s)
            | FirestoreValue::ReferenceValue(s) => Value::String(s),
            FirestoreValue::GeoPointValue(p) => serde_json::json!({
                "latitude": p.latitude,
                "longitude": p.longitude,
            }),
            FirestoreValue::ArrayValue(a) => {
                Value::Array(a.values.into_iter().map(FirestoreValue::into_json).collect())
            }
            FirestoreValue::MapValue(m) => Value::Object(decode_fields(m.fields)),
        }
    }
}
