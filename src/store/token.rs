//! OAuth access tokens for a service account
//!
//! Signs an RS256 JWT assertion with the service-account key and exchanges it
//! at the key's token endpoint (JWT bearer grant). The token is cached until
//! shortly before it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{ServiceAccountKey, StoreError};

const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS)
    }
}

/// Issues and caches access tokens for one service account
pub struct TokenSource {
    client: reqwest::Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenSource {
    pub fn new(client: reqwest::Client, key: ServiceAccountKey) -> Result<Self, StoreError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| StoreError::Credentials(format!("Invalid private key: {}", e)))?;

        Ok(Self {
            client,
            key,
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    /// Return a valid access token, exchanging a new assertion if needed
    pub async fn access_token(&self) -> Result<String, StoreError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.value.clone());
            }
            tracing::debug!("Access token expired, refreshing");
        }

        let token = self.exchange().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String, StoreError> {
        let iat = now.timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: DATASTORE_SCOPE,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| StoreError::Auth(format!("Failed to sign assertion: {}", e)))
    }

    async fn exchange(&self) -> Result<AccessToken, StoreError> {
        let now = Utc::now();
        let assertion = self.assertion(now)?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| match e.error_description {
                    Some(desc) => format!("{}: {}", e.error, desc),
                    None => e.error,
                })
                .unwrap_or_else(|_| format!("token endpoint returned {}", status));
            return Err(StoreError::Auth(message));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        tracing::debug!("Obtained access token for {}", self.key.client_email);

        Ok(AccessToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_PRIVATE_KEY: &str = include_str!("testdata/test_key.pem");

    fn test_key(token_uri: String) -> ServiceAccountKey {
        ServiceAccountKey {
            project_id: "joybank-test".to_string(),
            client_email: "viewer@joybank-test.iam.gserviceaccount.com".to_string(),
            private_key: TEST_PRIVATE_KEY.to_string(),
            token_uri,
        }
    }

    #[test]
    fn test_invalid_private_key() {
        let mut key = test_key("http://localhost/token".to_string());
        key.private_key = "not a pem".to_string();
        assert!(matches!(
            TokenSource::new(reqwest::Client::new(), key),
            Err(StoreError::Credentials(_))
        ));
    }

    #[test]
    fn test_assertion_is_three_part_jwt() {
        let source =
            TokenSource::new(reqwest::Client::new(), test_key("http://localhost/token".to_string()))
                .unwrap();
        let jwt = source.assertion(Utc::now()).unwrap();
        assert_eq!(jwt.split('.').count(), 3);
    }

    #[test]
    fn test_expiry_margin() {
        let fresh = AccessToken {
            value: "t".to_string(),
            expires_at: Utc::now() + Duration::minutes(30),
        };
        let nearly = AccessToken {
            value: "t".to_string(),
            expires_at: Utc::now() + Duration::seconds(10),
        };
        assert!(!fresh.is_expired());
        assert!(nearly.is_expired());
    }

    #[tokio::test]
    async fn test_token_is_exchanged_once_and_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.test-token",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let source = TokenSource::new(
            reqwest::Client::new(),
            test_key(format!("{}/token", server.uri())),
        )
        .unwrap();

        assert_eq!(source.access_token().await.unwrap(), "ya29.test-token");
        assert_eq!(source.access_token().await.unwrap(), "ya29.test-token");
    }

    #[tokio::test]
    async fn test_rejected_assertion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Invalid JWT Signature."
            })))
            .mount(&server)
            .await;

        let source = TokenSource::new(
            reqwest::Client::new(),
            test_key(format!("{}/token", server.uri())),
        )
        .unwrap();

        let err = source.access_token().await.unwrap_err();
        assert!(matches!(err, StoreError::Auth(_)));
        assert!(err.to_string().contains("invalid_grant: Invalid JWT Signature."));
    }
}
