//! Balance lookup and formatting
//!
//! Reads `users/{id}/accounts/main` and turns its `balance` field into label
//! text. Integral balances get comma grouping; anything that does not convert
//! to an integer is shown as-is.

use std::fmt;

use serde_json::Value;

use super::directory::USERS_COLLECTION;
use crate::store::{DocumentStore, StoreError};

/// Subcollection and document id holding a user's account
pub const ACCOUNTS_COLLECTION: &str = "accounts";
pub const MAIN_ACCOUNT: &str = "main";

/// Text shown in place of a missing `balance` field
pub const MISSING_BALANCE: &str = "N/A";

const LABEL_PREFIX: &str = "Balance:";

/// What the balance label should show after a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceOutcome {
    /// Formatted (or raw) balance followed by the currency suffix
    Rendered { amount: String, currency: String },
    /// The user has no `accounts/main` document
    AccountNotFound,
    /// The selected name matched no user
    UserNotFound,
    /// The lookup failed
    QueryError,
}

impl BalanceOutcome {
    /// Label text before any selection has been made
    pub fn idle_label() -> &'static str {
        LABEL_PREFIX
    }
}

impl fmt::Display for BalanceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceOutcome::Rendered { amount, currency } if currency.is_empty() => {
                write!(f, "{} {}", LABEL_PREFIX, amount)
            }
            BalanceOutcome::Rendered { amount, currency } => {
                write!(f, "{} {} {}", LABEL_PREFIX, amount, currency)
            }
            BalanceOutcome::AccountNotFound => write!(f, "{} account not found", LABEL_PREFIX),
            BalanceOutcome::UserNotFound => write!(f, "{} user not found", LABEL_PREFIX),
            BalanceOutcome::QueryError => write!(f, "{} query error", LABEL_PREFIX),
        }
    }
}

/// Fetch a user's main account and render its balance
pub async fn present(
    store: &dyn DocumentStore,
    document_id: &str,
    currency: &str,
) -> Result<BalanceOutcome, StoreError> {
    let path = [USERS_COLLECTION, document_id, ACCOUNTS_COLLECTION, MAIN_ACCOUNT];

    let Some(account) = store.get_document(&path).await? else {
        tracing::debug!("No main account for user {}", document_id);
        return Ok(BalanceOutcome::AccountNotFound);
    };

    Ok(BalanceOutcome::Rendered {
        amount: format_balance(account.get("balance")),
        currency: currency.to_string(),
    })
}

/// Format a `balance` field value; `None` means the field is absent
pub fn format_balance(balance: Option<&Value>) -> String {
    match balance {
        None => MISSING_BALANCE.to_string(),
        Some(value) => match integer_text(value) {
            Some(n) => group_thousands(&n),
            None => raw_text(value),
        },
    }
}

/// Best-effort integer conversion to canonical decimal text (`-123`, `0`).
///
/// Works on digit strings, so there is no width limit. Doubles truncate
/// toward zero, strings must be an optionally signed run of digits
/// (surrounding whitespace allowed), booleans count as 1 and 0.
pub fn integer_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .and_then(|f| parse_integer(&format!("{:.0}", f.trunc())))
            }
        }
        Value::String(s) => parse_integer(s),
        Value::Bool(b) => Some(u8::from(*b).to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn parse_integer(s: &str) -> Option<String> {
    let trimmed = s.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some("0".to_string());
    }
    Some(if negative {
        format!("-{}", digits)
    } else {
        digits.to_string()
    })
}

/// `"1234567"` -> `"1,234,567"`; expects canonical integer text
pub fn group_thousands(n: &str) -> String {
    let (sign, digits) = match n.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", n),
    };
    let mut out = String::with_capacity(n.len() + digits.len() / 3);

    out.push_str(sign);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn raw_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
