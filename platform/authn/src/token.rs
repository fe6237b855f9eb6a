//! Session token codec: standard base64 over the JSON identity document.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use entity::{RecordId, User};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage key the token lives under.
pub const TOKEN_KEY: &str = "token";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub user_id: RecordId,
    pub email: String,
    /// Milliseconds since the Unix epoch.
    pub issued_at: i64,
}

impl SessionIdentity {
    pub fn issue(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            issued_at: Utc::now().timestamp_millis(),
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.issued_at)
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("session token is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("session token payload is malformed: {0}")]
    Payload(#[from] serde_json::Error),
}

pub fn encode(identity: &SessionIdentity) -> Result<String, TokenError> {
    let payload = serde_json::to_vec(identity)?;
    Ok(STANDARD.encode(payload))
}

pub fn decode(token: &str) -> Result<SessionIdentity, TokenError> {
    let payload = STANDARD.decode(token.trim())?;
    Ok(serde_json::from_slice(&payload)?)
}
