use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a successful login leaves in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub scopes: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub logged_in_at: DateTime<Utc>,
    /// Provider profile, when a userinfo endpoint is configured.
    pub user: Option<Value>,
}

impl UserSession {
    pub fn new(access_token: String, expires_in: Option<std::time::Duration>) -> Self {
        let now = Utc::now();
        UserSession {
            access_token,
            refresh_token: None,
            scopes: Vec::new(),
            expires_at: expires_in
                .and_then(|d| Duration::from_std(d).ok())
                .map(|d| now + d),
            logged_in_at: now,
            user: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|at| at <= Utc::now()).unwrap_or(false)
    }
}

/// State carried from `/login` to `/callback`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingLogin {
    pub state: String,
    pub next: Option<String>,
}
