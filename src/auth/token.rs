use chrono::serde::ts_seconds::{deserialize as from_ts, serialize as to_ts};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    pub access_token: String,
    pub refresh_token: String,

    #[serde(serialize_with = "to_ts", deserialize_with = "from_ts")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Token {
    AccessToken(String),
    RefreshToken(String),
}

impl TokenData {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Which credential should be used at `now`: the access token while it
    /// is valid, otherwise the refresh token that has to be exchanged.
    pub fn usable_at(&self, now: DateTime<Utc>) -> Token {
        if self.is_expired_at(now) {
            Token::RefreshToken(self.refresh_token.clone())
        } else {
            Token::AccessToken(self.access_token.clone())
        }
    }
}
