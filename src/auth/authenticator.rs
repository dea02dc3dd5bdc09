use anyhow::Result;
use chrono::serde::ts_seconds::deserialize as from_ts;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;

use crate::api::{self, Config};
use crate::auth::storage::TokenStorage;
use crate::auth::token::{Token, TokenData};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(deserialize_with = "from_ts")]
    expires_at: DateTime<Utc>,
}

impl From<TokenResponse> for TokenData {
    fn from(r: TokenResponse) -> Self {
        TokenData {
            refresh_token: r.refresh_token,
            access_token: r.access_token,
            expires_at: r.expires_at,
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("access token expired; STRAVA_CLIENT_ID and STRAVA_CLIENT_SECRET must be set to refresh it")]
    MissingCredentials,
}

/// Owns the token loaded from storage and swaps it for a fresh one whenever
/// it has expired.
#[derive(Debug)]
pub struct Authenticator<'a, Storage>
where
    Storage: TokenStorage,
{
    config: &'a Config,
    storage: &'a Storage,
    client: reqwest::Client,
    token: Mutex<TokenData>,
}

impl<'a, Storage> Authenticator<'a, Storage>
where
    Storage: TokenStorage,
{
    /// Loads the token eagerly, so a missing or malformed token file fails
    /// before anything goes over the network.
    pub fn new(config: &'a Config, storage: &'a Storage) -> Result<Authenticator<'a, Storage>> {
        let token = storage.load()?;
        log::debug!("loaded token expiring at {}", token.expires_at);

        Ok(Self {
            config,
            storage,
            client: reqwest::Client::new(),
            token: Mutex::new(token),
        })
    }

    pub async fn ensure_fresh_token(&self) -> Result<String> {
        self.ensure_fresh_token_at(Utc::now()).await
    }

    pub async fn ensure_fresh_token_at(&self, now: DateTime<Utc>) -> Result<String> {
        let mut token = self.token.lock().await;

        match token.usable_at(now) {
            Token::AccessToken(access_token) => Ok(access_token),
            Token::RefreshToken(refresh_token) => {
                log::info!("access token expired at {}, refreshing", token.expires_at);

                let token_data: TokenData = self.refresh_token(&refresh_token).await?.into();
                self.storage.save(&token_data)?;
                log::debug!("refreshed token expires at {}", token_data.expires_at);

                let access_token = token_data.access_token.clone();
                *token = token_data;

                Ok(access_token)
            }
        }
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let (client_id, client_secret) = match (&self.config.client_id, &self.config.client_secret)
        {
            (Some(id), Some(secret)) => (id, secret),
            _ => return Err(AuthError::MissingCredentials.into()),
        };

        let url = Url::parse(&self.config.oauth_url)?;

        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("refresh_token", refresh_token),
        ];

        let response = self
            .client
            .post(url)
            .form(&params)
            .send()
            .await
            .map_err(api::ApiError::from)?;

        Ok(api::decode_response(response).await?)
    }
}
