use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::utils::StringExt;

pub use activity::{Activity, ActivityList, ActivityUpdate};

pub mod activity;

pub const DEFAULT_API_URL: &str = "https://www.strava.com/api/v3/";
pub const DEFAULT_OAUTH_URL: &str = "https://www.strava.com/oauth/token";

/// Strava caps `per_page` on the activity list endpoint.
pub const MAX_PER_PAGE: usize = 200;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub oauth_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Reads configuration through `get` so tests never touch the process
    /// environment.
    pub fn from_env_with<F>(mut get: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |v: String| if v.is_empty() { None } else { Some(v) };

        Self {
            api_url: get("STRAVA_API_URL")
                .and_then(non_empty)
                .unwrap_or(defaults.api_url),
            oauth_url: get("STRAVA_OAUTH_URL")
                .and_then(non_empty)
                .unwrap_or(defaults.oauth_url),
            client_id: get("STRAVA_CLIENT_ID").and_then(non_empty),
            client_secret: get("STRAVA_CLIENT_SECRET").and_then(non_empty),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            oauth_url: DEFAULT_OAUTH_URL.to_string(),
            client_id: None,
            client_secret: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("activity {0} not found")]
    NotFound(u64),
    #[error("API request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid API url: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound(_) => Some(StatusCode::NOT_FOUND.as_u16()),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::Url(_) => None,
        }
    }
}

/// Decodes a JSON body, turning any non-2xx status into [`ApiError::Status`].
pub(crate) async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json().await?)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: usize,
    pub per_page: usize,
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
}

impl ListQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        if let Some(after) = self.after {
            params.push(("after", after.timestamp().to_string()));
        }
        if let Some(before) = self.before {
            params.push(("before", before.timestamp().to_string()));
        }
        params
    }
}

pub enum Api<R> {
    ListActivities(ListQuery),
    ActivityById(u64),
    UpdateActivity(u64, ActivityUpdate),
    _Unreachable(std::convert::Infallible, PhantomData<R>),
}

impl<R> Api<R> {
    pub fn path(&self) -> String {
        match self {
            Api::ListActivities(_) => "athlete/activities".to_string(),
            Api::ActivityById(id) | Api::UpdateActivity(id, _) => format!("activities/{}", id),
            Api::_Unreachable(_, _) => unreachable!(),
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Api::UpdateActivity(_, _) => Method::PUT,
            _ => Method::GET,
        }
    }

    /// The activity the call addresses, used to report a 404 as
    /// [`ApiError::NotFound`].
    fn activity_id(&self) -> Option<u64> {
        match self {
            Api::ActivityById(id) | Api::UpdateActivity(id, _) => Some(*id),
            _ => None,
        }
    }
}

pub struct ApiClient<'a> {
    config: &'a Config,
    client: Client,
    access_token: Mutex<String>,
}

impl<'a> ApiClient<'a> {
    pub fn new(config: &'a Config) -> ApiClient<'a> {
        let client = reqwest::Client::new();
        ApiClient {
            config,
            client,
            access_token: Mutex::new("".to_string()),
        }
    }

    pub async fn set_access_token(&self, access_token: &str) {
        let mut token = self.access_token.lock().await;
        *token = access_token.to_owned();
    }

    pub async fn request<R: DeserializeOwned>(&self, api: Api<R>) -> Result<R, ApiError> {
        let url = self.config.api_url.to_base_url()?.join(&api.path())?;
        log::debug!("{} {}", api.method(), url);

        let mut req_builder = self.client.request(api.method(), url);

        match &api {
            Api::ListActivities(query) => req_builder = req_builder.query(&query.params()),
            Api::UpdateActivity(_, update) => req_builder = req_builder.json(update),
            _ => {}
        }

        {
            let access_token = self.access_token.lock().await;
            if !access_token.is_empty() {
                req_builder = req_builder.bearer_auth(access_token.as_str());
            }
        }

        let response = req_builder.send().await?;
        log::debug!("response status: {}", response.status());

        if response.status() == StatusCode::NOT_FOUND {
            if let Some(id) = api.activity_id() {
                return Err(ApiError::NotFound(id));
            }
        }

        decode_response(response).await
    }
}
