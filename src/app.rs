use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;

use crate::api::{Activity, ActivityUpdate, Api, ApiClient, Config, ListQuery, MAX_PER_PAGE};
use crate::auth::storage::TokenStorage;
use crate::auth::Authenticator;
use crate::utils::{parse_activity_id, parse_date};

pub const DEFAULT_TOKEN_FILE: &str = "strava-token.json";

/// Manage your Strava activities from the command line.
#[derive(Parser, Debug)]
#[clap(name = "strava", version)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    #[clap(short, long, parse(from_occurrences), global = true)]
    pub verbose: usize,

    #[clap(
        short,
        long,
        global = true,
        default_value = DEFAULT_TOKEN_FILE,
        help = "Path to token file"
    )]
    pub token_file: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List your Strava activities
    List {
        #[clap(short, long, default_value_t = 10, help = "Number of activities to retrieve")]
        limit: usize,
        #[clap(
            short,
            long,
            parse(try_from_str = parse_date),
            help = "Only activities after this date (YYYY-MM-DD)"
        )]
        after: Option<DateTime<Utc>>,
        #[clap(
            short,
            long,
            parse(try_from_str = parse_date),
            help = "Only activities before this date (YYYY-MM-DD)"
        )]
        before: Option<DateTime<Utc>>,
        #[clap(long, help = "Output as JSON")]
        json: bool,
    },
    /// Get details of a specific activity by ID
    Get {
        #[clap(parse(try_from_str = parse_activity_id), help = "Activity ID")]
        id: u64,
        #[clap(long, help = "Output as JSON")]
        json: bool,
    },
    /// Update a specific activity
    Update(UpdateArgs),
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[clap(parse(try_from_str = parse_activity_id), help = "Activity ID")]
    pub id: u64,
    #[clap(short, long, help = "Update activity name")]
    pub name: Option<String>,
    #[clap(
        short,
        long,
        help = "Update activity description (an empty string clears it)"
    )]
    pub description: Option<String>,
    #[clap(long = "type", help = "Update activity type (e.g. Run, Ride, Swim)")]
    pub activity_type: Option<String>,
    #[clap(long, help = "Mark as commute")]
    pub commute: bool,
    #[clap(long, conflicts_with = "commute", help = "Mark as not a commute")]
    pub no_commute: bool,
    #[clap(long, help = "Mark as trainer")]
    pub trainer: bool,
    #[clap(long, conflicts_with = "trainer", help = "Mark as not trainer")]
    pub no_trainer: bool,
    #[clap(long, help = "Set gear ID")]
    pub gear_id: Option<String>,
    #[clap(long, help = "Output updated activity as JSON")]
    pub json: bool,
}

impl UpdateArgs {
    pub fn to_update(&self) -> ActivityUpdate {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());

        ActivityUpdate {
            name: non_empty(&self.name),
            description: self.description.clone(),
            r#type: non_empty(&self.activity_type),
            commute: flag(self.commute, self.no_commute),
            trainer: flag(self.trainer, self.no_trainer),
            gear_id: non_empty(&self.gear_id),
        }
    }
}

fn flag(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

pub struct App<'a, Storage>
where
    Storage: TokenStorage,
{
    auth: Authenticator<'a, Storage>,
    api_client: ApiClient<'a>,
}

impl<'a, Storage> App<'a, Storage>
where
    Storage: TokenStorage,
{
    pub fn new(config: &'a Config, storage: &'a Storage) -> Result<App<'a, Storage>> {
        let auth = Authenticator::new(config, storage)?;
        let api_client = ApiClient::new(config);
        Ok(Self { auth, api_client })
    }

    /// Up to `limit` activities, newest first.
    pub async fn list(
        &self,
        limit: usize,
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Activity>> {
        if let (Some(after), Some(before)) = (after, before) {
            if after >= before {
                bail!("--after must be earlier than --before");
            }
        }

        let mut activities: Vec<Activity> = Vec::new();
        if limit == 0 {
            return Ok(activities);
        }

        let per_page = limit.min(MAX_PER_PAGE);
        let mut page = 1;

        while activities.len() < limit {
            let query = ListQuery {
                page,
                per_page,
                after,
                before,
            };
            let batch: Vec<Activity> = self
                .request(Api::ListActivities(query))
                .await
                .context("failed to fetch activities")?;

            let fetched = batch.len();
            log::debug!("page {} returned {} activities", page, fetched);
            activities.extend(batch);

            if fetched < per_page {
                break;
            }
            page += 1;
        }

        activities.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        activities.truncate(limit);

        Ok(activities)
    }

    pub async fn get(&self, id: u64) -> Result<Activity> {
        self.request(Api::ActivityById(id))
            .await
            .with_context(|| format!("failed to fetch activity {}", id))
    }

    pub async fn update(&self, id: u64, update: ActivityUpdate) -> Result<Activity> {
        log::debug!("updating activity {} with {:?}", id, update);

        self.request(Api::UpdateActivity(id, update))
            .await
            .with_context(|| format!("failed to update activity {}", id))
    }

    async fn request<T: DeserializeOwned>(&self, api: Api<T>) -> Result<T> {
        let access_token = self.auth.ensure_fresh_token().await?;
        self.api_client.set_access_token(&access_token).await;
        Ok(self.api_client.request(api).await?)
    }
}
