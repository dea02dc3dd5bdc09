use chrono::{DateTime, Utc};
use cli_table::{format::Justify, Table};
use serde::{Deserialize, Serialize};

use crate::utils::Utils;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Table)]
pub struct Activity {
    #[table(title = "ID", justify = "Justify::Right")]
    pub id: u64,
    #[table(title = "Date", display_fn = "render_date")]
    pub start_date_local: DateTime<Utc>,
    #[table(title = "Name")]
    pub name: String,
    #[table(title = "Type")]
    pub r#type: String,
    #[serde(default)]
    #[table(title = "Distance", justify = "Justify::Right", display_fn = "render_distance")]
    pub distance: f64,
    #[serde(default)]
    #[table(title = "Time", justify = "Justify::Right", display_fn = "render_moving_time")]
    pub moving_time: u64,
    #[serde(default)]
    #[table(title = "Elevation", justify = "Justify::Right", display_fn = "render_elevation")]
    pub total_elevation_gain: f64,

    #[table(skip)]
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    #[table(skip)]
    pub sport_type: Option<String>,
    #[serde(default)]
    #[table(skip)]
    pub elapsed_time: u64,
    #[serde(default)]
    #[table(skip)]
    pub average_speed: Option<f64>,
    #[serde(default)]
    #[table(skip)]
    pub max_speed: Option<f64>,
    #[serde(default)]
    #[table(skip)]
    pub average_heartrate: Option<f64>,
    #[serde(default)]
    #[table(skip)]
    pub max_heartrate: Option<f64>,
    #[serde(default)]
    #[table(skip)]
    pub description: Option<String>,
    #[serde(default)]
    #[table(skip)]
    pub calories: Option<f64>,
    #[serde(default)]
    #[table(skip)]
    pub gear_id: Option<String>,
    #[serde(default)]
    #[table(skip)]
    pub trainer: bool,
    #[serde(default)]
    #[table(skip)]
    pub commute: bool,
    #[serde(default)]
    #[table(skip)]
    pub private: bool,
}

impl Activity {
    /// Field/value pairs shown by `get`. Optional metrics are left out when
    /// the service did not report them.
    pub fn detail_rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("Type", self.r#type.clone()),
            (
                "Date",
                self.start_date_local.format("%Y-%m-%d %H:%M:%S").to_string(),
            ),
            ("Distance", Utils::format_distance(self.distance)),
            ("Moving Time", Utils::format_duration_long(self.moving_time)),
            ("Elapsed Time", Utils::format_duration_long(self.elapsed_time)),
            ("Elevation Gain", Utils::format_elevation(self.total_elevation_gain)),
        ];

        // Strava reports 0 for metrics it did not record (trainer, manual).
        let reported = |v: Option<f64>| v.filter(|v| *v > 0.0);
        let optional = [
            ("Average Speed", reported(self.average_speed).map(Utils::format_speed)),
            ("Max Speed", reported(self.max_speed).map(Utils::format_speed)),
            ("Average HR", reported(self.average_heartrate).map(Utils::format_heartrate)),
            ("Max HR", reported(self.max_heartrate).map(Utils::format_heartrate)),
            ("Calories", reported(self.calories).map(|c| format!("{:.0}", c))),
        ];
        rows.extend(
            optional
                .into_iter()
                .filter_map(|(field, value)| value.map(|v| (field, v))),
        );

        rows.push(("Trainer", Utils::yes_no(self.trainer)));
        rows.push(("Commute", Utils::yes_no(self.commute)));

        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            rows.push(("Description", description.to_string()));
        }

        rows
    }
}

/// JSON document printed by `list --json`.
#[derive(Debug, Serialize)]
pub struct ActivityList<'a> {
    pub activities: &'a [Activity],
    pub count: usize,
}

impl<'a> ActivityList<'a> {
    pub fn new(activities: &'a [Activity]) -> Self {
        Self {
            activities,
            count: activities.len(),
        }
    }
}

/// The mutable subset of an activity. Only fields that are set end up in
/// the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commute: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trainer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gear_id: Option<String>,
}

impl ActivityUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn render_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d %H:%M").to_string()
}

fn render_distance(meters: &f64) -> String {
    Utils::format_distance(*meters)
}

fn render_moving_time(seconds: &u64) -> String {
    Utils::format_duration_short(*seconds)
}

fn render_elevation(meters: &f64) -> String {
    Utils::format_elevation(*meters)
}
