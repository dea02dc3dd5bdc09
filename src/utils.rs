use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UtilsError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid activity id '{0}', expected a positive integer")]
    InvalidActivityId(String),
}

pub trait StringExt {
    /// Parses the string as a base URL that relative paths can be joined
    /// onto, adding the trailing slash `Url::join` needs to keep the last
    /// path segment.
    fn to_base_url(&self) -> Result<Url, url::ParseError>;
}

impl StringExt for String {
    fn to_base_url(&self) -> Result<Url, url::ParseError> {
        if self.ends_with('/') {
            Url::parse(self)
        } else {
            Url::parse(&format!("{}/", self))
        }
    }
}

pub fn parse_date(value: &str) -> Result<DateTime<Utc>, UtilsError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| Utc.from_utc_datetime(&datetime))
        .ok_or_else(|| UtilsError::InvalidDate(value.to_string()))
}

pub fn parse_activity_id(value: &str) -> Result<u64, UtilsError> {
    match value.parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(UtilsError::InvalidActivityId(value.to_string())),
    }
}

pub struct Utils;

impl Utils {
    pub fn format_distance(meters: f64) -> String {
        format!("{:.2} km", meters / 1000.0)
    }

    pub fn format_elevation(meters: f64) -> String {
        format!("{:.0} m", meters)
    }

    /// Meters per second to km/h.
    pub fn format_speed(mps: f64) -> String {
        format!("{:.2} km/h", mps * 3.6)
    }

    pub fn format_heartrate(bpm: f64) -> String {
        format!("{:.0} bpm", bpm)
    }

    pub fn yes_no(value: bool) -> String {
        (if value { "Yes" } else { "No" }).to_string()
    }

    pub fn format_duration_short(seconds: u64) -> String {
        let (hours, minutes, _) = Self::split_duration(seconds);

        if hours > 0 {
            format!("{}h {}m", hours, minutes)
        } else {
            format!("{}m", minutes)
        }
    }

    pub fn format_duration_long(seconds: u64) -> String {
        let (hours, minutes, seconds) = Self::split_duration(seconds);

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else {
            format!("{}m {}s", minutes, seconds)
        }
    }

    fn split_duration(seconds: u64) -> (u64, u64, u64) {
        (seconds / 3600, (seconds % 3600) / 60, seconds % 60)
    }
}
