use std::fmt;

use chrono::Utc;
use compact_str::{CompactString, format_compact};
use serde_json::{Map, Value};

use crate::result::{BotError, Result};

/// Lower bound (unix seconds) sent to the API as `from_date`
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub struct Cursor {
    value: i64,
}

impl Cursor {
    pub fn new(value: i64) -> Self {
        Self { value }
    }

    pub fn now() -> Self {
        Self::new(Utc::now().timestamp())
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Decoded body of the homework statuses endpoint, not yet validated
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse(pub Value);

impl ApiResponse {
    /// Server time reported alongside the homework list
    pub fn current_date(&self) -> Option<Cursor> {
        self.0.get("current_date").and_then(Value::as_i64).map(Cursor::new)
    }
}

impl From<Value> for ApiResponse {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// One element of the `homeworks` list
#[derive(Debug, Clone, PartialEq)]
pub struct HomeworkRecord(pub Map<String, Value>);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "approved" => Some(Self::Approved),
            "reviewing" => Some(Self::Reviewing),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn verdict(&self) -> &'static str {
        match self {
            Self::Approved => "Work reviewed: reviewer liked everything. Hooray!",
            Self::Reviewing => "Work taken up for review by the reviewer.",
            Self::Rejected => "Work reviewed: reviewer has comments.",
        }
    }
}

/// Checks the response shape and returns the most recent homework.
///
/// The API lists homeworks most recent first, so the first element wins.
pub fn check_response(response: &ApiResponse) -> Result<HomeworkRecord> {
    let root = response
        .0
        .as_object()
        .ok_or_else(|| BotError::unexpected_type("API response is not a JSON object"))?;

    let homeworks = root
        .get("homeworks")
        .ok_or_else(|| BotError::missing_key("homeworks"))?
        .as_array()
        .ok_or_else(|| BotError::unexpected_type("homeworks is not a list"))?;

    let latest = homeworks.first().ok_or(BotError::EmptyResult)?;

    latest
        .as_object()
        .cloned()
        .map(HomeworkRecord)
        .ok_or_else(|| BotError::unexpected_type("homework entry is not a JSON object"))
}

/// Builds the notification text for a homework record
pub fn parse_status(homework: &HomeworkRecord) -> Result<CompactString> {
    let status = string_field(homework, "status")?;
    let homework_name = string_field(homework, "homework_name")?;

    let verdict = HomeworkStatus::parse(status)
        .ok_or_else(|| BotError::unknown_status(status))?
        .verdict();

    Ok(format_compact!(
        "Changed review status of work \"{homework_name}\". {verdict}"
    ))
}

fn string_field<'a>(homework: &'a HomeworkRecord, key: &str) -> Result<&'a str> {
    homework
        .0
        .get(key)
        .ok_or_else(|| BotError::missing_key(key))?
        .as_str()
        .ok_or_else(|| BotError::unexpected_type(format_compact!("{key} is not a string")))
}
