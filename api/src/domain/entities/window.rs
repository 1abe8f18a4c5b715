//! Aggregation window
//!
//! Calendar-date range a run is computed over. Both boundaries are
//! normalized to midnight UTC and compared inclusively, so a caller that
//! wants the whole last day must pass the following date as `end`.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AggregationError;

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Whether `value` has the `YYYY-MM-DD` shape (not necessarily a real date)
pub fn is_iso_date(value: &str) -> bool {
    ISO_DATE.is_match(value)
}

/// Inclusive `[start, end]` test shared by every window filter
pub fn within_window(ts: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    ts >= start && ts <= end
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WindowBounds")]
pub struct AggregationWindow {
    start: NaiveDate,
    end: NaiveDate,
}

/// Unchecked wire form, validated through [`AggregationWindow::new`]
#[derive(Deserialize)]
struct WindowBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<WindowBounds> for AggregationWindow {
    type Error = AggregationError;

    fn try_from(bounds: WindowBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.start, bounds.end)
    }
}

impl AggregationWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AggregationError> {
        if start > end {
            return Err(AggregationError::Validation(format!(
                "startDate ({}) must not be after endDate ({})",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` strings into a window
    pub fn parse(start: &str, end: &str) -> Result<Self, AggregationError> {
        let start = parse_date("startDate", start)?;
        let end = parse_date("endDate", end)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn start_instant(&self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    pub fn end_instant(&self) -> DateTime<Utc> {
        self.end.and_time(NaiveTime::MIN).and_utc()
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        within_window(ts, self.start_instant(), self.end_instant())
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AggregationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AggregationError::Validation(format!("{} is required", field)));
    }
    if !is_iso_date(value) {
        return Err(AggregationError::Validation(format!(
            "{} must use the YYYY-MM-DD format, got {:?}",
            field, value
        )));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AggregationError::Validation(format!("{} is not a valid date: {}", field, value))
    })
}
