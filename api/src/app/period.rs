//! Preset reporting periods

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::domain::entities::AggregationWindow;
use crate::error::AggregationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Seven days ago until today
    LastWeek,
    /// First day of this month until today
    ThisMonth,
    /// First day of last month until the first day of this month
    LastMonth,
}

impl Preset {
    pub fn window(self, today: NaiveDate) -> Result<AggregationWindow, AggregationError> {
        let first_of_month = today.with_day(1).unwrap_or(today);
        let (start, end) = match self {
            Preset::LastWeek => (today.checked_sub_days(Days::new(7)).unwrap_or(today), today),
            Preset::ThisMonth => (first_of_month, today),
            Preset::LastMonth => (
                first_of_month
                    .checked_sub_months(Months::new(1))
                    .unwrap_or(first_of_month),
                first_of_month,
            ),
        };
        AggregationWindow::new(start, end)
    }

    pub fn label(self) -> &'static str {
        match self {
            Preset::LastWeek => "last week",
            Preset::ThisMonth => "this month",
            Preset::LastMonth => "last month",
        }
    }
}
