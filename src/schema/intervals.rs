//! Bucketing intervals for continuous and datetime dimensions.

use std::fmt;

use chrono::{Months, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::sql::DatePart;

/// Truncation grain of a datetime dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatetimeInterval {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annually,
}

impl DatetimeInterval {
    /// Parse an interval from its configuration name.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hourly" | "hour" => Some(DatetimeInterval::Hourly),
            "daily" | "day" => Some(DatetimeInterval::Daily),
            "weekly" | "week" => Some(DatetimeInterval::Weekly),
            "monthly" | "month" => Some(DatetimeInterval::Monthly),
            "quarterly" | "quarter" => Some(DatetimeInterval::Quarterly),
            "annually" | "year" => Some(DatetimeInterval::Annually),
            _ => None,
        }
    }

    /// Truncation key understood by warehouse `TRUNC` functions.
    pub fn trunc_key(self) -> &'static str {
        match self {
            DatetimeInterval::Hourly => "HH",
            DatetimeInterval::Daily => "DD",
            DatetimeInterval::Weekly => "IW",
            DatetimeInterval::Monthly => "MM",
            DatetimeInterval::Quarterly => "Q",
            DatetimeInterval::Annually => "Y",
        }
    }

    /// One bucket of this interval as a date unit.
    pub fn unit(self) -> DateUnit {
        match self {
            DatetimeInterval::Hourly => DateUnit::Hour,
            DatetimeInterval::Daily => DateUnit::Day,
            DatetimeInterval::Weekly => DateUnit::Week,
            DatetimeInterval::Monthly => DateUnit::Month,
            DatetimeInterval::Quarterly => DateUnit::Quarter,
            DatetimeInterval::Annually => DateUnit::Year,
        }
    }
}

impl fmt::Display for DatetimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatetimeInterval::Hourly => "hourly",
            DatetimeInterval::Daily => "daily",
            DatetimeInterval::Weekly => "weekly",
            DatetimeInterval::Monthly => "monthly",
            DatetimeInterval::Quarterly => "quarterly",
            DatetimeInterval::Annually => "annually",
        };
        f.write_str(name)
    }
}

/// Unit of a date shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateUnit {
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl DateUnit {
    pub fn key(self) -> &'static str {
        match self {
            DateUnit::Hour => "hour",
            DateUnit::Day => "day",
            DateUnit::Week => "week",
            DateUnit::Month => "month",
            DateUnit::Quarter => "quarter",
            DateUnit::Year => "year",
        }
    }

    /// The start of the bucket after the one starting at `t`.
    pub fn next(self, t: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            DateUnit::Hour => t.checked_add_signed(TimeDelta::hours(1)),
            DateUnit::Day => t.checked_add_signed(TimeDelta::days(1)),
            DateUnit::Week => t.checked_add_signed(TimeDelta::weeks(1)),
            DateUnit::Month => t.checked_add_months(Months::new(1)),
            DateUnit::Quarter => t.checked_add_months(Months::new(3)),
            DateUnit::Year => t.checked_add_months(Months::new(12)),
        }
    }

    /// The matching SQL INTERVAL unit.
    pub fn date_part(self) -> DatePart {
        match self {
            DateUnit::Hour => DatePart::Hour,
            DateUnit::Day => DatePart::Day,
            DateUnit::Week => DatePart::Week,
            DateUnit::Month => DatePart::Month,
            DateUnit::Quarter => DatePart::Quarter,
            DateUnit::Year => DatePart::Year,
        }
    }
}

impl fmt::Display for DateUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Bucketing of a continuous numeric dimension: `floor((x - offset) / size) * size + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumericInterval {
    pub size: i64,
    pub offset: i64,
}

impl NumericInterval {
    pub fn new(size: i64, offset: i64) -> Self {
        Self { size, offset }
    }

    /// Whether bucketing leaves values unchanged.
    pub fn is_identity(&self) -> bool {
        self.size == 1 && self.offset == 0
    }
}

impl Default for NumericInterval {
    fn default() -> Self {
        Self { size: 1, offset: 0 }
    }
}
