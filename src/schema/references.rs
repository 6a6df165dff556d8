//! Time-shifted comparisons of metrics.
//!
//! A reference re-runs the query with its datetime dimension shifted by a
//! fixed `(unit, interval)` and joins the shifted metrics back onto the base
//! rows. `delta` and `delta_percent` derive the difference instead of the
//! shifted value.

use super::elements::Dimension;
use super::intervals::DateUnit;

/// The comparison period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceType {
    DayOverDay,
    WeekOverWeek,
    MonthOverMonth,
    QuarterOverQuarter,
    YearOverYear,
}

impl ReferenceType {
    pub fn key(self) -> &'static str {
        match self {
            ReferenceType::DayOverDay => "dod",
            ReferenceType::WeekOverWeek => "wow",
            ReferenceType::MonthOverMonth => "mom",
            ReferenceType::QuarterOverQuarter => "qoq",
            ReferenceType::YearOverYear => "yoy",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReferenceType::DayOverDay => "DoD",
            ReferenceType::WeekOverWeek => "WoW",
            ReferenceType::MonthOverMonth => "MoM",
            ReferenceType::QuarterOverQuarter => "QoQ",
            ReferenceType::YearOverYear => "YoY",
        }
    }

    pub fn unit(self) -> DateUnit {
        match self {
            ReferenceType::DayOverDay => DateUnit::Day,
            ReferenceType::WeekOverWeek => DateUnit::Week,
            ReferenceType::MonthOverMonth => DateUnit::Month,
            ReferenceType::QuarterOverQuarter => DateUnit::Quarter,
            ReferenceType::YearOverYear => DateUnit::Year,
        }
    }

    pub fn interval(self) -> i64 {
        1
    }
}

/// A comparison of every selected metric against a shifted period.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub dimension: Dimension,
    pub kind: ReferenceType,
    pub delta: bool,
    pub delta_percent: bool,
}

impl Reference {
    pub fn new(kind: ReferenceType, dimension: &Dimension) -> Self {
        Self {
            dimension: dimension.clone(),
            kind,
            delta: false,
            delta_percent: false,
        }
    }

    pub fn day_over_day(dimension: &Dimension) -> Self {
        Self::new(ReferenceType::DayOverDay, dimension)
    }

    pub fn week_over_week(dimension: &Dimension) -> Self {
        Self::new(ReferenceType::WeekOverWeek, dimension)
    }

    pub fn month_over_month(dimension: &Dimension) -> Self {
        Self::new(ReferenceType::MonthOverMonth, dimension)
    }

    pub fn quarter_over_quarter(dimension: &Dimension) -> Self {
        Self::new(ReferenceType::QuarterOverQuarter, dimension)
    }

    pub fn year_over_year(dimension: &Dimension) -> Self {
        Self::new(ReferenceType::YearOverYear, dimension)
    }

    /// Report `base - reference` instead of the reference value.
    pub fn delta(mut self) -> Self {
        self.delta = true;
        self
    }

    /// Report `(base - reference) * 100 / reference` instead of the reference value.
    pub fn delta_percent(mut self) -> Self {
        self.delta = true;
        self.delta_percent = true;
        self
    }

    pub fn unit(&self) -> DateUnit {
        self.kind.unit()
    }

    pub fn interval(&self) -> i64 {
        self.kind.interval()
    }

    /// Suffix of the metric columns this reference produces.
    pub fn key(&self) -> String {
        let mut key = self.kind.key().to_string();
        if self.delta_percent {
            key.push_str("_delta_percent");
        } else if self.delta {
            key.push_str("_delta");
        }
        key
    }

    pub fn label(&self) -> String {
        let mut label = self.kind.label().to_string();
        if self.delta_percent {
            label.push_str(" Δ%");
        } else if self.delta {
            label.push_str(" Δ");
        }
        label
    }

    /// Key of the metric column for this reference: `votes_dod_delta`.
    pub fn metric_key(&self, metric_key: &str) -> String {
        format!("{}_{}", metric_key, self.key())
    }

    /// References sharing this key share one shifted subquery.
    pub fn group_key(&self) -> (String, DateUnit, i64) {
        (self.dimension.key.clone(), self.unit(), self.interval())
    }
}

/// Column key of `metric_key` under an optional reference.
pub fn reference_key(metric_key: &str, reference: Option<&Reference>) -> String {
    match reference {
        Some(r) => r.metric_key(metric_key),
        None => metric_key.to_string(),
    }
}
