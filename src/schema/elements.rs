//! Metrics and dimensions: the selectable elements of a slicer.

use crate::frame::Value;
use crate::sql::Expr;

use super::intervals::{DatetimeInterval, NumericInterval};

/// Prefix of dimension value columns in SQL results and frames.
pub const DIMENSION_PREFIX: &str = "$d$";
/// Prefix of metric columns in SQL results and frames.
pub const METRIC_PREFIX: &str = "$m$";
/// Suffix appended to a dimension key for its display column.
pub const DISPLAY_SUFFIX: &str = "_display";

/// Column alias of a dimension key.
pub fn dimension_alias(key: &str) -> String {
    format!("{}{}", DIMENSION_PREFIX, key)
}

/// Column alias of a metric key.
pub fn metric_alias(key: &str) -> String {
    format!("{}{}", METRIC_PREFIX, key)
}

// =============================================================================
// Metric
// =============================================================================

/// An aggregating expression with display hints.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub key: String,
    pub label: String,
    pub definition: Expr,
    pub precision: Option<usize>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl Metric {
    /// A metric labelled with its key.
    pub fn new(key: &str, definition: Expr) -> Self {
        Self {
            key: key.into(),
            label: key.into(),
            definition,
            precision: None,
            prefix: None,
            suffix: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Result column holding this metric.
    pub fn alias(&self) -> String {
        metric_alias(&self.key)
    }
}

// =============================================================================
// Dimension
// =============================================================================

/// What kind of values a dimension groups by, and how they are bucketed.
#[derive(Debug, Clone, PartialEq)]
pub enum DimensionKind {
    Boolean,
    /// A small fixed set of values, each with caller-supplied display text.
    Categorical {
        display_values: Vec<(String, String)>,
    },
    /// Key-like values, optionally shown through a secondary display term.
    Unique { display_definition: Option<Expr> },
    Continuous { interval: NumericInterval },
    Datetime { interval: DatetimeInterval },
}

/// A groupable attribute of the fact table.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub key: String,
    pub label: String,
    pub definition: Expr,
    pub kind: DimensionKind,
    pub is_rollup: bool,
    pub hyperlink_template: Option<String>,
}

impl Dimension {
    fn with_kind(key: &str, definition: Expr, kind: DimensionKind) -> Self {
        Self {
            key: key.into(),
            label: key.into(),
            definition,
            kind,
            is_rollup: false,
            hyperlink_template: None,
        }
    }

    pub fn boolean(key: &str, definition: Expr) -> Self {
        Self::with_kind(key, definition, DimensionKind::Boolean)
    }

    /// A categorical dimension with `(value, display)` pairs.
    pub fn categorical(key: &str, definition: Expr, display_values: &[(&str, &str)]) -> Self {
        Self::with_kind(
            key,
            definition,
            DimensionKind::Categorical {
                display_values: display_values
                    .iter()
                    .map(|(v, d)| (v.to_string(), d.to_string()))
                    .collect(),
            },
        )
    }

    pub fn unique(key: &str, definition: Expr) -> Self {
        Self::with_kind(
            key,
            definition,
            DimensionKind::Unique {
                display_definition: None,
            },
        )
    }

    pub fn continuous(key: &str, definition: Expr) -> Self {
        Self::with_kind(
            key,
            definition,
            DimensionKind::Continuous {
                interval: NumericInterval::default(),
            },
        )
    }

    /// A datetime dimension bucketed daily.
    pub fn datetime(key: &str, definition: Expr) -> Self {
        Self::with_kind(
            key,
            definition,
            DimensionKind::Datetime {
                interval: DatetimeInterval::Daily,
            },
        )
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_hyperlink_template(mut self, template: &str) -> Self {
        self.hyperlink_template = Some(template.into());
        self
    }

    /// Set the display term of a unique dimension. Other kinds are unchanged.
    pub fn with_display(mut self, display_definition: Expr) -> Self {
        if let DimensionKind::Unique {
            display_definition: slot,
        } = &mut self.kind
        {
            *slot = Some(display_definition);
        }
        self
    }

    /// Re-bucket a datetime dimension. Other kinds are unchanged.
    pub fn with_interval(mut self, interval: DatetimeInterval) -> Self {
        if let DimensionKind::Datetime { interval: slot } = &mut self.kind {
            *slot = interval;
        }
        self
    }

    /// Re-bucket a continuous dimension. Other kinds are unchanged.
    pub fn with_numeric_interval(mut self, interval: NumericInterval) -> Self {
        if let DimensionKind::Continuous { interval: slot } = &mut self.kind {
            *slot = interval;
        }
        self
    }

    /// A copy of this dimension that requests totals.
    pub fn rollup(&self) -> Self {
        let mut rolled = self.clone();
        rolled.is_rollup = true;
        rolled
    }

    /// Result column holding the dimension value.
    pub fn alias(&self) -> String {
        dimension_alias(&self.key)
    }

    pub fn display_key(&self) -> String {
        format!("{}{}", self.key, DISPLAY_SUFFIX)
    }

    /// Result column holding the display value.
    pub fn display_alias(&self) -> String {
        dimension_alias(&self.display_key())
    }

    pub fn display_definition(&self) -> Option<&Expr> {
        match &self.kind {
            DimensionKind::Unique { display_definition } => display_definition.as_ref(),
            _ => None,
        }
    }

    pub fn has_display(&self) -> bool {
        self.display_definition().is_some()
    }

    /// Datetime and continuous dimensions: plotted on an axis, never rolled up there.
    pub fn is_continuous(&self) -> bool {
        matches!(
            self.kind,
            DimensionKind::Continuous { .. } | DimensionKind::Datetime { .. }
        )
    }

    pub fn datetime_interval(&self) -> Option<DatetimeInterval> {
        match self.kind {
            DimensionKind::Datetime { interval } => Some(interval),
            _ => None,
        }
    }

    /// Display text of a categorical value, if the mapping has one.
    pub fn display_value(&self, value: &Value) -> Option<&str> {
        let DimensionKind::Categorical { display_values } = &self.kind else {
            return None;
        };
        let text = value.to_string();
        display_values
            .iter()
            .find(|(v, _)| match value {
                Value::Bool(b) => *v == text || v == if *b { "1" } else { "0" },
                _ => *v == text,
            })
            .map(|(_, display)| display.as_str())
    }
}

// =============================================================================
// Field
// =============================================================================

/// A selectable element a request can sort by.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Dimension(Dimension),
    Metric(Metric),
}

impl Field {
    pub fn key(&self) -> &str {
        match self {
            Field::Dimension(d) => &d.key,
            Field::Metric(m) => &m.key,
        }
    }

    /// Result column this field is selected under.
    pub fn alias(&self) -> String {
        match self {
            Field::Dimension(d) => d.alias(),
            Field::Metric(m) => m.alias(),
        }
    }
}

impl From<&Dimension> for Field {
    fn from(dimension: &Dimension) -> Self {
        Field::Dimension(dimension.clone())
    }
}

impl From<&Metric> for Field {
    fn from(metric: &Metric) -> Self {
        Field::Metric(metric.clone())
    }
}
