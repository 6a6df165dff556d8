//! Value formatting shared by the renderers.
//!
//! Renderers show each cell twice: a raw JSON value (for sorting and
//! charting) and display text with the element's prefix, suffix and
//! precision applied. Totals markers render as [`TOTALS_LABEL`].

use chrono::Timelike;
use serde_json::json;

use crate::frame::Value;
use crate::schema::Dimension;

/// Label shown for totals rows.
pub const TOTALS_LABEL: &str = "Totals";

/// Number formatting hints carried by metrics and operations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Format<'a> {
    pub prefix: Option<&'a str>,
    pub suffix: Option<&'a str>,
    pub precision: Option<usize>,
}

/// Group the integer digits of `digits` in thousands.
fn with_separators(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let (whole, fraction) = match digits.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

fn format_float(f: f64, precision: Option<usize>) -> String {
    match precision {
        Some(p) => format!("{:.*}", p, f),
        None => {
            let mut buf = ryu::Buffer::new();
            let text = buf.format(f);
            text.strip_suffix(".0").unwrap_or(text).to_string()
        }
    }
}

/// Text of a timestamp: the date alone at midnight.
pub fn format_timestamp(value: &chrono::NaiveDateTime) -> String {
    if value.hour() == 0 && value.minute() == 0 && value.second() == 0 {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Display text of a metric value. Nulls and non-finite numbers have none.
pub fn metric_display(value: &Value, format: Format<'_>) -> Option<String> {
    let number = match value {
        Value::Null => return None,
        Value::Float(f) if !f.is_finite() => return None,
        Value::Int(i) => with_separators(&match format.precision {
            Some(p) if p > 0 => format!("{:.*}", p, *i as f64),
            _ => i.to_string(),
        }),
        Value::Float(f) => with_separators(&format_float(*f, format.precision)),
        Value::Bool(b) => b.to_string(),
        Value::Text(s) => s.clone(),
        Value::Timestamp(t) => format_timestamp(t),
    };

    Some(format!(
        "{}{}{}",
        format.prefix.unwrap_or(""),
        number,
        format.suffix.unwrap_or("")
    ))
}

/// Raw JSON of a metric value. Non-finite numbers become null.
pub fn metric_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => json!(s),
        Value::Timestamp(t) => json!(t.format("%Y-%m-%dT%H:%M:%S").to_string()),
    }
}

/// A dimension label as a frame value: totals markers become [`TOTALS_LABEL`].
pub fn dimension_value(value: &Value) -> Value {
    if value.is_totals_marker() {
        Value::Text(TOTALS_LABEL.to_string())
    } else {
        value.clone()
    }
}

/// Raw JSON of a dimension label.
pub fn dimension_json(value: &Value) -> serde_json::Value {
    if value.is_totals_marker() {
        json!(TOTALS_LABEL)
    } else {
        metric_json(value)
    }
}

/// Display text of a dimension label.
///
/// Categorical values use the dimension's mapping; `display` is the value
/// of the display column for dimensions that have one.
pub fn dimension_display(dimension: &Dimension, value: &Value, display: Option<&Value>) -> String {
    if value.is_totals_marker() {
        return TOTALS_LABEL.to_string();
    }
    if let Some(text) = display.filter(|d| !d.is_null()) {
        return text.to_string();
    }
    if let Some(text) = dimension.display_value(value) {
        return text.to_string();
    }
    match value {
        Value::Timestamp(t) => format_timestamp(t),
        other => other.to_string(),
    }
}
