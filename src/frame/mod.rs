//! Result frames.
//!
//! A [`DataFrame`] is a polars frame with some of its columns named as index
//! levels. Query results arrive as plain records; the shaper moves the
//! dimension columns into the index, operations derive metric columns with
//! polars expressions, and widgets read rows back as [`Value`]s.
//!
//! ```text
//!   index_names: [$d$timestamp, $d$political_party]   columns: [$m$votes, ...]
//!   polars:       $d$timestamp | $d$political_party  |  $m$votes | ...
//! ```
//!
//! Cells are converted at the edges only: [`from_records`](DataFrame::from_records)
//! and [`insert_column`](DataFrame::insert_column) pick one polars dtype per
//! column, and reads turn `AnyValue`s back into [`Value`]s.

mod value;

pub use value::{Value, TOTALS_MARKER};

use std::collections::BTreeMap;

use chrono::DateTime;
use polars::prelude::{
    col, AnyValue, BooleanChunked, DataType, Expr, IdxCa, IdxSize, IntoLazy, NamedFrom, NewChunkedArray,
    PolarsError, Series, SortMultipleOptions, TimeUnit,
};
use thiserror::Error;

/// Separator between a metric and a pivoted dimension value in column names.
pub const UNSTACK_SEPARATOR: char = '|';

const POSITION: &str = "__position";

/// Result type for frame manipulation.
pub type FrameResult<T> = Result<T, FrameError>;

/// Errors raised by frame manipulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("row has {actual} values, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("no column named `{0}`")]
    MissingColumn(String),

    #[error("no index level named `{0}`")]
    MissingLevel(String),

    #[error("polars: {0}")]
    Polars(String),
}

impl From<PolarsError> for FrameError {
    fn from(err: PolarsError) -> Self {
        FrameError::Polars(err.to_string())
    }
}

/// A polars frame with named index levels.
#[derive(Debug, Clone)]
pub struct DataFrame {
    index_names: Vec<String>,
    columns: Vec<String>,
    df: polars::prelude::DataFrame,
}

impl PartialEq for DataFrame {
    fn eq(&self, other: &Self) -> bool {
        self.index_names == other.index_names
            && self.columns == other.columns
            && self.df.equals_missing(&other.df)
    }
}

/// Result of [`DataFrame::unstack`].
#[derive(Debug, Clone, PartialEq)]
pub struct Unstacked {
    pub frame: DataFrame,
    /// For every column of `frame`: the source column and the pivoted value.
    pub keys: Vec<(String, Value)>,
}

/// Columns that exist only while a derived column is computed.
#[derive(Default)]
pub struct Scratch {
    masks: Vec<(String, Vec<bool>)>,
    exprs: Vec<(String, Expr)>,
}

impl Scratch {
    /// A boolean column, one flag per row.
    pub fn mask(mut self, name: &str, flags: Vec<bool>) -> Self {
        self.masks.push((name.to_string(), flags));
        self
    }

    /// A column computed before the derived one, in the order added.
    pub fn expr(mut self, name: &str, expr: Expr) -> Self {
        self.exprs.push((name.to_string(), expr));
        self
    }
}

impl DataFrame {
    /// Build a frame from row records, with no index.
    pub fn from_records(columns: Vec<String>, rows: Vec<Vec<Value>>) -> FrameResult<Self> {
        for row in &rows {
            if row.len() != columns.len() {
                return Err(FrameError::LengthMismatch {
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
        }

        let mut series = Vec::with_capacity(columns.len());
        for (c, name) in columns.iter().enumerate() {
            let values: Vec<Value> = rows.iter().map(|row| row[c].clone()).collect();
            series.push(series_from_values(name, &values)?);
        }

        Ok(Self {
            index_names: vec![],
            columns,
            df: polars::prelude::DataFrame::new(series)?,
        })
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index_names(&self) -> &[String] {
        &self.index_names
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// The underlying polars frame: index levels first, then data columns.
    pub fn polars(&self) -> &polars::prelude::DataFrame {
        &self.df
    }

    fn cell(&self, name: &str, row: usize) -> Value {
        self.df
            .column(name)
            .ok()
            .and_then(|s| s.get(row).ok())
            .map_or(Value::Null, from_any)
    }

    /// One cell of a data column.
    pub fn value_at(&self, column: &str, row: usize) -> Option<Value> {
        self.has_column(column).then(|| self.cell(column, row))
    }

    /// Index labels of row `row`.
    pub fn index_at(&self, row: usize) -> Vec<Value> {
        self.index_names.iter().map(|n| self.cell(n, row)).collect()
    }

    /// Data values of row `row`.
    pub fn row(&self, row: usize) -> Vec<Value> {
        self.columns.iter().map(|n| self.cell(n, row)).collect()
    }

    /// Iterate `(index labels, data values)` per row.
    pub fn rows(&self) -> impl Iterator<Item = (Vec<Value>, Vec<Value>)> + '_ {
        (0..self.len()).map(move |r| (self.index_at(r), self.row(r)))
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn level_position(&self, name: &str) -> Option<usize> {
        self.index_names.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_position(name).is_some()
    }

    fn values(&self, name: &str) -> FrameResult<Vec<Value>> {
        let series = self.df.column(name)?;
        Ok((0..series.len())
            .map(|r| series.get(r).map_or(Value::Null, from_any))
            .collect())
    }

    /// Values of one column, top to bottom.
    pub fn column(&self, name: &str) -> FrameResult<Vec<Value>> {
        if !self.has_column(name) {
            return Err(FrameError::MissingColumn(name.to_string()));
        }
        self.values(name)
    }

    /// Labels of one index level, top to bottom.
    pub fn level(&self, name: &str) -> FrameResult<Vec<Value>> {
        if self.level_position(name).is_none() {
            return Err(FrameError::MissingLevel(name.to_string()));
        }
        self.values(name)
    }

    /// Append a column, or replace it if the name already exists.
    pub fn insert_column(&mut self, name: &str, values: Vec<Value>) -> FrameResult<()> {
        if values.len() != self.len() && self.df.width() > 0 {
            return Err(FrameError::LengthMismatch {
                expected: self.len(),
                actual: values.len(),
            });
        }
        self.df.with_column(series_from_values(name, &values)?)?;
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
        Ok(())
    }

    /// Rewrite every value of a column in place.
    pub fn map_column<F>(&mut self, name: &str, f: F) -> FrameResult<()>
    where
        F: FnMut(&Value) -> Value,
    {
        let values: Vec<Value> = self.column(name)?.iter().map(f).collect();
        self.insert_column(name, values)
    }

    /// Replace nulls in a data column with `value`.
    pub fn fill_null(&mut self, name: &str, value: &Value) -> FrameResult<()> {
        if !self.has_column(name) {
            return Err(FrameError::MissingColumn(name.to_string()));
        }
        let all_null = self.df.column(name)?.null_count() == self.len();
        let Some(literal) = literal(value).filter(|_| !all_null) else {
            // Nothing typed to fill into; the column takes the value's type.
            return self.map_column(name, |v| if v.is_null() { value.clone() } else { v.clone() });
        };
        self.df = self
            .df
            .clone()
            .lazy()
            .with_column(col(name).fill_null(literal).alias(name))
            .collect()?;
        Ok(())
    }

    /// Compute column `name` from a polars expression over this frame.
    ///
    /// Scratch columns are visible to `expr` and dropped afterwards.
    pub fn derive(&mut self, name: &str, expr: Expr, scratch: Scratch) -> FrameResult<()> {
        let mut df = self.df.clone();
        for (mask, flags) in &scratch.masks {
            df.with_column(Series::new(mask, flags.as_slice()))?;
        }

        let mut lazy = df.lazy();
        for (helper, helper_expr) in &scratch.exprs {
            lazy = lazy.with_column(helper_expr.clone().alias(helper));
        }
        let mut df = lazy.with_column(expr.alias(name)).collect()?;

        for temporary in scratch.masks.iter().map(|m| &m.0).chain(scratch.exprs.iter().map(|e| &e.0)) {
            df = df.drop(temporary)?;
        }
        self.df = df;
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
        Ok(())
    }

    /// Keep only the named columns, in the given order.
    pub fn select_columns(&self, names: &[String]) -> FrameResult<DataFrame> {
        if let Some(missing) = names.iter().find(|n| !self.has_column(n)) {
            return Err(FrameError::MissingColumn(missing.clone()));
        }
        let selection: Vec<String> = self.index_names.iter().chain(names).cloned().collect();
        Ok(DataFrame {
            index_names: self.index_names.clone(),
            columns: names.to_vec(),
            df: self.df.select(selection)?,
        })
    }

    /// Move the named columns into the index, in order.
    pub fn set_index(self, keys: &[String]) -> FrameResult<DataFrame> {
        if let Some(missing) = keys.iter().find(|k| !self.has_column(k)) {
            return Err(FrameError::MissingColumn(missing.clone()));
        }

        let mut index_names = self.index_names;
        index_names.extend(keys.iter().cloned());
        let columns: Vec<String> = self.columns.into_iter().filter(|c| !keys.contains(c)).collect();

        let selection: Vec<String> = index_names.iter().chain(&columns).cloned().collect();
        Ok(DataFrame {
            df: self.df.select(selection)?,
            index_names,
            columns,
        })
    }

    /// Move every index level back into leading data columns.
    pub fn reset_index(self) -> DataFrame {
        let mut columns = self.index_names;
        columns.extend(self.columns);
        DataFrame {
            index_names: vec![],
            columns,
            df: self.df,
        }
    }

    /// Keep the rows for which `keep(index labels, data values)` is true.
    pub fn retain<F>(&mut self, mut keep: F) -> FrameResult<()>
    where
        F: FnMut(&[Value], &[Value]) -> bool,
    {
        let flags: Vec<bool> = self.rows().map(|(labels, row)| keep(&labels, &row)).collect();
        self.df = self.df.filter(&BooleanChunked::from_slice("keep", &flags))?;
        Ok(())
    }

    /// A new frame holding the given rows, in the given order.
    pub fn take(&self, rows: &[usize]) -> FrameResult<DataFrame> {
        let positions: Vec<IdxSize> = rows.iter().map(|&r| r as IdxSize).collect();
        Ok(DataFrame {
            index_names: self.index_names.clone(),
            columns: self.columns.clone(),
            df: self.df.take(&IdxCa::from_vec("rows", positions))?,
        })
    }

    /// Row positions in ascending index order. Ties keep their order.
    pub fn index_order(&self) -> FrameResult<Vec<usize>> {
        if self.index_names.is_empty() {
            return Ok((0..self.len()).collect());
        }

        let mut keys = self.df.select(self.index_names.clone())?;
        let positions: Vec<u64> = (0..self.len() as u64).collect();
        keys.with_column(Series::new(POSITION, positions))?;

        let sorted = keys
            .lazy()
            .sort(
                self.index_names.clone(),
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .collect()?;
        Ok(sorted
            .column(POSITION)?
            .u64()?
            .into_iter()
            .flatten()
            .map(|p| p as usize)
            .collect())
    }

    /// Stable sort of rows by their index labels.
    pub fn sort_index(&mut self) -> FrameResult<()> {
        let order = self.index_order()?;
        *self = self.take(&order)?;
        Ok(())
    }

    /// Row positions grouped by the labels at `levels`, groups in order of
    /// first appearance.
    pub fn group_positions(&self, levels: &[usize]) -> Vec<Vec<usize>> {
        let mut slots: BTreeMap<Vec<Value>, usize> = BTreeMap::new();
        let mut groups: Vec<Vec<usize>> = vec![];
        for row in 0..self.len() {
            let key: Vec<Value> = levels
                .iter()
                .filter_map(|&l| self.index_names.get(l))
                .map(|name| self.cell(name, row))
                .collect();
            let slot = *slots.entry(key).or_insert_with(|| {
                groups.push(vec![]);
                groups.len() - 1
            });
            groups[slot].push(row);
        }
        groups
    }

    /// Pivot one index level into columns.
    ///
    /// Each data column `c` becomes one column per distinct label `v` of the
    /// level, named `c|v`, with labels in sorted order. Remaining index
    /// tuples keep their order of first appearance; missing cells are null.
    pub fn unstack(&self, level: &str) -> FrameResult<Unstacked> {
        let labels = self.level(level)?;
        let mut pivot_values = labels.clone();
        pivot_values.sort();
        pivot_values.dedup();

        let remaining: Vec<String> = self
            .index_names
            .iter()
            .filter(|n| n.as_str() != level)
            .cloned()
            .collect();

        let mut df = self.df.clone();
        for (k, value) in pivot_values.iter().enumerate() {
            let flags: Vec<bool> = labels.iter().map(|l| l == value).collect();
            df.with_column(Series::new(&pivot_mask(k), flags))?;
        }

        let mut keys = Vec::with_capacity(self.columns.len() * pivot_values.len());
        let mut columns = Vec::with_capacity(keys.capacity());
        let mut aggs = Vec::with_capacity(keys.capacity());
        for column in &self.columns {
            for (k, value) in pivot_values.iter().enumerate() {
                let name = format!("{}{}{}", column, UNSTACK_SEPARATOR, value);
                aggs.push(col(column).filter(col(&pivot_mask(k))).first().alias(&name));
                columns.push(name);
                keys.push((column.clone(), value.clone()));
            }
        }

        let df = if self.is_empty() {
            let names: Vec<String> = remaining.iter().chain(&columns).cloned().collect();
            DataFrame::from_records(names, vec![])?.df
        } else if remaining.is_empty() {
            df.lazy().select(aggs).collect()?
        } else {
            let by: Vec<Expr> = remaining.iter().map(|n| col(n)).collect();
            df.lazy().group_by_stable(by).agg(aggs).collect()?
        };

        Ok(Unstacked {
            frame: DataFrame {
                index_names: remaining,
                columns,
                df,
            },
            keys,
        })
    }
}

fn pivot_mask(k: usize) -> String {
    format!("__pivot_{}", k)
}

// =============================================================================
// Value <-> polars
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Empty,
    Bool,
    Int,
    Float,
    Text,
    Timestamp,
    Mixed,
}

impl Kind {
    fn of(value: &Value) -> Kind {
        match value {
            Value::Null => Kind::Empty,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Text(_) => Kind::Text,
            Value::Timestamp(_) => Kind::Timestamp,
        }
    }

    fn widen(self, value: &Value) -> Kind {
        match (self, Kind::of(value)) {
            (k, Kind::Empty) | (Kind::Empty, k) => k,
            (a, b) if a == b => a,
            (Kind::Bool, Kind::Int) | (Kind::Int, Kind::Bool) => Kind::Int,
            (Kind::Bool | Kind::Int | Kind::Float, Kind::Bool | Kind::Int | Kind::Float) => Kind::Float,
            _ => Kind::Mixed,
        }
    }
}

fn millis(t: &chrono::NaiveDateTime) -> i64 {
    t.and_utc().timestamp_millis()
}

/// One polars column holding `values`, typed by the values present.
/// Numbers widen to float; anything else mixed falls back to text.
fn series_from_values(name: &str, values: &[Value]) -> FrameResult<Series> {
    let kind = values.iter().fold(Kind::Empty, Kind::widen);
    let series = match kind {
        Kind::Empty => Series::full_null(name, values.len(), &DataType::Float64),
        Kind::Bool => {
            let cells: Vec<Option<bool>> = values
                .iter()
                .map(|v| match v {
                    Value::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Series::new(name, cells)
        }
        Kind::Int => {
            let cells: Vec<Option<i64>> = values
                .iter()
                .map(|v| match v {
                    Value::Int(i) => Some(*i),
                    Value::Bool(b) => Some(i64::from(*b)),
                    _ => None,
                })
                .collect();
            Series::new(name, cells)
        }
        Kind::Float => {
            let cells: Vec<Option<f64>> = values.iter().map(Value::as_f64).collect();
            Series::new(name, cells)
        }
        Kind::Timestamp => {
            let cells: Vec<Option<i64>> = values.iter().map(|v| v.as_timestamp().map(|t| millis(&t))).collect();
            Series::new(name, cells).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        }
        Kind::Text | Kind::Mixed => {
            let cells: Vec<Option<String>> = values
                .iter()
                .map(|v| if v.is_null() { None } else { Some(v.to_string()) })
                .collect();
            Series::new(name, cells)
        }
    };
    Ok(series)
}

/// A polars literal of the value's type. `None` for null.
fn literal(value: &Value) -> Option<Expr> {
    use polars::prelude::lit;
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(lit(*b)),
        Value::Int(i) => Some(lit(*i)),
        Value::Float(f) => Some(lit(*f)),
        Value::Text(s) => Some(lit(s.clone())),
        Value::Timestamp(t) => Some(lit(millis(t)).cast(DataType::Datetime(TimeUnit::Milliseconds, None))),
    }
}

fn timestamp(value: i64, unit: TimeUnit) -> Value {
    let millis = match unit {
        TimeUnit::Nanoseconds => value.div_euclid(1_000_000),
        TimeUnit::Microseconds => value.div_euclid(1_000),
        TimeUnit::Milliseconds => value,
    };
    DateTime::from_timestamp_millis(millis).map_or(Value::Null, |t| Value::Timestamp(t.naive_utc()))
}

fn from_any(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::Int32(i) => Value::Int(i64::from(i)),
        AnyValue::Int64(i) => Value::Int(i),
        AnyValue::UInt32(u) => Value::Int(i64::from(u)),
        AnyValue::UInt64(u) => i64::try_from(u).map_or(Value::Float(u as f64), Value::Int),
        AnyValue::Float32(f) => Value::Float(f64::from(f)),
        AnyValue::Float64(f) => Value::Float(f),
        AnyValue::String(s) => Value::Text(s.to_string()),
        AnyValue::Datetime(v, unit, _) => timestamp(v, unit),
        AnyValue::Date(days) => timestamp(i64::from(days) * 86_400_000, TimeUnit::Milliseconds),
        other => match other.extract::<i64>() {
            Some(i) => Value::Int(i),
            None => Value::Text(other.to_string()),
        },
    }
}
