//! HighCharts JSON output.
//!
//! The first dimension is the x axis (`datetime` for datetime dimensions,
//! `category` otherwise). Every other dimension splits each item into one
//! series per value combination, and every reference adds a dashed copy.

use serde_json::{json, Value as Json};

use crate::error::{SlicerResult, ValidationError};
use crate::formats::{dimension_display, metric_json};
use crate::frame::{DataFrame, FrameError, Value};
use crate::schema::{Dimension, Reference, Slicer};

use super::{display_cell, Item, ItemColumn, Widget, WidgetOutput};

const WIDGET_NAME: &str = "HighCharts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Line,
    Area,
    Bar,
    Column,
    Pie,
}

impl SeriesKind {
    pub fn key(self) -> &'static str {
        match self {
            SeriesKind::Line => "line",
            SeriesKind::Area => "area",
            SeriesKind::Bar => "bar",
            SeriesKind::Column => "column",
            SeriesKind::Pie => "pie",
        }
    }
}

/// One plotted item.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub kind: SeriesKind,
    pub item: Item,
}

impl Series {
    pub fn new(kind: SeriesKind, item: impl Into<Item>) -> Self {
        Self {
            kind,
            item: item.into(),
        }
    }

    pub fn line(item: impl Into<Item>) -> Self {
        Self::new(SeriesKind::Line, item)
    }

    pub fn area(item: impl Into<Item>) -> Self {
        Self::new(SeriesKind::Area, item)
    }

    pub fn bar(item: impl Into<Item>) -> Self {
        Self::new(SeriesKind::Bar, item)
    }

    pub fn column(item: impl Into<Item>) -> Self {
        Self::new(SeriesKind::Column, item)
    }

    pub fn pie(item: impl Into<Item>) -> Self {
        Self::new(SeriesKind::Pie, item)
    }
}

/// A y axis and the series plotted against it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Axis {
    pub series: Vec<Series>,
}

impl Axis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct HighCharts {
    title: Option<String>,
    axes: Vec<Axis>,
}

impl HighCharts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn axis(mut self, axis: Axis) -> Self {
        self.axes.push(axis);
        self
    }
}

/// X coordinate of a row's leading label.
fn x_value(label: &Value, categories: &mut Vec<String>, text: String) -> Json {
    match label {
        Value::Timestamp(t) => json!(t.and_utc().timestamp_millis()),
        _ => {
            let index = categories.iter().position(|c| *c == text).unwrap_or_else(|| {
                categories.push(text);
                categories.len() - 1
            });
            json!(index)
        }
    }
}

fn tooltip(column: &ItemColumn<'_>) -> Json {
    let format = column.format();
    json!({
        "valuePrefix": format.prefix,
        "valueSuffix": format.suffix,
        "valueDecimals": format.precision,
    })
}

impl HighCharts {
    fn group_name(frame: &DataFrame, dimensions: &[Dimension], row: usize, levels: &[usize]) -> Option<String> {
        if levels.is_empty() {
            return None;
        }
        let labels = frame.index_at(row);
        let names: Vec<String> = levels
            .iter()
            .map(|&l| dimension_display(&dimensions[l], &labels[l], display_cell(frame, &dimensions[l], row).as_ref()))
            .collect();
        Some(names.join(", "))
    }

    fn pie_series(
        frame: &DataFrame,
        dimensions: &[Dimension],
        column: &ItemColumn<'_>,
        pos: usize,
    ) -> Json {
        let levels: Vec<usize> = (0..dimensions.len()).collect();
        let data: Vec<Json> = (0..frame.len())
            .filter(|&r| !frame.index_at(r).iter().any(Value::is_totals_marker))
            .map(|r| {
                let name = Self::group_name(frame, dimensions, r, &levels).unwrap_or_else(|| column.label());
                json!({"name": name, "y": metric_json(&frame.row(r)[pos])})
            })
            .collect();

        json!({
            "type": SeriesKind::Pie.key(),
            "name": column.label(),
            "data": data,
            "tooltip": tooltip(column),
        })
    }
}

impl Widget for HighCharts {
    fn name(&self) -> &'static str {
        WIDGET_NAME
    }

    fn items(&self) -> Vec<Item> {
        self.axes
            .iter()
            .flat_map(|a| a.series.iter().map(|s| s.item.clone()))
            .collect()
    }

    fn validate(&self, dimensions: &[Dimension]) -> SlicerResult<()> {
        if self.axes.is_empty() || self.axes.iter().any(|a| a.series.is_empty()) {
            return Err(ValidationError::MetricRequired {
                widget: WIDGET_NAME.into(),
            }
            .into());
        }
        if let Some(leading) = dimensions.first() {
            if leading.is_continuous() && leading.is_rollup {
                return Err(ValidationError::ContinuousDimensionCannotBeRolledUp {
                    dimension: leading.key.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn transform(
        &self,
        frame: &DataFrame,
        _slicer: &Slicer,
        dimensions: &[Dimension],
        references: &[Reference],
    ) -> SlicerResult<WidgetOutput> {
        let is_datetime = dimensions
            .first()
            .is_some_and(|d| d.datetime_interval().is_some());
        let group_levels: Vec<usize> = (1..dimensions.len()).collect();
        let groups = frame.group_positions(&group_levels);
        let variants: Vec<Option<&Reference>> =
            std::iter::once(None).chain(references.iter().map(Some)).collect();

        let mut categories: Vec<String> = vec![];
        let mut y_axes: Vec<Json> = vec![];
        let mut series_out: Vec<Json> = vec![];

        for (axis_index, axis) in self.axes.iter().enumerate() {
            let axis_id = axis_index.to_string();
            let title = axis.series.first().map(|s| s.item.label());
            y_axes.push(json!({"id": axis_id, "title": {"text": title}}));

            for series in &axis.series {
                for &reference in &variants {
                    let column = ItemColumn {
                        item: &series.item,
                        reference,
                    };
                    let pos = frame
                        .column_position(&column.alias())
                        .ok_or_else(|| FrameError::MissingColumn(column.alias()))?;

                    if series.kind == SeriesKind::Pie {
                        series_out.push(Self::pie_series(frame, dimensions, &column, pos));
                        continue;
                    }

                    for group in &groups {
                        let mut data: Vec<Json> = vec![];
                        for &r in group {
                            let y = metric_json(&frame.row(r)[pos]);
                            let Some(leading) = dimensions.first() else {
                                data.push(y);
                                continue;
                            };
                            let labels = frame.index_at(r);
                            let label = &labels[0];
                            if label.is_totals_marker() {
                                continue;
                            }
                            let text = dimension_display(leading, label, display_cell(frame, leading, r).as_ref());
                            data.push(json!([x_value(label, &mut categories, text), y]));
                        }

                        let name = match Self::group_name(frame, dimensions, group[0], &group_levels) {
                            Some(group_name) => format!("{} ({})", column.label(), group_name),
                            None => column.label(),
                        };
                        let dash_style = if reference.is_some() { "Dash" } else { "Solid" };
                        series_out.push(json!({
                            "type": series.kind.key(),
                            "name": name,
                            "yAxis": axis_id,
                            "data": data,
                            "dashStyle": dash_style,
                            "tooltip": tooltip(&column),
                        }));
                    }
                }
            }
        }

        let x_axis = if is_datetime {
            json!({"type": "datetime"})
        } else {
            json!({"type": "category", "categories": categories})
        };

        Ok(WidgetOutput::Json(json!({
            "title": {"text": self.title},
            "xAxis": x_axis,
            "yAxis": y_axes,
            "series": series_out,
        })))
    }
}
