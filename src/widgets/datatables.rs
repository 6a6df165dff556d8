//! DataTables.js JSON output.
//!
//! ```json
//! {
//!   "columns": [{"data": "political_party", "title": "Party", "render": {"_": "value", "display": "display"}}],
//!   "data": [{"political_party": {"value": "d", "display": "Democrat"}, "votes": {"value": 7, "display": "7"}}]
//! }
//! ```
//!
//! Pivoted dimensions nest one level deeper, keyed by display text:
//! `"votes": {"Democrat": {...}, "Republican": {...}}`
//! with column `data` paths such as `votes.Democrat`.

use serde_json::{json, Map, Value as Json};

use crate::error::SlicerResult;
use crate::formats::{dimension_display, dimension_json, metric_display, metric_json};
use crate::frame::{DataFrame, Value};
use crate::schema::{Dimension, Reference, Slicer};

use super::{display_cell, item_columns, Item, ItemColumn, Widget, WidgetOutput};

#[derive(Debug, Clone, Default)]
pub struct DataTablesJs {
    items: Vec<Item>,
    pivot: Vec<String>,
}

impl DataTablesJs {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            pivot: vec![],
        }
    }

    pub fn item(mut self, item: impl Into<Item>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Spread these dimension keys across columns.
    pub fn pivot(mut self, dimension_keys: &[&str]) -> Self {
        self.pivot = dimension_keys.iter().map(|k| k.to_string()).collect();
        self
    }
}

fn render_spec() -> Json {
    json!({"_": "value", "display": "display"})
}

/// Fill `{key}` placeholders from the row's dimension values. Links with a
/// placeholder that cannot be filled are dropped.
fn hyperlink(template: &str, row: &[(&Dimension, &Value)]) -> Option<String> {
    let mut link = template.to_string();
    for (dimension, value) in row {
        if value.is_totals_marker() {
            continue;
        }
        link = link.replace(&format!("{{{}}}", dimension.key), &value.to_string());
    }
    (!link.contains('{')).then_some(link)
}

fn metric_cell(column: &ItemColumn<'_>, value: &Value) -> Json {
    let mut cell = Map::new();
    cell.insert("value".into(), metric_json(value));
    if let Some(display) = metric_display(value, column.format()) {
        cell.insert("display".into(), json!(display));
    }
    Json::Object(cell)
}

impl Widget for DataTablesJs {
    fn name(&self) -> &'static str {
        "DataTablesJs"
    }

    fn items(&self) -> Vec<Item> {
        self.items.clone()
    }

    fn transform(
        &self,
        frame: &DataFrame,
        _slicer: &Slicer,
        dimensions: &[Dimension],
        references: &[Reference],
    ) -> SlicerResult<WidgetOutput> {
        let columns = item_columns(&self.items, references);
        let (pivoted, rows_by): (Vec<usize>, Vec<usize>) =
            (0..dimensions.len()).partition(|&i| self.pivot.contains(&dimensions[i].key));

        let positions = columns
            .iter()
            .map(|c| {
                frame
                    .column_position(&c.alias())
                    .ok_or_else(|| crate::frame::FrameError::MissingColumn(c.alias()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut data: Vec<Map<String, Json>> = vec![];
        let mut pivot_keys: Vec<Vec<String>> = vec![];

        for group in frame.group_positions(&rows_by) {
            let first = group[0];
            let labels = frame.index_at(first);
            let row_dimensions: Vec<(&Dimension, &Value)> =
                rows_by.iter().map(|&l| (&dimensions[l], &labels[l])).collect();

            let mut record = Map::new();
            for &(dimension, value) in &row_dimensions {
                let display = display_cell(frame, dimension, first);
                let mut cell = Map::new();
                cell.insert("value".into(), dimension_json(value));
                cell.insert("display".into(), json!(dimension_display(dimension, value, display.as_ref())));
                if let Some(link) = dimension
                    .hyperlink_template
                    .as_deref()
                    .and_then(|t| hyperlink(t, &row_dimensions))
                {
                    cell.insert("hyperlink".into(), json!(link));
                }
                record.insert(dimension.key.clone(), Json::Object(cell));
            }

            let first_row = frame.row(first);
            for (column, &pos) in columns.iter().zip(&positions) {
                if pivoted.is_empty() {
                    record.insert(column.key(), metric_cell(column, &first_row[pos]));
                    continue;
                }
                let mut nested = Map::new();
                for &r in &group {
                    let path: Vec<String> = pivoted
                        .iter()
                        .map(|&l| {
                            let labels = frame.index_at(r);
                            let display = display_cell(frame, &dimensions[l], r);
                            dimension_display(&dimensions[l], &labels[l], display.as_ref())
                        })
                        .collect();
                    let key = path.join(", ");
                    if !pivot_keys.contains(&path) {
                        pivot_keys.push(path);
                    }
                    nested.insert(key, metric_cell(column, &frame.row(r)[pos]));
                }
                record.insert(column.key(), Json::Object(nested));
            }

            data.push(record);
        }

        let mut column_specs: Vec<Json> = rows_by
            .iter()
            .map(|&l| {
                let d = &dimensions[l];
                json!({"data": d.key, "title": d.label, "render": render_spec()})
            })
            .collect();

        for column in &columns {
            if pivoted.is_empty() {
                column_specs.push(json!({
                    "data": column.key(),
                    "title": column.label(),
                    "render": render_spec(),
                }));
                continue;
            }
            for path in &pivot_keys {
                let key = path.join(", ");
                column_specs.push(json!({
                    "data": format!("{}.{}", column.key(), key),
                    "title": format!("{} ({})", column.label(), key),
                    "render": render_spec(),
                }));
            }
        }

        Ok(WidgetOutput::Json(json!({
            "columns": column_specs,
            "data": data,
        })))
    }
}
