//! Labelled frame output.

use crate::error::SlicerResult;
use crate::formats::{dimension_value, TOTALS_LABEL};
use crate::frame::{DataFrame, Value};
use crate::schema::{Dimension, Reference, Slicer};

use super::{display_cell, item_columns, Item, Widget, WidgetOutput};

/// Returns the result as a [`DataFrame`] indexed and headed by labels.
///
/// Dimension levels show display values where the dimension has them and
/// `Totals` on totals rows. Dimensions named in `pivot` are unstacked
/// into columns labelled `Votes|Democrat`.
#[derive(Debug, Clone, Default)]
pub struct FrameWidget {
    items: Vec<Item>,
    pivot: Vec<String>,
}

impl FrameWidget {
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

    /// Unstack these dimension keys into columns.
    pub fn pivot(mut self, dimension_keys: &[&str]) -> Self {
        self.pivot = dimension_keys.iter().map(|k| k.to_string()).collect();
        self
    }

    /// The labelled frame, before pivoting.
    pub(crate) fn relabel(
        items: &[Item],
        frame: &DataFrame,
        dimensions: &[Dimension],
        references: &[Reference],
    ) -> SlicerResult<DataFrame> {
        let columns = item_columns(items, references);

        let mut names: Vec<String> = dimensions.iter().map(|d| d.label.clone()).collect();
        names.extend(columns.iter().map(|c| c.label()));

        let positions = columns
            .iter()
            .map(|c| {
                frame
                    .column_position(&c.alias())
                    .ok_or_else(|| crate::frame::FrameError::MissingColumn(c.alias()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(frame.len());
        for row in 0..frame.len() {
            let labels = frame.index_at(row);
            let values = frame.row(row);
            let mut record: Vec<Value> = dimensions
                .iter()
                .enumerate()
                .map(|(level, d)| level_label(d, &labels[level], display_cell(frame, d, row).as_ref()))
                .collect();
            record.extend(positions.iter().map(|&p| values[p].clone()));
            records.push(record);
        }

        let index: Vec<String> = names[..dimensions.len()].to_vec();
        Ok(DataFrame::from_records(names, records)?.set_index(&index)?)
    }
}

/// Index label of a dimension value in rendered output.
fn level_label(dimension: &Dimension, value: &Value, display: Option<&Value>) -> Value {
    if value.is_totals_marker() {
        return Value::Text(TOTALS_LABEL.to_string());
    }
    if let Some(display) = display.filter(|d| !d.is_null()) {
        return display.clone();
    }
    match dimension.display_value(value) {
        Some(text) => Value::Text(text.to_string()),
        None => dimension_value(value),
    }
}

impl Widget for FrameWidget {
    fn name(&self) -> &'static str {
        "Frame"
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
        let mut result = Self::relabel(&self.items, frame, dimensions, references)?;

        for key in &self.pivot {
            let Some(dimension) = dimensions.iter().find(|d| &d.key == key) else {
                continue;
            };
            result = result.unstack(&dimension.label)?.frame;
        }

        Ok(WidgetOutput::Frame(result))
    }
}
