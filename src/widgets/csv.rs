//! CSV output: the labelled frame written as text.

use crate::error::{RenderError, SlicerResult};
use crate::formats::format_timestamp;
use crate::frame::{DataFrame, Value};
use crate::schema::{Dimension, Reference, Slicer};

use super::frame::FrameWidget;
use super::{Item, Widget, WidgetOutput};

#[derive(Debug, Clone, Default)]
pub struct CsvWidget {
    items: Vec<Item>,
    pivot: Vec<String>,
}

impl CsvWidget {
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

    pub fn pivot(mut self, dimension_keys: &[&str]) -> Self {
        self.pivot = dimension_keys.iter().map(|k| k.to_string()).collect();
        self
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Timestamp(t) => format_timestamp(t),
        other => other.to_string(),
    }
}

fn write_csv(frame: &DataFrame) -> Result<String, RenderError> {
    let mut writer = ::csv::Writer::from_writer(vec![]);

    let header: Vec<&str> = frame
        .index_names()
        .iter()
        .chain(frame.column_names())
        .map(String::as_str)
        .collect();
    writer.write_record(&header)?;

    for (labels, values) in frame.rows() {
        writer.write_record(labels.iter().chain(values.iter()).map(cell))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| RenderError::Io(err.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

impl Widget for CsvWidget {
    fn name(&self) -> &'static str {
        "CSV"
    }

    fn items(&self) -> Vec<Item> {
        self.items.clone()
    }

    fn transform(
        &self,
        frame: &DataFrame,
        slicer: &Slicer,
        dimensions: &[Dimension],
        references: &[Reference],
    ) -> SlicerResult<WidgetOutput> {
        let labelled = FrameWidget::new(self.items.clone()).pivot(
            &self.pivot.iter().map(String::as_str).collect::<Vec<_>>(),
        );
        let WidgetOutput::Frame(result) = labelled.transform(frame, slicer, dimensions, references)?
        else {
            return Ok(WidgetOutput::Csv(String::new()));
        };
        Ok(WidgetOutput::Csv(write_csv(&result)?))
    }
}
