//! Turning raw result rows into an indexed frame.
//!
//! Totals branches select NULL for rolled-up dimensions. Shaping swaps
//! those NULLs for typed totals markers, moves dimension columns into the
//! index and, once operations have run, drops totals rows the caller did
//! not ask for.

use crate::error::{ShapeError, SlicerResult};
use crate::frame::{DataFrame, Value};
use crate::schema::Dimension;

/// A totals marker matching the type of the column's other values.
fn marker_for(values: &[Value]) -> Value {
    values
        .iter()
        .find(|v| !v.is_null())
        .map(|v| v.totals_marker_like())
        .unwrap_or_else(|| Value::Text(crate::frame::TOTALS_MARKER.to_string()))
}

/// Whether each dimension is totalled in SQL, with rollup carried to every
/// later dimension.
pub fn rollup_flags(dimensions: &[Dimension]) -> Vec<bool> {
    let mut rolled = false;
    dimensions
        .iter()
        .map(|d| {
            rolled |= d.is_rollup;
            rolled
        })
        .collect()
}

/// Index the raw frame on its dimensions.
///
/// `dimensions` carries the rollup flags the SQL was built with. NULLs in
/// rolled-up columns become totals markers; NULLs in other continuous
/// columns become empty text. Rows are sorted by index when any dimension
/// was rolled up and no explicit order was requested.
pub fn shape(raw: DataFrame, dimensions: &[Dimension], ordered: bool) -> SlicerResult<DataFrame> {
    let mut frame = raw;
    let flags = rollup_flags(dimensions);

    for (dimension, &rolled) in dimensions.iter().zip(&flags) {
        let alias = dimension.alias();
        if !frame.has_column(&alias) {
            return Err(ShapeError::MissingColumn(alias).into());
        }

        if rolled {
            let marker = marker_for(&frame.column(&alias)?);
            frame.fill_null(&alias, &marker)?;
        } else if dimension.is_continuous() && frame.column(&alias)?.iter().any(Value::is_null) {
            // The column turns to text so the unknown bucket has a label.
            frame.map_column(&alias, |v| {
                if v.is_null() {
                    Value::Text(String::new())
                } else {
                    v.clone()
                }
            })?;
        }
    }

    let keys: Vec<String> = dimensions.iter().map(|d| d.alias()).collect();
    let mut frame = frame.set_index(&keys)?;

    if flags.iter().any(|&f| f) && !ordered {
        frame.sort_index()?;
    }

    check_unique_index(&frame)?;
    tracing::debug!(rows = frame.len(), levels = keys.len(), "shaped result");
    Ok(frame)
}

fn check_unique_index(frame: &DataFrame) -> SlicerResult<()> {
    let all: Vec<usize> = (0..frame.index_names().len()).collect();
    if let Some(group) = frame.group_positions(&all).into_iter().find(|g| g.len() > 1) {
        return Err(ShapeError::DuplicateIndex {
            dimensions: frame.index_names().to_vec(),
            values: frame.index_at(group[0]).iter().map(|v| v.to_string()).collect(),
        }
        .into());
    }
    Ok(())
}

/// Drop totals rows the caller did not request.
///
/// A row is kept when every index level holding a totals marker belongs
/// to a dimension the caller rolled up (directly or through an earlier
/// rolled-up dimension). Totals computed only to support share operations
/// are removed here.
pub fn scrub_totals(frame: &mut DataFrame, requested: &[Dimension]) -> SlicerResult<()> {
    let flags = rollup_flags(requested);
    let strict = cfg!(feature = "strict-totals-scrub");

    frame.retain(|labels, _| {
        let markers: Vec<bool> = labels.iter().map(|v| v.is_totals_marker()).collect();
        let allowed = markers.iter().zip(&flags).all(|(&m, &rolled)| !m || rolled);
        if !allowed {
            return false;
        }
        // Markers must run from the first totalled level to the end.
        !strict || match markers.iter().position(|&m| m) {
            Some(first) => markers[first..].iter().all(|&m| m),
            None => true,
        }
    })?;
    Ok(())
}
