//! Schema model: what a slicer can select, filter and compare.
//!
//! - [`elements`] - metrics and the dimension variants
//! - [`intervals`] - datetime and numeric bucketing
//! - [`filters`] - WHERE and HAVING predicates built from elements
//! - [`references`] - time-shifted metric comparisons
//! - [`joins`] - joins from the fact table
//! - [`slicer`] - the aggregate root and its builder

pub mod elements;
pub mod filters;
pub mod intervals;
pub mod joins;
pub mod references;
pub mod slicer;

pub use elements::{
    dimension_alias, metric_alias, Dimension, DimensionKind, Field, Metric, DIMENSION_PREFIX,
    DISPLAY_SUFFIX, METRIC_PREFIX,
};
pub use filters::{DimensionFilter, Filter, FilterKind, MetricFilter};
pub use intervals::{DateUnit, DatetimeInterval, NumericInterval};
pub use joins::Join;
pub use references::{reference_key, Reference, ReferenceType};
pub use slicer::{Slicer, SlicerBuilder};
