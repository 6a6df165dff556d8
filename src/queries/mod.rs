//! Query compilation and execution.
//!
//! The three builders entered from a [`Slicer`](crate::schema::Slicer):
//!
//! - [`DataQueryBuilder`]: widget requests, the full pipeline;
//! - [`DimensionChoicesBuilder`]: the values a dimension takes;
//! - [`LatestQueryBuilder`]: the latest value of each dimension.
//!
//! The stages they share are public for callers that assemble their own
//! requests.

mod choices;
mod data;
mod execution;
pub mod joins;
mod latest;
pub mod makers;
pub mod references;
pub mod shaper;
pub mod special_cases;

pub use choices::DimensionChoicesBuilder;
pub use data::DataQueryBuilder;
pub use execution::fetch_data;
pub use latest::LatestQueryBuilder;
