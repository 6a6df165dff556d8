//! # Slicer
//!
//! Compiles analytical requests against a star schema into SQL and shapes
//! the results for widgets.
//!
//! ## Architecture
//!
//! A [`Slicer`](schema::Slicer) describes a fact table, its joins, and the
//! metrics and dimensions callers may select. Requests are built fluently
//! and compiled in stages:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │     Request (widgets, dimensions, filters, references)   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [queries::joins, queries::makers]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Query: totals UNION ALL branches, reference containers │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [database adapter]
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Raw DataFrame                           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [shaper, operations, totals scrubber]
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Indexed DataFrame                       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [widgets]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Frame │ DataTables JSON │ HighCharts JSON │ CSV   │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod formats;
pub mod frame;
pub mod logging;
pub mod operations;
pub mod queries;
pub mod schema;
pub mod sql;
pub mod widgets;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::database::{
        Connector, Database, MySqlDatabase, PostgresDatabase, SqliteDatabase, VerticaDatabase,
    };
    pub use crate::error::{SlicerError, SlicerResult};
    pub use crate::frame::{DataFrame, Value};
    pub use crate::operations::Operation;
    pub use crate::schema::{
        DatetimeInterval, Dimension, Field, Filter, Join, Metric, NumericInterval, Reference,
        Slicer,
    };
    pub use crate::sql::{
        // Constructors
        coalesce,
        col,
        count,
        func,
        lit_bool,
        lit_date,
        lit_float,
        lit_int,
        lit_str,
        lit_timestamp,
        max,
        min,
        sum,
        table_col,
        // Types
        Dialect,
        Expr,
        ExprExt,
        JoinType,
        SortDir,
        TableRef,
    };
    pub use crate::widgets::{
        Axis, CsvWidget, DataTablesJs, FrameWidget, HighCharts, Item, Series, Widget,
        WidgetOutput,
    };
}

// Also export at crate root for convenience
pub use error::{SlicerError, SlicerResult};
pub use schema::Slicer;
