//! Error types for the slicer.
//!
//! Every fallible public operation returns [`SlicerResult`]. The top-level
//! [`SlicerError`] wraps one enum per stage, so callers can match on the
//! stage that failed.

use thiserror::Error;

use crate::config::SettingsError;
use crate::frame::FrameError;

/// Result type for slicer operations.
pub type SlicerResult<T> = Result<T, SlicerError>;

/// Errors raised by any stage of building, running or shaping a query.
#[derive(Error, Debug)]
pub enum SlicerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    JoinResolution(#[from] JoinResolutionError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// A request or slicer definition that cannot be compiled.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A widget that needs at least one metric was given none.
    #[error("{widget} requires at least one metric")]
    MetricRequired { widget: String },

    /// Continuous dimensions (datetime, numeric) cannot be rolled up for
    /// widgets that plot them on an axis.
    #[error("cannot roll up continuous dimension `{dimension}`")]
    ContinuousDimensionCannotBeRolledUp { dimension: String },

    /// Pattern filters on a unique dimension need its display definition.
    #[error("pattern filter on `{dimension}` requires a display definition")]
    PatternFilterRequiresDisplay { dimension: String },

    /// Two elements of a slicer share a key.
    #[error("duplicate {kind} key `{key}`")]
    DuplicateKey { kind: &'static str, key: String },

    /// Two joins target the same table.
    #[error("duplicate join for table `{table}`")]
    DuplicateJoin { table: String },

    /// A request referenced an element the slicer does not define.
    #[error("unknown {kind} `{key}`")]
    UnknownElement { kind: &'static str, key: String },

    /// The operation needs a different kind of element.
    #[error("{0}")]
    Unsupported(String),
}

/// Joins required by a query could not be arranged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JoinResolutionError {
    #[error("could not find a join for table `{table}`")]
    MissingTableJoin { table: String },

    #[error("circular joins between tables: {}", tables.join(", "))]
    CircularJoins { tables: Vec<String> },
}

/// The database adapter failed to execute a query.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("connector error: {0}")]
    Connector(String),

    #[error("database lock poisoned")]
    Poisoned,
}

/// Query results could not be shaped into a frame.
#[derive(Error, Debug)]
pub enum ShapeError {
    #[error("result set is missing column `{0}`")]
    MissingColumn(String),

    #[error("duplicate index {values:?} for dimensions {dimensions:?}")]
    DuplicateIndex {
        dimensions: Vec<String>,
        values: Vec<String>,
    },

    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// A widget could not render its output.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl From<rusqlite::Error> for SlicerError {
    fn from(err: rusqlite::Error) -> Self {
        SlicerError::Adapter(AdapterError::Sqlite(err))
    }
}

impl From<FrameError> for SlicerError {
    fn from(err: FrameError) -> Self {
        SlicerError::Shape(ShapeError::Frame(err))
    }
}
