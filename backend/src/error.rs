//! Error taxonomy of the merge service and its mapping onto HTTP responses.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::path::PathBuf;
use thiserror::Error;

/// A document or data source could not be loaded. The session keeps its
/// previous state when this is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("{} is not valid UTF-8 text", .0.display())]
    Encoding(PathBuf),

    #[error("Could not parse CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Spreadsheet has no worksheets")]
    NoWorksheet,

    #[error("Data source has no header row")]
    MissingHeader,

    #[error("No {0} has been loaded yet")]
    NotLoaded(&'static str),
}

/// Reasons a batch is refused before it starts, or aborted while running.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Please select an Email column for the 'To' field.")]
    MissingToColumn,

    #[error("No data source has been loaded")]
    NoData,

    #[error("Row range {start}-{end} is outside 1-{len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("A batch is already running")]
    Busy,

    /// The transport session could not be established, or the worker died.
    #[error("FATAL ERROR:\n{0}")]
    Fatal(String),
}

impl DispatchError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// Runtime settings or a persisted merge configuration could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Could not access config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No config file path is configured (set MAILMERGE_CONFIG)")]
    NoPath,

    #[error("Please map your columns first.")]
    EmptyMapping,
}

/// Error returned by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Session is locked while a batch is running")]
    Busy,

    #[error("{0} not found")]
    NotFound(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Load(_) | Self::Upload(_) => StatusCode::BAD_REQUEST,
            Self::Dispatch(DispatchError::Busy) | Self::Busy => StatusCode::CONFLICT,
            Self::Dispatch(DispatchError::Fatal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Dispatch(_) => StatusCode::BAD_REQUEST,
            Self::Config(ConfigError::Io { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}
