// errors.rs
use std::fmt;

/// Errors originating from server logic (routing, auth, missing resources)
/// or downstream layers (DB, external order API, export).
///
/// Malformed individual records and lookup misses are NOT represented here:
/// both are recovered locally (row dropped with a warning, or a default
/// substituted) and never abort a run.
#[derive(Debug)]
pub enum ServerError {
    NotFound,
    BadRequest(String),
    Unauthorized(String),
    /// Required upstream data absent or empty; the run does not proceed.
    MissingInput(String),
    /// Order API unreachable or rejecting us; fatal for the current run,
    /// nothing is written.
    Upstream(String),
    DbError(String),
    XlsxError(String),
    InternalError,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::NotFound => write!(f, "Not Found"),
            ServerError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            ServerError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            ServerError::MissingInput(msg) => write!(f, "Missing Input: {msg}"),
            ServerError::Upstream(msg) => write!(f, "Upstream Error: {msg}"),
            ServerError::DbError(msg) => write!(f, "Database Error: {msg}"),
            ServerError::XlsxError(msg) => write!(f, "Export Error: {msg}"),
            ServerError::InternalError => write!(f, "Internal Server Error"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<rusqlite::Error> for ServerError {
    fn from(e: rusqlite::Error) -> Self {
        ServerError::DbError(e.to_string())
    }
}
