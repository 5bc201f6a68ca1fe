//! Error taxonomy for the acquisition pipeline.
//!
//! Fetch, cache, and parse code return [`FirmsWatchError`] so callers can
//! distinguish transport failures from remote rejections and payload schema
//! problems. Per-row malformed optional fields are recovered inside the
//! parser and never reach this enum.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FirmsWatchError>;

#[derive(Error, Debug)]
pub enum FirmsWatchError {
    /// Transport-level failure: timeout, DNS, connection refused.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The remote answered with a non-2xx status (e.g. an invalid MAP_KEY).
    #[error("remote rejected request with HTTP {status}: {body}")]
    RemoteRejected { status: u16, body: String },

    /// The payload lacks required columns or a required value is unusable.
    #[error("malformed payload schema: {0}")]
    MalformedSchema(String),

    /// The FIRMS area API only serves 1 to 10 days per request.
    #[error("day range {0} outside the supported 1..=10")]
    InvalidDayRange(u32),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("IO error {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error {0}")]
    CsvError(#[from] csv::Error),

    #[error("serde error {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl FirmsWatchError {
    /// Short stable tag used for error rows in the stats log.
    pub fn kind(&self) -> &'static str {
        match self {
            FirmsWatchError::NetworkFailure(_) => "network_failure",
            FirmsWatchError::RemoteRejected { .. } => "remote_rejected",
            FirmsWatchError::MalformedSchema(_) => "malformed_schema",
            FirmsWatchError::InvalidDayRange(_) => "invalid_day_range",
            FirmsWatchError::InvalidUrl(_) => "invalid_url",
            FirmsWatchError::IoError(_) => "io_error",
            FirmsWatchError::CsvError(_) => "csv_error",
            FirmsWatchError::SerdeError(_) => "serde_error",
        }
    }
}
