//! Error types for the Epik client.
//!
//! Only local failures live here. A request the vendor answered with a
//! non-2xx status is not an `EpikError`; it comes back as a
//! [`ResultEnvelope`](crate::envelope::ResultEnvelope) with `success == false`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EpikError>;

#[derive(Error, Debug)]
pub enum EpikError {
    /// Connection, TLS, timeout or body-read failure.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Input rejected before any request was sent. Only produced when the
    /// client runs with [`ValidationMode::Strict`](crate::validation::ValidationMode::Strict).
    #[error("Invalid input: {title}: {detail}")]
    InvalidInput { title: String, detail: String },

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for EpikError {
    fn from(err: reqwest::Error) -> Self {
        EpikError::HttpError(err.to_string())
    }
}
