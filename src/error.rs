//! Error types returned by the Waldur client.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WaldurError {
    /// The server answered with a status the operation does not accept.
    #[error("Server refuses to communicate. URL {url}. Status: {}. Reason: {reason}.", status.as_u16())]
    Rejected {
        url: String,
        status: StatusCode,
        reason: String,
    },

    /// The server kept answering `409 Conflict` until the attempts ran out.
    #[error("Reached a limit of retries for the operation: {method} {url}, body: {body}")]
    RetryLimit {
        method: String,
        url: String,
        body: String,
    },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The requested object does not exist.
    #[error("{0}")]
    ObjectDoesNotExist(String),

    /// The query returned multiple objects when only one was expected.
    #[error("{0}")]
    MultipleObjectsReturned(String),

    /// The arguments of an operation are inconsistent.
    #[error("{0}")]
    Validation(String),

    /// A waited-for state change did not happen in time.
    #[error("{0}")]
    Timeout(String),

    /// A resource or order transitioned to the error state.
    #[error("{0}")]
    InvalidState(String),

    #[error("Empty ID is not allowed.")]
    EmptyIdentifier,

    #[error("Response of {context} has no field '{field}'")]
    MissingField { field: String, context: String },

    #[error("Header {name} is missing or invalid: {value}")]
    InvalidHeader { name: String, value: String },
}

impl WaldurError {
    pub fn is_not_found(&self) -> bool {
        match self {
            WaldurError::ObjectDoesNotExist(_) => true,
            WaldurError::Rejected { status, .. } => *status == StatusCode::NOT_FOUND,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, WaldurError>;
