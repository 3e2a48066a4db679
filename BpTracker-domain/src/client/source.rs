use async_trait::async_trait;
use thiserror::Error;

use crate::entities::{CreateReadingRequest, Reading};
use crate::range::ResolvedRange;

/// Readings client errors. All of them are transient from the session's
/// point of view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Request could not be sent or the connection failed
    #[error("Request failed: {0}")]
    Transport(String),

    /// Server answered with a non-success status
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body was not what we expected
    #[error("Invalid response: {0}")]
    Decode(String),
}

/// Where readings come from
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadingsSource: Send + Sync {
    /// Readings within `range`, oldest first. A range that is not ready
    /// yields no readings and makes no request.
    async fn fetch_readings(&self, range: &ResolvedRange) -> Result<Vec<Reading>, ClientError>;

    /// Record a new reading
    async fn create_reading(&self, request: &CreateReadingRequest) -> Result<Reading, ClientError>;
}
