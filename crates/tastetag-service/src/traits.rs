use async_trait::async_trait;
use tastetag_core::{Listing, PromptRevision};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server responded with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Malformed(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ServiceError {
    /// Upstream HTTP status, when the failure was a non-success response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The two remote calls the wizard makes.
///
/// `HttpService` goes through the proxy for the list and straight to the
/// recommendation service for the rewrite.
#[async_trait]
pub trait RecommendationService: Send + Sync {
    /// Recommendations for a tag. One request, no retries.
    async fn fetch_listing(&self, tag: &str) -> Result<Listing, ServiceError>;

    /// Send the rated listing and get the revised prompt back.
    async fn rewrite(&self, listing: &Listing) -> Result<PromptRevision, ServiceError>;
}
