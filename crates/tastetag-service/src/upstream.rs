use reqwest::Client;
use tastetag_core::{Listing, PromptRevision};
use tracing::debug;
use url::Url;

use crate::http::{handle_response, transport_error};
use crate::ServiceError;

/// Client for the external recommendation service.
///
/// Used by the proxy route for `GET /instagram/{tag}/full-service` and by
/// the TUI for `POST /rewrite`.
#[derive(Debug, Clone)]
pub struct UpstreamService {
    base_url: String,
    client: Client,
}

impl UpstreamService {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build `{base_url}/{segments...}`, each segment percent-encoded.
    ///
    /// `.` and `..` are rejected: the URL parser resolves them as dot
    /// segments instead of encoding them, which would change the route.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        if let Some(dot) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(ServiceError::InvalidInput(format!(
                "path segment {dot:?} is not allowed"
            )));
        }
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ServiceError::InvalidInput(format!("base url {}: {e}", self.base_url)))?;
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ServiceError::InvalidInput(format!("base url {} cannot hold a path", self.base_url))
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    pub async fn full_service(&self, tag: &str) -> Result<Listing, ServiceError> {
        let url = self.endpoint(&["instagram", tag, "full-service"])?;
        debug!(%url, "fetching recommendations upstream");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;
        handle_response(resp).await
    }

    pub async fn rewrite(&self, listing: &Listing) -> Result<PromptRevision, ServiceError> {
        let url = self.endpoint(&["rewrite"])?;
        debug!(%url, count = listing.len(), "requesting prompt rewrite");
        let resp = self
            .client
            .post(url)
            .json(listing)
            .send()
            .await
            .map_err(transport_error)?;
        handle_response(resp).await
    }
}
