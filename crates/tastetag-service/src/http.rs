use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tastetag_core::{Listing, PromptRevision, ProxyRequest, ProxyResponse};
use tracing::{debug, warn};

use crate::{RecommendationService, ServiceError, UpstreamService};

/// Async HTTP client implementation of RecommendationService.
/// Fetches lists through a running tastetag-server and sends rewrites to the
/// recommendation service.
pub struct HttpService {
    base_url: String,
    client: Client,
    upstream: UpstreamService,
}

impl HttpService {
    pub fn new(base_url: &str, rewrite_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = Client::new();
        Self {
            base_url,
            upstream: UpstreamService::with_client(rewrite_url, client.clone()),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the server is reachable.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        let resp = self
            .client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Transport(format!("connection failed: {e}")))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Status {
                status: resp.status().as_u16(),
                message: "health check failed".into(),
            })
        }
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        handle_response(resp).await
    }
}

#[async_trait]
impl RecommendationService for HttpService {
    async fn fetch_listing(&self, tag: &str) -> Result<Listing, ServiceError> {
        debug!(tag, "fetching recommendations through proxy");
        let response: ProxyResponse = self
            .post_json("/api/proxy", &ProxyRequest { tag: tag.to_string() })
            .await?;
        Ok(response.into_listing())
    }

    async fn rewrite(&self, listing: &Listing) -> Result<PromptRevision, ServiceError> {
        self.upstream.rewrite(listing).await
    }
}

pub(crate) fn transport_error(e: reqwest::Error) -> ServiceError {
    ServiceError::Transport(e.to_string())
}

pub(crate) async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        let body = resp
            .bytes()
            .await
            .map_err(|e| ServiceError::Transport(format!("read body: {e}")))?;
        serde_json::from_slice(&body).map_err(|e| {
            warn!(error = %e, "response body did not match the expected shape");
            ServiceError::Malformed(e.to_string())
        })
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or(body);
    warn!(status = status.as_u16(), %message, "request failed");
    ServiceError::Status {
        status: status.as_u16(),
        message,
    }
}
