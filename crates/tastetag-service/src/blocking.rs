use tastetag_core::{Listing, PromptRevision};
use tokio::runtime::Runtime;

use crate::{HttpService, RecommendationService, ServiceError};

/// Blocking wrapper around the async `HttpService`.
///
/// Creates an internal tokio runtime and uses `block_on()` for each call.
/// Designed for sync callers like the TUI.
pub struct BlockingHttpService {
    inner: HttpService,
    rt: Runtime,
}

impl BlockingHttpService {
    pub fn new(base_url: &str, rewrite_url: &str) -> std::io::Result<Self> {
        Ok(Self {
            inner: HttpService::new(base_url, rewrite_url),
            rt: Runtime::new()?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    pub fn health_check(&self) -> Result<(), ServiceError> {
        self.rt.block_on(self.inner.health_check())
    }

    pub fn fetch_listing(&self, tag: &str) -> Result<Listing, ServiceError> {
        self.rt.block_on(self.inner.fetch_listing(tag))
    }

    pub fn rewrite(&self, listing: &Listing) -> Result<PromptRevision, ServiceError> {
        self.rt.block_on(self.inner.rewrite(listing))
    }
}
