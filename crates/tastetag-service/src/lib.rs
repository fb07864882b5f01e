mod blocking;
mod http;
mod traits;
mod upstream;

pub use blocking::BlockingHttpService;
pub use http::HttpService;
pub use traits::{RecommendationService, ServiceError};
pub use upstream::UpstreamService;
