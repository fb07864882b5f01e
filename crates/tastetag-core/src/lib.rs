pub mod error;
pub mod listing;
pub mod recommendation;
pub mod session;

pub use error::FlowError;
pub use listing::{Listing, PromptRevision, ProxyRequest, ProxyResponse};
pub use recommendation::{Preference, Recommendation};
pub use session::{Session, SessionEvent, Stage};
