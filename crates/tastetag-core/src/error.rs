use thiserror::Error;

use crate::session::Stage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("{event} is not allowed in the {stage} stage")]
    InvalidTransition { stage: Stage, event: &'static str },

    #[error("tag must not be empty")]
    EmptyTag,

    #[error("recommendations have not been loaded yet")]
    NotLoaded,

    #[error("there are no recommendations to evaluate")]
    NoRecommendations,

    #[error("recommendation {index} has no preference yet")]
    Unrated { index: usize },

    #[error("no recommendation at index {index} (have {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("preference must be like or dislike")]
    UnsetPreference,
}
