//! The wizard's state and its transition function.
//!
//! A [`Session`] is only mutated through [`Session::apply`]. Events that are
//! not valid for the current stage return an error and leave the session as
//! it was.

use std::fmt;

use url::Url;

use crate::error::FlowError;
use crate::listing::{Listing, PromptRevision};
use crate::recommendation::Preference;

const PROFILE_BASE_URL: &str = "https://www.instagram.com/";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    #[default]
    TagEntry,
    Listing,
    Result,
}

impl Stage {
    pub const ALL: &[Stage] = &[Stage::TagEntry, Stage::Listing, Stage::Result];

    pub fn index(&self) -> u8 {
        match self {
            Stage::TagEntry => 0,
            Stage::Listing => 1,
            Stage::Result => 2,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::TagEntry => "Tag",
            Stage::Listing => "Recommendations",
            Stage::Result => "Result",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Tag confirmed on the input view.
    SubmitTag(String),
    /// The proxy answered the list fetch.
    ListingLoaded(Listing),
    /// A card reported a new preference for its index.
    SetPreference { index: usize, preference: Preference },
    /// The rewrite endpoint answered the submit.
    Evaluated(PromptRevision),
    Reset,
}

impl SessionEvent {
    fn name(&self) -> &'static str {
        match self {
            SessionEvent::SubmitTag(_) => "submit tag",
            SessionEvent::ListingLoaded(_) => "listing loaded",
            SessionEvent::SetPreference { .. } => "set preference",
            SessionEvent::Evaluated(_) => "evaluated",
            SessionEvent::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    stage: Stage,
    tag: Option<String>,
    listing: Option<Listing>,
    result: Option<PromptRevision>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn listing(&self) -> Option<&Listing> {
        self.listing.as_ref()
    }

    pub fn result(&self) -> Option<&PromptRevision> {
        self.result.as_ref()
    }

    /// Profile link for the current tag, the tag encoded as one path
    /// segment. `None` for `.` and `..`, which cannot name a profile.
    pub fn profile_url(&self) -> Option<String> {
        let tag = self.tag.as_deref()?;
        if matches!(tag, "." | "..") {
            return None;
        }
        let mut url = Url::parse(PROFILE_BASE_URL).ok()?;
        url.path_segments_mut().ok()?.pop_if_empty().push(tag);
        Some(url.into())
    }

    /// The tag to fetch recommendations for, when a fetch is due.
    pub fn listing_request(&self) -> Option<&str> {
        match (self.stage, &self.listing) {
            (Stage::Listing, None) => self.tag.as_deref(),
            _ => None,
        }
    }

    /// Check the submit precondition and return the body to send.
    pub fn submission(&self) -> Result<&Listing, FlowError> {
        if self.stage != Stage::Listing {
            return Err(FlowError::InvalidTransition {
                stage: self.stage,
                event: "submit",
            });
        }
        let listing = self.listing.as_ref().ok_or(FlowError::NotLoaded)?;
        if listing.is_empty() {
            return Err(FlowError::NoRecommendations);
        }
        match listing.first_unrated() {
            Some(index) => Err(FlowError::Unrated { index }),
            None => Ok(listing),
        }
    }

    pub fn apply(&mut self, event: SessionEvent) -> Result<(), FlowError> {
        let name = event.name();
        match (self.stage, event) {
            (_, SessionEvent::Reset) => {
                *self = Session::default();
                Ok(())
            }
            (Stage::TagEntry, SessionEvent::SubmitTag(tag)) => {
                let tag = tag.trim();
                if tag.is_empty() {
                    return Err(FlowError::EmptyTag);
                }
                self.tag = Some(tag.to_string());
                self.stage = Stage::Listing;
                Ok(())
            }
            (Stage::Listing, SessionEvent::ListingLoaded(listing)) if self.listing.is_none() => {
                self.listing = Some(listing);
                Ok(())
            }
            (Stage::Listing, SessionEvent::SetPreference { index, preference }) => {
                if preference.is_unset() {
                    return Err(FlowError::UnsetPreference);
                }
                let listing = self.listing.as_mut().ok_or(FlowError::NotLoaded)?;
                let len = listing.len();
                let rec = listing
                    .recommendations
                    .get_mut(index)
                    .ok_or(FlowError::IndexOutOfRange { index, len })?;
                rec.preference = preference;
                Ok(())
            }
            (Stage::Listing, SessionEvent::Evaluated(revision)) => {
                self.submission()?;
                self.result = Some(revision);
                self.stage = Stage::Result;
                Ok(())
            }
            (stage, _) => Err(FlowError::InvalidTransition { stage, event: name }),
        }
    }
}
