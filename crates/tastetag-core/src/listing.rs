use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::recommendation::{Preference, Recommendation};

/// Body sent to `POST /api/proxy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRequest {
    pub tag: String,
}

/// The recommendation list for one tag, as returned by the upstream
/// full-service endpoint.
///
/// Fields other than `username` and `recommendations` (for example
/// `output_files`) are kept in `extra` so the whole body can be sent back to
/// the rewrite endpoint unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub recommendations: Vec<Recommendation>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Listing {
    pub fn new(recommendations: Vec<Recommendation>) -> Self {
        Self {
            username: None,
            recommendations,
            extra: Map::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.recommendations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }

    /// Index of the first recommendation still waiting for a preference.
    pub fn first_unrated(&self) -> Option<usize> {
        self.recommendations.iter().position(|r| !r.is_rated())
    }

    pub fn all_rated(&self) -> bool {
        self.first_unrated().is_none()
    }

    pub fn count(&self, preference: Preference) -> usize {
        self.recommendations
            .iter()
            .filter(|r| r.preference == preference)
            .count()
    }
}

/// Proxy response: the upstream body plus a `places` alias of its
/// recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyResponse {
    pub places: Vec<Recommendation>,
    #[serde(flatten)]
    pub listing: Listing,
}

impl ProxyResponse {
    pub fn from_upstream(listing: Listing) -> Self {
        Self {
            places: listing.recommendations.clone(),
            listing,
        }
    }

    /// Drop the alias. Preferences are only ever written into
    /// `recommendations`, so the alias would go stale.
    pub fn into_listing(self) -> Listing {
        self.listing
    }
}

/// Result of the rewrite endpoint: the prompt that produced the
/// recommendations and the revised one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRevision {
    pub current_prompt: String,
    #[serde(rename = "response")]
    pub new_prompt: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn upstream_body() -> Value {
        json!({
            "username": "foodie123",
            "recommendations": [
                {
                    "restaurant_name": "Tartine",
                    "restaurant_location": "Mission",
                    "restaurant_description": "Bakery"
                }
            ],
            "output_files": { "analysis": "outputs/foodie123_analysis.json" }
        })
    }

    #[test]
    fn listing_keeps_unknown_fields() {
        let listing: Listing = serde_json::from_value(upstream_body()).unwrap();
        assert_eq!(listing.username.as_deref(), Some("foodie123"));
        assert_eq!(listing.len(), 1);
        assert!(listing.extra.contains_key("output_files"));

        let back = serde_json::to_value(&listing).unwrap();
        assert_eq!(back, upstream_body());
    }

    #[test]
    fn listing_requires_recommendations() {
        let result: Result<Listing, _> = serde_json::from_value(json!({ "username": "x" }));
        assert!(result.is_err());
    }

    #[test]
    fn proxy_response_adds_places_alias() {
        let listing: Listing = serde_json::from_value(upstream_body()).unwrap();
        let value = serde_json::to_value(ProxyResponse::from_upstream(listing)).unwrap();
        assert_eq!(value["places"], value["recommendations"]);
        assert_eq!(value["username"], "foodie123");
        assert_eq!(
            value["output_files"]["analysis"],
            "outputs/foodie123_analysis.json"
        );
    }

    #[test]
    fn proxy_response_into_listing_drops_alias() {
        let mut body = upstream_body();
        body["places"] = body["recommendations"].clone();
        let response: ProxyResponse = serde_json::from_value(body).unwrap();
        let listing = response.into_listing();
        assert!(!listing.extra.contains_key("places"));
        assert_eq!(listing.len(), 1);
    }

    #[test]
    fn unrated_tracking() {
        let mut listing = Listing::new(vec![
            Recommendation::new("A", "", ""),
            Recommendation::new("B", "", ""),
        ]);
        assert_eq!(listing.first_unrated(), Some(0));
        listing.recommendations[0].preference = Preference::Like;
        assert_eq!(listing.first_unrated(), Some(1));
        listing.recommendations[1].preference = Preference::Dislike;
        assert!(listing.all_rated());
        assert_eq!(listing.count(Preference::Like), 1);
        assert_eq!(listing.count(Preference::Dislike), 1);
    }

    #[test]
    fn prompt_revision_wire_names() {
        let revision: PromptRevision = serde_json::from_value(json!({
            "current_prompt": "old",
            "response": "new"
        }))
        .unwrap();
        assert_eq!(revision.new_prompt, "new");
        assert_eq!(revision.current_prompt, "old");
    }
}
