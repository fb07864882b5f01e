use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    #[default]
    Unset,
    Like,
    Dislike,
}

impl Preference {
    pub fn display_name(&self) -> &'static str {
        match self {
            Preference::Unset => "Unrated",
            Preference::Like => "Liked",
            Preference::Dislike => "Disliked",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Preference::Unset => " ",
            Preference::Like => "+",
            Preference::Dislike => "-",
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Preference::Unset)
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One restaurant suggestion.
///
/// Field names on the wire follow the recommendation service
/// (`restaurant_name`, ...). `preference` is left out of the JSON while unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "restaurant_name", default)]
    pub name: String,
    #[serde(rename = "restaurant_location", default)]
    pub location: String,
    #[serde(rename = "restaurant_description", default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Preference::is_unset")]
    pub preference: Preference,
}

impl Recommendation {
    pub fn new(name: &str, location: &str, description: &str) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            description: description.into(),
            preference: Preference::Unset,
        }
    }

    pub fn is_rated(&self) -> bool {
        !self.preference.is_unset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preference_wire_names() {
        let like: Preference = serde_json::from_value(json!("like")).unwrap();
        assert_eq!(like, Preference::Like);
        assert_eq!(serde_json::to_value(Preference::Dislike).unwrap(), "dislike");
        assert!(serde_json::from_value::<Preference>(json!("Like")).is_err());
    }

    #[test]
    fn preference_display() {
        assert_eq!(format!("{}", Preference::Like), "Liked");
        assert_eq!(format!("{}", Preference::Unset), "Unrated");
    }

    #[test]
    fn unset_preference_is_omitted() {
        let rec = Recommendation::new("Nopa", "San Francisco", "Wood-fired");
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(
            value,
            json!({
                "restaurant_name": "Nopa",
                "restaurant_location": "San Francisco",
                "restaurant_description": "Wood-fired",
            })
        );
    }

    #[test]
    fn rated_preference_is_lowercase() {
        let mut rec = Recommendation::new("Nopa", "San Francisco", "Wood-fired");
        rec.preference = Preference::Dislike;
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["preference"], "dislike");
    }

    #[test]
    fn missing_fields_default() {
        let rec: Recommendation =
            serde_json::from_value(json!({ "restaurant_name": "Zuni" })).unwrap();
        assert_eq!(rec.name, "Zuni");
        assert!(rec.location.is_empty());
        assert!(!rec.is_rated());
    }
}
