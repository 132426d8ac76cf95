//! Caller profile and personalization-variable construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Separator used when flattening list-valued profile fields for the
/// provider, which accepts only string values.
const LIST_SEPARATOR: &str = ", ";

/// Relocation profile supplied by the embedding page.
///
/// Every field is optional; the profile as a whole may be absent too. List
/// fields default to empty when missing from the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallerProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_country: Option<String>,
    /// Countries the caller is considering moving to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub destination_countries: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    /// Rough relocation timeline, free-form ("6 months", "next year").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interests: Vec<String>,
}

/// Builds the string-keyed variable mapping transmitted to the remote
/// session during the personalization handshake.
///
/// `is_authenticated` is always present. Profile fields are included only
/// when present and non-empty; list fields are flattened to a delimited
/// string. A `BTreeMap` keeps the transmitted order deterministic.
pub fn personalization_variables(
    profile: Option<&CallerProfile>,
    authenticated: bool,
) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    vars.insert("is_authenticated".to_string(), authenticated.to_string());

    let Some(profile) = profile else {
        return vars;
    };

    insert_text(&mut vars, "first_name", profile.first_name.as_deref());
    insert_text(
        &mut vars,
        "current_country",
        profile.current_country.as_deref(),
    );
    insert_list(
        &mut vars,
        "destination_countries",
        &profile.destination_countries,
    );
    insert_text(&mut vars, "budget", profile.budget.as_deref());
    insert_text(&mut vars, "timeline", profile.timeline.as_deref());
    insert_list(&mut vars, "interests", &profile.interests);

    vars
}

fn insert_text(vars: &mut BTreeMap<String, String>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        if !value.is_empty() {
            vars.insert(key.to_string(), value.to_string());
        }
    }
}

fn insert_list(vars: &mut BTreeMap<String, String>, key: &str, values: &[String]) {
    if !values.is_empty() {
        vars.insert(key.to_string(), values.join(LIST_SEPARATOR));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_partial_profile() {
        let profile = CallerProfile {
            first_name: Some("Dan".to_string()),
            interests: vec!["sailing".to_string(), "finance".to_string()],
            ..Default::default()
        };

        let vars = personalization_variables(Some(&profile), false);

        assert_eq!(vars.get("is_authenticated").map(String::as_str), Some("false"));
        assert_eq!(vars.get("first_name").map(String::as_str), Some("Dan"));
        assert_eq!(
            vars.get("interests").map(String::as_str),
            Some("sailing, finance")
        );
        assert!(!vars.contains_key("current_country"));
        assert!(!vars.contains_key("budget"));
        assert!(!vars.contains_key("timeline"));
        assert!(!vars.contains_key("destination_countries"));
        assert_eq!(vars.len(), 3);
    }

    #[test]
    fn no_profile_yields_flag_only() {
        let vars = personalization_variables(None, true);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get("is_authenticated").map(String::as_str), Some("true"));
    }

    #[test]
    fn empty_strings_are_omitted() {
        let profile = CallerProfile {
            first_name: Some(String::new()),
            budget: Some("2000 EUR/month".to_string()),
            ..Default::default()
        };

        let vars = personalization_variables(Some(&profile), false);

        assert!(!vars.contains_key("first_name"));
        assert_eq!(
            vars.get("budget").map(String::as_str),
            Some("2000 EUR/month")
        );
    }

    #[test]
    fn full_profile_flattens_lists() {
        let profile = CallerProfile {
            first_name: Some("Mia".to_string()),
            current_country: Some("Germany".to_string()),
            destination_countries: vec!["Portugal".to_string(), "Spain".to_string()],
            budget: Some("3000 EUR/month".to_string()),
            timeline: Some("6 months".to_string()),
            interests: vec!["remote work".to_string()],
        };

        let vars = personalization_variables(Some(&profile), true);

        assert_eq!(vars.len(), 7);
        assert_eq!(
            vars.get("destination_countries").map(String::as_str),
            Some("Portugal, Spain")
        );
        assert_eq!(vars.get("interests").map(String::as_str), Some("remote work"));
    }

    #[test]
    fn profile_deserialises_with_missing_fields() {
        let profile: CallerProfile =
            serde_json::from_str(r#"{"first_name": "Dan"}"#).expect("should parse");
        assert_eq!(profile.first_name.as_deref(), Some("Dan"));
        assert!(profile.destination_countries.is_empty());
        assert!(profile.interests.is_empty());
    }
}
