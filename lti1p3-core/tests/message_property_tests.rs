//! Property-based tests for message rendering and claim merging.

use lti1p3_core::{ClaimSet, LtiMessage};
use lti1p3_test_utils::{arb_optional_claims, arb_url};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn arb_parameters() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z_]{1,12}", ".{0,24}", 0..6)
}

proptest! {
    #[test]
    fn prop_to_url_encodes_every_parameter(url in arb_url(), parameters in arb_parameters()) {
        let message = LtiMessage::new(url.clone(), parameters.clone());
        let rendered = message.to_url();

        prop_assert!(rendered.starts_with(&url));
        let query = rendered[url.len()..].trim_start_matches('?');
        let pairs: Vec<&str> = if query.is_empty() {
            Vec::new()
        } else {
            query.split('&').collect()
        };
        prop_assert_eq!(pairs.len(), parameters.len());

        for (pair, (name, value)) in pairs.iter().zip(parameters.iter()) {
            let (encoded_name, encoded_value) = pair.split_once('=').unwrap_or((*pair, ""));
            let decoded_name = urlencoding::decode(encoded_name).map(|d| d.into_owned()).ok();
            let decoded_value = urlencoding::decode(encoded_value).map(|d| d.into_owned()).ok();
            prop_assert_eq!(decoded_name, Some(name.clone()));
            prop_assert_eq!(decoded_value, Some(value.clone()));
        }
    }

    #[test]
    fn prop_redirect_form_never_leaks_markup(parameters in arb_parameters()) {
        let form = LtiMessage::new("http://tool.com/oidc-init", parameters.clone())
            .to_html_redirect_form("launch");

        prop_assert_eq!(form.matches("<input").count(), parameters.len());
        prop_assert_eq!(form.matches("<script>").count(), 1);
        prop_assert_eq!(form.matches("<form").count(), 1);
    }

    #[test]
    fn prop_merge_keeps_every_name_and_prefers_later(
        first in arb_optional_claims(),
        second in arb_optional_claims(),
    ) {
        let mut merged = first.clone();
        merged.merge(second.clone());

        for (name, value) in second.iter() {
            prop_assert_eq!(merged.get(name), Some(value));
        }
        for (name, value) in first.iter().filter(|(name, _)| !second.contains(name)) {
            prop_assert_eq!(merged.get(name), Some(value));
        }
        prop_assert!(merged.len() <= first.len() + second.len());
        prop_assert!(merged.len() >= first.len().max(second.len()));
    }

    #[test]
    fn prop_claim_set_serializes_as_plain_object(claims in arb_optional_claims()) {
        let value = serde_json::to_value(&claims).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let object = value.as_object().cloned().unwrap_or_default();
        prop_assert_eq!(ClaimSet::from(object), claims);
    }
}
