//! Property-based tests for launch url resolution and claim round trips.

use lti1p3_submission_review::{SubmissionReviewLaunchRequestBuilder, SubmissionReviewOptions};
use lti1p3_test_utils::{
    arb_optional_claims, arb_roles, arb_url, create_test_ags_claim, create_test_for_user_claim,
    create_test_registration, create_test_registration_with, create_test_tool_without_launch_url,
    parse_message_hint, test_launch_config, ForUserClaim, LtiResourceLink,
    RecordingLaunchBuilder, TEST_LINE_ITEM_URL, TEST_TOOL_LAUNCH_URL,
};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The explicit url wins when present, the tool default otherwise.
    #[test]
    fn prop_launch_url_resolution(explicit in proptest::option::of(arb_url())) {
        let builder = SubmissionReviewLaunchRequestBuilder::with_launch_builder(
            RecordingLaunchBuilder::new(),
        );
        let options = SubmissionReviewOptions {
            submission_review_url: explicit.clone(),
            ..SubmissionReviewOptions::default()
        };

        let message = builder.build_submission_review_launch_request(
            &create_test_ags_claim(Some(TEST_LINE_ITEM_URL)),
            &create_test_for_user_claim(),
            &create_test_registration(),
            "loginHint",
            options,
        );

        let expected = explicit.unwrap_or_else(|| TEST_TOOL_LAUNCH_URL.to_string());
        prop_assert!(message.is_ok());
        let message = message.unwrap();
        prop_assert_eq!(message.parameter("target_link_uri"), Some(expected.as_str()));
    }

    /// Resource link url, then explicit url, then tool default; failure only
    /// when all three are absent.
    #[test]
    fn prop_resource_link_url_resolution(
        link_url in proptest::option::of(arb_url()),
        explicit in proptest::option::of(arb_url()),
        tool_has_default in any::<bool>(),
    ) {
        let builder = SubmissionReviewLaunchRequestBuilder::with_launch_builder(
            RecordingLaunchBuilder::new(),
        );
        let registration = if tool_has_default {
            create_test_registration()
        } else {
            create_test_registration_with(create_test_tool_without_launch_url())
        };
        let mut resource_link = LtiResourceLink::new("resourceLinkIdentifier");
        resource_link.url = link_url.clone();
        let options = SubmissionReviewOptions {
            submission_review_url: explicit.clone(),
            ..SubmissionReviewOptions::default()
        };

        let result = builder.build_lti_resource_link_submission_review_launch_request(
            &resource_link,
            &create_test_ags_claim(Some(TEST_LINE_ITEM_URL)),
            &create_test_for_user_claim(),
            &registration,
            "loginHint",
            options,
        );

        let expected = link_url
            .or(explicit)
            .or_else(|| tool_has_default.then(|| TEST_TOOL_LAUNCH_URL.to_string()));

        match expected {
            Some(expected) => {
                prop_assert!(result.is_ok());
                let message = result.unwrap();
                prop_assert_eq!(message.parameter("target_link_uri"), Some(expected.as_str()));
            }
            None => {
                prop_assert!(result.is_err());
                prop_assert!(builder.launch_builder().requests().is_empty());
            }
        }
    }

    /// Every input claim is recoverable from the signed message hint.
    #[test]
    fn prop_claims_round_trip_through_signed_hint(
        line_item_url in arb_url(),
        user_id in "[a-zA-Z0-9]{1,16}",
        roles in arb_roles(),
        optional_claims in arb_optional_claims(),
    ) {
        let builder = SubmissionReviewLaunchRequestBuilder::new(test_launch_config());
        let options = SubmissionReviewOptions::new()
            .with_roles(roles.clone())
            .with_optional_claims(optional_claims.clone());

        let message = builder.build_submission_review_launch_request(
            &create_test_ags_claim(Some(&line_item_url)),
            &ForUserClaim::new(user_id.clone()),
            &create_test_registration(),
            "loginHint",
            options,
        );
        prop_assert!(message.is_ok());

        let payload = parse_message_hint(&message.unwrap());
        prop_assert!(payload.is_ok());
        let payload = payload.unwrap();

        prop_assert_eq!(
            payload.ags().ok().flatten().and_then(|ags| ags.line_item_url),
            Some(line_item_url)
        );
        prop_assert_eq!(
            payload.for_user().ok().flatten().map(|user| user.identifier),
            Some(user_id)
        );
        prop_assert_eq!(payload.roles(), roles);
        for (name, value) in optional_claims.iter() {
            prop_assert_eq!(payload.claim(name), Some(value));
        }
    }
}
