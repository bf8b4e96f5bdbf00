//! LTI 1.3 Test Utilities
//!
//! Shared test infrastructure for the workspace:
//! - Fixed RSA keys and a deterministic clock
//! - Registration, claim, and resource link fixtures
//! - Substitute launch builders that record or fail requests
//! - Proptest generators for urls and optional claims

pub use lti1p3_core::{
    AgsClaim, ClaimSet, FixedClock, ForUserClaim, KeyChain, LaunchConfig, LtiError, LtiMessage,
    LtiMessagePayload, LtiResourceLink, LtiResult, Platform, PlatformLaunchRequest,
    PlatformOriginatingLaunch, Registration, Tool,
};

use proptest::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ============================================================================
// KEYS AND CLOCKS
// ============================================================================

/// PKCS#8 PEM private key of the test platform. Test use only.
pub const PLATFORM_PRIVATE_KEY: &str = include_str!("keys/platform_private.pem");

/// SPKI PEM public key matching [`PLATFORM_PRIVATE_KEY`].
pub const PLATFORM_PUBLIC_KEY: &str = include_str!("keys/platform_public.pem");

/// 2024-01-01 00:00:00 UTC
pub const TEST_NOW: i64 = 1704067200;

pub const TEST_SCORE_SCOPE: &str = "https://purl.imsglobal.org/spec/lti-ags/scope/score";
pub const TEST_LINE_ITEMS_URL: &str = "http://platform.com/lineitems";
pub const TEST_LINE_ITEM_URL: &str = "http://platform.com/lineitems/1";
pub const TEST_TOOL_LAUNCH_URL: &str = "http://tool.com/launch";
pub const TEST_TOOL_OIDC_INIT_URL: &str = "http://tool.com/oidc-init";

/// Clock pinned at [`TEST_NOW`].
pub fn test_clock() -> FixedClock {
    FixedClock(TEST_NOW)
}

/// Launch configuration using [`test_clock`].
pub fn test_launch_config() -> LaunchConfig {
    LaunchConfig::default().with_clock(Arc::new(test_clock()))
}

/// Install a test-writer tracing subscriber honouring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs it.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// REGISTRATION FIXTURES
// ============================================================================

pub fn create_test_key_chain() -> KeyChain {
    KeyChain::new(
        "platformKeyChain",
        "platformKeySet",
        PLATFORM_PUBLIC_KEY,
        Some(PLATFORM_PRIVATE_KEY.to_string()),
    )
}

pub fn create_test_platform() -> Platform {
    Platform::new("platformIdentifier", "platformName", "platformAudience")
}

/// Tool with a default launch url.
pub fn create_test_tool() -> Tool {
    create_test_tool_without_launch_url().with_launch_url(TEST_TOOL_LAUNCH_URL)
}

pub fn create_test_tool_without_launch_url() -> Tool {
    Tool::new(
        "toolIdentifier",
        "toolName",
        "toolAudience",
        TEST_TOOL_OIDC_INIT_URL,
    )
}

/// Registration of [`create_test_platform`] and [`create_test_tool`] with a
/// single `deploymentIdentifier` deployment and the test key chain.
pub fn create_test_registration() -> Registration {
    create_test_registration_with(create_test_tool())
}

/// Same as [`create_test_registration`] with another tool.
pub fn create_test_registration_with(tool: Tool) -> Registration {
    Registration::new(
        "registrationIdentifier",
        "registrationClientId",
        create_test_platform(),
        tool,
        vec!["deploymentIdentifier".to_string()],
    )
    .with_platform_key_chain(create_test_key_chain())
}

// ============================================================================
// CLAIM FIXTURES
// ============================================================================

pub fn create_test_ags_claim(line_item_url: Option<&str>) -> AgsClaim {
    AgsClaim::new(
        vec![TEST_SCORE_SCOPE.to_string()],
        Some(TEST_LINE_ITEMS_URL.to_string()),
        line_item_url.map(str::to_string),
    )
}

pub fn create_test_for_user_claim() -> ForUserClaim {
    ForUserClaim::new("userIdentifier")
}

pub fn create_test_resource_link(url: Option<&str>) -> LtiResourceLink {
    let link = LtiResourceLink::new("resourceLinkIdentifier")
        .with_title("resourceLinkTitle")
        .with_text("resourceLinkText");
    match url {
        Some(url) => link.with_url(url),
        None => link,
    }
}

/// Verify a message's `lti_message_hint` with the test key chain and clock.
pub fn parse_message_hint(message: &LtiMessage) -> LtiResult<LtiMessagePayload> {
    let token = message.mandatory_parameter("lti_message_hint")?;
    LtiMessagePayload::from_token(token, &create_test_key_chain(), &test_launch_config())
}

// ============================================================================
// SUBSTITUTE LAUNCH BUILDERS
// ============================================================================

/// Launch builder that records every request and returns an unsigned message.
///
/// The returned message targets the tool's OIDC initiation url and carries
/// `target_link_uri` and `login_hint` so url resolution can be asserted.
#[derive(Debug, Default)]
pub struct RecordingLaunchBuilder {
    requests: Mutex<Vec<PlatformLaunchRequest>>,
}

impl RecordingLaunchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<PlatformLaunchRequest> {
        self.requests
            .lock()
            .expect("recorder lock poisoned")
            .clone()
    }

    pub fn last_request(&self) -> Option<PlatformLaunchRequest> {
        self.requests().pop()
    }
}

impl PlatformOriginatingLaunch for RecordingLaunchBuilder {
    fn build_platform_originating_launch(
        &self,
        registration: &Registration,
        request: PlatformLaunchRequest,
    ) -> LtiResult<LtiMessage> {
        let mut parameters = BTreeMap::new();
        parameters.insert(
            "target_link_uri".to_string(),
            request.target_link_uri.clone(),
        );
        parameters.insert("login_hint".to_string(), request.login_hint.clone());

        self.requests
            .lock()
            .expect("recorder lock poisoned")
            .push(request);

        Ok(LtiMessage::new(
            registration.tool.oidc_initiation_url.clone(),
            parameters,
        ))
    }
}

/// Launch builder that always fails with the given error.
#[derive(Debug, Clone)]
pub struct FailingLaunchBuilder {
    error: LtiError,
}

impl FailingLaunchBuilder {
    pub fn new(error: LtiError) -> Self {
        Self { error }
    }
}

impl PlatformOriginatingLaunch for FailingLaunchBuilder {
    fn build_platform_originating_launch(
        &self,
        _registration: &Registration,
        _request: PlatformLaunchRequest,
    ) -> LtiResult<LtiMessage> {
        Err(self.error.clone())
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

/// Generate http(s) urls with a host and an optional path.
pub fn arb_url() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("http"), Just("https")],
        "[a-z]{1,12}\\.(com|org|edu)",
        "(/[a-z0-9-]{1,10}){0,3}",
    )
        .prop_map(|(scheme, host, path)| format!("{}://{}{}", scheme, host, path))
}

/// Generate LTI role names.
pub fn arb_roles() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            Just("Instructor".to_string()),
            Just("Learner".to_string()),
            Just("http://purl.imsglobal.org/vocab/lis/v2/membership#Mentor".to_string()),
        ],
        0..4,
    )
}

/// Generate custom claims whose names cannot collide with LTI claim names.
pub fn arb_optional_claims() -> impl Strategy<Value = ClaimSet> {
    prop::collection::btree_map(
        "custom_[a-z]{1,8}",
        prop_oneof![
            "[a-zA-Z0-9 ]{0,16}".prop_map(Value::from),
            any::<i32>().prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
        ],
        0..5,
    )
    .prop_map(|claims| claims.into_iter().collect::<ClaimSet>())
}
