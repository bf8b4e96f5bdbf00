//! Submission Review Launch Request Builder
//!
//! Builds `LtiSubmissionReviewRequest` messages asking a tool to show a
//! learner's submission for an AGS line item.
//!
//! See <https://www.imsglobal.org/spec/lti-sr/v1p0>.

use lti1p3_core::{
    AgsClaim, ClaimSet, ConfigError, ForUserClaim, LaunchConfig, LtiError, LtiMessage,
    LtiResourceLink, LtiResult, PlatformLaunchRequest, PlatformOriginatingLaunch,
    PlatformOriginatingLaunchBuilder, Registration, LTI_MESSAGE_TYPE_SUBMISSION_REVIEW_REQUEST,
};

const BUILD_ERROR_CONTEXT: &str = "Cannot create submission review launch request";

/// Optional inputs of a submission review launch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionReviewOptions {
    /// Launch url; the tool default launch url is used when absent.
    pub submission_review_url: Option<String>,
    /// Deployment id; the registration default is used when absent.
    pub deployment_id: Option<String>,
    pub roles: Vec<String>,
    /// Extra claims, passed through to the launch builder.
    pub optional_claims: ClaimSet,
}

impl SubmissionReviewOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submission_review_url(mut self, url: impl Into<String>) -> Self {
        self.submission_review_url = Some(url.into());
        self
    }

    pub fn with_deployment_id(mut self, deployment_id: impl Into<String>) -> Self {
        self.deployment_id = Some(deployment_id.into());
        self
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    pub fn with_optional_claims(mut self, optional_claims: ClaimSet) -> Self {
        self.optional_claims = optional_claims;
        self
    }
}

/// Builder for LTI submission review launch requests.
///
/// Holds no per-call state: every call collects its own claim set, so one
/// instance can be reused and shared between threads.
#[derive(Debug, Clone, Default)]
pub struct SubmissionReviewLaunchRequestBuilder<B = PlatformOriginatingLaunchBuilder> {
    launch_builder: B,
}

impl SubmissionReviewLaunchRequestBuilder {
    /// Builder signing messages with the core launch builder.
    pub fn new(config: LaunchConfig) -> Self {
        Self {
            launch_builder: PlatformOriginatingLaunchBuilder::new(config),
        }
    }
}

impl<B: PlatformOriginatingLaunch> SubmissionReviewLaunchRequestBuilder<B> {
    /// Builder delegating to another launch builder.
    pub fn with_launch_builder(launch_builder: B) -> Self {
        Self { launch_builder }
    }

    pub fn launch_builder(&self) -> &B {
        &self.launch_builder
    }

    /// Build a submission review launch request.
    ///
    /// The launch url is `options.submission_review_url`, falling back to the
    /// tool default launch url.
    ///
    /// # Errors
    /// Always an [`LtiError::Build`]. Failures that are not already build
    /// errors are wrapped once, prefixed with
    /// "Cannot create submission review launch request: ".
    pub fn build_submission_review_launch_request(
        &self,
        ags_claim: &AgsClaim,
        for_user_claim: &ForUserClaim,
        registration: &Registration,
        login_hint: &str,
        options: SubmissionReviewOptions,
    ) -> LtiResult<LtiMessage> {
        self.build(
            None,
            ags_claim,
            for_user_claim,
            registration,
            login_hint,
            options,
        )
    }

    /// Build a submission review launch request for a resource link.
    ///
    /// Adds the resource link claim, and the resource link url takes priority
    /// over `options.submission_review_url`.
    pub fn build_lti_resource_link_submission_review_launch_request(
        &self,
        resource_link: &LtiResourceLink,
        ags_claim: &AgsClaim,
        for_user_claim: &ForUserClaim,
        registration: &Registration,
        login_hint: &str,
        options: SubmissionReviewOptions,
    ) -> LtiResult<LtiMessage> {
        let options = SubmissionReviewOptions {
            submission_review_url: resource_link
                .url
                .clone()
                .or(options.submission_review_url),
            ..options
        };

        self.build(
            Some(resource_link),
            ags_claim,
            for_user_claim,
            registration,
            login_hint,
            options,
        )
    }

    fn build(
        &self,
        resource_link: Option<&LtiResourceLink>,
        ags_claim: &AgsClaim,
        for_user_claim: &ForUserClaim,
        registration: &Registration,
        login_hint: &str,
        options: SubmissionReviewOptions,
    ) -> LtiResult<LtiMessage> {
        self.assemble(
            resource_link,
            ags_claim,
            for_user_claim,
            registration,
            login_hint,
            options,
        )
        .map_err(|e| {
            tracing::warn!(
                registration_id = %registration.identifier,
                error = %e,
                "Submission review launch request failed"
            );
            LtiError::wrap_unless_build(BUILD_ERROR_CONTEXT, e)
        })
    }

    fn assemble(
        &self,
        resource_link: Option<&LtiResourceLink>,
        ags_claim: &AgsClaim,
        for_user_claim: &ForUserClaim,
        registration: &Registration,
        login_hint: &str,
        options: SubmissionReviewOptions,
    ) -> LtiResult<LtiMessage> {
        ags_claim.require_line_item_url()?;

        let mut claims = ClaimSet::new();
        if let Some(resource_link) = resource_link {
            claims.insert_claim(&resource_link.to_claim())?;
        }
        claims.insert_claim(ags_claim)?;
        claims.insert_claim(for_user_claim)?;

        let launch_url = resolve_launch_url(options.submission_review_url, registration)?;

        tracing::debug!(
            registration_id = %registration.identifier,
            message_type = LTI_MESSAGE_TYPE_SUBMISSION_REVIEW_REQUEST,
            launch_url = %launch_url,
            "Building submission review launch request"
        );

        let request = PlatformLaunchRequest::new(
            LTI_MESSAGE_TYPE_SUBMISSION_REVIEW_REQUEST,
            launch_url,
            login_hint,
        )
        .with_deployment_id(options.deployment_id)
        .with_roles(options.roles)
        .with_claims(claims)
        .with_optional_claims(options.optional_claims);

        self.launch_builder
            .build_platform_originating_launch(registration, request)
    }
}

/// Explicit url first, then the tool default launch url.
fn resolve_launch_url(
    submission_review_url: Option<String>,
    registration: &Registration,
) -> LtiResult<String> {
    submission_review_url
        .or_else(|| registration.tool.launch_url.clone())
        .ok_or_else(|| {
            ConfigError::MissingLaunchUrl {
                candidate: "submission review url".to_string(),
            }
            .into()
        })
}

// =============================================================================
// TESTS
// =============================================================================
