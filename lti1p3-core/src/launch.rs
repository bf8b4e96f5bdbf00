//! Platform Originating Launches
//!
//! A platform originating launch sends the browser to the tool's OIDC login
//! initiation endpoint. The claims of the eventual id token travel signed in
//! the `lti_message_hint` parameter.
//!
//! [`PlatformOriginatingLaunch`] is the capability message-specific builders
//! are composed over; [`PlatformOriginatingLaunchBuilder`] is the signing
//! implementation.

use crate::claims::{
    ClaimSet, CLAIM_LTI_DEPLOYMENT_ID, CLAIM_LTI_MESSAGE_TYPE, CLAIM_LTI_ROLES,
    CLAIM_LTI_TARGET_LINK_URI, CLAIM_LTI_VERSION, CLAIM_REGISTRATION_ID,
};
use crate::config::LaunchConfig;
use crate::error::LtiResult;
use crate::message::{
    LtiMessage, PARAMETER_CLIENT_ID, PARAMETER_ISS, PARAMETER_LOGIN_HINT,
    PARAMETER_LTI_DEPLOYMENT_ID, PARAMETER_LTI_MESSAGE_HINT, PARAMETER_TARGET_LINK_URI,
};
use crate::payload::MessagePayloadBuilder;
use crate::registration::Registration;
use crate::LTI_VERSION;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Everything a platform originating launch needs besides the registration.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformLaunchRequest {
    pub message_type: String,
    pub target_link_uri: String,
    pub login_hint: String,
    /// Defaults to the registration's first deployment when absent.
    pub deployment_id: Option<String>,
    pub roles: Vec<String>,
    /// Message specific claims.
    pub claims: ClaimSet,
    /// Caller supplied claims; these replace same-named message claims.
    pub optional_claims: ClaimSet,
}

impl PlatformLaunchRequest {
    pub fn new(
        message_type: impl Into<String>,
        target_link_uri: impl Into<String>,
        login_hint: impl Into<String>,
    ) -> Self {
        Self {
            message_type: message_type.into(),
            target_link_uri: target_link_uri.into(),
            login_hint: login_hint.into(),
            deployment_id: None,
            roles: Vec::new(),
            claims: ClaimSet::new(),
            optional_claims: ClaimSet::new(),
        }
    }

    pub fn with_deployment_id(mut self, deployment_id: Option<String>) -> Self {
        self.deployment_id = deployment_id;
        self
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    pub fn with_claims(mut self, claims: ClaimSet) -> Self {
        self.claims = claims;
        self
    }

    pub fn with_optional_claims(mut self, optional_claims: ClaimSet) -> Self {
        self.optional_claims = optional_claims;
        self
    }
}

/// Builds platform originating launch messages.
pub trait PlatformOriginatingLaunch: Send + Sync {
    fn build_platform_originating_launch(
        &self,
        registration: &Registration,
        request: PlatformLaunchRequest,
    ) -> LtiResult<LtiMessage>;
}

/// Signing implementation of [`PlatformOriginatingLaunch`].
#[derive(Debug, Clone, Default)]
pub struct PlatformOriginatingLaunchBuilder {
    payload_builder: MessagePayloadBuilder,
}

impl PlatformOriginatingLaunchBuilder {
    pub fn new(config: LaunchConfig) -> Self {
        Self {
            payload_builder: MessagePayloadBuilder::new(config),
        }
    }

    pub fn config(&self) -> &LaunchConfig {
        self.payload_builder.config()
    }

    fn build(
        &self,
        registration: &Registration,
        request: PlatformLaunchRequest,
    ) -> LtiResult<LtiMessage> {
        let deployment_id = registration.resolve_deployment_id(request.deployment_id.as_deref())?;
        let key_chain = registration.require_platform_key_chain()?;

        let mut claims = request.claims;
        claims.merge(request.optional_claims);
        claims.insert(CLAIM_LTI_MESSAGE_TYPE, request.message_type.as_str());
        claims.insert(CLAIM_LTI_VERSION, LTI_VERSION);
        claims.insert(CLAIM_LTI_DEPLOYMENT_ID, deployment_id.as_str());
        claims.insert(CLAIM_LTI_TARGET_LINK_URI, request.target_link_uri.as_str());
        claims.insert(CLAIM_LTI_ROLES, request.roles);
        claims.insert(CLAIM_REGISTRATION_ID, registration.identifier.as_str());

        let message_hint = self.payload_builder.build(
            claims,
            key_chain,
            &registration.platform.audience,
            &registration.client_id,
        )?;

        let mut parameters = BTreeMap::new();
        parameters.insert(
            PARAMETER_ISS.to_string(),
            registration.platform.audience.clone(),
        );
        parameters.insert(PARAMETER_LOGIN_HINT.to_string(), request.login_hint);
        parameters.insert(
            PARAMETER_TARGET_LINK_URI.to_string(),
            request.target_link_uri,
        );
        parameters.insert(PARAMETER_LTI_MESSAGE_HINT.to_string(), message_hint);
        parameters.insert(PARAMETER_LTI_DEPLOYMENT_ID.to_string(), deployment_id);
        parameters.insert(
            PARAMETER_CLIENT_ID.to_string(),
            registration.client_id.clone(),
        );

        Ok(LtiMessage::new(
            registration.tool.oidc_initiation_url.clone(),
            parameters,
        ))
    }
}

impl PlatformOriginatingLaunch for PlatformOriginatingLaunchBuilder {
    fn build_platform_originating_launch(
        &self,
        registration: &Registration,
        request: PlatformLaunchRequest,
    ) -> LtiResult<LtiMessage> {
        let message_type = request.message_type.clone();
        let message = self.build(registration, request)?;

        tracing::debug!(
            registration_id = %registration.identifier,
            message_type = %message_type,
            url = %message.url(),
            "Built platform originating launch"
        );

        Ok(message)
    }
}

impl<T: PlatformOriginatingLaunch + ?Sized> PlatformOriginatingLaunch for Arc<T> {
    fn build_platform_originating_launch(
        &self,
        registration: &Registration,
        request: PlatformLaunchRequest,
    ) -> LtiResult<LtiMessage> {
        (**self).build_platform_originating_launch(registration, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::{ConfigError, LtiError};
    use crate::payload::LtiMessagePayload;
    use crate::registration::{KeyChain, Platform, Tool};
    use jsonwebtoken::Algorithm;
    use serde_json::json;

    const NOW: i64 = 1704067200;

    fn config() -> LaunchConfig {
        LaunchConfig::default().with_clock(Arc::new(FixedClock(NOW)))
    }

    fn key_chain() -> KeyChain {
        KeyChain::new("platformKeyId", "platformSet", "secret", Some("secret".to_string()))
            .with_algorithm(Algorithm::HS256)
    }

    fn registration() -> Registration {
        Registration::new(
            "registrationIdentifier",
            "registrationClientId",
            Platform::new("platformIdentifier", "platformName", "platformAudience"),
            Tool::new(
                "toolIdentifier",
                "toolName",
                "toolAudience",
                "http://tool.com/oidc-init",
            )
            .with_launch_url("http://tool.com/launch"),
            vec!["deploymentIdentifier".to_string()],
        )
        .with_platform_key_chain(key_chain())
    }

    fn request() -> PlatformLaunchRequest {
        PlatformLaunchRequest::new(
            "LtiResourceLinkRequest",
            "http://tool.com/launch",
            "loginHint",
        )
        .with_roles(vec!["Learner".to_string()])
    }

    #[test]
    fn test_message_parameters() -> LtiResult<()> {
        let builder = PlatformOriginatingLaunchBuilder::new(config());
        let message = builder.build_platform_originating_launch(&registration(), request())?;

        assert_eq!(message.url(), "http://tool.com/oidc-init");
        assert_eq!(message.mandatory_parameter("iss")?, "platformAudience");
        assert_eq!(message.mandatory_parameter("login_hint")?, "loginHint");
        assert_eq!(
            message.mandatory_parameter("target_link_uri")?,
            "http://tool.com/launch"
        );
        assert_eq!(
            message.mandatory_parameter("lti_deployment_id")?,
            "deploymentIdentifier"
        );
        assert_eq!(
            message.mandatory_parameter("client_id")?,
            "registrationClientId"
        );
        Ok(())
    }

    #[test]
    fn test_message_hint_claims() -> LtiResult<()> {
        let builder = PlatformOriginatingLaunchBuilder::new(config());
        let message = builder.build_platform_originating_launch(&registration(), request())?;

        let token = message.mandatory_parameter("lti_message_hint")?;
        let payload = LtiMessagePayload::from_token(token, &key_chain(), &config())?;

        assert_eq!(payload.key_id(), Some("platformKeyId"));
        assert_eq!(payload.message_type(), Some("LtiResourceLinkRequest"));
        assert_eq!(payload.version(), Some(LTI_VERSION));
        assert_eq!(payload.deployment_id(), Some("deploymentIdentifier"));
        assert_eq!(payload.target_link_uri(), Some("http://tool.com/launch"));
        assert_eq!(payload.registration_id(), Some("registrationIdentifier"));
        assert_eq!(payload.roles(), vec!["Learner".to_string()]);
        Ok(())
    }

    #[test]
    fn test_claim_precedence() -> LtiResult<()> {
        let builder = PlatformOriginatingLaunchBuilder::new(config());
        let request = request()
            .with_claims(ClaimSet::new().with_value("a", "message").with_value("b", "message"))
            .with_optional_claims(
                ClaimSet::new()
                    .with_value("a", "optional")
                    .with_value(CLAIM_LTI_MESSAGE_TYPE, "Spoofed"),
            );

        let message = builder.build_platform_originating_launch(&registration(), request)?;
        let token = message.mandatory_parameter("lti_message_hint")?;
        let payload = LtiMessagePayload::from_token(token, &key_chain(), &config())?;

        assert_eq!(payload.claim("a"), Some(&json!("optional")));
        assert_eq!(payload.claim("b"), Some(&json!("message")));
        assert_eq!(payload.message_type(), Some("LtiResourceLinkRequest"));
        Ok(())
    }

    #[test]
    fn test_unknown_deployment_fails() {
        let builder = PlatformOriginatingLaunchBuilder::new(config());
        let request = request().with_deployment_id(Some("otherDeployment".to_string()));

        let result = builder.build_platform_originating_launch(&registration(), request);
        assert!(matches!(
            result,
            Err(LtiError::Config(ConfigError::InvalidDeploymentId { .. }))
        ));
    }

    #[test]
    fn test_missing_key_chain_fails() {
        let builder = PlatformOriginatingLaunchBuilder::new(config());
        let mut registration = registration();
        registration.platform_key_chain = None;

        let result = builder.build_platform_originating_launch(&registration, request());
        assert!(matches!(
            result,
            Err(LtiError::Config(ConfigError::MissingKeyChain { .. }))
        ));
    }

    #[test]
    fn test_shared_builder_delegates() -> LtiResult<()> {
        let builder: Arc<dyn PlatformOriginatingLaunch> =
            Arc::new(PlatformOriginatingLaunchBuilder::new(config()));
        let message = builder.build_platform_originating_launch(&registration(), request())?;
        assert_eq!(message.parameter("login_hint"), Some("loginHint"));
        Ok(())
    }
}
