//! Signed message payloads
//!
//! [`MessagePayloadBuilder`] turns a [`ClaimSet`] into a signed JWT and
//! [`LtiMessagePayload`] verifies one and reads the LTI claims back out.
//!
//! Only the signature is checked by `jsonwebtoken`. Time validation (`exp`,
//! `nbf`) is done here against the injected clock with the configured skew.

use crate::claims::{
    AgsClaim, ClaimSet, ForUserClaim, MessageClaim, ResourceLinkClaim, CLAIM_LTI_DEPLOYMENT_ID,
    CLAIM_LTI_MESSAGE_TYPE, CLAIM_LTI_ROLES, CLAIM_LTI_TARGET_LINK_URI, CLAIM_LTI_VERSION,
    CLAIM_REGISTRATION_ID,
};
use crate::config::LaunchConfig;
use crate::error::{LtiError, LtiResult, ValidationError};
use crate::registration::KeyChain;
use jsonwebtoken::{decode, encode, Header, Validation};
use serde_json::{Map, Value};
use std::collections::HashSet;
use uuid::Uuid;

pub const CLAIM_JTI: &str = "jti";
pub const CLAIM_ISS: &str = "iss";
pub const CLAIM_AUD: &str = "aud";
pub const CLAIM_IAT: &str = "iat";
pub const CLAIM_NBF: &str = "nbf";
pub const CLAIM_EXP: &str = "exp";

// ============================================================================
// BUILDING
// ============================================================================

/// Signs claim sets into message tokens.
#[derive(Debug, Clone, Default)]
pub struct MessagePayloadBuilder {
    config: LaunchConfig,
}

impl MessagePayloadBuilder {
    pub fn new(config: LaunchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Sign `claims` with `key_chain`.
    ///
    /// Registered claims (`jti`, `iss`, `aud`, `iat`, `nbf`, `exp`) are added
    /// last and replace any same-named entries in `claims`.
    pub fn build(
        &self,
        claims: ClaimSet,
        key_chain: &KeyChain,
        issuer: &str,
        audience: &str,
    ) -> LtiResult<String> {
        let now = self.config.clock.now_epoch_secs();
        let ttl = self.config.message_ttl_secs;
        if ttl <= 0 {
            return Err(LtiError::build(
                "Cannot sign message payload: message ttl must be positive",
            ));
        }
        let exp = now.checked_add(ttl).ok_or_else(|| {
            LtiError::build("Cannot sign message payload: message ttl overflows exp")
        })?;

        let mut payload = claims;
        payload.insert(CLAIM_JTI, Uuid::now_v7().to_string());
        payload.insert(CLAIM_ISS, issuer);
        payload.insert(CLAIM_AUD, audience);
        payload.insert(CLAIM_IAT, now);
        payload.insert(CLAIM_NBF, now);
        payload.insert(CLAIM_EXP, exp);

        let mut header = Header::new(key_chain.algorithm);
        header.kid = Some(key_chain.identifier.clone());

        let encoding_key = key_chain.encoding_key()?;

        encode(&header, &payload.into_map(), &encoding_key)
            .map_err(|e| LtiError::wrap("Cannot sign message payload", e))
    }
}

// ============================================================================
// READING
// ============================================================================

/// A verified message token.
#[derive(Debug, Clone)]
pub struct LtiMessagePayload {
    key_id: Option<String>,
    claims: ClaimSet,
}

impl LtiMessagePayload {
    /// Verify `token` against `key_chain` and validate its time claims.
    pub fn from_token(token: &str, key_chain: &KeyChain, config: &LaunchConfig) -> LtiResult<Self> {
        let decoding_key = key_chain.decoding_key()?;

        let mut validation = Validation::new(key_chain.algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::from([CLAIM_EXP.to_string()]);

        let token_data = decode::<Map<String, Value>>(token, &decoding_key, &validation)
            .map_err(|e| invalid_token(format!("verification failed: {}", e)))?;

        let payload = Self {
            key_id: token_data.header.kid,
            claims: ClaimSet::from(token_data.claims),
        };

        payload.validate_times(config.clock.now_epoch_secs(), config.clock_skew_secs)?;

        Ok(payload)
    }

    fn validate_times(&self, now: i64, leeway_secs: i64) -> LtiResult<()> {
        let leeway_secs = leeway_secs.max(0);

        if let Some(nbf) = self.integer_claim(CLAIM_NBF) {
            if now.saturating_add(leeway_secs) < nbf {
                return Err(invalid_token("not yet valid (nbf)".to_string()));
            }
        }

        let exp = self
            .integer_claim(CLAIM_EXP)
            .ok_or_else(|| invalid_token("exp claim is not a timestamp".to_string()))?;
        if exp < now.saturating_sub(leeway_secs) {
            return Err(invalid_token("expired".to_string()));
        }

        Ok(())
    }

    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    /// Any claim by name.
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn issuer(&self) -> Option<&str> {
        self.string_claim(CLAIM_ISS)
    }

    pub fn audience(&self) -> Option<&str> {
        self.string_claim(CLAIM_AUD)
    }

    pub fn message_type(&self) -> Option<&str> {
        self.string_claim(CLAIM_LTI_MESSAGE_TYPE)
    }

    pub fn version(&self) -> Option<&str> {
        self.string_claim(CLAIM_LTI_VERSION)
    }

    pub fn deployment_id(&self) -> Option<&str> {
        self.string_claim(CLAIM_LTI_DEPLOYMENT_ID)
    }

    pub fn target_link_uri(&self) -> Option<&str> {
        self.string_claim(CLAIM_LTI_TARGET_LINK_URI)
    }

    pub fn registration_id(&self) -> Option<&str> {
        self.string_claim(CLAIM_REGISTRATION_ID)
    }

    /// Roles claim; non-string entries are skipped.
    pub fn roles(&self) -> Vec<String> {
        self.claims
            .get(CLAIM_LTI_ROLES)
            .and_then(Value::as_array)
            .map(|roles| {
                roles
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn ags(&self) -> LtiResult<Option<AgsClaim>> {
        self.typed_claim()
    }

    pub fn for_user(&self) -> LtiResult<Option<ForUserClaim>> {
        self.typed_claim()
    }

    pub fn resource_link(&self) -> LtiResult<Option<ResourceLinkClaim>> {
        self.typed_claim()
    }

    fn typed_claim<C: MessageClaim>(&self) -> LtiResult<Option<C>> {
        self.claims.claim::<C>()
    }

    fn string_claim(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    fn integer_claim(&self, name: &str) -> Option<i64> {
        self.claims.get(name).and_then(Value::as_i64)
    }
}

fn invalid_token(reason: String) -> LtiError {
    ValidationError::InvalidToken { reason }.into()
}
