//! LTI message claims
//!
//! Typed claim value objects and [`ClaimSet`], the explicit collection of
//! claims handed to a launch builder for one message.

use crate::error::{LtiError, LtiResult, ValidationError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// CLAIM NAMES
// ============================================================================

pub const CLAIM_LTI_MESSAGE_TYPE: &str = "https://purl.imsglobal.org/spec/lti/claim/message_type";
pub const CLAIM_LTI_VERSION: &str = "https://purl.imsglobal.org/spec/lti/claim/version";
pub const CLAIM_LTI_DEPLOYMENT_ID: &str = "https://purl.imsglobal.org/spec/lti/claim/deployment_id";
pub const CLAIM_LTI_TARGET_LINK_URI: &str =
    "https://purl.imsglobal.org/spec/lti/claim/target_link_uri";
pub const CLAIM_LTI_ROLES: &str = "https://purl.imsglobal.org/spec/lti/claim/roles";
pub const CLAIM_LTI_RESOURCE_LINK: &str = "https://purl.imsglobal.org/spec/lti/claim/resource_link";
pub const CLAIM_LTI_FOR_USER: &str = "https://purl.imsglobal.org/spec/lti/claim/for_user";
pub const CLAIM_LTI_AGS: &str = "https://purl.imsglobal.org/spec/lti-ags/claim/endpoint";
pub const CLAIM_REGISTRATION_ID: &str = "registration_id";

/// A claim with a fixed name in the message payload.
pub trait MessageClaim: Serialize + DeserializeOwned {
    /// Name the claim is stored under.
    fn claim_name() -> &'static str;
}

// ============================================================================
// TYPED CLAIMS
// ============================================================================

/// Assignment and Grade Services endpoint claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgsClaim {
    #[serde(rename = "scope", default)]
    pub scopes: Vec<String>,

    #[serde(rename = "lineitems", default, skip_serializing_if = "Option::is_none")]
    pub line_items_container_url: Option<String>,

    #[serde(rename = "lineitem", default, skip_serializing_if = "Option::is_none")]
    pub line_item_url: Option<String>,
}

impl AgsClaim {
    pub fn new(
        scopes: Vec<String>,
        line_items_container_url: Option<String>,
        line_item_url: Option<String>,
    ) -> Self {
        Self {
            scopes,
            line_items_container_url,
            line_item_url,
        }
    }

    /// The line item url, or a validation error naming the missing field.
    pub fn require_line_item_url(&self) -> LtiResult<&str> {
        self.line_item_url.as_deref().ok_or_else(|| {
            ValidationError::MissingClaimField {
                claim: "AGS".to_string(),
                field: "line item url".to_string(),
            }
            .into()
        })
    }
}

impl MessageClaim for AgsClaim {
    fn claim_name() -> &'static str {
        CLAIM_LTI_AGS
    }
}

/// The user a message is about, when it differs from the launching user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForUserClaim {
    #[serde(rename = "user_id")]
    pub identifier: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_sourcedid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl ForUserClaim {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            person_sourcedid: None,
            given_name: None,
            family_name: None,
            name: None,
            email: None,
            roles: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles.extend(roles);
        self
    }
}

impl MessageClaim for ForUserClaim {
    fn claim_name() -> &'static str {
        CLAIM_LTI_FOR_USER
    }
}

/// Resource link claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLinkClaim {
    #[serde(rename = "id")]
    pub identifier: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ResourceLinkClaim {
    pub fn new(
        identifier: impl Into<String>,
        title: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            title,
            description,
        }
    }
}

impl MessageClaim for ResourceLinkClaim {
    fn claim_name() -> &'static str {
        CLAIM_LTI_RESOURCE_LINK
    }
}

// ============================================================================
// CLAIM SET
// ============================================================================

/// Claims collected for one message, keyed by claim name.
///
/// Inserting a claim under an existing name replaces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Add a typed claim under its claim name.
    pub fn with_claim<C: MessageClaim>(mut self, claim: &C) -> LtiResult<Self> {
        self.insert_claim(claim)?;
        Ok(self)
    }

    /// Add a typed claim under its claim name.
    pub fn insert_claim<C: MessageClaim>(&mut self, claim: &C) -> LtiResult<()> {
        let value = serde_json::to_value(claim).map_err(|e| {
            LtiError::from(ValidationError::InvalidClaim {
                name: C::claim_name().to_string(),
                reason: e.to_string(),
            })
        })?;
        self.0.insert(C::claim_name().to_string(), value);
        Ok(())
    }

    /// Add a raw claim value.
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add a raw claim value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Copy every claim of `other` into this set, replacing same-named claims.
    pub fn merge(&mut self, other: ClaimSet) {
        for (name, value) in other.0 {
            self.0.insert(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Read a typed claim back, if present.
    pub fn claim<C: MessageClaim>(&self) -> LtiResult<Option<C>> {
        match self.0.get(C::claim_name()) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                ValidationError::InvalidClaim {
                    name: C::claim_name().to_string(),
                    reason: e.to_string(),
                }
                .into()
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ags_claim(line_item_url: Option<&str>) -> AgsClaim {
        AgsClaim::new(
            vec!["https://purl.imsglobal.org/spec/lti-ags/scope/score".to_string()],
            Some("http://platform.com/lineitems".to_string()),
            line_item_url.map(str::to_string),
        )
    }

    #[test]
    fn test_ags_claim_serializes_lti_field_names() {
        let value = serde_json::to_value(ags_claim(Some("http://platform.com/lineitems/1")))
            .expect("serializable");
        assert_eq!(
            value,
            json!({
                "scope": ["https://purl.imsglobal.org/spec/lti-ags/scope/score"],
                "lineitems": "http://platform.com/lineitems",
                "lineitem": "http://platform.com/lineitems/1",
            })
        );
    }

    #[test]
    fn test_ags_claim_omits_missing_line_item() {
        let value = serde_json::to_value(ags_claim(None)).expect("serializable");
        assert!(value.get("lineitem").is_none());
    }

    #[test]
    fn test_require_line_item_url() {
        assert_eq!(
            ags_claim(Some("http://platform.com/lineitems/1"))
                .require_line_item_url()
                .ok(),
            Some("http://platform.com/lineitems/1")
        );

        let err = ags_claim(None)
            .require_line_item_url()
            .expect_err("line item url is missing");
        assert_eq!(err.to_string(), "Missing line item url from AGS claim");
    }

    #[test]
    fn test_for_user_claim_serializes_user_id() {
        let claim = ForUserClaim::new("userIdentifier").with_email("user@example.com");
        let value = serde_json::to_value(&claim).expect("serializable");
        assert_eq!(
            value,
            json!({"user_id": "userIdentifier", "email": "user@example.com"})
        );
    }

    #[test]
    fn test_claim_set_typed_claims_are_readable() -> LtiResult<()> {
        let claims = ClaimSet::new()
            .with_claim(&ags_claim(Some("http://platform.com/lineitems/1")))?
            .with_claim(&ForUserClaim::new("userIdentifier"))?;

        assert_eq!(claims.len(), 2);
        assert!(claims.contains(CLAIM_LTI_AGS));
        let for_user: Option<ForUserClaim> = claims.claim()?;
        assert_eq!(for_user.map(|c| c.identifier).as_deref(), Some("userIdentifier"));
        let link: Option<ResourceLinkClaim> = claims.claim()?;
        assert!(link.is_none());
        Ok(())
    }

    #[test]
    fn test_claim_set_reports_malformed_typed_claim() {
        let claims = ClaimSet::new().with_value(CLAIM_LTI_FOR_USER, "not an object");
        let err = claims
            .claim::<ForUserClaim>()
            .expect_err("string is not a for_user claim");
        assert!(err.to_string().starts_with("Invalid claim"));
    }

    #[test]
    fn test_claim_set_merge_overwrites() {
        let mut claims = ClaimSet::new().with_value("a", "first").with_value("b", 1);
        claims.merge(ClaimSet::from_iter([("a", json!("second"))]));

        assert_eq!(claims.get("a"), Some(&json!("second")));
        assert_eq!(claims.get("b"), Some(&json!(1)));
    }
}
