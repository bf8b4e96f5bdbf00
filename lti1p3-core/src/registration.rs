//! Registration metadata
//!
//! A [`Registration`] binds a platform and a tool together with a client id,
//! the deployments the tool is installed under, and the key chain the
//! platform signs its messages with.

use crate::error::{ConfigError, LtiResult};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use secrecy::{ExposeSecret, SecretString};

// ============================================================================
// PLATFORM / TOOL
// ============================================================================

/// The learning platform (LMS) side of a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub identifier: String,
    pub name: String,
    /// Issuer value used in messages sent by this platform.
    pub audience: String,
}

impl Platform {
    pub fn new(
        identifier: impl Into<String>,
        name: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            audience: audience.into(),
        }
    }
}

/// The tool side of a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    pub identifier: String,
    pub name: String,
    pub audience: String,
    /// Endpoint receiving platform originating launches.
    pub oidc_initiation_url: String,
    /// Default launch url, used when a message does not name one.
    pub launch_url: Option<String>,
}

impl Tool {
    pub fn new(
        identifier: impl Into<String>,
        name: impl Into<String>,
        audience: impl Into<String>,
        oidc_initiation_url: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            audience: audience.into(),
            oidc_initiation_url: oidc_initiation_url.into(),
            launch_url: None,
        }
    }

    pub fn with_launch_url(mut self, url: impl Into<String>) -> Self {
        self.launch_url = Some(url.into());
        self
    }
}

// ============================================================================
// KEY CHAIN
// ============================================================================

/// A signing key pair identified by `kid`.
///
/// The private key is kept in a [`SecretString`] and never printed.
#[derive(Clone)]
pub struct KeyChain {
    pub identifier: String,
    pub key_set_name: String,
    pub public_key: String,
    private_key: Option<SecretString>,
    pub algorithm: Algorithm,
}

impl KeyChain {
    /// Create an RS256 key chain from PEM encoded keys.
    pub fn new(
        identifier: impl Into<String>,
        key_set_name: impl Into<String>,
        public_key: impl Into<String>,
        private_key: Option<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            key_set_name: key_set_name.into(),
            public_key: public_key.into(),
            private_key: private_key.map(|key| SecretString::new(key.into())),
            algorithm: Algorithm::RS256,
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    /// Key used to sign messages.
    pub fn encoding_key(&self) -> LtiResult<EncodingKey> {
        let private_key = self.private_key.as_ref().ok_or_else(|| {
            self.invalid_key("missing private key".to_string())
        })?;
        let pem = private_key.expose_secret().as_bytes();

        let key = match self.algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                Ok(EncodingKey::from_secret(pem))
            }
            Algorithm::ES256 | Algorithm::ES384 => EncodingKey::from_ec_pem(pem),
            Algorithm::EdDSA => EncodingKey::from_ed_pem(pem),
            _ => EncodingKey::from_rsa_pem(pem),
        };

        key.map_err(|e| self.invalid_key(e.to_string()).into())
    }

    /// Key used to verify messages.
    pub fn decoding_key(&self) -> LtiResult<DecodingKey> {
        let pem = self.public_key.as_bytes();

        let key = match self.algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                Ok(DecodingKey::from_secret(pem))
            }
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem),
            Algorithm::EdDSA => DecodingKey::from_ed_pem(pem),
            _ => DecodingKey::from_rsa_pem(pem),
        };

        key.map_err(|e| self.invalid_key(e.to_string()).into())
    }

    fn invalid_key(&self, reason: String) -> ConfigError {
        ConfigError::InvalidKey {
            key_chain: self.identifier.clone(),
            reason,
        }
    }
}

impl std::fmt::Debug for KeyChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyChain")
            .field("identifier", &self.identifier)
            .field("key_set_name", &self.key_set_name)
            .field("algorithm", &self.algorithm)
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

// ============================================================================
// REGISTRATION
// ============================================================================

/// Platform/tool pairing with its deployments and key chains.
#[derive(Debug, Clone)]
pub struct Registration {
    pub identifier: String,
    pub client_id: String,
    pub platform: Platform,
    pub tool: Tool,
    /// Deployment ids, the first one being the default.
    pub deployment_ids: Vec<String>,
    /// Signs the messages this platform sends.
    pub platform_key_chain: Option<KeyChain>,
}

impl Registration {
    pub fn new(
        identifier: impl Into<String>,
        client_id: impl Into<String>,
        platform: Platform,
        tool: Tool,
        deployment_ids: Vec<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            client_id: client_id.into(),
            platform,
            tool,
            deployment_ids,
            platform_key_chain: None,
        }
    }

    pub fn with_platform_key_chain(mut self, key_chain: KeyChain) -> Self {
        self.platform_key_chain = Some(key_chain);
        self
    }

    pub fn default_deployment_id(&self) -> Option<&str> {
        self.deployment_ids.first().map(String::as_str)
    }

    pub fn has_deployment_id(&self, deployment_id: &str) -> bool {
        self.deployment_ids.iter().any(|id| id == deployment_id)
    }

    /// Pick the deployment for a message: an explicit id must belong to this
    /// registration, otherwise the default deployment is used.
    pub fn resolve_deployment_id(&self, deployment_id: Option<&str>) -> LtiResult<String> {
        match deployment_id {
            Some(id) if self.has_deployment_id(id) => Ok(id.to_string()),
            Some(id) => Err(ConfigError::InvalidDeploymentId {
                deployment_id: id.to_string(),
                registration: self.identifier.clone(),
            }
            .into()),
            None => self
                .default_deployment_id()
                .map(str::to_string)
                .ok_or_else(|| {
                    ConfigError::MissingDeploymentId {
                        registration: self.identifier.clone(),
                    }
                    .into()
                }),
        }
    }

    /// Key chain the platform signs its messages with.
    pub fn require_platform_key_chain(&self) -> LtiResult<&KeyChain> {
        self.platform_key_chain.as_ref().ok_or_else(|| {
            ConfigError::MissingKeyChain {
                owner: "platform".to_string(),
                registration: self.identifier.clone(),
            }
            .into()
        })
    }
}
