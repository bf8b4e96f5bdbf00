//! Error types for LTI operations

use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Validation errors for claims, parameters, and tokens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing {field} from {claim} claim")]
    MissingClaimField { claim: String, field: String },

    #[error("Missing mandatory parameter {name}")]
    MissingParameter { name: String },

    #[error("Invalid claim {name}: {reason}")]
    InvalidClaim { name: String, reason: String },

    #[error("Invalid token: {reason}")]
    InvalidToken { reason: String },
}

/// Registration and launch configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Neither {candidate} nor tool default url were presented")]
    MissingLaunchUrl { candidate: String },

    #[error("Invalid deployment id {deployment_id} for registration {registration}")]
    InvalidDeploymentId {
        deployment_id: String,
        registration: String,
    },

    #[error("Missing deployment id for registration {registration}")]
    MissingDeploymentId { registration: String },

    #[error("Missing {owner} key chain for registration {registration}")]
    MissingKeyChain { owner: String, registration: String },

    #[error("Invalid key in key chain {key_chain}: {reason}")]
    InvalidKey { key_chain: String, reason: String },
}

/// Shared handle to the error that caused a build failure.
pub type ErrorSource = Arc<dyn StdError + Send + Sync + 'static>;

/// Master error type for all LTI errors.
#[derive(Debug, Clone, Error)]
pub enum LtiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{message}")]
    Build {
        message: String,
        #[source]
        source: Option<ErrorSource>,
    },
}

impl LtiError {
    /// Create a build error without an underlying cause.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap `source` into a build error whose message is `"{context}: {source}"`.
    pub fn wrap<E>(context: &str, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Build {
            message: format!("{}: {}", context, source),
            source: Some(Arc::new(source)),
        }
    }

    /// Wrap every error that is not already a build error; build errors pass through.
    pub fn wrap_unless_build(context: &str, error: LtiError) -> Self {
        match error {
            build @ LtiError::Build { .. } => build,
            other => Self::wrap(context, other),
        }
    }

    /// Whether this is a build error.
    pub fn is_build(&self) -> bool {
        matches!(self, LtiError::Build { .. })
    }

    /// The wrapped LTI error, if this build error was produced from one.
    pub fn cause(&self) -> Option<&LtiError> {
        match self {
            LtiError::Build {
                source: Some(source),
                ..
            } => source.downcast_ref::<LtiError>(),
            _ => None,
        }
    }
}

/// Result type alias for LTI operations.
pub type LtiResult<T> = Result<T, LtiError>;

// =============================================================================
// TESTS
// =============================================================================
