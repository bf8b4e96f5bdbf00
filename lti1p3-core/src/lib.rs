//! LTI 1.3 Core
//!
//! Claims, registrations, key chains, signed message payloads, and the
//! platform originating launch builder that message-specific builders are
//! composed over.

pub mod claims;
pub mod clock;
pub mod config;
pub mod error;
pub mod launch;
pub mod message;
pub mod payload;
pub mod registration;
pub mod resource_link;

pub use claims::{
    AgsClaim, ClaimSet, ForUserClaim, MessageClaim, ResourceLinkClaim, CLAIM_LTI_AGS,
    CLAIM_LTI_DEPLOYMENT_ID, CLAIM_LTI_FOR_USER, CLAIM_LTI_MESSAGE_TYPE, CLAIM_LTI_RESOURCE_LINK,
    CLAIM_LTI_ROLES, CLAIM_LTI_TARGET_LINK_URI, CLAIM_LTI_VERSION, CLAIM_REGISTRATION_ID,
};
pub use clock::{FixedClock, MessageClock, SystemClock};
pub use config::LaunchConfig;
pub use error::{ConfigError, ErrorSource, LtiError, LtiResult, ValidationError};
pub use launch::{PlatformLaunchRequest, PlatformOriginatingLaunch, PlatformOriginatingLaunchBuilder};
pub use message::LtiMessage;
pub use payload::{LtiMessagePayload, MessagePayloadBuilder};
pub use registration::{KeyChain, Platform, Registration, Tool};
pub use resource_link::LtiResourceLink;

/// Re-exported so callers can pick a key chain algorithm without depending on `jsonwebtoken`.
pub use jsonwebtoken::Algorithm;

/// LTI version carried by every message.
pub const LTI_VERSION: &str = "1.3.0";

// ============================================================================
// MESSAGE TYPES
// ============================================================================

pub const LTI_MESSAGE_TYPE_RESOURCE_LINK_REQUEST: &str = "LtiResourceLinkRequest";
pub const LTI_MESSAGE_TYPE_SUBMISSION_REVIEW_REQUEST: &str = "LtiSubmissionReviewRequest";
