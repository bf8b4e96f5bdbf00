//! LTI 1.3 Submission Review
//!
//! Platform side of the IMS LTI Submission Review extension: builds the
//! `LtiSubmissionReviewRequest` launch a platform sends to a tool to review a
//! learner's submission.
//!
//! ```no_run
//! use lti1p3_core::{AgsClaim, ForUserClaim, LaunchConfig, Registration};
//! use lti1p3_submission_review::{SubmissionReviewLaunchRequestBuilder, SubmissionReviewOptions};
//!
//! fn launch(registration: &Registration) -> lti1p3_core::LtiResult<String> {
//!     let builder = SubmissionReviewLaunchRequestBuilder::new(LaunchConfig::from_env());
//!     let ags = AgsClaim::new(
//!         vec!["https://purl.imsglobal.org/spec/lti-ags/scope/score".to_string()],
//!         None,
//!         Some("https://lms.example.com/lineitems/1".to_string()),
//!     );
//!     let message = builder.build_submission_review_launch_request(
//!         &ags,
//!         &ForUserClaim::new("learner-1"),
//!         registration,
//!         "instructor-1",
//!         SubmissionReviewOptions::new().with_roles(vec!["Instructor".to_string()]),
//!     )?;
//!     Ok(message.to_url())
//! }
//! ```

pub mod builder;

pub use builder::{SubmissionReviewLaunchRequestBuilder, SubmissionReviewOptions};
pub use lti1p3_core::LTI_MESSAGE_TYPE_SUBMISSION_REVIEW_REQUEST;
