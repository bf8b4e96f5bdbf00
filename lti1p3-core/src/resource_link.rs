//! LTI resource links

use crate::claims::ResourceLinkClaim;

/// A resource link placed by the platform, optionally pointing at its own tool url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LtiResourceLink {
    pub identifier: String,
    pub url: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
}

impl LtiResourceLink {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            url: None,
            title: None,
            text: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Claim describing this link in a message.
    pub fn to_claim(&self) -> ResourceLinkClaim {
        ResourceLinkClaim::new(self.identifier.clone(), self.title.clone(), self.text.clone())
    }
}
