//! LTI launch messages
//!
//! An [`LtiMessage`] is the target url plus the form parameters a browser
//! carries to it. Rendering it as a redirect url or an auto-submitting form
//! is left to the caller.

use crate::error::{LtiResult, ValidationError};
use std::collections::BTreeMap;

pub const PARAMETER_ISS: &str = "iss";
pub const PARAMETER_LOGIN_HINT: &str = "login_hint";
pub const PARAMETER_TARGET_LINK_URI: &str = "target_link_uri";
pub const PARAMETER_LTI_MESSAGE_HINT: &str = "lti_message_hint";
pub const PARAMETER_LTI_DEPLOYMENT_ID: &str = "lti_deployment_id";
pub const PARAMETER_CLIENT_ID: &str = "client_id";

/// A launch message: a url and its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LtiMessage {
    url: String,
    parameters: BTreeMap<String, String>,
}

impl LtiMessage {
    pub fn new(url: impl Into<String>, parameters: BTreeMap<String, String>) -> Self {
        Self {
            url: url.into(),
            parameters,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Parameter that must be present.
    pub fn mandatory_parameter(&self, name: &str) -> LtiResult<&str> {
        self.parameter(name).ok_or_else(|| {
            ValidationError::MissingParameter {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// The message url with its parameters appended as a query string.
    pub fn to_url(&self) -> String {
        if self.parameters.is_empty() {
            return self.url.clone();
        }

        let query = self
            .parameters
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(name),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&");

        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, query)
    }

    /// An HTML form posting the parameters to the message url on page load.
    pub fn to_html_redirect_form(&self, form_id: &str) -> String {
        let inputs: String = self
            .parameters
            .iter()
            .map(|(name, value)| {
                format!(
                    r#"<input type="hidden" name="{}" value="{}"/>"#,
                    escape_html(name),
                    escape_html(value)
                )
            })
            .collect();

        format!(
            r#"<form id="{id}" action="{action}" method="POST">{inputs}</form><script>window.onload=function(){{document.getElementById("{id}").submit()}}</script>"#,
            id = escape_html(form_id),
            action = escape_html(&self.url),
            inputs = inputs
        )
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
