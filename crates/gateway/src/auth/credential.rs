//! Upstream session credential

use std::fmt;

/// Session cookie used to authenticate against the upstream API.
///
/// The cookie name is kept exactly as the upstream issued it (`SID` or
/// `sid`); the upstream is case-sensitive about it.
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamCredential {
    name: String,
    value: String,
}

impl UpstreamCredential {
    /// Build a credential, rejecting empty fields and values that would
    /// break out of a `Cookie` header
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let value = value.into();

        if name.is_empty() || value.is_empty() {
            return None;
        }
        if [&name, &value]
            .iter()
            .any(|s| s.contains([';', '\r', '\n']))
        {
            return None;
        }

        Some(Self { name, value })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// `Cookie` header value for upstream requests
    pub fn cookie_header(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

impl fmt::Debug for UpstreamCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamCredential")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}
