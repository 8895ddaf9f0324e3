//! Domain models for the SAML SSO module.

use std::collections::BTreeMap;
use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::template::FormatTemplate;

/// Attribute claims asserted by the identity provider for one SSO session.
///
/// Values keep the order in which the provider listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityAssertion {
    attributes: BTreeMap<String, Vec<String>>,
}

impl IdentityAssertion {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an attribute.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.insert(name, values);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.attributes.insert(name.into(), values);
    }

    /// Values asserted for `name`, if the attribute is present.
    #[must_use]
    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.attributes.get(name).map(Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<String>)> for IdentityAssertion {
    fn from_iter<I: IntoIterator<Item = (K, Vec<String>)>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Local account field an asserted value is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    Email,
    #[default]
    Username,
}

impl MatchField {
    /// Human label used in failure messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Username => "Username",
        }
    }
}

/// How asserted attributes are matched to local accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPolicy {
    /// Attribute name to read from the assertion (e.g. `uid`).
    pub attribute: String,
    /// Optional template applied to each value before lookup.
    pub format: Option<FormatTemplate>,
    /// Local field compared against the (formatted) value.
    pub field: MatchField,
}

impl MatchPolicy {
    #[must_use]
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            format: None,
            field: MatchField::Username,
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: FormatTemplate) -> Self {
        self.format = Some(format);
        self
    }

    #[must_use]
    pub fn matching(mut self, field: MatchField) -> Self {
        self.field = field;
        self
    }

    /// The lookup value for one asserted value.
    #[must_use]
    pub fn candidate(&self, value: &str) -> String {
        match &self.format {
            Some(tpl) => tpl.apply(value),
            None => value.to_owned(),
        }
    }
}

/// An account owned by the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAccount {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Inactive accounts cannot log in.
    pub active: bool,
}

/// Result of one credential resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationOutcome {
    /// An active account matched.
    Success(LocalAccount),
    /// No value matched an active account; `attempted` is the last lookup value.
    IdentityNotFound { attempted: String, field: MatchField },
    /// The configured attribute was absent or had no values.
    IdentityAmbiguous { attribute: String },
}

impl AuthenticationOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Matched account, if any.
    #[must_use]
    pub fn account(&self) -> Option<&LocalAccount> {
        match self {
            Self::Success(account) => Some(account),
            _ => None,
        }
    }

    /// Human-readable failure message. `None` for `Success`.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Success(_) => None,
            Self::IdentityNotFound { attempted, field } => Some(format!(
                "{} matching \"{attempted}\" not found.",
                field.label()
            )),
            Self::IdentityAmbiguous { attribute } => Some(format!(
                "The identity provider did not supply the \"{attribute}\" attribute."
            )),
        }
    }
}

/// Opaque identity-provider session id taken from the provider's cookie.
///
/// `Debug` is redacted; use [`SsoSessionId::expose`] only at the provider boundary.
#[derive(Clone)]
pub struct SsoSessionId(SecretString);

impl SsoSessionId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for SsoSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SsoSessionId([REDACTED])")
    }
}
