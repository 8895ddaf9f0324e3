//! Attribute format templates.
//!
//! A template holds exactly one `%s` placeholder that is replaced by the
//! attribute value. `%%` stands for a literal percent sign; no other escape
//! is accepted.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a format template is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("format must contain a %s placeholder")]
    MissingPlaceholder,

    #[error("format must contain only one %s placeholder")]
    MultiplePlaceholders,

    #[error("unsupported format sequence '{0}', only %s and %% are allowed")]
    UnsupportedSequence(String),
}

/// A parsed single-placeholder format, e.g. `%s@example.org`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FormatTemplate {
    source: String,
    prefix: String,
    suffix: String,
}

impl FormatTemplate {
    /// Parse a template string.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] when the template does not hold exactly one
    /// `%s` placeholder or uses any escape other than `%s` and `%%`.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut prefix = String::with_capacity(source.len());
        let mut suffix = String::new();
        let mut placeholders = 0_usize;
        let mut chars = source.chars();

        while let Some(ch) = chars.next() {
            let literal = if ch == '%' {
                match chars.next() {
                    Some('s') => {
                        placeholders += 1;
                        if placeholders > 1 {
                            return Err(TemplateError::MultiplePlaceholders);
                        }
                        continue;
                    }
                    Some('%') => '%',
                    Some(other) => {
                        return Err(TemplateError::UnsupportedSequence(format!("%{other}")));
                    }
                    None => return Err(TemplateError::UnsupportedSequence("%".to_owned())),
                }
            } else {
                ch
            };

            if placeholders == 0 {
                prefix.push(literal);
            } else {
                suffix.push(literal);
            }
        }

        if placeholders == 0 {
            return Err(TemplateError::MissingPlaceholder);
        }

        Ok(Self {
            source: source.to_owned(),
            prefix,
            suffix,
        })
    }

    /// Substitute `value` into the placeholder.
    #[must_use]
    pub fn apply(&self, value: &str) -> String {
        let mut out = String::with_capacity(self.prefix.len() + value.len() + self.suffix.len());
        out.push_str(&self.prefix);
        out.push_str(value);
        out.push_str(&self.suffix);
        out
    }

    /// The template as originally written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for FormatTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl TryFrom<String> for FormatTemplate {
    type Error = TemplateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FormatTemplate> for String {
    fn from(value: FormatTemplate) -> Self {
        value.source
    }
}
