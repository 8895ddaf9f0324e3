//! SAML SSO SDK
//!
//! This crate provides the public contract of the `saml_sso` module:
//!
//! - [`AccountLookup`] - Host account storage consumed by the credential resolver
//! - [`IdentityProviderClient`] - Per-installation client for the external SSO service
//! - [`IdentityProviderPlugin`] - Plugin API used to validate and connect installations
//! - [`IdentityAssertion`], [`MatchPolicy`], [`LocalAccount`], [`AuthenticationOutcome`] - Models
//! - [`FormatTemplate`] - Single-placeholder attribute format
//! - [`SamlSsoError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use saml_sso_sdk::{IdentityProviderPlugin, SsoSessionId};
//!
//! let client = plugin.connect(path, "default-sp").await?;
//! let assertion = client.attributes(session.as_ref()).await?;
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod error;
pub mod models;
pub mod plugin_api;
pub mod template;

// Re-export main types at crate root
pub use api::{AccountLookup, IdentityProviderClient};
pub use error::SamlSsoError;
pub use models::{
    AuthenticationOutcome, IdentityAssertion, LocalAccount, MatchField, MatchPolicy, SsoSessionId,
};
pub use plugin_api::IdentityProviderPlugin;
pub use template::{FormatTemplate, TemplateError};
