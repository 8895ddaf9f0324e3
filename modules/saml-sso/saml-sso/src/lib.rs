//! SAML SSO Module
//!
//! Bridges the host application's login with an external SAML identity
//! provider. The module:
//!
//! 1. Installs and validates its options in the host option store
//! 2. Resolves identity-provider assertions to active local accounts
//! 3. Decorates the host's `/users/login` and `/users/logout` handlers and
//!    serves `/users/add` plus the admin configuration endpoints
//!
//! Host collaborators are reached through the traits in [`host`]; the
//! identity provider through [`saml_sso_sdk::IdentityProviderPlugin`].
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod config;
pub mod domain;
pub mod host;
pub mod infra;
pub mod module;

pub use api::rest::dto::LoginView;
pub use api::rest::problem::Problem;
pub use config::SamlSsoConfig;
pub use module::{HostRoutes, SamlSso, SamlSsoDeps};
