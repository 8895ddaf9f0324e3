//! Demo host for the SAML SSO module.
//!
//! Sessions, flash messages and accounts live in memory; the identity
//! provider is the static plugin driven by config fixtures.

pub mod config;
pub mod host;
pub mod logging;
pub mod server;
