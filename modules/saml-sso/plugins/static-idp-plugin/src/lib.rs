#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static Identity-Provider Plugin
//!
//! Serves provider sessions from configuration instead of a real SAML
//! installation. Useful for local development and end-to-end tests.
//!
//! ## Configuration
//!
//! ```yaml
//! static_idp:
//!   idp_base_url: "http://localhost:8080/idp/"
//!   session_cookie: "idp_session"
//!   session_store: sql
//!   auth_sources: ["default-sp"]
//!   sessions:
//!     - session_id: "dev-session"
//!       attributes:
//!         uid: ["jdoe"]
//!         mail: ["jdoe@example.edu"]
//! ```
//!
//! The install path handed to the plugin must be an existing directory.

pub mod config;
pub mod domain;
pub mod plugin;

pub use config::{SessionFixture, SessionStore, StaticIdpPluginConfig};
pub use domain::client::StaticIdpClient;
pub use domain::service::SessionDirectory;
pub use plugin::StaticIdpPlugin;
