pub mod error;
pub mod forms;
pub mod resolver;
pub mod service;
pub mod settings;

pub use error::DomainError;
pub use resolver::CredentialResolver;
pub use service::{AddedUser, LoginDecision, LoginPrompt, SsoService};
pub use settings::{ActiveSettings, ConfigSubmission, SettingsService, SsoSettings};
