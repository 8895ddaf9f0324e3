//! Session directory for the static identity-provider plugin.

use dashmap::DashMap;
use saml_sso_sdk::IdentityAssertion;

use crate::config::SessionFixture;

#[derive(Debug, Clone)]
struct Session {
    auth_source: Option<String>,
    attributes: IdentityAssertion,
}

/// Authenticated provider sessions keyed by session id.
///
/// Seeded from configuration; logout ends a session and [`SessionDirectory::open`]
/// starts one at runtime.
#[derive(Debug, Default)]
pub struct SessionDirectory {
    sessions: DashMap<String, Session>,
}

impl SessionDirectory {
    #[must_use]
    pub fn from_fixtures(fixtures: &[SessionFixture]) -> Self {
        let sessions = fixtures
            .iter()
            .map(|f| {
                (
                    f.session_id.clone(),
                    Session {
                        auth_source: f.auth_source.clone(),
                        attributes: f.attributes.clone(),
                    },
                )
            })
            .collect();
        Self { sessions }
    }

    /// Attributes for `session_id` if it is authenticated against `auth_source`.
    #[must_use]
    pub fn attributes(&self, session_id: &str, auth_source: &str) -> Option<IdentityAssertion> {
        self.sessions.get(session_id).and_then(|s| {
            s.auth_source
                .as_deref()
                .is_none_or(|src| src == auth_source)
                .then(|| s.attributes.clone())
        })
    }

    pub fn open(
        &self,
        session_id: impl Into<String>,
        auth_source: Option<String>,
        attributes: IdentityAssertion,
    ) {
        self.sessions.insert(
            session_id.into(),
            Session {
                auth_source,
                attributes,
            },
        );
    }

    /// End a session. Returns whether it existed.
    pub fn end(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
