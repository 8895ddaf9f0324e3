//! Credential resolution: asserted attribute values to a local account.

use std::sync::Arc;

use saml_sso_sdk::{
    AccountLookup, AuthenticationOutcome, IdentityAssertion, LocalAccount, MatchField, MatchPolicy,
};

use super::error::DomainError;

/// Maps identity-provider assertions to active local accounts.
///
/// Values of the configured attribute are tried in assertion order; the first
/// one that finds an active account wins and later values are not looked up.
#[derive(Clone)]
pub struct CredentialResolver {
    lookup: Arc<dyn AccountLookup>,
}

impl CredentialResolver {
    #[must_use]
    pub fn new(lookup: Arc<dyn AccountLookup>) -> Self {
        Self { lookup }
    }

    /// Resolve `assertion` under `policy`.
    ///
    /// # Errors
    ///
    /// Only when account storage fails. Every other condition is an
    /// [`AuthenticationOutcome`].
    #[tracing::instrument(skip_all, fields(attribute = %policy.attribute, field = ?policy.field))]
    pub async fn resolve(
        &self,
        assertion: &IdentityAssertion,
        policy: &MatchPolicy,
    ) -> Result<AuthenticationOutcome, DomainError> {
        let values = match assertion.values(&policy.attribute) {
            Some(values) if !values.is_empty() => values,
            _ => {
                tracing::debug!("attribute missing from assertion");
                return Ok(AuthenticationOutcome::IdentityAmbiguous {
                    attribute: policy.attribute.clone(),
                });
            }
        };

        let mut attempted = String::new();
        for value in values {
            attempted = policy.candidate(value);

            match self.find(policy.field, &attempted).await? {
                Some(account) if account.active => {
                    tracing::debug!(account_id = %account.id, "matched active account");
                    return Ok(AuthenticationOutcome::Success(account));
                }
                Some(account) => {
                    tracing::debug!(account_id = %account.id, "matched account is inactive");
                }
                None => {
                    tracing::trace!("no account for candidate value");
                }
            }
        }

        Ok(AuthenticationOutcome::IdentityNotFound {
            attempted,
            field: policy.field,
        })
    }

    async fn find(
        &self,
        field: MatchField,
        value: &str,
    ) -> Result<Option<LocalAccount>, DomainError> {
        let found = match field {
            MatchField::Email => self.lookup.find_by_email(value).await?,
            MatchField::Username => self.lookup.find_by_username(value).await?,
        };
        Ok(found)
    }
}
