//! In-memory account directory implementing both [`AccountLookup`] and
//! [`AccountRegistry`].

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use saml_sso_sdk::{AccountLookup, LocalAccount, SamlSsoError};
use uuid::Uuid;

use crate::host::{AccountRegistry, HostError, NewAccount};

#[derive(Debug, Default)]
pub struct InMemoryAccounts {
    accounts: DashMap<Uuid, LocalAccount>,
    /// Username to account id. Claimed through the entry API so concurrent
    /// adds cannot both take a name.
    usernames: DashMap<String, Uuid>,
    /// Lowercased email to account id.
    emails: DashMap<String, Uuid>,
    /// Accounts that received an activation email.
    activations: DashMap<Uuid, String>,
    mail_enabled: bool,
}

impl InMemoryAccounts {
    /// Directory whose activation mail always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mail_enabled: true,
            ..Self::default()
        }
    }

    /// Directory with no mail transport; activation emails fail.
    #[must_use]
    pub fn without_mail() -> Self {
        Self::default()
    }

    pub fn insert(&self, account: LocalAccount) {
        self.usernames.insert(account.username.clone(), account.id);
        self.emails
            .insert(account.email.to_ascii_lowercase(), account.id);
        self.accounts.insert(account.id, account);
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<LocalAccount> {
        self.accounts.get(&id).map(|a| a.value().clone())
    }

    /// Every account, in no particular order.
    #[must_use]
    pub fn all(&self) -> Vec<LocalAccount> {
        self.accounts.iter().map(|a| a.value().clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Whether an activation email went out for `id`.
    #[must_use]
    pub fn activation_sent(&self, id: Uuid) -> bool {
        self.activations.contains_key(&id)
    }

    fn by_index(&self, index: &DashMap<String, Uuid>, key: &str) -> Option<LocalAccount> {
        let id = *index.get(key)?;
        self.get(id)
    }
}

/// Claim `key` for `id`; false if it is already taken.
fn claim(index: &DashMap<String, Uuid>, key: String, id: Uuid) -> bool {
    match index.entry(key) {
        Entry::Occupied(_) => false,
        Entry::Vacant(slot) => {
            slot.insert(id);
            true
        }
    }
}

#[async_trait]
impl AccountLookup for InMemoryAccounts {
    async fn find_by_email(&self, email: &str) -> Result<Option<LocalAccount>, SamlSsoError> {
        Ok(self.by_index(&self.emails, &email.to_ascii_lowercase()))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<LocalAccount>, SamlSsoError> {
        Ok(self.by_index(&self.usernames, username))
    }
}

#[async_trait]
impl AccountRegistry for InMemoryAccounts {
    async fn create_account(&self, account: NewAccount) -> Result<LocalAccount, HostError> {
        let id = Uuid::new_v4();
        let email_key = account.email.to_ascii_lowercase();
        let username_claimed = claim(&self.usernames, account.username.clone(), id);
        let email_claimed = claim(&self.emails, email_key.clone(), id);

        if !(username_claimed && email_claimed) {
            let mut errors = Vec::new();
            if username_claimed {
                self.usernames.remove(&account.username);
            } else {
                errors.push("Username is already in use.".to_owned());
            }
            if email_claimed {
                self.emails.remove(&email_key);
            } else {
                errors.push("Email address is already in use.".to_owned());
            }
            return Err(HostError::Rejected(errors));
        }

        let created = LocalAccount {
            id,
            username: account.username,
            email: account.email,
            active: account.active,
        };
        self.accounts.insert(id, created.clone());
        Ok(created)
    }

    async fn send_activation_email(&self, account: &LocalAccount) -> bool {
        if !self.mail_enabled {
            return false;
        }
        tracing::debug!(account_id = %account.id, "activation email queued");
        self.activations.insert(account.id, account.email.clone());
        true
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn new_account(username: &str, email: &str) -> NewAccount {
        NewAccount {
            username: username.to_owned(),
            name: "Test User".to_owned(),
            email: email.to_owned(),
            role: "researcher".to_owned(),
            active: false,
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_claim_a_username_once() {
        let accounts = Arc::new(InMemoryAccounts::new());

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let accounts = accounts.clone();
                tokio::spawn(async move {
                    accounts
                        .create_account(new_account("jdoe", &format!("jdoe{i}@example.edu")))
                        .await
                })
            })
            .collect();

        let mut created = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(accounts.len(), 1);
        let account = accounts.find_by_username("jdoe").await.unwrap().unwrap();
        assert!(accounts.find_by_email(&account.email).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn rejected_add_releases_the_other_claim() {
        let accounts = InMemoryAccounts::new();
        accounts
            .create_account(new_account("jdoe", "jdoe@example.edu"))
            .await
            .unwrap();

        accounts
            .create_account(new_account("asmith", "JDoe@example.edu"))
            .await
            .unwrap_err();

        accounts
            .create_account(new_account("asmith", "asmith@example.edu"))
            .await
            .unwrap();
        assert_eq!(accounts.len(), 2);
    }

    #[tokio::test]
    async fn duplicates_are_rejected_with_messages() {
        let accounts = InMemoryAccounts::new();
        accounts
            .create_account(new_account("jdoe", "jdoe@example.edu"))
            .await
            .unwrap();

        let err = accounts
            .create_account(new_account("jdoe", "JDOE@example.edu"))
            .await
            .unwrap_err();

        match err {
            HostError::Rejected(messages) => assert_eq!(messages.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(accounts.len(), 1);
    }

    #[tokio::test]
    async fn email_lookup_ignores_case() {
        let accounts = InMemoryAccounts::new();
        let created = accounts
            .create_account(new_account("jdoe", "jdoe@example.edu"))
            .await
            .unwrap();

        let found = accounts.find_by_email("JDoe@Example.edu").await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn activation_mail_depends_on_transport() {
        let with_mail = InMemoryAccounts::new();
        let account = with_mail
            .create_account(new_account("a", "a@example.edu"))
            .await
            .unwrap();
        assert!(with_mail.send_activation_email(&account).await);
        assert!(with_mail.activation_sent(account.id));

        let without = InMemoryAccounts::without_mail();
        assert!(!without.send_activation_email(&account).await);
    }
}
