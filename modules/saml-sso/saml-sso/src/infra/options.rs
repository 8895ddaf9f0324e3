//! In-memory [`OptionStore`] for development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::host::{HostError, OptionStore};

#[derive(Debug, Default)]
pub struct InMemoryOptionStore {
    values: DashMap<String, String>,
}

impl InMemoryOptionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `values`.
    #[must_use]
    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Copy of every stored option.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.values
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

#[async_trait]
impl OptionStore for InMemoryOptionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, HostError> {
        Ok(self.values.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), HostError> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), HostError> {
        self.values.remove(key);
        Ok(())
    }
}
