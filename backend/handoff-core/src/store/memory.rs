use crate::error::credential::CredentialError;
use crate::store::DataSource;

use common::ErrorLocation;

use std::collections::BTreeMap;
use std::panic::Location;
use std::sync::{Mutex, MutexGuard};

/// Process-local [`DataSource`]; contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryDataSource {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[track_caller]
    fn entries(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, CredentialError> {
        self.entries.lock().map_err(|_| CredentialError::Storage {
            message: String::from("Memory data source lock poisoned"),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

impl DataSource for MemoryDataSource {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CredentialError> {
        self.entries()?.remove(key);
        Ok(())
    }

    fn remove_all(&self) -> Result<(), CredentialError> {
        self.entries()?.clear();
        Ok(())
    }
}
