use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use campaign_wizard::CacheInvalidator;
use serde::{de::DeserializeOwned, Serialize};
use shared::domain::QueryScope;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub scope: QueryScope,
    pub params: Vec<String>,
}

impl QueryKey {
    pub fn new(scope: QueryScope) -> Self {
        Self {
            scope,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, value: impl ToString) -> Self {
        self.params.push(value.to_string());
        self
    }
}

/// Results of backend reads, shared by everything in the process. Entries
/// live until their scope is invalidated.
#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, serde_json::Value>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let value = entries.get(key)?.clone();
        drop(entries);
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(scope = key.scope.as_str(), error = %err, "cache: entry has unexpected shape");
                None
            }
        }
    }

    pub fn put<T: Serialize>(&self, key: QueryKey, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.entries
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(key, value);
            }
            Err(err) => warn!(scope = key.scope.as_str(), error = %err, "cache: value not stored"),
        }
    }

    pub fn invalidate_scope(&self, scope: QueryScope) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|key, _| key.scope != scope);
        let dropped = before - entries.len();
        debug!(scope = scope.as_str(), dropped, "cache: invalidated");
        dropped
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheInvalidator for QueryCache {
    fn invalidate(&self, scope: QueryScope) {
        self.invalidate_scope(scope);
    }
}
