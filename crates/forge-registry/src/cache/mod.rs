//! Run-scoped owner profile cache
//!
//! Owner profiles are fetched at most once per username during a collection
//! run. Entries never expire and are never evicted; the cache lives exactly
//! as long as the collector owning it. Access is single-task, so no locking.

use std::collections::HashMap;
use std::sync::Arc;
use forge_core::types::Owner;

/// Owner profiles keyed by username
#[derive(Debug, Default)]
pub struct OwnerCache {
    owners: HashMap<String, Arc<Owner>>,
}

impl OwnerCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached profile of `username`; hits share the same record
    pub fn get(&self, username: &str) -> Option<Arc<Owner>> {
        self.owners.get(username).cloned()
    }

    /// Store a profile and return the shared record
    pub fn insert(&mut self, username: impl Into<String>, owner: Owner) -> Arc<Owner> {
        let owner = Arc::new(owner);
        self.owners.insert(username.into(), Arc::clone(&owner));
        owner
    }

    /// Check if a username has been resolved
    pub fn contains(&self, username: &str) -> bool {
        self.owners.contains_key(username)
    }

    /// Number of cached profiles
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Check if nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
