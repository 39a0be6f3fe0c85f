//! Module collector
//!
//! Walks the module listing newest first and enriches each module with its
//! releases and owner profile before handing it out. The registry sorts the
//! listing by update time, so the first module older than the boundary ends
//! the whole run.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use forge_core::types::{Module, Owner, Release};
use crate::api::parse_page;
use crate::cache::OwnerCache;
use crate::client::{ForgeClient, PageCursor};
use crate::transport::Transport;
use crate::RegistryResult;

/// Collects enriched modules from the registry
#[derive(Debug)]
pub struct ModuleCollector<T> {
    client: ForgeClient<T>,
    owners: OwnerCache,
}

impl<T: Transport> ModuleCollector<T> {
    /// Create a collector with an empty owner cache
    pub fn new(client: ForgeClient<T>) -> Self {
        Self {
            client,
            owners: OwnerCache::new(),
        }
    }

    /// Client used for every request
    pub fn client(&self) -> &ForgeClient<T> {
        &self.client
    }

    /// Owner profiles resolved so far
    pub fn owners(&self) -> &OwnerCache {
        &self.owners
    }

    /// Modules updated at or after `since`, newest first.
    ///
    /// Pass `forge_core::utils::default_datetime()` to collect everything.
    pub fn collect(&mut self, since: DateTime<Utc>) -> ModuleStream<'_, T> {
        info!("Fetching modules from {}", since);

        let Self { client, owners } = self;
        let client = &*client;
        ModuleStream {
            pages: client.modules(),
            client,
            owners,
            pending: VecDeque::new(),
            since,
            fetched: 0,
            finished: false,
        }
    }

    /// Every release of `owner-module`, across all pages, in page order
    pub async fn fetch_releases(&self, owner: &str, module: &str) -> RegistryResult<Vec<Release>> {
        fetch_releases(&self.client, owner, module).await
    }
}

/// Lazy, finite sequence of enriched modules
pub struct ModuleStream<'a, T> {
    client: &'a ForgeClient<T>,
    owners: &'a mut OwnerCache,
    pages: PageCursor<'a, T>,
    /// Parsed entries of the current page not handed out yet
    pending: VecDeque<Value>,
    since: DateTime<Utc>,
    fetched: usize,
    finished: bool,
}

impl<'a, T: Transport> ModuleStream<'a, T> {
    /// Next enriched module; `Ok(None)` once the boundary or the end of the
    /// listing is reached. After an error the stream is exhausted.
    pub async fn next_module(&mut self) -> RegistryResult<Option<Module>> {
        if self.finished {
            return Ok(None);
        }

        match self.advance().await {
            Ok(Some(module)) => {
                self.fetched += 1;
                Ok(Some(module))
            }
            Ok(None) => {
                self.finished = true;
                info!("Fetch process completed: {} modules fetched", self.fetched);
                Ok(None)
            }
            Err(error) => {
                self.finished = true;
                Err(error)
            }
        }
    }

    /// Drain the remaining modules
    pub async fn try_collect(mut self) -> RegistryResult<Vec<Module>> {
        let mut modules = Vec::new();
        while let Some(module) = self.next_module().await? {
            modules.push(module);
        }
        Ok(modules)
    }

    /// Number of modules handed out so far
    #[cfg(test)]
    fn fetched(&self) -> usize {
        self.fetched
    }

    async fn advance(&mut self) -> RegistryResult<Option<Module>> {
        let entry = loop {
            if let Some(entry) = self.pending.pop_front() {
                break entry;
            }

            match self.pages.next_page().await? {
                Some(raw) => self.pending.extend(parse_page(&raw)?.into_items()),
                None => return Ok(None),
            }
        };

        let mut module = Module::from_value(entry)?;

        let updated_on = module.updated_on()?;
        if updated_on < self.since {
            debug!(
                "Module {} updated on {} is older than {}; stopping",
                module.id(),
                updated_on,
                self.since
            );
            return Ok(None);
        }

        let releases = fetch_releases(self.client, &module.owner.username, &module.name).await?;
        let owner = self.owner(&module.owner.username).await?;
        module.enrich(releases, owner);

        Ok(Some(module))
    }

    async fn owner(&mut self, username: &str) -> RegistryResult<Arc<Owner>> {
        if let Some(owner) = self.owners.get(username) {
            return Ok(owner);
        }

        debug!("Owner {} not found on client cache; fetching it", username);

        let raw = self.client.user(username).await?;
        let owner = Owner::from_value(parse_page(&raw)?.into_single()?)?;

        Ok(self.owners.insert(username, owner))
    }
}

async fn fetch_releases<T: Transport>(
    client: &ForgeClient<T>,
    owner: &str,
    module: &str,
) -> RegistryResult<Vec<Release>> {
    debug!("Fetching and parsing releases from '{}'-'{}'", owner, module);

    let mut releases = Vec::new();
    let mut pages = client.releases(owner, module);

    while let Some(raw) = pages.next_page().await? {
        releases.extend(parse_page(&raw)?.into_items().into_iter().map(Release::from));
    }

    Ok(releases)
}
