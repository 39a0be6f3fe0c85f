//! Puppet Forge backend
//!
//! Drives the module collector and wraps every enriched module in an `Item`
//! envelope carrying its provenance: origin, uuid, fetch time and tag.

use chrono::{DateTime, Utc};
use tracing::info;

use forge_core::error::ForgeError;
use forge_core::types::{Item, Module, SearchFields};
use forge_core::utils::{datetime_to_timestamp, default_datetime, item_uuid};
use crate::client::ForgeClient;
use crate::collector::{ModuleCollector, ModuleStream};
use crate::transport::Transport;
use crate::RegistryResult;

pub const BACKEND_NAME: &str = "PuppetForge";
pub const BACKEND_VERSION: &str = "1.0.0";
pub const CATEGORY_MODULE: &str = "module";

/// Categories this backend can fetch
pub const CATEGORIES: &[&str] = &[CATEGORY_MODULE];

/// Backend fetching modules from a Puppet Forge registry
#[derive(Debug)]
pub struct PuppetForge<T> {
    collector: ModuleCollector<T>,
    origin: String,
    tag: String,
}

impl<T: Transport> PuppetForge<T> {
    /// Create a backend; the tag defaults to the origin when absent or empty
    pub fn new(client: ForgeClient<T>, tag: Option<String>) -> Self {
        let origin = client.base_url().to_string();
        let tag = tag.filter(|t| !t.is_empty()).unwrap_or_else(|| origin.clone());

        Self {
            collector: ModuleCollector::new(client),
            origin,
            tag,
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Collector behind this backend
    pub fn collector(&self) -> &ModuleCollector<T> {
        &self.collector
    }

    /// Responses of this backend can be archived and replayed
    pub fn has_archiving(&self) -> bool {
        true
    }

    /// A run cannot be resumed from an offset
    pub fn has_resuming(&self) -> bool {
        false
    }

    /// Identifier of a module item
    pub fn metadata_id(module: &Module) -> String {
        module.id()
    }

    /// Update time of a module item, in seconds since the Unix epoch
    pub fn metadata_updated_on(module: &Module) -> RegistryResult<f64> {
        Ok(datetime_to_timestamp(&module.updated_on()?))
    }

    /// Category of every item this backend produces
    pub fn metadata_category(_module: &Module) -> &'static str {
        CATEGORY_MODULE
    }

    /// Fetch items of `category` updated at or after `from_date`.
    ///
    /// Without `from_date` every module is fetched.
    pub fn fetch(&mut self, category: &str, from_date: Option<DateTime<Utc>>) -> RegistryResult<ItemStream<'_, T>> {
        if !CATEGORIES.contains(&category) {
            return Err(ForgeError::InvalidCategory {
                category: category.to_string(),
                supported: CATEGORIES.join(", "),
            });
        }

        let from_date = from_date.unwrap_or_else(default_datetime);
        info!(
            "Fetching items of category '{}' from {} since {}",
            category, self.origin, from_date
        );

        let Self { collector, origin, tag } = self;
        Ok(ItemStream {
            modules: collector.collect(from_date),
            origin: origin.as_str(),
            tag: tag.as_str(),
        })
    }
}

/// Lazy sequence of item envelopes
pub struct ItemStream<'a, T> {
    modules: ModuleStream<'a, T>,
    origin: &'a str,
    tag: &'a str,
}

impl<'a, T: Transport> ItemStream<'a, T> {
    /// Next item; `Ok(None)` once the collector is exhausted
    pub async fn next_item(&mut self) -> RegistryResult<Option<Item>> {
        match self.modules.next_module().await? {
            Some(module) => self.wrap(module).map(Some),
            None => Ok(None),
        }
    }

    /// Drain the remaining items
    pub async fn try_collect(mut self) -> RegistryResult<Vec<Item>> {
        let mut items = Vec::new();
        while let Some(item) = self.next_item().await? {
            items.push(item);
        }
        Ok(items)
    }

    fn wrap(&self, module: Module) -> RegistryResult<Item> {
        let id = PuppetForge::<T>::metadata_id(&module);

        Ok(Item {
            backend_name: BACKEND_NAME.to_string(),
            backend_version: BACKEND_VERSION.to_string(),
            timestamp: datetime_to_timestamp(&Utc::now()),
            origin: self.origin.to_string(),
            uuid: item_uuid(&[self.origin, &id]),
            updated_on: PuppetForge::<T>::metadata_updated_on(&module)?,
            category: PuppetForge::<T>::metadata_category(&module).to_string(),
            search_fields: SearchFields::for_module(&module),
            tag: self.tag.to_string(),
            data: module,
        })
    }
}
