//! Merged tool catalog across endpoints

use agent_core::ToolSpec;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::warn;

use crate::endpoint::ServerEndpoint;

/// A tool together with the endpoint that serves it
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub endpoint: Arc<ServerEndpoint>,
    pub spec: ToolSpec,
}

impl CatalogEntry {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn alias(&self) -> &str {
        &self.endpoint.alias
    }
}

/// Union of the tool catalogs of every reachable endpoint
///
/// Names are unique. When two endpoints expose the same name the one that
/// comes first in configured order keeps it and the other is dropped.
/// Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct MergedCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
}

impl MergedCatalog {
    /// Merge per-endpoint listings, given in configured endpoint order
    pub fn merge<I>(listings: I) -> Self
    where
        I: IntoIterator<Item = (Arc<ServerEndpoint>, Vec<ToolSpec>)>,
    {
        let mut catalog = Self::default();

        for (endpoint, specs) in listings {
            for spec in specs {
                match catalog.index.entry(spec.name.clone()) {
                    Entry::Occupied(existing) => {
                        let winner = &catalog.entries[*existing.get()];
                        warn!(
                            "Tool '{}' from '{}' is shadowed by '{}'",
                            spec.name,
                            endpoint.alias,
                            winner.alias()
                        );
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(catalog.entries.len());
                        catalog.entries.push(CatalogEntry {
                            endpoint: Arc::clone(&endpoint),
                            spec,
                        });
                    }
                }
            }
        }

        catalog
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Endpoint that owns `name`
    pub fn owner(&self, name: &str) -> Option<&ServerEndpoint> {
        self.get(name).map(|entry| entry.endpoint.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Entries in configured-endpoint order, then registration order
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(CatalogEntry::name).collect()
    }

    /// Tools won by the endpoint called `alias`
    pub fn tools_for<'a>(&'a self, alias: &'a str) -> impl Iterator<Item = &'a ToolSpec> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.alias() == alias)
            .map(|entry| &entry.spec)
    }

    /// Plain tool descriptions, as handed to a model
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.entries.iter().map(|entry| entry.spec.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
