//! Name-based plugin resolver.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;

use crate::config::PluginSettings;
use crate::plugins::readiness::TcpReadinessPlugin;
use crate::plugins::{PluginError, PluginResolver, SyncHandler};

/// Resolver backed by a map of registered handlers.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    handlers: HashMap<String, SyncHandler>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build readiness plugins for every `[plugins.<id>]` entry.
    pub fn from_settings(settings: &BTreeMap<String, PluginSettings>) -> Result<Self, PluginError> {
        let mut registry = Self::new();
        for (id, plugin_settings) in settings {
            let plugin = Arc::new(TcpReadinessPlugin::from_settings(id, plugin_settings)?);
            tracing::debug!(plugin = %id, target = %plugin.target(), "Readiness plugin configured");
            registry.register(id.clone(), move || {
                let plugin = plugin.clone();
                async move { plugin.check().await }
            });
        }
        Ok(registry)
    }

    /// Register (or replace) the sync handler for `id`.
    pub fn register<F, Fut>(&mut self, id: impl Into<String>, sync: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), PluginError>> + Send + 'static,
    {
        let handler: SyncHandler = Arc::new(move || sync().boxed());
        self.handlers.insert(id.into(), handler);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl PluginResolver for PluginRegistry {
    fn resolve(&self, id: &str) -> Result<SyncHandler, PluginError> {
        self.handlers
            .get(id)
            .cloned()
            .ok_or_else(|| PluginError::Unresolved(id.to_string()))
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.handlers.keys().collect();
        ids.sort();
        f.debug_struct("PluginRegistry").field("plugins", &ids).finish()
    }
}
