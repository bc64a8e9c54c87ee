//! Resolve and run plugin sync handlers.

use std::time::Instant;

use futures_util::future::join_all;

use crate::observability::{console, metrics};
use crate::plugins::{PluginError, PluginFailure, PluginResolver, SyncHandlerMap};

/// Resolve each plugin id to its sync handler without invoking any of them.
///
/// Duplicate ids keep their first position and resolve once.
pub fn resolve_sync_handlers(
    ids: &[String],
    resolver: &dyn PluginResolver,
) -> Result<SyncHandlerMap, PluginError> {
    let mut handlers = SyncHandlerMap::with_capacity(ids.len());
    for id in ids {
        if handlers.contains_key(id) {
            tracing::debug!(plugin = %id, "Duplicate database plugin ignored");
            continue;
        }
        let handler = resolver.resolve(id)?;
        handlers.insert(id.clone(), handler);
    }
    Ok(handlers)
}

/// Launch every handler together and wait for all of them to settle.
///
/// In-flight handlers are never cancelled when a sibling fails. Returns the
/// number synchronized, or every failure.
pub async fn synchronize(handlers: SyncHandlerMap) -> Result<usize, Vec<PluginFailure>> {
    let total = handlers.len();

    let runs = handlers.into_iter().map(|(plugin, handler)| async move {
        let started = Instant::now();
        let result = handler().await;
        metrics::record_plugin_sync(&plugin, result.is_ok());
        match &result {
            Ok(()) => {
                tracing::info!(plugin = %plugin, elapsed_ms = started.elapsed().as_millis() as u64, "Plugin synchronized")
            }
            Err(e) => {
                tracing::error!(plugin = %plugin, error = %console::error_chain(e), "Plugin sync failed")
            }
        }
        (plugin, result)
    });

    let failures: Vec<PluginFailure> = join_all(runs)
        .await
        .into_iter()
        .filter_map(|(plugin, result)| result.err().map(|error| PluginFailure { plugin, error }))
        .collect();

    if failures.is_empty() {
        Ok(total)
    } else {
        Err(failures)
    }
}
