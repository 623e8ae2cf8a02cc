//! Memoizes resolver results keyed by track identity.

use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::ResolveError;
use crate::protocol::TrackMetadata;
use crate::resolver::{PlayableHandle, TrackResolver};

/// Caches resolved playable handles for the session lifetime.
///
/// At most one entry per track id; entries are never evicted, only purged on
/// track removal or list replacement. Failures are not cached, so a later
/// call with the same metadata retries the resolver.
pub struct SourceCache {
    resolver: Arc<dyn TrackResolver>,
    entries: HashMap<String, PlayableHandle>,
    resolve_timeout: Duration,
}

impl SourceCache {
    pub fn new(resolver: Arc<dyn TrackResolver>, resolve_timeout: Duration) -> SourceCache {
        SourceCache {
            resolver,
            entries: HashMap::new(),
            resolve_timeout,
        }
    }

    /// Returns the cached handle for the track, resolving and storing it on
    /// first use.
    pub fn resolve(&mut self, metadata: &TrackMetadata) -> Result<PlayableHandle, ResolveError> {
        if let Some(handle) = self.entries.get(&metadata.id) {
            info!("SourceCache: '{}' has been cached", metadata.name);
            return Ok(handle.clone());
        }

        debug!(
            "SourceCache: resolving '{}' from {}",
            metadata.name, metadata.source
        );
        let handle = self.resolve_with_timeout(&metadata.source)?;
        self.entries.insert(metadata.id.clone(), handle.clone());
        Ok(handle)
    }

    // The resolver may block indefinitely; run it on a helper thread so the
    // session thread waits at most `resolve_timeout`.
    fn resolve_with_timeout(&self, source: &str) -> Result<PlayableHandle, ResolveError> {
        let (result_tx, result_rx) = mpsc::channel();
        let resolver = Arc::clone(&self.resolver);
        let source = source.to_string();
        let source_for_worker = source.clone();
        thread::spawn(move || {
            let _ = result_tx.send(resolver.resolve(&source_for_worker));
        });

        match result_rx.recv_timeout(self.resolve_timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                let waited_ms = self.resolve_timeout.as_millis() as u64;
                warn!(
                    "SourceCache: resolver did not answer within {} ms for {}",
                    waited_ms, source
                );
                Err(ResolveError::Timeout { waited_ms })
            }
            Err(RecvTimeoutError::Disconnected) => Err(ResolveError::Failed(
                "resolver worker exited without a result".to_string(),
            )),
        }
    }

    /// Drops the entry for `id`. Returns whether an entry existed.
    pub fn purge(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Drops every entry whose id is not in `ids`.
    pub fn retain_ids(&mut self, ids: &HashSet<String>) {
        self.entries.retain(|id, _| ids.contains(id));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }
}
