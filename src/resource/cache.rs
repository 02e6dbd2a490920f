use futures::future::join_all;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    path::PathBuf,
    result::Result,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use crate::{error::VocabError, graph::Graph};

use super::{FetchOptions, LocalCopyStore, ResourceFetcher};

/// Identifies one generation cycle. Entries remember the cycle that fetched them.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct GenerationToken(pub u64);

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub resource_id: String,
    pub graph: Arc<Graph>,
    pub fetched_at_generation: GenerationToken,
    /// Served from a local snapshot after the fetch failed.
    pub from_local_copy: bool,
}

/// Memoized resource fetches, keyed by the exact resource id string.
///
/// Ids are not normalized: `http://ex.org/v` and `http://ex.org/v/` are distinct entries.
pub struct ResourceCache {
    fetcher: ResourceFetcher,
    local_copies: Option<LocalCopyStore>,
    entries: RwLock<HashMap<String, CacheEntry>>,
    generation: AtomicU64,
}

impl ResourceCache {
    pub fn new(fetcher: ResourceFetcher) -> Self {
        ResourceCache {
            fetcher,
            local_copies: None,
            entries: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_local_copies(mut self, store: LocalCopyStore) -> Self {
        self.local_copies = Some(store);
        self
    }

    pub fn fetcher(&self) -> &ResourceFetcher {
        &self.fetcher
    }

    pub fn local_copies(&self) -> Option<&LocalCopyStore> {
        self.local_copies.as_ref()
    }

    pub fn begin_generation(&self) -> GenerationToken {
        GenerationToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn current_generation(&self) -> GenerationToken {
        GenerationToken(self.generation.load(Ordering::SeqCst))
    }

    pub fn contains(&self, resource: &str) -> bool {
        self.entries.read().contains_key(resource)
    }

    pub fn entry(&self, resource: &str) -> Option<CacheEntry> {
        self.entries.read().get(resource).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops the entry for `resource`; the next `get` refetches it.
    pub fn invalidate(&self, resource: &str) -> bool {
        let removed = self.entries.write().remove(resource).is_some();
        if removed {
            tracing::debug!("[ResourceCache] invalidated {resource}");
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub async fn get(
        &self,
        resource: &str,
        options: &FetchOptions,
    ) -> Result<Arc<Graph>, VocabError> {
        if let Some(entry) = self.entries.read().get(resource) {
            tracing::debug!("[ResourceCache] hit {resource}");
            return Ok(entry.graph.clone());
        }

        match self.fetcher.fetch(resource, options).await {
            Ok(graph) => Ok(self.insert(resource, graph, false)),
            Err(err) => self.fall_back(resource, err).await,
        }
    }

    /// Fetches every miss concurrently; results keep the order of `requests`.
    pub async fn get_many(
        &self,
        requests: &[(String, FetchOptions)],
    ) -> Result<Vec<Arc<Graph>>, VocabError> {
        join_all(
            requests
                .iter()
                .map(|(resource, options)| self.get(resource, options)),
        )
        .await
        .into_iter()
        .collect()
    }

    /// Snapshots the graph fetched from `resource` into the local-copy directory, keyed by the
    /// resource id.
    pub async fn store_local_copy(
        &self,
        prefix: &str,
        resource: &str,
        graph: &Graph,
    ) -> Result<Option<PathBuf>, VocabError> {
        let store = self.local_copies.as_ref().ok_or_else(|| {
            VocabError::Config("no local copy directory configured".to_string())
        })?;
        store.store(prefix, resource, graph).await
    }

    fn insert(&self, resource: &str, graph: Graph, from_local_copy: bool) -> Arc<Graph> {
        let graph = Arc::new(graph);
        let entry = CacheEntry {
            resource_id: resource.to_string(),
            graph: graph.clone(),
            fetched_at_generation: self.current_generation(),
            from_local_copy,
        };
        self.entries.write().insert(resource.to_string(), entry);
        graph
    }

    async fn fall_back(&self, resource: &str, err: VocabError) -> Result<Arc<Graph>, VocabError> {
        let Some(store) = &self.local_copies else {
            return Err(err);
        };
        let lookup_failed = |source: VocabError| VocabError::CacheLookup {
            namespace: resource.to_string(),
            directory: store.directory().to_string_lossy().to_string(),
            source: Box::new(source),
        };
        match store.load_latest(resource, self.fetcher.parsers()).await {
            Ok(Some((path, graph))) => {
                tracing::warn!(
                    "[ResourceCache] fetching {resource} failed ({err}); using local copy {:?}",
                    path
                );
                Ok(self.insert(resource, graph, true))
            }
            Ok(None) => Err(lookup_failed(err)),
            Err(read_err) => {
                tracing::warn!("[ResourceCache] reading local copies failed: {read_err}");
                Err(lookup_failed(err))
            }
        }
    }
}
