//! # Artifact orchestration
//!
//! [`ArtifactOrchestrator`] runs one generation cycle as a fixed sequence of awaited steps:
//!
//! 1. unless forced, ask the [`StalenessChecker`] which inputs changed since the last marker;
//!    nothing changed means nothing to do, otherwise the changed resources are invalidated.
//!    A forced cycle invalidates every configured resource
//! 2. per vocabulary, fetch the inputs and term selection resource through the
//!    [`ResourceCache`] and merge them into the full graph
//! 3. resolve terms with a [`TermResolver`] configured from the vocabulary entry
//! 4. snapshot online inputs into the local-copy directory, when one is configured
//! 5. render every configured artifact and write it atomically
//! 6. write the staleness marker
//!
//! Any failing step aborts the cycle and surfaces its error; the marker is only written after
//! every artifact has been.

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, result::Result, sync::Arc, time::Duration};

use crate::{
    artifact::ArtifactRenderer,
    config::{ConfigProvider, GeneratorConfig, VocabConfig},
    error::VocabError,
    graph::Graph,
    resolver::{TermResolver, VocabularyBundle},
    resource::{
        is_online, GenerationToken, HttpTransport, LocalCopyStore, ReqwestTransport,
        ResourceCache, ResourceFetcher,
    },
    staleness::{write_atomic, write_marker, MarkerProvenance, StalenessChecker},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularySummary {
    pub namespace: String,
    pub prefix: String,
    pub classes: usize,
    pub properties: usize,
    pub literals: usize,
    pub constants: usize,
}

impl From<&VocabularyBundle> for VocabularySummary {
    fn from(bundle: &VocabularyBundle) -> Self {
        VocabularySummary {
            namespace: bundle.namespace.clone(),
            prefix: bundle.prefix.clone(),
            classes: bundle.classes.len(),
            properties: bundle.properties.len(),
            literals: bundle.literals.len(),
            constants: bundle.constant_iris.len() + bundle.constant_strings.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub generation: GenerationToken,
    pub forced: bool,
    pub vocabularies: Vec<VocabularySummary>,
    pub artifacts: Vec<PathBuf>,
    pub local_copies: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Every artifact was newer than every input.
    Skipped,
    Generated(GenerationReport),
}

pub struct ArtifactOrchestrator {
    config: GeneratorConfig,
    config_provider: Option<Arc<dyn ConfigProvider>>,
    cache: ResourceCache,
    staleness: StalenessChecker,
    renderer: Arc<dyn ArtifactRenderer>,
    force: bool,
}

impl ArtifactOrchestrator {
    pub fn new(
        config: GeneratorConfig,
        transport: Arc<dyn HttpTransport>,
        renderer: Arc<dyn ArtifactRenderer>,
    ) -> Result<Self, VocabError> {
        config.validate()?;
        let fetcher = ResourceFetcher::with_transport(transport.clone());
        Ok(ArtifactOrchestrator {
            force: config.force,
            cache: Self::build_cache(&config, fetcher),
            staleness: StalenessChecker::new(transport),
            config,
            config_provider: None,
            renderer,
        })
    }

    /// Builds from a configuration provider with the default HTTP transport. The provider is
    /// kept for [`reload_config`](Self::reload_config).
    pub fn from_provider(
        provider: Arc<dyn ConfigProvider>,
        renderer: Arc<dyn ArtifactRenderer>,
    ) -> Result<Self, VocabError> {
        let config = provider.read_config()?;
        let transport = Arc::new(ReqwestTransport::new(
            config.http_timeout_secs.map(Duration::from_secs),
        )?);
        Self::with_provider(provider, transport, renderer)
    }

    pub fn with_provider(
        provider: Arc<dyn ConfigProvider>,
        transport: Arc<dyn HttpTransport>,
        renderer: Arc<dyn ArtifactRenderer>,
    ) -> Result<Self, VocabError> {
        let mut orchestrator = Self::new(provider.read_config()?, transport, renderer)?;
        orchestrator.config_provider = Some(provider);
        Ok(orchestrator)
    }

    fn build_cache(config: &GeneratorConfig, fetcher: ResourceFetcher) -> ResourceCache {
        let cache = ResourceCache::new(fetcher);
        match &config.local_copy_directory {
            Some(dir) => cache.with_local_copies(LocalCopyStore::new(dir)),
            None => cache,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn config_path(&self) -> Option<PathBuf> {
        self.config_provider
            .as_ref()
            .and_then(|p| p.path().map(PathBuf::from))
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn force(&self) -> bool {
        self.force
    }

    pub fn set_force(&mut self, force: bool) {
        self.force = force;
    }

    pub fn invalidate(&self, resource: &str) -> bool {
        self.cache.invalidate(resource)
    }

    /// Re-reads the configuration from its provider. Cached graphs are dropped because the
    /// resource set or local-copy directory may have changed. Returns false when the
    /// orchestrator has no provider.
    pub fn reload_config(&mut self) -> Result<bool, VocabError> {
        let Some(provider) = &self.config_provider else {
            return Ok(false);
        };
        let config = provider.read_config()?;
        tracing::info!(
            "[ArtifactOrchestrator] configuration reloaded: {} vocabularies",
            config.vocab_list.len()
        );
        self.cache = Self::build_cache(&config, self.cache.fetcher().clone());
        self.config = config;
        Ok(true)
    }

    #[tracing::instrument(skip_all, fields(force = self.force))]
    pub async fn generate(&mut self) -> Result<GenerationOutcome, VocabError> {
        let generation = self.cache.begin_generation();
        let resources = self.config.resources();
        let marker = self.config.marker_path();
        let forced = self.force || self.config.force;

        if forced {
            for resource in resources.iter() {
                self.cache.invalidate(resource);
            }
        } else {
            match self.staleness.stale_resources(&marker, &resources).await? {
                Some(stale) if stale.is_empty() => {
                    tracing::info!("[ArtifactOrchestrator] artifacts up to date, skipping");
                    return Ok(GenerationOutcome::Skipped);
                }
                Some(stale) => {
                    for resource in self.config.expand_changed(&stale) {
                        self.cache.invalidate(&resource);
                    }
                }
                None => {}
            }
        }

        let mut report = GenerationReport {
            generation,
            forced,
            vocabularies: Vec::new(),
            artifacts: Vec::new(),
            local_copies: Vec::new(),
        };
        for vocab in self.config.vocab_list.iter() {
            let (bundle, local_copies) = self.generate_vocabulary(vocab).await?;
            report.local_copies.extend(local_copies);
            for artifact in self.config.artifacts.iter() {
                let prepared = artifact.prepare(&bundle);
                let text = self.renderer.render(artifact.template_id(), &prepared)?;
                let path = self
                    .config
                    .output_directory
                    .join(artifact.relative_path(&prepared));
                write_atomic(&path, &text).await?;
                tracing::debug!("[ArtifactOrchestrator] wrote {:?}", path);
                report.artifacts.push(path);
            }
            report.vocabularies.push(VocabularySummary::from(&bundle));
        }

        write_marker(&marker, &MarkerProvenance::now(resources)).await?;
        tracing::info!(
            "[ArtifactOrchestrator] generation {} wrote {} artifacts for {} vocabularies",
            generation.0,
            report.artifacts.len(),
            report.vocabularies.len()
        );
        Ok(GenerationOutcome::Generated(report))
    }

    async fn generate_vocabulary(
        &self,
        vocab: &VocabConfig,
    ) -> Result<(VocabularyBundle, Vec<PathBuf>), VocabError> {
        let options = vocab.fetch_options();
        let requests: Vec<_> = vocab
            .input_resources
            .iter()
            .map(|resource| (resource.clone(), options.clone()))
            .collect();
        let inputs = self.cache.get_many(&requests).await?;
        let extension = match &vocab.term_selection_resource {
            Some(resource) => self.cache.get(resource, &options).await?,
            None => Arc::new(Graph::new()),
        };

        let mut full = Graph::new();
        for graph in inputs.iter() {
            full = full.merge(graph);
        }
        full = full.merge(&extension);

        let bundle = TermResolver::new(vocab.resolve_options()).resolve(&full, &extension)?;

        let mut local_copies = Vec::new();
        if self.cache.local_copies().is_some() {
            for (resource, graph) in vocab.input_resources.iter().zip(inputs.iter()) {
                let served_locally = self
                    .cache
                    .entry(resource)
                    .map(|entry| entry.from_local_copy)
                    .unwrap_or(false);
                if !is_online(resource) || served_locally {
                    continue;
                }
                if let Some(path) = self
                    .cache
                    .store_local_copy(&bundle.prefix, resource, graph)
                    .await?
                {
                    local_copies.push(path);
                }
            }
        }
        Ok((bundle, local_copies))
    }
}
