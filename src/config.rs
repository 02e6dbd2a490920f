use serde::{Deserialize, Serialize};
use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
    result::Result,
};

use crate::{
    artifact::ArtifactKind,
    error::VocabError,
    resolver::ResolveOptions,
    resource::{is_online, FetchOptions},
};

pub const DEFAULT_MARKER_FILE: &str = ".vocabgen-marker";

fn default_output_directory() -> PathBuf {
    PathBuf::from("Generated")
}

/// One vocabulary to generate: its input resources plus optional scoping and overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabConfig {
    pub input_resources: Vec<String>,
    #[serde(default)]
    pub term_selection_resource: Option<String>,
    #[serde(default)]
    pub namespace_iri_override: Option<String>,
    #[serde(default)]
    pub name_and_prefix_override: Option<String>,
    #[serde(default)]
    pub ignore_non_vocab_terms: bool,
    #[serde(default)]
    pub vocab_accept_header_override: Option<String>,
    #[serde(default)]
    pub vocab_content_type_header_override: Option<String>,
    #[serde(default)]
    pub vocab_content_type_header_fallback: Option<String>,
}

impl VocabConfig {
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            accept_header_override: self.vocab_accept_header_override.clone(),
            content_type_override: self.vocab_content_type_header_override.clone(),
            content_type_fallback: self.vocab_content_type_header_fallback.clone(),
        }
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            namespace_override: self.namespace_iri_override.clone(),
            prefix_override: self.name_and_prefix_override.clone(),
            ignore_non_vocab_terms: self.ignore_non_vocab_terms,
        }
    }

    /// Input resources followed by the term selection resource, if any.
    pub fn resources(&self) -> Vec<String> {
        let mut resources = self.input_resources.clone();
        if let Some(selection) = &self.term_selection_resource {
            if !resources.contains(selection) {
                resources.push(selection.clone());
            }
        }
        resources
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,
    /// Staleness marker, relative to `output_directory`.
    #[serde(default)]
    pub marker_file: Option<PathBuf>,
    #[serde(default, rename = "storeLocalCopyOfVocabDirectory")]
    pub local_copy_directory: Option<PathBuf>,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,
    #[serde(default, rename = "artifactToGenerate")]
    pub artifacts: Vec<ArtifactKind>,
    pub vocab_list: Vec<VocabConfig>,
}

impl GeneratorConfig {
    /// A single-vocabulary configuration producing the default artifact.
    pub fn for_resources(
        input_resources: Vec<String>,
        term_selection_resource: Option<String>,
        output_directory: PathBuf,
    ) -> Self {
        GeneratorConfig {
            output_directory,
            marker_file: None,
            local_copy_directory: None,
            force: false,
            http_timeout_secs: None,
            artifacts: vec![ArtifactKind::default()],
            vocab_list: vec![VocabConfig {
                input_resources,
                term_selection_resource,
                ..Default::default()
            }],
        }
    }

    pub fn marker_path(&self) -> PathBuf {
        self.output_directory.join(
            self.marker_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MARKER_FILE)),
        )
    }

    /// Every resource of every vocabulary, in configuration order, without duplicates.
    pub fn resources(&self) -> Vec<String> {
        let mut all = Vec::new();
        for resource in self.vocab_list.iter().flat_map(VocabConfig::resources) {
            if !all.contains(&resource) {
                all.push(resource);
            }
        }
        all
    }

    /// Widens a set of changed resources: a changed term selection resource rescopes its
    /// vocabulary, so all of that vocabulary's inputs count as changed.
    pub fn expand_changed(&self, changed: &[String]) -> Vec<String> {
        let mut expanded: Vec<String> = changed.to_vec();
        for vocab in self.vocab_list.iter() {
            let selection_changed = vocab
                .term_selection_resource
                .as_ref()
                .map(|s| changed.contains(s))
                .unwrap_or(false);
            if selection_changed {
                for resource in vocab.input_resources.iter() {
                    if !expanded.contains(resource) {
                        expanded.push(resource.clone());
                    }
                }
            }
        }
        expanded
    }

    pub fn validate(&self) -> Result<(), VocabError> {
        if self.vocab_list.is_empty() {
            return Err(VocabError::Config(
                "vocabList must name at least one vocabulary".to_string(),
            ));
        }
        if let Some((idx, _)) = self
            .vocab_list
            .iter()
            .enumerate()
            .find(|(_, vocab)| vocab.input_resources.is_empty())
        {
            return Err(VocabError::Config(format!(
                "vocabList entry {idx} has no inputResources"
            )));
        }
        Ok(())
    }

    /// Resolves relative local paths against `base` (the configuration file's directory) and
    /// fills in defaults.
    pub fn normalized(mut self, base: &Path) -> Self {
        let join = |path: &Path| -> PathBuf {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                base.join(path)
            }
        };
        let join_resource = |resource: &String| -> String {
            if is_online(resource) {
                resource.clone()
            } else {
                join(Path::new(resource)).to_string_lossy().to_string()
            }
        };
        self.output_directory = join(&self.output_directory);
        self.local_copy_directory = self.local_copy_directory.as_deref().map(|p| join(p));
        for vocab in self.vocab_list.iter_mut() {
            vocab.input_resources = vocab.input_resources.iter().map(|r| join_resource(r)).collect();
            vocab.term_selection_resource = vocab
                .term_selection_resource
                .as_ref()
                .map(|r| join_resource(r));
        }
        if self.artifacts.is_empty() {
            self.artifacts.push(ArtifactKind::default());
        }
        self
    }
}

pub trait ConfigProvider: Send + Sync {
    fn read_config(&self) -> Result<GeneratorConfig, VocabError>;

    /// The file backing this configuration, if any. The watcher observes it.
    fn path(&self) -> Option<&Path> {
        None
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YamlConfigProvider {
    path: PathBuf,
}

impl YamlConfigProvider {
    pub fn new(path: PathBuf) -> Self {
        YamlConfigProvider { path }
    }
}

impl ConfigProvider for YamlConfigProvider {
    fn read_config(&self) -> Result<GeneratorConfig, VocabError> {
        tracing::debug!("Attempting to read generator config from: {:?}", &self.path);
        let content = read_to_string(&self.path).map_err(|e| {
            VocabError::Config(format!("cannot read {}: {e}", self.path.display()))
        })?;
        let config: GeneratorConfig = serde_yaml::from_str(&content)?;
        let base = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let config = config.normalized(&base);
        config.validate()?;
        Ok(config)
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// A fixed, in-memory configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigProvider(pub GeneratorConfig);

impl ConfigProvider for StaticConfigProvider {
    fn read_config(&self) -> Result<GeneratorConfig, VocabError> {
        self.0.validate()?;
        Ok(self.0.clone())
    }
}
