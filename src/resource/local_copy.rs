//! On-disk snapshots of fetched vocabularies.
//!
//! Snapshots are keyed by the resource id they were fetched from, so two inputs that share a
//! namespace never serve each other's content.
//!
//! File names follow `<prefix>-<timestamp>-<digest>__<encoded-key>.ttl`. The timestamp is
//! UTC `%Y%m%d%H%M%S%3f`, so for a fixed prefix a descending lexicographic sort puts the newest
//! snapshot first. The digest is a SHA-256 over the graph's sorted N-Triples lines with blank
//! node labels blanked out, so re-parsing identical content never produces a second file.

use sha2::{Digest, Sha256};
use std::{
    path::{Path, PathBuf},
    result::Result,
};

use crate::{
    error::VocabError,
    graph::{Graph, Statement, Term},
};

use super::{ParserRegistry, LOCAL_MEDIA_TYPE};

const FORBIDDEN_FILENAME_CHARS: [char; 10] = ['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];
const BLANK_PLACEHOLDER: &str = "b";

/// Filename-safe form of a snapshot key (a resource id or namespace IRI), always ending in `.ttl`.
pub fn encode_namespace(namespace: &str) -> String {
    let mut encoded: String = namespace
        .chars()
        .map(|c| {
            if FORBIDDEN_FILENAME_CHARS.contains(&c) {
                '-'
            } else {
                c
            }
        })
        .collect();
    if !encoded.ends_with(".ttl") {
        encoded.push_str(".ttl");
    }
    encoded
}

/// Hex SHA-256 of the graph content, independent of statement order and blank node labels.
pub fn content_digest(graph: &Graph) -> String {
    let blank = |term: &Term| match term {
        Term::BlankNode(_) => Term::blank(BLANK_PLACEHOLDER),
        other => other.clone(),
    };
    let mut lines: Vec<String> = graph
        .iter()
        .map(|st| {
            Statement::new(blank(&st.subject), st.predicate.clone(), blank(&st.object))
                .to_string()
        })
        .collect();
    lines.sort();
    let mut hasher = Sha256::new();
    for line in lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

pub fn serialize_ntriples(graph: &Graph) -> String {
    let mut out = String::new();
    for st in graph.iter() {
        out.push_str(&st.to_string());
        out.push('\n');
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCopyStore {
    directory: PathBuf,
}

impl LocalCopyStore {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        LocalCopyStore {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    async fn file_names(&self) -> Result<Vec<String>, VocabError> {
        let mut names = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    /// Path of the newest snapshot for `key`, if any.
    pub async fn latest(&self, key: &str) -> Result<Option<PathBuf>, VocabError> {
        let suffix = format!("__{}", encode_namespace(key));
        let mut candidates: Vec<String> = self
            .file_names()
            .await?
            .into_iter()
            .filter(|name| name.ends_with(&suffix))
            .collect();
        candidates.sort_by(|a, b| b.cmp(a));
        Ok(candidates
            .into_iter()
            .next()
            .map(|name| self.directory.join(name)))
    }

    /// Parses the newest snapshot for `key` with `parsers`.
    pub async fn load_latest(
        &self,
        key: &str,
        parsers: &ParserRegistry,
    ) -> Result<Option<(PathBuf, Graph)>, VocabError> {
        let Some(path) = self.latest(key).await? else {
            return Ok(None);
        };
        let bytes = tokio::fs::read(&path).await?;
        let resource = path.to_string_lossy().to_string();
        let graph = parsers.parse(&resource, LOCAL_MEDIA_TYPE, &bytes, None)?;
        Ok(Some((path, graph)))
    }

    /// Writes a snapshot of `graph` unless one with identical content already exists.
    ///
    /// Returns the path written, or `None` when an identical snapshot was found.
    #[tracing::instrument(skip(self, graph))]
    pub async fn store(
        &self,
        prefix: &str,
        key: &str,
        graph: &Graph,
    ) -> Result<Option<PathBuf>, VocabError> {
        tokio::fs::create_dir_all(&self.directory).await?;
        let encoded = encode_namespace(key);
        let digest = content_digest(graph);
        let identical = format!("-{digest}__{encoded}");
        if let Some(existing) = self
            .file_names()
            .await?
            .into_iter()
            .find(|name| name.ends_with(&identical))
        {
            tracing::debug!(
                "[LocalCopyStore] {key} unchanged, keeping {existing}"
            );
            return Ok(None);
        }
        let timestamp = chrono::Utc::now().format("%Y%m%d%H%M%S%3f");
        let path = self
            .directory
            .join(format!("{prefix}-{timestamp}-{digest}__{encoded}"));
        tokio::fs::write(&path, serialize_ntriples(graph)).await?;
        tracing::info!("[LocalCopyStore] stored {key} as {:?}", path);
        Ok(Some(path))
    }
}
