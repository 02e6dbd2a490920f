//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use tempfile::TempDir;
use vocabgen_core::{
    resource::{HttpResponse, HttpTransport},
    VocabError,
};

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times, subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

#[allow(dead_code)]
pub const PERSON_VOCAB: &str = r#"
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix ex: <http://ex.org/> .

ex: a owl:Ontology ;
    rdfs:comment "People and their names"@en .

ex:Person a rdfs:Class ;
    rdfs:label "Person"@en ;
    rdfs:comment "A human being"@en .

ex:name a rdf:Property ;
    rdfs:label "name"@en .
"#;

/// Selects `Person` only and adds a Spanish label.
#[allow(dead_code)]
pub const PERSON_SELECTION: &str = r#"
@prefix schema: <https://schema.org/> .
@prefix ex: <http://ex.org/> .

ex:Person schema:alternateName "Persona"@es .
"#;

/// Create a vocabulary directory holding `person.ttl` and `person-ext.ttl`.
///
/// Returns the path to the directory (e.g. `<temp_dir>/vocab/`).
#[allow(dead_code)]
pub fn create_vocab_dir(temp_dir: &TempDir) -> PathBuf {
    let vocab_dir = temp_dir.path().join("vocab");
    std::fs::create_dir(&vocab_dir).unwrap();
    std::fs::write(vocab_dir.join("person.ttl"), PERSON_VOCAB).unwrap();
    std::fs::write(vocab_dir.join("person-ext.ttl"), PERSON_SELECTION).unwrap();
    vocab_dir
}

/// Write a YAML generator configuration next to the vocabulary directory. Paths in it are
/// relative to the configuration file.
#[allow(dead_code)]
pub fn write_config(temp_dir: &TempDir, vocab_list: &str) -> PathBuf {
    let config = format!(
        "outputDirectory: ./out\nartifactToGenerate:\n  - programmingLanguage: Json\nvocabList:\n{vocab_list}"
    );
    let path = temp_dir.path().join("vocab.yml");
    std::fs::write(&path, config).unwrap();
    path
}

/// Read back a generated JSON artifact.
#[allow(dead_code)]
pub fn read_artifact(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// In-memory [`HttpTransport`] answering 200 with a fixed body per URL. Every other URL is
/// unreachable.
#[allow(dead_code)]
#[derive(Default)]
pub struct FixedTransport {
    bodies: Mutex<HashMap<String, (String, String)>>,
    hits: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FixedTransport {
    pub fn serve(&self, url: &str, body: &str, content_type: &str) {
        self.bodies
            .lock()
            .insert(url.to_string(), (body.to_string(), content_type.to_string()));
    }

    pub fn take_offline(&self, url: &str) {
        self.bodies.lock().remove(url);
    }

    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().clone()
    }
}

#[async_trait]
impl HttpTransport for FixedTransport {
    async fn get(&self, url: &str, _headers: &[(&str, &str)]) -> Result<HttpResponse, VocabError> {
        self.hits.lock().push(url.to_string());
        match self.bodies.lock().get(url) {
            Some((body, content_type)) => Ok(HttpResponse {
                status: 200,
                headers: HashMap::from([("content-type".to_string(), content_type.clone())]),
                body: body.as_bytes().to_vec(),
            }),
            None => Err(VocabError::Fetch {
                resource: url.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}
