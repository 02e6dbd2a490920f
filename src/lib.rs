//! # vocabgen-core
//!
//! A Rust library for turning RDF vocabularies into normalized, per-term bundles ready for
//! source artifact generation, with incremental rebuilds.
//!
//! ## Overview
//!
//! A vocabulary is described by one or more *input resources* (Turtle or RDF/XML, local files or
//! URLs) and, optionally, a *term selection resource* that scopes which terms are emitted and
//! overrides their labels and comments. vocabgen-core fetches and caches those resources,
//! resolves every class, property and literal term with precise precedence and language
//! fallback rules, and renders one artifact per configured target language.
//!
//! ### Key Features
//!
//! - **Term resolution**: Extension graphs override labels, comments and definitions per language
//! - **Resource caching**: Fetched graphs are memoized and invalidated per resource
//! - **Offline fallback**: Snapshots of online vocabularies stand in when a fetch fails
//! - **Incremental builds**: A marker file skips regeneration while artifacts are up to date
//! - **Watch mode**: Regenerates on change without letting malformed input stop the watcher
//!
//! ## Architecture
//!
//! - **[`graph`]**: Statements and pattern lookup (`Graph`, `Term`)
//! - **[`resource`]**: Fetching, parsing, caching and local copies (`ResourceCache`)
//! - **[`resolver`]**: Term resolution (`TermResolver`, `VocabularyBundle`)
//! - **[`staleness`]**: Marker-based regeneration checks (`StalenessChecker`)
//! - **[`orchestrator`]**: One generation cycle end to end (`ArtifactOrchestrator`)
//! - **[`watch`]**: Change-driven regeneration (`VocabWatcher`, requires `service`)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vocabgen_core::{
//!     artifact::JsonRenderer,
//!     config::GeneratorConfig,
//!     orchestrator::{ArtifactOrchestrator, GenerationOutcome},
//!     resource::ReqwestTransport,
//! };
//! use std::{path::PathBuf, sync::Arc};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GeneratorConfig::for_resources(
//!         vec!["./vocab/schema.ttl".to_string()],
//!         Some("./vocab/schema-ext.ttl".to_string()),
//!         PathBuf::from("./Generated"),
//!     );
//!     let mut orchestrator = ArtifactOrchestrator::new(
//!         config,
//!         Arc::new(ReqwestTransport::new(None)?),
//!         Arc::new(JsonRenderer),
//!     )?;
//!
//!     if let GenerationOutcome::Generated(report) = orchestrator.generate().await? {
//!         for path in report.artifacts {
//!             println!("wrote {}", path.display());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Resolving Terms Directly
//!
//! ```rust
//! use vocabgen_core::{
//!     graph::{Graph, Statement, Term},
//!     resolver::TermResolver,
//!     vocab::{rdf, rdfs, schema},
//! };
//!
//! let full: Graph = vec![
//!     Statement::new(Term::iri("http://ex.org/Person"), rdf::TYPE, Term::iri(rdfs::CLASS)),
//!     Statement::new(
//!         Term::iri("http://ex.org/Person"),
//!         rdfs::LABEL,
//!         Term::lang_literal("Person", "en"),
//!     ),
//! ]
//! .into_iter()
//! .collect();
//! let extension: Graph = vec![Statement::new(
//!     Term::iri("http://ex.org/Person"),
//!     schema::ALTERNATE_NAME,
//!     Term::lang_literal("Persona", "es"),
//! )]
//! .into_iter()
//! .collect();
//!
//! let bundle = TermResolver::default().resolve(&full.merge(&extension), &extension)?;
//! assert_eq!(bundle.classes[0].local_name, "Person");
//! assert_eq!(bundle.classes[0].labels.len(), 2);
//! # Ok::<(), vocabgen_core::VocabError>(())
//! ```
//!
//! ## Features
//!
//! - **service** (default): File watching (`notify`, `notify-debouncer-full`)
//! - **bin**: The `vocabgen` command-line tool

pub mod artifact;
pub mod config;
pub mod error;
pub mod event;
pub mod graph;
pub mod orchestrator;
pub mod resolver;
pub mod resource;
pub mod staleness;
#[cfg(test)]
mod tests;
pub mod vocab;
#[cfg(feature = "service")]
pub mod watch;

pub use error::*;
