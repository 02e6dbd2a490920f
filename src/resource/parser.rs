//! Media-type keyed parser registry.
//!
//! Parsing a resource is a pure lookup: the media type (normalized by
//! [`normalize_media_type`](super::normalize_media_type)) selects a [`GraphParser`], which turns
//! bytes into a [`Graph`]. The built-in parsers wrap `oxttl`, `oxrdfxml` and `oxjsonld`;
//! applications that need RDFa register their own through [`ParserRegistry::insert`].

use once_cell::sync::Lazy;
use oxjsonld::JsonLdParser;
use oxrdf::{NamedOrBlankNode, Term as OxTerm, Triple};
use oxrdfxml::RdfXmlParser;
use oxttl::TurtleParser;
use parking_lot::RwLock;
use std::{result::Result, sync::Arc};

use crate::{
    error::VocabError,
    graph::{Graph, Statement, Term},
};

use super::normalize_media_type;

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

/// Global parser registry with the built-in Turtle family and RDF/XML parsers.
pub static PARSERS: Lazy<ParserRegistry> = Lazy::new(ParserRegistry::create);

pub trait GraphParser: Send + Sync {
    fn parse(
        &self,
        // Resource identifier, for error reporting
        resource: &str,
        bytes: &[u8],
        base_iri: Option<&str>,
    ) -> Result<Graph, VocabError>;
}

/// Turtle, N-Triples and the Turtle subset of N3.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurtleGraphParser;

impl GraphParser for TurtleGraphParser {
    fn parse(
        &self,
        resource: &str,
        bytes: &[u8],
        base_iri: Option<&str>,
    ) -> Result<Graph, VocabError> {
        let mut parser = TurtleParser::new();
        if let Some(base) = base_iri {
            parser = parser.with_base_iri(base).map_err(|e| VocabError::Parse {
                resource: resource.to_string(),
                reason: format!("invalid base IRI '{base}': {e}"),
            })?;
        }
        let mut graph = Graph::new();
        for triple in parser.for_reader(bytes) {
            let triple = triple.map_err(|e| VocabError::Parse {
                resource: resource.to_string(),
                reason: e.to_string(),
            })?;
            if let Some(statement) = statement_from_triple(triple) {
                graph.insert(statement);
            }
        }
        Ok(graph)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RdfXmlGraphParser;

impl GraphParser for RdfXmlGraphParser {
    fn parse(
        &self,
        resource: &str,
        bytes: &[u8],
        base_iri: Option<&str>,
    ) -> Result<Graph, VocabError> {
        let mut parser = RdfXmlParser::new();
        if let Some(base) = base_iri {
            parser = parser.with_base_iri(base).map_err(|e| VocabError::Parse {
                resource: resource.to_string(),
                reason: format!("invalid base IRI '{base}': {e}"),
            })?;
        }
        let mut graph = Graph::new();
        for triple in parser.for_reader(bytes) {
            let triple = triple.map_err(|e| VocabError::Parse {
                resource: resource.to_string(),
                reason: e.to_string(),
            })?;
            if let Some(statement) = statement_from_triple(triple) {
                graph.insert(statement);
            }
        }
        Ok(graph)
    }
}

/// JSON-LD documents. Only inline contexts are honoured; remote `@context` URLs are not loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLdGraphParser;

impl GraphParser for JsonLdGraphParser {
    fn parse(
        &self,
        resource: &str,
        bytes: &[u8],
        base_iri: Option<&str>,
    ) -> Result<Graph, VocabError> {
        let mut parser = JsonLdParser::new();
        if let Some(base) = base_iri {
            parser = parser.with_base_iri(base).map_err(|e| VocabError::Parse {
                resource: resource.to_string(),
                reason: format!("invalid base IRI '{base}': {e}"),
            })?;
        }
        let mut graph = Graph::new();
        for quad in parser.for_reader(bytes) {
            let quad = quad.map_err(|e| VocabError::Parse {
                resource: resource.to_string(),
                reason: e.to_string(),
            })?;
            // named graphs are flattened into one vocabulary graph
            if let Some(statement) = statement_from_triple(quad.into()) {
                graph.insert(statement);
            }
        }
        Ok(graph)
    }
}

fn statement_from_triple(triple: Triple) -> Option<Statement> {
    let subject = match triple.subject {
        NamedOrBlankNode::NamedNode(node) => Term::Iri(node.as_str().to_string()),
        NamedOrBlankNode::BlankNode(node) => Term::BlankNode(node.as_str().to_string()),
    };
    #[allow(unreachable_patterns)]
    let object = match triple.object {
        OxTerm::NamedNode(node) => Term::Iri(node.as_str().to_string()),
        OxTerm::BlankNode(node) => Term::BlankNode(node.as_str().to_string()),
        OxTerm::Literal(literal) => {
            let datatype = literal.datatype().as_str();
            Term::Literal {
                value: literal.value().to_string(),
                language: literal.language().map(str::to_string),
                datatype: if datatype == XSD_STRING || datatype == RDF_LANG_STRING {
                    None
                } else {
                    Some(datatype.to_string())
                },
            }
        }
        _ => return None,
    };
    Some(Statement::new(
        subject,
        triple.predicate.as_str().to_string(),
        object,
    ))
}

// It is better to express the complexity of the registry than hide it behind aliases.
#[allow(clippy::type_complexity)]
pub struct ParserRegistry(Arc<RwLock<Vec<(String, Arc<dyn GraphParser>)>>>);

impl Clone for ParserRegistry {
    fn clone(&self) -> Self {
        ParserRegistry(self.0.clone())
    }
}

impl ParserRegistry {
    pub fn create() -> Self {
        let turtle: Arc<dyn GraphParser> = Arc::new(TurtleGraphParser);
        let rdf_xml: Arc<dyn GraphParser> = Arc::new(RdfXmlGraphParser);
        let json_ld: Arc<dyn GraphParser> = Arc::new(JsonLdGraphParser);
        ParserRegistry(Arc::new(RwLock::new(vec![
            ("text/turtle".to_string(), turtle.clone()),
            ("text/n3".to_string(), turtle.clone()),
            ("application/x-turtle".to_string(), turtle.clone()),
            ("text/plain".to_string(), turtle.clone()),
            ("application/n-triples".to_string(), turtle),
            ("application/rdf+xml".to_string(), rdf_xml),
            ("application/ld+json".to_string(), json_ld),
        ])))
    }

    /// Registers (or replaces) the parser for a media type.
    pub fn insert<P: GraphParser + 'static>(&self, media_type: &str, parser: P) {
        let media_type = normalize_media_type(media_type);
        let mut writer = self.0.write();
        let parser: Arc<dyn GraphParser> = Arc::new(parser);
        if let Some(entry) = writer.iter_mut().find(|(mt, _)| mt == &media_type) {
            entry.1 = parser;
        } else {
            writer.push((media_type, parser));
        }
    }

    pub fn get(&self, media_type: &str) -> Option<Arc<dyn GraphParser>> {
        let media_type = normalize_media_type(media_type);
        self.0
            .read()
            .iter()
            .find(|(mt, _)| mt == &media_type)
            .map(|(_, parser)| parser.clone())
    }

    pub fn media_types(&self) -> Vec<String> {
        self.0.read().iter().map(|(mt, _)| mt.clone()).collect()
    }

    /// Selects a parser for `media_type` and parses `bytes` with it.
    pub fn parse(
        &self,
        resource: &str,
        media_type: &str,
        bytes: &[u8],
        base_iri: Option<&str>,
    ) -> Result<Graph, VocabError> {
        let parser = self
            .get(media_type)
            .ok_or_else(|| VocabError::UnsupportedMediaType {
                resource: resource.to_string(),
                media_type: media_type.to_string(),
            })?;
        parser.parse(resource, bytes, base_iri)
    }
}
