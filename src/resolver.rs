//! # Term resolution
//!
//! [`TermResolver`] turns a *full* vocabulary graph and an optional *extension* graph into a
//! [`VocabularyBundle`]: the ordered class, property, literal and constant terms of the
//! vocabulary with their labels, comments and definitions resolved, plus vocabulary-level
//! metadata.
//!
//! ## Classification
//!
//! A subject is a class when typed with one of [`CLASS_TYPES`] or when it has an
//! `rdfs:subClassOf` statement, and a property when typed with one of [`PROPERTY_TYPES`] or
//! when it has an `rdfs:subPropertyOf` statement. Subjects typed `rdfs:Literal` are literals.
//! Subjects in none of those categories may still be constants (`ConstantIri`, then
//! `ConstantString`), whose value is their single `skos:definition`.
//!
//! ## Scope
//!
//! The extension graph selects which terms are emitted: when it describes at least one subject
//! (ignoring `owl:Ontology` headers) only those subjects become terms. An empty extension graph
//! means "everything in the full graph".
//!
//! ## Precedence
//!
//! Values are gathered from a fixed list of (graph, predicate) sources and de-duplicated by
//! language tag, first seen wins:
//!
//! | field       | sources, in order                                                        |
//! |-------------|--------------------------------------------------------------------------|
//! | labels      | ext `schema:alternateName`, ext `rdfs:label`, full `rdfs:label`, full `skosxl:literalForm`, full `schema:alternateName` |
//! | comments    | ext `rdfs:comment`, full `rdfs:comment`                                   |
//! | definitions | ext `skos:definition`, full `skos:definition`                             |
//!
//! So an extension can override the label or comment for a language without touching the
//! vocabulary it extends.
//!
//! ## Metadata
//!
//! Namespace: configured override, then `vann:preferredNamespaceUri` on the ontology subject,
//! then the most common IRI stem of in-scope subjects. Prefix: override, then
//! `vann:preferredNamespacePrefix`, then a table of well-known namespaces, then a label taken
//! from the namespace host.
//!
//! Subjects outside the namespace fail resolution unless `ignore_non_vocab_terms` is set. Terms
//! from the RDF, RDFS, OWL and XSD namespaces are always skipped, since vocabularies routinely
//! describe them.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, HashMap, HashSet},
    result::Result,
};

use crate::{
    error::VocabError,
    graph::{Graph, Term},
    vocab::{
        dcterms, owl, rdf, rdfs, schema, skos, skosxl, vann, CLASS_TYPES, CONSTANT_IRI_TYPES,
        CONSTANT_STRING_TYPES, DESCRIPTION_PREDICATES, LITERAL_TYPES, PROPERTY_TYPES,
        WELL_KNOWN_NAMESPACES,
    },
};

/// Author recorded for vocabularies that name no `dcterms:creator`.
pub const DEFAULT_AUTHOR: &str = "vocabgen-core";

static KNOWN_PREFIXES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("http://xmlns.com/foaf/0.1/", "foaf"),
        (rdf::NS, "rdf"),
        (rdfs::NS, "rdfs"),
        ("http://www.w3.org/2006/vcard/ns#", "vcard"),
        ("http://schema.org/", "schema"),
        ("https://schema.org/", "schema"),
        (owl::NS, "owl"),
    ])
});

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LangValue {
    pub value: String,
    /// Empty when the literal had no language tag.
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTerm {
    pub iri: String,
    pub local_name: String,
    /// `local_name` made safe for use as a programming-language identifier.
    pub identifier: String,
    pub canonical_comment: String,
    pub labels: Vec<LangValue>,
    pub comments: Vec<LangValue>,
    pub definitions: Vec<LangValue>,
    pub see_also: Vec<String>,
    pub is_defined_by: Vec<String>,
    /// The `skos:definition` value of a constant term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyBundle {
    pub namespace: String,
    pub vocabulary_iri: String,
    pub prefix: String,
    pub classes: Vec<ResolvedTerm>,
    pub properties: Vec<ResolvedTerm>,
    pub literals: Vec<ResolvedTerm>,
    pub constant_iris: Vec<ResolvedTerm>,
    pub constant_strings: Vec<ResolvedTerm>,
    pub description: String,
    pub authors: BTreeSet<String>,
}

impl VocabularyBundle {
    pub fn term_count(&self) -> usize {
        self.classes.len()
            + self.properties.len()
            + self.literals.len()
            + self.constant_iris.len()
            + self.constant_strings.len()
    }

    pub fn terms(&self) -> impl Iterator<Item = &ResolvedTerm> {
        self.classes
            .iter()
            .chain(self.properties.iter())
            .chain(self.literals.iter())
            .chain(self.constant_iris.iter())
            .chain(self.constant_strings.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveOptions {
    pub namespace_override: Option<String>,
    pub prefix_override: Option<String>,
    /// Skip subjects outside the namespace instead of failing.
    pub ignore_non_vocab_terms: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TermResolver {
    options: ResolveOptions,
}

impl TermResolver {
    pub fn new(options: ResolveOptions) -> Self {
        TermResolver { options }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    #[tracing::instrument(skip_all, fields(full = full.len(), extension = extension.len()))]
    pub fn resolve(&self, full: &Graph, extension: &Graph) -> Result<VocabularyBundle, VocabError> {
        let ontology_type = Term::iri(owl::ONTOLOGY);
        let ontologies: Vec<&Term> = {
            let mut seen = HashSet::new();
            full.subjects_with(rdf::TYPE, &ontology_type)
                .chain(extension.subjects_with(rdf::TYPE, &ontology_type))
                .filter(|s| seen.insert(*s))
                .collect()
        };
        if ontologies.len() > 1 {
            tracing::warn!(
                "[TermResolver] {} owl:Ontology subjects found, using {}",
                ontologies.len(),
                ontologies[0].value()
            );
        }
        let ontology = ontologies.first().copied();

        let in_scope = |graph: &'_ Graph| -> Vec<Term> {
            graph
                .subjects()
                .into_iter()
                .filter(|s| matches!(s, Term::Iri(_)) && !ontologies.contains(s))
                .cloned()
                .collect()
        };
        let mut subjects = in_scope(extension);
        if subjects.is_empty() {
            subjects = in_scope(full);
        } else {
            tracing::debug!(
                "[TermResolver] extension graph selects {} subjects",
                subjects.len()
            );
        }

        let namespace = self.namespace(full, extension, ontology, &subjects);
        let prefix = self.prefix(full, extension, ontology, &namespace);

        let mut bundle = VocabularyBundle {
            vocabulary_iri: ontology
                .map(|o| o.value().to_string())
                .unwrap_or_else(|| namespace.clone()),
            prefix,
            classes: Vec::new(),
            properties: Vec::new(),
            literals: Vec::new(),
            constant_iris: Vec::new(),
            constant_strings: Vec::new(),
            description: description(full, extension, ontology),
            authors: authors(full, extension, ontology),
            namespace,
        };

        let type_predicate = rdf::TYPE;
        for subject in subjects.iter() {
            let types: HashSet<&str> = full
                .objects(subject, type_predicate)
                .chain(extension.objects(subject, type_predicate))
                .filter_map(Term::as_iri)
                .collect();
            let is_class = CLASS_TYPES.iter().any(|t| types.contains(t))
                || has_statement(full, extension, subject, rdfs::SUB_CLASS_OF);
            let is_property = PROPERTY_TYPES.iter().any(|t| types.contains(t))
                || has_statement(full, extension, subject, rdfs::SUB_PROPERTY_OF);
            let is_literal = LITERAL_TYPES.iter().any(|t| types.contains(t));
            let is_constant_iri = CONSTANT_IRI_TYPES.iter().any(|t| types.contains(t));
            let is_constant_string = CONSTANT_STRING_TYPES.iter().any(|t| types.contains(t));
            if !(is_class || is_property || is_literal || is_constant_iri || is_constant_string) {
                continue;
            }

            let Some(mut term) = self.resolve_term(full, extension, subject, &bundle.namespace)?
            else {
                continue;
            };
            if !(is_class || is_property || is_literal) {
                // Constants only, and an IRI constant wins over a string one.
                let value = constant_value(full, extension, subject, is_constant_iri)?;
                term.value = Some(value);
                if is_constant_iri {
                    bundle.constant_iris.push(term);
                } else {
                    bundle.constant_strings.push(term);
                }
                continue;
            }
            // A subject typed into several categories is emitted once per category.
            if is_class {
                bundle.classes.push(term.clone());
            }
            if is_property {
                bundle.properties.push(term.clone());
            }
            if is_literal {
                bundle.literals.push(term);
            }
        }

        tracing::info!(
            "[TermResolver] resolved {} ({}): {} classes, {} properties, {} literals, {} constants",
            bundle.namespace,
            bundle.prefix,
            bundle.classes.len(),
            bundle.properties.len(),
            bundle.literals.len(),
            bundle.constant_iris.len() + bundle.constant_strings.len()
        );
        Ok(bundle)
    }

    fn resolve_term(
        &self,
        full: &Graph,
        extension: &Graph,
        subject: &Term,
        namespace: &str,
    ) -> Result<Option<ResolvedTerm>, VocabError> {
        let iri = subject.value();
        if iri == namespace {
            return Ok(None);
        }
        let Some(local_name) = iri.strip_prefix(namespace) else {
            if WELL_KNOWN_NAMESPACES.iter().any(|ns| iri.starts_with(ns)) {
                tracing::debug!("[TermResolver] skipping well-known term {iri}");
                return Ok(None);
            }
            if self.options.ignore_non_vocab_terms {
                tracing::debug!("[TermResolver] skipping {iri}, not in namespace {namespace}");
                return Ok(None);
            }
            return Err(VocabError::NamespaceMismatch {
                subject: iri.to_string(),
                namespace: namespace.to_string(),
            });
        };

        let labels = collect_lang_values(
            &[
                (extension, schema::ALTERNATE_NAME),
                (extension, rdfs::LABEL),
                (full, rdfs::LABEL),
                (full, skosxl::LITERAL_FORM),
                (full, schema::ALTERNATE_NAME),
            ],
            subject,
        );
        let comments =
            collect_lang_values(&[(extension, rdfs::COMMENT), (full, rdfs::COMMENT)], subject);
        let definitions = collect_lang_values(
            &[(extension, skos::DEFINITION), (full, skos::DEFINITION)],
            subject,
        );

        Ok(Some(ResolvedTerm {
            iri: iri.to_string(),
            local_name: local_name.to_string(),
            identifier: escape_identifier(local_name),
            canonical_comment: canonical_comment(&comments),
            labels,
            comments,
            definitions,
            see_also: collect_values(&[(extension, rdfs::SEE_ALSO), (full, rdfs::SEE_ALSO)], subject),
            is_defined_by: collect_values(
                &[(extension, rdfs::IS_DEFINED_BY), (full, rdfs::IS_DEFINED_BY)],
                subject,
            ),
            value: None,
        }))
    }

    fn namespace(
        &self,
        full: &Graph,
        extension: &Graph,
        ontology: Option<&Term>,
        subjects: &[Term],
    ) -> String {
        if let Some(ns) = &self.options.namespace_override {
            return ns.clone();
        }
        if let Some(ns) = ontology.and_then(|o| {
            first_value(full, extension, o, vann::PREFERRED_NAMESPACE_URI)
        }) {
            return ns;
        }
        namespace_heuristic(subjects)
    }

    fn prefix(
        &self,
        full: &Graph,
        extension: &Graph,
        ontology: Option<&Term>,
        namespace: &str,
    ) -> String {
        if let Some(prefix) = &self.options.prefix_override {
            return prefix.clone();
        }
        if let Some(prefix) = ontology.and_then(|o| {
            first_value(full, extension, o, vann::PREFERRED_NAMESPACE_PREFIX)
        }) {
            return prefix;
        }
        if let Some(prefix) = KNOWN_PREFIXES.get(namespace) {
            return prefix.to_string();
        }
        host_prefix(namespace)
    }
}

/// Gathers literal values from `sources` in order, keeping the first value per language tag.
pub fn collect_lang_values(sources: &[(&Graph, &str)], subject: &Term) -> Vec<LangValue> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for (graph, predicate) in sources {
        for object in graph.objects(subject, predicate) {
            if let Term::Literal {
                value, language, ..
            } = object
            {
                let language = language.clone().unwrap_or_default();
                if seen.insert(language.clone()) {
                    values.push(LangValue {
                        value: value.clone(),
                        language,
                    });
                }
            }
        }
    }
    values
}

fn collect_values(sources: &[(&Graph, &str)], subject: &Term) -> Vec<String> {
    let mut seen = HashSet::new();
    sources
        .iter()
        .flat_map(|(graph, predicate)| graph.objects(subject, predicate))
        .map(|object| object.value().to_string())
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

fn has_statement(full: &Graph, extension: &Graph, subject: &Term, predicate: &str) -> bool {
    full.objects(subject, predicate)
        .chain(extension.objects(subject, predicate))
        .next()
        .is_some()
}

/// The single `skos:definition` of a constant. IRI constants must hold an absolute IRI.
fn constant_value(
    full: &Graph,
    extension: &Graph,
    subject: &Term,
    is_iri: bool,
) -> Result<String, VocabError> {
    let invalid = |reason: String| VocabError::InvalidConstant {
        subject: subject.value().to_string(),
        reason,
    };
    let mut values = collect_values(
        &[(extension, skos::DEFINITION), (full, skos::DEFINITION)],
        subject,
    );
    if values.len() != 1 {
        return Err(invalid(format!(
            "expected exactly one skos:definition value, found {}",
            values.len()
        )));
    }
    let value = values.remove(0);
    if is_iri {
        url::Url::parse(&value)
            .map_err(|e| invalid(format!("value '{value}' is not a valid IRI: {e}")))?;
    }
    Ok(value)
}

fn first_value(full: &Graph, extension: &Graph, subject: &Term, predicate: &str) -> Option<String> {
    full.objects(subject, predicate)
        .chain(extension.objects(subject, predicate))
        .map(|object| object.value().to_string())
        .next()
}

/// English first, then untagged, then whatever came first.
pub fn canonical_comment(comments: &[LangValue]) -> String {
    comments
        .iter()
        .find(|c| c.language.eq_ignore_ascii_case("en"))
        .or_else(|| comments.iter().find(|c| c.language.is_empty()))
        .or_else(|| comments.first())
        .map(|c| c.value.clone())
        .unwrap_or_default()
}

/// Leading digits get a `_` prefix; `-`, `/` and `.` become `_`.
pub fn escape_identifier(local_name: &str) -> String {
    let mut escaped: String = local_name
        .chars()
        .map(|c| match c {
            '-' | '/' | '.' => '_',
            other => other,
        })
        .collect();
    if escaped.starts_with(|c: char| c.is_ascii_digit()) {
        escaped.insert(0, '_');
    }
    escaped
}

fn iri_stem(iri: &str) -> Option<&str> {
    iri.rfind(['/', '#']).map(|idx| &iri[..=idx])
}

/// Most common stem (up to and including the last `/` or `#`) among `subjects`.
/// Ties go to the stem seen first.
fn namespace_heuristic(subjects: &[Term]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for stem in subjects.iter().filter_map(|s| s.as_iri()).filter_map(iri_stem) {
        match counts.iter_mut().find(|(s, _)| *s == stem) {
            Some((_, count)) => *count += 1,
            None => counts.push((stem, 1)),
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (stem, count) in counts {
        if best.map(|(_, c)| count > c).unwrap_or(true) {
            best = Some((stem, count));
        }
    }
    best.map(|(stem, _)| stem.to_string()).unwrap_or_default()
}

/// The host label just left of the top-level domain, e.g. `w3` for `http://www.w3.org/...`.
fn host_prefix(namespace: &str) -> String {
    let Ok(url) = url::Url::parse(namespace) else {
        return String::new();
    };
    let Some(host) = url.host_str() else {
        return String::new();
    };
    let labels: Vec<&str> = host.split('.').collect();
    match labels.len() {
        0 => String::new(),
        1 => labels[0].to_string(),
        n => labels[n - 2].to_string(),
    }
}

fn description(full: &Graph, extension: &Graph, ontology: Option<&Term>) -> String {
    let Some(ontology) = ontology else {
        return String::new();
    };
    DESCRIPTION_PREDICATES
        .iter()
        .map(|predicate| {
            collect_lang_values(&[(full, *predicate), (extension, *predicate)], ontology)
        })
        .find(|values| !values.is_empty())
        .map(|values| canonical_comment(&values))
        .unwrap_or_default()
}

fn authors(full: &Graph, extension: &Graph, ontology: Option<&Term>) -> BTreeSet<String> {
    let mut authors: BTreeSet<String> = ontology
        .map(|o| {
            full.objects(o, dcterms::CREATOR)
                .chain(extension.objects(o, dcterms::CREATOR))
                .map(|creator| creator.value().to_string())
                .collect()
        })
        .unwrap_or_default();
    if authors.is_empty() {
        authors.insert(DEFAULT_AUTHOR.to_string());
    }
    authors
}
