//! # Statement graphs
//!
//! [`Graph`] is the in-memory form of a parsed vocabulary resource: an insertion-ordered set of
//! [`Statement`]s with fixed-shape pattern lookup. Nothing in the crate mutates a graph once a
//! [`ResourceCache`](crate::resource::ResourceCache) has handed it out; combining graphs goes
//! through [`Graph::merge`], which builds a new one.

use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    fmt,
};

/// A node or value in a statement.
///
/// Literal language tags are kept as delivered by the parser (lower-cased for Turtle and
/// RDF/XML). `language: None` means "no language" and is distinct from `Some("en")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    Iri(String),
    BlankNode(String),
    Literal {
        value: String,
        language: Option<String>,
        datatype: Option<String>,
    },
}

impl Term {
    pub fn iri<S: Into<String>>(iri: S) -> Term {
        Term::Iri(iri.into())
    }

    pub fn blank<S: Into<String>>(id: S) -> Term {
        Term::BlankNode(id.into())
    }

    pub fn literal<S: Into<String>>(value: S) -> Term {
        Term::Literal {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }

    pub fn lang_literal<S: Into<String>, L: Into<String>>(value: S, language: L) -> Term {
        Term::Literal {
            value: value.into(),
            language: Some(language.into()),
            datatype: None,
        }
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// The lexical value of an IRI, blank node id, or literal.
    pub fn value(&self) -> &str {
        match self {
            Term::Iri(v) | Term::BlankNode(v) => v,
            Term::Literal { value, .. } => value,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }
}

impl fmt::Display for Term {
    /// N-Triples rendering.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::BlankNode(id) => write!(f, "_:{id}"),
            Term::Literal {
                value,
                language,
                datatype,
            } => {
                write!(f, "\"{}\"", escape_literal(value))?;
                if let Some(lang) = language {
                    write!(f, "@{lang}")
                } else if let Some(dt) = datatype {
                    write!(f, "^^<{dt}>")
                } else {
                    Ok(())
                }
            }
        }
    }
}

fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Statement {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
}

impl Statement {
    pub fn new<P: Into<String>>(subject: Term, predicate: P, object: Term) -> Statement {
        Statement {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {} .", self.subject, self.predicate, self.object)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    statements: Vec<Statement>,
    members: HashSet<Statement>,
    by_subject: HashMap<Term, Vec<usize>>,
}

impl PartialEq for Graph {
    /// Set equality; insertion order is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for Graph {}

impl Graph {
    pub fn new() -> Graph {
        Graph::default()
    }

    /// Adds a statement, returning false if it was already present.
    pub fn insert(&mut self, statement: Statement) -> bool {
        if self.members.contains(&statement) {
            return false;
        }
        let idx = self.statements.len();
        self.by_subject
            .entry(statement.subject.clone())
            .or_default()
            .push(idx);
        self.members.insert(statement.clone());
        self.statements.push(statement);
        true
    }

    pub fn contains(&self, statement: &Statement) -> bool {
        self.members.contains(statement)
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Statement> {
        self.statements.iter()
    }

    /// Every statement matching the given pattern. `None` is a wildcard.
    pub fn matches<'a>(
        &'a self,
        subject: Option<&'a Term>,
        predicate: Option<&'a str>,
        object: Option<&'a Term>,
    ) -> Box<dyn Iterator<Item = &'a Statement> + 'a> {
        let filter = move |st: &&'a Statement| {
            predicate.map(|p| st.predicate == p).unwrap_or(true)
                && object.map(|o| &st.object == o).unwrap_or(true)
        };
        match subject {
            Some(s) => Box::new(
                self.by_subject
                    .get(s)
                    .into_iter()
                    .flatten()
                    .map(move |idx| &self.statements[*idx])
                    .filter(filter),
            ),
            None => Box::new(self.statements.iter().filter(filter)),
        }
    }

    /// Objects of `(subject, predicate, ?)`.
    pub fn objects<'a>(
        &'a self,
        subject: &'a Term,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.matches(Some(subject), Some(predicate), None)
            .map(|st| &st.object)
    }

    /// Subjects of `(?, predicate, object)`, in statement order.
    pub fn subjects_with<'a>(
        &'a self,
        predicate: &'a str,
        object: &'a Term,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.matches(None, Some(predicate), Some(object))
            .map(|st| &st.subject)
    }

    /// Distinct subjects in first-seen order.
    pub fn subjects(&self) -> Vec<&Term> {
        let mut seen = HashSet::new();
        self.statements
            .iter()
            .map(|st| &st.subject)
            .filter(|s| seen.insert(*s))
            .collect()
    }

    /// Set union of `self` and `other`. Neither input is modified; statements of `self` keep
    /// their order and come first.
    pub fn merge(&self, other: &Graph) -> Graph {
        let mut merged = self.clone();
        for st in other.iter() {
            merged.insert(st.clone());
        }
        merged
    }
}

impl FromIterator<Statement> for Graph {
    fn from_iter<T: IntoIterator<Item = Statement>>(iter: T) -> Self {
        let mut graph = Graph::new();
        for st in iter {
            graph.insert(st);
        }
        graph
    }
}

impl Extend<Statement> for Graph {
    fn extend<T: IntoIterator<Item = Statement>>(&mut self, iter: T) {
        for st in iter {
            self.insert(st);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn st(s: &str, p: &str, o: Term) -> Statement {
        Statement::new(Term::iri(s), p, o)
    }

    #[test]
    fn merge_is_union_and_leaves_inputs_alone() {
        let a: Graph = vec![
            st("http://ex.org/A", "http://ex.org/p", Term::literal("1")),
            st("http://ex.org/B", "http://ex.org/p", Term::literal("2")),
        ]
        .into_iter()
        .collect();
        let b: Graph = vec![
            st("http://ex.org/B", "http://ex.org/p", Term::literal("2")),
            st("http://ex.org/C", "http://ex.org/p", Term::literal("3")),
        ]
        .into_iter()
        .collect();

        let ab = a.merge(&b);
        let ba = b.merge(&a);
        assert_eq!(ab.len(), 3);
        assert_eq!(ab, ba);
        for s in a.iter().chain(b.iter()) {
            assert!(ab.contains(s));
        }
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn pattern_lookup() {
        let subject = Term::iri("http://ex.org/A");
        let mut g = Graph::new();
        g.insert(st("http://ex.org/A", "http://ex.org/label", Term::lang_literal("a", "en")));
        g.insert(st("http://ex.org/A", "http://ex.org/label", Term::lang_literal("un", "fr")));
        g.insert(st("http://ex.org/B", "http://ex.org/label", Term::literal("b")));
        assert!(!g.insert(st("http://ex.org/B", "http://ex.org/label", Term::literal("b"))));

        assert_eq!(g.matches(Some(&subject), None, None).count(), 2);
        assert_eq!(g.matches(None, Some("http://ex.org/label"), None).count(), 3);
        let fr = Term::lang_literal("un", "fr");
        assert_eq!(g.matches(None, None, Some(&fr)).count(), 1);
        assert_eq!(
            g.subjects(),
            vec![&Term::iri("http://ex.org/A"), &Term::iri("http://ex.org/B")]
        );
    }

    #[test]
    fn ntriples_display_escapes_literals() {
        let s = st(
            "http://ex.org/A",
            "http://ex.org/comment",
            Term::lang_literal("say \"hi\"\n", "en"),
        );
        assert_eq!(
            s.to_string(),
            "<http://ex.org/A> <http://ex.org/comment> \"say \\\"hi\\\"\\n\"@en ."
        );
    }
}
