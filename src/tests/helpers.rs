//! Shared test utilities for resource and resolver testing

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::{
    error::VocabError,
    graph::{Graph, Statement, Term},
    resource::{HttpResponse, HttpTransport},
    vocab::{owl, rdf, rdfs},
};

pub const PERSON_TTL: &str = r#"
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix ex: <http://ex.org/> .

ex:Person a rdfs:Class ;
    rdfs:label "Person"@en ;
    rdfs:comment "A human being"@en .
"#;

/// Initialize logging for tests
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

#[derive(Debug, Clone)]
pub enum StubResponse {
    Reply(HttpResponse),
    Unreachable,
}

impl StubResponse {
    pub fn ok(body: &str, content_type: Option<&str>) -> Self {
        let mut headers = HashMap::new();
        if let Some(ct) = content_type {
            headers.insert("content-type".to_string(), ct.to_string());
        }
        StubResponse::Reply(HttpResponse {
            status: 200,
            headers,
            body: body.as_bytes().to_vec(),
        })
    }

    pub fn status(status: u16) -> Self {
        StubResponse::Reply(HttpResponse {
            status,
            ..Default::default()
        })
    }

    pub fn unreachable() -> Self {
        StubResponse::Unreachable
    }

    pub fn with_header(self, name: &str, value: &str) -> Self {
        match self {
            StubResponse::Reply(mut response) => {
                response
                    .headers
                    .insert(name.to_ascii_lowercase(), value.to_string());
                StubResponse::Reply(response)
            }
            StubResponse::Unreachable => StubResponse::Unreachable,
        }
    }
}

/// In-memory [`HttpTransport`]. Unknown URLs behave as unreachable hosts.
#[derive(Default)]
pub struct StubTransport {
    responses: Mutex<HashMap<String, StubResponse>>,
    requests: Mutex<Vec<(String, Option<String>)>>,
}

impl StubTransport {
    pub fn respond(&self, url: &str, response: StubResponse) {
        self.responses.lock().insert(url.to_string(), response);
    }

    /// (url, Accept header) of every request so far.
    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, VocabError> {
        let accept = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("accept"))
            .map(|(_, value)| value.to_string());
        self.requests.lock().push((url.to_string(), accept));
        match self.responses.lock().get(url).cloned() {
            Some(StubResponse::Reply(response)) => Ok(response),
            Some(StubResponse::Unreachable) | None => Err(VocabError::Fetch {
                resource: url.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

pub fn typed(subject: &str, class: &str) -> Statement {
    Statement::new(Term::iri(subject), rdf::TYPE, Term::iri(class))
}

pub fn labelled(subject: &str, predicate: &str, value: &str, lang: Option<&str>) -> Statement {
    let object = match lang {
        Some(lang) => Term::lang_literal(value, lang),
        None => Term::literal(value),
    };
    Statement::new(Term::iri(subject), predicate, object)
}

/// An ontology header plus `Person`, `name` and a `Text` literal type in `http://ex.org/`.
pub fn person_vocab() -> Graph {
    vec![
        typed("http://ex.org/", owl::ONTOLOGY),
        typed("http://ex.org/Person", rdfs::CLASS),
        labelled("http://ex.org/Person", rdfs::LABEL, "Person", Some("en")),
        labelled("http://ex.org/Person", rdfs::COMMENT, "A human being", Some("en")),
        typed("http://ex.org/name", rdf::PROPERTY),
        labelled("http://ex.org/name", rdfs::LABEL, "name", Some("en")),
        typed("http://ex.org/Text", rdfs::LITERAL),
    ]
    .into_iter()
    .collect()
}
