use async_trait::async_trait;
use std::{collections::HashMap, result::Result, sync::Arc, time::Duration};

use crate::{error::VocabError, graph::Graph};

use super::{is_online, FetchOptions, ParserRegistry, LOCAL_MEDIA_TYPE, PARSERS, USER_AGENT};

/// The parts of an HTTP response resource handling looks at. Header names are lower-case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Seam between resource handling and the network.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, VocabError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, VocabError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(ReqwestTransport {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, VocabError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Turns resource ids into graphs.
#[derive(Clone)]
pub struct ResourceFetcher {
    transport: Arc<dyn HttpTransport>,
    parsers: ParserRegistry,
}

impl ResourceFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self, VocabError> {
        Ok(Self::with_transport(Arc::new(ReqwestTransport::new(
            timeout,
        )?)))
    }

    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        ResourceFetcher {
            transport,
            parsers: PARSERS.clone(),
        }
    }

    pub fn with_parsers(mut self, parsers: ParserRegistry) -> Self {
        self.parsers = parsers;
        self
    }

    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        self.transport.clone()
    }

    pub fn parsers(&self) -> &ParserRegistry {
        &self.parsers
    }

    #[tracing::instrument(skip(self, options))]
    pub async fn fetch(&self, resource: &str, options: &FetchOptions) -> Result<Graph, VocabError> {
        if is_online(resource) {
            self.fetch_remote(resource, options).await
        } else {
            self.fetch_local(resource).await
        }
    }

    async fn fetch_local(&self, resource: &str) -> Result<Graph, VocabError> {
        tracing::debug!("[ResourceFetcher] reading local resource {resource}");
        let bytes = tokio::fs::read(resource)
            .await
            .map_err(|e| VocabError::Fetch {
                resource: resource.to_string(),
                reason: e.to_string(),
            })?;
        self.parsers
            .parse(resource, LOCAL_MEDIA_TYPE, &bytes, None)
    }

    async fn fetch_remote(
        &self,
        resource: &str,
        options: &FetchOptions,
    ) -> Result<Graph, VocabError> {
        tracing::debug!(
            "[ResourceFetcher] GET {resource} (Accept: {})",
            options.accept_header()
        );
        let response = self
            .transport
            .get(resource, &[("Accept", options.accept_header())])
            .await
            .map_err(|e| match e {
                VocabError::Fetch { reason, .. } => VocabError::Fetch {
                    resource: resource.to_string(),
                    reason,
                },
                other => VocabError::Fetch {
                    resource: resource.to_string(),
                    reason: other.to_string(),
                },
            })?;
        if !response.is_success() {
            return Err(VocabError::Fetch {
                resource: resource.to_string(),
                reason: format!("HTTP status {}", response.status),
            });
        }
        let content_type = options
            .effective_content_type(response.header("content-type"))
            .ok_or_else(|| VocabError::AmbiguousContentType {
                resource: resource.to_string(),
            })?;
        tracing::debug!("[ResourceFetcher] {resource} parsed as {content_type}");
        self.parsers
            .parse(resource, &content_type, &response.body, Some(resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::helpers::{StubResponse, StubTransport, PERSON_TTL};
    use crate::VocabError;
    use test_log::test;

    const URL: &str = "http://ex.org/vocab";

    fn fetcher(stub: &Arc<StubTransport>) -> ResourceFetcher {
        ResourceFetcher::with_transport(stub.clone())
    }

    #[test(tokio::test)]
    async fn remote_fetch_uses_response_content_type() {
        let stub = Arc::new(StubTransport::default());
        stub.respond(URL, StubResponse::ok(PERSON_TTL, Some("text/turtle; charset=utf-8")));
        let graph = fetcher(&stub)
            .fetch(URL, &FetchOptions::default())
            .await
            .expect("turtle response");
        assert!(!graph.is_empty());
        let sent = stub.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.as_deref(), Some(super::super::DEFAULT_ACCEPT));
    }

    #[test(tokio::test)]
    async fn missing_content_type_without_fallback_is_ambiguous() {
        let stub = Arc::new(StubTransport::default());
        stub.respond(URL, StubResponse::ok(PERSON_TTL, None));
        let err = fetcher(&stub)
            .fetch(URL, &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, VocabError::AmbiguousContentType { .. }));

        let options = FetchOptions {
            content_type_fallback: Some("text/turtle".to_string()),
            ..Default::default()
        };
        assert!(fetcher(&stub).fetch(URL, &options).await.is_ok());
    }

    #[test(tokio::test)]
    async fn override_beats_response_header() {
        let stub = Arc::new(StubTransport::default());
        stub.respond(URL, StubResponse::ok(PERSON_TTL, Some("text/html")));
        let err = fetcher(&stub)
            .fetch(URL, &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, VocabError::UnsupportedMediaType { .. }));

        let options = FetchOptions {
            content_type_override: Some("text/turtle".to_string()),
            accept_header_override: Some("text/turtle".to_string()),
            ..Default::default()
        };
        assert!(fetcher(&stub).fetch(URL, &options).await.is_ok());
        assert_eq!(stub.requests()[1].1.as_deref(), Some("text/turtle"));
    }

    #[test(tokio::test)]
    async fn json_ld_response_resolves_ids_against_the_resource() {
        let doc = r##"{
  "@context": {"rdfs": "http://www.w3.org/2000/01/rdf-schema#"},
  "@id": "#Note",
  "@type": "rdfs:Class",
  "rdfs:comment": "A short written work"
}"##;
        let stub = Arc::new(StubTransport::default());
        stub.respond(URL, StubResponse::ok(doc, Some("application/ld+json; charset=utf-8")));
        let graph = fetcher(&stub)
            .fetch(URL, &FetchOptions::default())
            .await
            .expect("json-ld response");
        let note = crate::graph::Term::iri("http://ex.org/vocab#Note");
        assert_eq!(
            graph
                .objects(&note, crate::vocab::rdfs::COMMENT)
                .map(|t| t.value().to_string())
                .collect::<Vec<_>>(),
            vec!["A short written work".to_string()]
        );
    }

    #[test(tokio::test)]
    async fn http_error_status_is_a_fetch_failure() {
        let stub = Arc::new(StubTransport::default());
        stub.respond(URL, StubResponse::status(404));
        let err = fetcher(&stub)
            .fetch(URL, &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, VocabError::Fetch { .. }));
    }

    #[test(tokio::test)]
    async fn local_files_are_read_as_turtle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("person.ttl");
        std::fs::write(&path, PERSON_TTL).unwrap();
        let stub = Arc::new(StubTransport::default());
        let graph = fetcher(&stub)
            .fetch(path.to_str().unwrap(), &FetchOptions::default())
            .await
            .expect("local turtle");
        assert!(!graph.is_empty());
        assert!(stub.requests().is_empty());

        let missing = dir.path().join("missing.ttl");
        let err = fetcher(&stub)
            .fetch(missing.to_str().unwrap(), &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, VocabError::Fetch { .. }));
    }
}
