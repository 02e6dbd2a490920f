//! # Vocabulary resources
//!
//! A *resource* is anything a vocabulary graph is read from: a local file path or an HTTP(S)
//! URL, identified by the exact string it was configured with.
//!
//! - [`ResourceFetcher`]: resource id → [`Graph`](crate::graph::Graph), choosing a parser by
//!   content negotiation
//! - [`ResourceCache`]: memoizes fetches per resource id, falls back to on-disk local copies
//!   when a fetch fails
//! - [`LocalCopyStore`]: the on-disk snapshot directory, keyed by resource id and content digest
//! - [`ParserRegistry`]: media type → [`GraphParser`]

pub mod cache;
pub mod fetcher;
pub mod local_copy;
pub mod parser;

pub use cache::{CacheEntry, GenerationToken, ResourceCache};
pub use fetcher::{HttpResponse, HttpTransport, ReqwestTransport, ResourceFetcher};
pub use local_copy::LocalCopyStore;
pub use parser::{GraphParser, ParserRegistry, PARSERS};

use serde::{Deserialize, Serialize};

/// Accept header sent with every remote fetch unless overridden.
pub const DEFAULT_ACCEPT: &str = "text/turtle, text/n3;q=0.9, application/x-turtle;q=0.9, application/ld+json;q=0.8, text/html;q=0.7, text/plain;q=0.6, application/rdf+xml;q=0.5";

/// Media type assumed for local files.
pub const LOCAL_MEDIA_TYPE: &str = "text/turtle";

pub const USER_AGENT: &str = concat!("vocabgen/", env!("CARGO_PKG_VERSION"));

/// Remote resources are recognised by prefix alone, so `https://` and `http://` both qualify.
pub fn is_online(resource: &str) -> bool {
    resource.starts_with("http")
}

/// Lower-cases a media type and drops any parameters (`; charset=...`).
pub fn normalize_media_type(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Per-resource fetch tuning, taken from a vocabulary's configuration entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOptions {
    pub accept_header_override: Option<String>,
    pub content_type_override: Option<String>,
    pub content_type_fallback: Option<String>,
}

impl FetchOptions {
    pub fn accept_header(&self) -> &str {
        self.accept_header_override
            .as_deref()
            .unwrap_or(DEFAULT_ACCEPT)
    }

    /// Override first, then the server's header, then the configured fallback.
    pub fn effective_content_type(&self, response_header: Option<&str>) -> Option<String> {
        self.content_type_override
            .as_deref()
            .or(response_header.filter(|ct| !ct.trim().is_empty()))
            .or(self.content_type_fallback.as_deref())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_normalization() {
        assert_eq!(normalize_media_type("Text/Turtle; charset=UTF-8"), "text/turtle");
        assert_eq!(normalize_media_type(" application/rdf+xml "), "application/rdf+xml");
    }

    #[test]
    fn content_type_precedence() {
        let mut options = FetchOptions {
            content_type_fallback: Some("text/plain".to_string()),
            ..Default::default()
        };
        assert_eq!(
            options.effective_content_type(Some("text/turtle")).as_deref(),
            Some("text/turtle")
        );
        assert_eq!(options.effective_content_type(None).as_deref(), Some("text/plain"));
        options.content_type_override = Some("application/rdf+xml".to_string());
        assert_eq!(
            options.effective_content_type(Some("text/turtle")).as_deref(),
            Some("application/rdf+xml")
        );
        assert_eq!(FetchOptions::default().effective_content_type(None), None);
    }

    #[test]
    fn online_detection() {
        assert!(is_online("https://schema.org/"));
        assert!(is_online("http://xmlns.com/foaf/0.1/"));
        assert!(!is_online("./vocab/schema.ttl"));
    }
}
