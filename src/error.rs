use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use serde_yaml::Error as YamlError;
use thiserror::Error;
use url::ParseError as UrlParseError;

#[cfg(feature = "service")]
use notify::{Error as NotifyError, ErrorKind as NotifyErrorKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum VocabError {
    #[error("Failed to fetch resource '{resource}': {reason}")]
    Fetch { resource: String, reason: String },
    #[error("No content type available for resource '{resource}' (no override, header, or fallback)")]
    AmbiguousContentType { resource: String },
    #[error("Unsupported media type '{media_type}' for resource '{resource}'")]
    UnsupportedMediaType {
        resource: String,
        media_type: String,
    },
    #[error("Term '{subject}' is not in vocabulary namespace '{namespace}'")]
    NamespaceMismatch { subject: String, namespace: String },
    #[error("Constant '{subject}' is invalid: {reason}")]
    InvalidConstant { subject: String, reason: String },
    #[error("Failed to parse resource '{resource}': {reason}")]
    Parse { resource: String, reason: String },
    #[error("No local copy of namespace '{namespace}' in '{directory}' after fetch failure")]
    CacheLookup {
        namespace: String,
        directory: String,
        #[source]
        source: Box<VocabError>,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Custom error: {0}")]
    Custom(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("Artifact render error: {0}")]
    Render(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("Watch error: {0}")]
    Watch(String),
}

impl From<YamlError> for VocabError {
    fn from(src: YamlError) -> VocabError {
        VocabError::Config(format!("YAML deserialization error: {src}"))
    }
}

impl From<JsonError> for VocabError {
    fn from(src: JsonError) -> VocabError {
        VocabError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<UrlParseError> for VocabError {
    fn from(src: UrlParseError) -> VocabError {
        VocabError::Serialization(format!("Invalid URL: {src}"))
    }
}

impl From<io::Error> for VocabError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => VocabError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => VocabError::PermissionDenied,
            _ => VocabError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<reqwest::Error> for VocabError {
    fn from(x: reqwest::Error) -> Self {
        let resource = x
            .url()
            .map(|url| url.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        VocabError::Fetch {
            resource,
            reason: format!("{x}"),
        }
    }
}

#[cfg(feature = "service")]
impl From<NotifyError> for VocabError {
    fn from(notify_error: NotifyError) -> Self {
        match notify_error.kind {
            NotifyErrorKind::Generic(msg) => VocabError::Watch(format!(
                "notify-debouncer: {}, paths: {:?}",
                msg, notify_error.paths
            )),
            NotifyErrorKind::Io(io_error) => VocabError::Watch(format!(
                "notify-debouncer: io error {}, paths: {:?}",
                io_error.kind(),
                notify_error.paths
            )),
            NotifyErrorKind::PathNotFound => VocabError::NotFound(format!(
                "notify-debouncer: path(s) not found: {:?}",
                notify_error.paths
            )),
            NotifyErrorKind::WatchNotFound => VocabError::NotFound(format!(
                "notify-debouncer: watch not found, paths: {:?}",
                notify_error.paths
            )),
            NotifyErrorKind::InvalidConfig(_) => {
                VocabError::Watch("notify-debouncer invalid config".to_string())
            }
            NotifyErrorKind::MaxFilesWatch => {
                VocabError::Watch("notify-debouncer max file watch limit reached".to_string())
            }
        }
    }
}
