//! Artifact kinds and rendering.
//!
//! Each [`ArtifactKind`] variant carries the configuration record for one target language.
//! Everything that differs between targets (template, output location, identifier rules) is
//! dispatched by `match` here; the text itself comes from an [`ArtifactRenderer`].

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, result::Result};

use crate::{
    error::VocabError,
    resolver::{escape_identifier, VocabularyBundle},
};

const JAVA_KEYWORDS: [&str; 15] = [
    "boolean",
    "float",
    "double",
    "byte",
    "int",
    "long",
    "short",
    "class",
    "abstract",
    "for",
    "default",
    "protected",
    "import",
    "implements",
    "extends",
];

// `this` is kept separate: it is reserved in JavaScript too.
const SHARED_KEYWORDS: [&str; 1] = ["this"];

fn default_artifact_version() -> String {
    "0.0.1".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaArtifactConfig {
    #[serde(default = "default_artifact_version")]
    pub artifact_version: String,
    pub java_package_name: String,
    #[serde(default)]
    pub artifact_directory_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaScriptArtifactConfig {
    #[serde(default = "default_artifact_version")]
    pub artifact_version: String,
    #[serde(default)]
    pub npm_module_scope: Option<String>,
    #[serde(default)]
    pub artifact_directory_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonArtifactConfig {
    #[serde(default)]
    pub artifact_directory_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "programmingLanguage")]
pub enum ArtifactKind {
    Java(JavaArtifactConfig),
    #[serde(alias = "Javascript")]
    JavaScript(JavaScriptArtifactConfig),
    #[serde(alias = "JSON")]
    Json(JsonArtifactConfig),
}

impl Default for ArtifactKind {
    fn default() -> Self {
        ArtifactKind::Json(JsonArtifactConfig::default())
    }
}

impl ArtifactKind {
    pub fn template_id(&self) -> &'static str {
        match self {
            ArtifactKind::Java(_) => "java",
            ArtifactKind::JavaScript(_) => "javascript",
            ArtifactKind::Json(_) => "json",
        }
    }

    pub fn source_file_extension(&self) -> &'static str {
        match self {
            ArtifactKind::Java(_) => "java",
            ArtifactKind::JavaScript(_) => "js",
            ArtifactKind::Json(_) => "json",
        }
    }

    pub fn directory_name(&self) -> String {
        let (configured, default) = match self {
            ArtifactKind::Java(c) => (&c.artifact_directory_name, "Java"),
            ArtifactKind::JavaScript(c) => (&c.artifact_directory_name, "JavaScript"),
            ArtifactKind::Json(c) => (&c.artifact_directory_name, "Json"),
        };
        configured.clone().unwrap_or_else(|| default.to_string())
    }

    /// Output path of `bundle`'s artifact, relative to the output directory.
    pub fn relative_path(&self, bundle: &VocabularyBundle) -> PathBuf {
        let stem = match self {
            ArtifactKind::Java(c) => {
                let mut path: PathBuf = c.java_package_name.split('.').collect();
                path.push(bundle.prefix.to_uppercase());
                path
            }
            ArtifactKind::JavaScript(_) | ArtifactKind::Json(_) => PathBuf::from(&bundle.prefix),
        };
        PathBuf::from(self.directory_name()).join(stem.with_extension(self.source_file_extension()))
    }

    /// Makes a term's local name usable as an identifier in the target language.
    pub fn escape_identifier(&self, local_name: &str) -> String {
        match self {
            ArtifactKind::Java(_) => {
                let escaped = escape_identifier(local_name);
                if JAVA_KEYWORDS.contains(&escaped.as_str())
                    || SHARED_KEYWORDS.contains(&escaped.as_str())
                {
                    format!("{escaped}_")
                } else {
                    escaped
                }
            }
            ArtifactKind::JavaScript(_) => {
                let escaped = escape_identifier(local_name);
                if SHARED_KEYWORDS.contains(&escaped.as_str()) {
                    format!("{escaped}_")
                } else {
                    escaped
                }
            }
            ArtifactKind::Json(_) => local_name.to_string(),
        }
    }

    /// A copy of `bundle` with identifiers escaped for this artifact.
    pub fn prepare(&self, bundle: &VocabularyBundle) -> VocabularyBundle {
        let mut prepared = bundle.clone();
        for term in prepared
            .classes
            .iter_mut()
            .chain(prepared.properties.iter_mut())
            .chain(prepared.literals.iter_mut())
            .chain(prepared.constant_iris.iter_mut())
            .chain(prepared.constant_strings.iter_mut())
        {
            term.identifier = self.escape_identifier(&term.local_name);
        }
        prepared
    }
}

pub trait ArtifactRenderer: Send + Sync {
    fn render(&self, template_id: &str, bundle: &VocabularyBundle) -> Result<String, VocabError>;
}

/// Renders the bundle itself as pretty-printed JSON, tagged with the template it stands in for.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ArtifactRenderer for JsonRenderer {
    fn render(&self, template_id: &str, bundle: &VocabularyBundle) -> Result<String, VocabError> {
        let document = serde_json::json!({
            "template": template_id,
            "vocabulary": bundle,
        });
        Ok(serde_json::to_string_pretty(&document)?)
    }
}
