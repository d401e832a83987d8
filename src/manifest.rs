//! Parsing of a rendered manifest stream into typed kubernetes resources.

use crate::constants::CONFIG_PAYLOAD_KEY;
use crate::thunder_config::ThunderConfig;
use k8s_openapi::api::core::v1::ConfigMap;
use serde::de::DeserializeOwned;
use thiserror::Error;

const SOURCE_PREFIX: &str = "# Source: ";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    #[error("Invalid YAML document `{source_name}`: {msg}")]
    InvalidDocument { source_name: String, msg: String },

    #[error("No `{0}` resource in rendered manifest")]
    ResourceNotFound(String),

    #[error("Expected a single `{kind}` resource in rendered manifest, found {count}")]
    DuplicateResource { kind: String, count: usize },

    #[error("Cannot parse `{kind}` resource: {msg}")]
    InvalidResource { kind: String, msg: String },

    #[error("ConfigMap `{0}` has no `config.yaml` entry")]
    MissingConfigPayload(String),

    #[error("Invalid application configuration: {0}")]
    InvalidConfigPayload(String),
}

/// One document of the stream, with the template it was rendered from when known.
#[derive(Clone, Debug, PartialEq)]
pub struct ManifestDocument {
    pub source: Option<String>,
    pub content: String,
    pub value: serde_yaml::Value,
}

impl ManifestDocument {
    pub fn kind(&self) -> Option<&str> {
        self.value.get("kind").and_then(|kind| kind.as_str())
    }

    pub fn name(&self) -> Option<&str> {
        self.value
            .get("metadata")
            .and_then(|metadata| metadata.get("name"))
            .and_then(|name| name.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderedManifest {
    pub raw: String,
    pub documents: Vec<ManifestDocument>,
}

impl RenderedManifest {
    /// Splits `raw` on `---` lines. Documents holding nothing but comments are dropped.
    pub fn parse(raw: String) -> Result<RenderedManifest, ManifestError> {
        let mut documents = vec![];

        for (idx, chunk) in split_documents(&raw).into_iter().enumerate() {
            let source = chunk
                .lines()
                .find_map(|line| line.strip_prefix(SOURCE_PREFIX))
                .map(|source| source.trim().to_string());
            let source_name = source.clone().unwrap_or_else(|| format!("document {idx}"));

            let value: serde_yaml::Value =
                serde_yaml::from_str(&chunk).map_err(|e| ManifestError::InvalidDocument {
                    source_name,
                    msg: e.to_string(),
                })?;
            if value.is_null() {
                continue;
            }

            documents.push(ManifestDocument {
                source,
                content: chunk,
                value,
            });
        }

        Ok(RenderedManifest { raw, documents })
    }

    pub fn documents(&self) -> &[ManifestDocument] {
        &self.documents
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.documents.iter().filter_map(|document| document.kind()).collect()
    }

    /// Deserializes the single document of kind `K::KIND`.
    pub fn resource<K>(&self) -> Result<K, ManifestError>
    where
        K: k8s_openapi::Resource + DeserializeOwned,
    {
        let matching: Vec<&ManifestDocument> = self
            .documents
            .iter()
            .filter(|document| document.kind() == Some(K::KIND))
            .collect();

        match matching.as_slice() {
            [] => Err(ManifestError::ResourceNotFound(K::KIND.to_string())),
            [document] => serde_yaml::from_value(document.value.clone()).map_err(|e| ManifestError::InvalidResource {
                kind: K::KIND.to_string(),
                msg: e.to_string(),
            }),
            _ => Err(ManifestError::DuplicateResource {
                kind: K::KIND.to_string(),
                count: matching.len(),
            }),
        }
    }
}

fn split_documents(raw: &str) -> Vec<String> {
    let mut documents = vec![];
    let mut current = String::new();

    for line in raw.lines() {
        if line.trim_end() == "---" {
            documents.push(std::mem::take(&mut current));
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    documents.push(current);

    documents
}

/// Extracts the serialized application configuration of the ConfigMap.
pub fn config_payload(config_map: &ConfigMap) -> Result<&str, ManifestError> {
    config_map
        .data
        .as_ref()
        .and_then(|data| data.get(CONFIG_PAYLOAD_KEY))
        .map(|payload| payload.as_str())
        .ok_or_else(|| {
            ManifestError::MissingConfigPayload(config_map.metadata.name.clone().unwrap_or_default())
        })
}

pub fn parse_thunder_config(payload: &str) -> Result<ThunderConfig, ManifestError> {
    serde_yaml::from_str(payload).map_err(|e| ManifestError::InvalidConfigPayload(e.to_string()))
}
