use crate::values::{ValuesError, compile_values_schema, load_values_file};
use serde_derive::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    #[error("Chart directory `{0}` cannot be found")]
    ChartNotFound(String),

    #[error("Invalid Chart.yaml in `{chart_path}`: {msg}")]
    InvalidChartYaml { chart_path: String, msg: String },

    #[error("Template `{template}` cannot be found in chart `{chart_name}`")]
    TemplateNotFound { chart_name: String, template: String },

    #[error("Invalid values.schema.json in `{chart_path}`: {msg}")]
    InvalidValuesSchema { chart_path: String, msg: String },

    #[error("Invalid chart default values: {0}")]
    InvalidDefaultValues(#[from] ValuesError),
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChartYAML {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub app_version: String,
    #[serde(default)]
    pub description: String,
}

/// A chart laid out on disk: `Chart.yaml`, `values.yaml`, `values.schema.json` and `templates/`.
#[derive(Debug, Clone)]
pub struct ChartDirectory {
    pub path: PathBuf,
    pub metadata: ChartYAML,
    pub default_values: Map<String, Value>,
    pub values_schema: Option<Value>,
}

impl ChartDirectory {
    pub fn load(path: &Path) -> Result<ChartDirectory, ChartError> {
        if !path.is_dir() {
            return Err(ChartError::ChartNotFound(path.display().to_string()));
        }

        let chart_yaml_path = path.join("Chart.yaml");
        let chart_yaml = fs::read_to_string(&chart_yaml_path).map_err(|e| ChartError::InvalidChartYaml {
            chart_path: path.display().to_string(),
            msg: e.to_string(),
        })?;
        let metadata: ChartYAML = serde_yaml::from_str(&chart_yaml).map_err(|e| ChartError::InvalidChartYaml {
            chart_path: path.display().to_string(),
            msg: e.to_string(),
        })?;
        if metadata.name.trim().is_empty() {
            return Err(ChartError::InvalidChartYaml {
                chart_path: path.display().to_string(),
                msg: "chart name is empty".to_string(),
            });
        }

        // values.yaml is optional
        let values_path = path.join("values.yaml");
        let default_values = if values_path.is_file() {
            load_values_file(&values_path)?
        } else {
            Map::new()
        };

        // so is values.schema.json, helm skips validation without it
        let schema_path = path.join("values.schema.json");
        let values_schema = if schema_path.is_file() {
            let invalid_schema = |msg: String| ChartError::InvalidValuesSchema {
                chart_path: path.display().to_string(),
                msg,
            };
            let content = fs::read_to_string(&schema_path).map_err(|e| invalid_schema(e.to_string()))?;
            let schema: Value = serde_json::from_str(&content).map_err(|e| invalid_schema(e.to_string()))?;
            compile_values_schema(&schema).map_err(|e| invalid_schema(e.to_string()))?;
            Some(schema)
        } else {
            None
        };

        Ok(ChartDirectory {
            path: path.to_path_buf(),
            metadata,
            default_values,
            values_schema,
        })
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Checks `template` (relative to the chart root) exists and returns its full path.
    pub fn template_path(&self, template: &str) -> Result<PathBuf, ChartError> {
        let template_path = self.path.join(template);
        if template.starts_with("templates/") && template_path.is_file() {
            Ok(template_path)
        } else {
            Err(ChartError::TemplateNotFound {
                chart_name: self.metadata.name.clone(),
                template: template.to_string(),
            })
        }
    }

    /// Templates producing manifests, partials (`_helpers.tpl`) excluded.
    pub fn manifest_templates(&self) -> Vec<String> {
        let mut templates: Vec<String> = fs::read_dir(self.path.join("templates"))
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .filter_map(|entry| entry.file_name().to_str().map(|s| s.to_string()))
                    .filter(|name| !name.starts_with('_') && (name.ends_with(".yaml") || name.ends_with(".yml")))
                    .map(|name| format!("templates/{name}"))
                    .collect()
            })
            .unwrap_or_default();
        templates.sort();
        templates
    }
}
