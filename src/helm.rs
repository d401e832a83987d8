use crate::constants::{DEFAULT_NAMESPACE, DEFAULT_RELEASE_NAME, DEFAULT_RENDER_TIMEOUT_IN_SECONDS};
use std::path::PathBuf;
use std::time::Duration;

/// A single `--set` / `--set-string` override, `key` being a dotted / indexed path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartSetValue {
    pub key: String,
    pub value: String,
}

impl ChartSetValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        ChartSetValue {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Inline values document, handed to helm as an extra `-f` file.
#[derive(Clone, Debug)]
pub struct ChartValuesGenerated {
    pub filename: String,
    pub yaml_content: String,
}

impl ChartValuesGenerated {
    pub fn new(name: String, yaml_content: String) -> Self {
        ChartValuesGenerated {
            filename: format!("{name}_override.yaml"),
            yaml_content,
        }
    }
}

/// ChartInfo: everything needed to render a chart once.
#[derive(Clone, Debug)]
pub struct ChartInfo {
    pub release_name: String,
    pub path: PathBuf,
    pub namespace: String,
    /// Templates to render, relative to the chart root (`templates/service.yaml`).
    /// Empty means every template of the chart.
    pub show_only: Vec<String>,
    /// Values used to override values set inside values files.
    pub values: Vec<ChartSetValue>,
    /// Same as `values` but always kept as strings.
    pub values_string: Vec<ChartSetValue>,
    pub values_files: Vec<PathBuf>,
    pub yaml_files_content: Vec<ChartValuesGenerated>,
    pub timeout: Duration,
}

impl ChartInfo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ChartInfo {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_show_only(&self, template: &str) -> ChartInfo {
        ChartInfo {
            show_only: vec![template.to_string()],
            ..self.clone()
        }
    }

    /// Fully qualified app name, following the usual chart convention:
    /// the release name is reused as is when it already contains the chart name.
    pub fn fullname(&self, chart_name: &str) -> String {
        let fullname = if self.release_name.contains(chart_name) {
            self.release_name.clone()
        } else {
            format!("{}-{}", self.release_name, chart_name)
        };

        // DNS-1123 label limit
        let mut fullname: String = fullname.chars().take(63).collect();
        while fullname.ends_with('-') {
            fullname.pop();
        }
        fullname
    }
}

impl Default for ChartInfo {
    fn default() -> ChartInfo {
        ChartInfo {
            release_name: DEFAULT_RELEASE_NAME.to_string(),
            path: PathBuf::new(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            show_only: vec![],
            values: vec![],
            values_string: vec![],
            values_files: vec![],
            yaml_files_content: vec![],
            timeout: Duration::from_secs(DEFAULT_RENDER_TIMEOUT_IN_SECONDS),
        }
    }
}
