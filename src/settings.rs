use crate::constants::{
    DEFAULT_HELM_BINARY, DEFAULT_NAMESPACE, DEFAULT_RELEASE_NAME, DEFAULT_RENDER_TIMEOUT_IN_SECONDS, HELM_BINARY,
    THUNDER_CHART_NAMESPACE, THUNDER_CHART_PATH, THUNDER_CHART_RELEASE, THUNDER_CHART_RENDER_TIMEOUT,
    THUNDER_CHART_RENDERER, bundled_chart_path,
};
use crate::render::RendererKind;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid value `{value}` for `{var}`: {msg}")]
    InvalidValue { var: String, value: String, msg: String },
}

/// Where and how charts are rendered, read from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifierSettings {
    pub chart_path: PathBuf,
    pub release_name: String,
    pub namespace: String,
    pub renderer: RendererKind,
    pub helm_binary: PathBuf,
    pub render_timeout: Duration,
}

impl Default for VerifierSettings {
    fn default() -> Self {
        VerifierSettings {
            chart_path: PathBuf::from(bundled_chart_path()),
            release_name: DEFAULT_RELEASE_NAME.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            renderer: RendererKind::default(),
            helm_binary: PathBuf::from(DEFAULT_HELM_BINARY),
            render_timeout: Duration::from_secs(DEFAULT_RENDER_TIMEOUT_IN_SECONDS),
        }
    }
}

impl VerifierSettings {
    pub fn from_env() -> Result<VerifierSettings, SettingsError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds settings from any variable source, unset or blank variables keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<VerifierSettings, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let mut settings = VerifierSettings::default();

        if let Some(chart_path) = lookup(THUNDER_CHART_PATH) {
            settings.chart_path = PathBuf::from(chart_path);
        }
        if let Some(release_name) = lookup(THUNDER_CHART_RELEASE) {
            settings.release_name = release_name;
        }
        if let Some(namespace) = lookup(THUNDER_CHART_NAMESPACE) {
            settings.namespace = namespace;
        }
        if let Some(renderer) = lookup(THUNDER_CHART_RENDERER) {
            settings.renderer =
                RendererKind::from_str(renderer.trim()).map_err(|e| SettingsError::InvalidValue {
                    var: THUNDER_CHART_RENDERER.to_string(),
                    value: renderer.clone(),
                    msg: e.to_string(),
                })?;
        }
        if let Some(helm_binary) = lookup(HELM_BINARY) {
            settings.helm_binary = PathBuf::from(helm_binary);
        }
        if let Some(timeout) = lookup(THUNDER_CHART_RENDER_TIMEOUT) {
            settings.render_timeout = duration_str::parse(timeout.trim()).map_err(|e| SettingsError::InvalidValue {
                var: THUNDER_CHART_RENDER_TIMEOUT.to_string(),
                value: timeout.clone(),
                msg: e.to_string(),
            })?;
        }

        Ok(settings)
    }
}
