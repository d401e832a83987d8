//! Renders one template of the chart with a set of overrides and hands back
//! the parsed resources, ready to be asserted on.

use crate::constants::{CONFIGMAP_TEMPLATE, DEFAULT_HELM_BINARY, DEPLOYMENT_TEMPLATE, SERVICE_TEMPLATE};
use crate::errors::VerifierError;
use crate::helm::{ChartInfo, ChartSetValue, ChartValuesGenerated};
use crate::logger::{LogLevel, Logger, RenderEvent, RenderStage, StdIoLogger};
use crate::manifest::{RenderedManifest, config_payload, parse_thunder_config};
use crate::render::{ChartRenderer, HelmCliRenderer, NativeRenderer, RendererKind};
use crate::settings::VerifierSettings;
use crate::thunder_config::ThunderConfig;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::time::Duration;

pub struct RenderVerifier {
    chart: ChartInfo,
    renderer: Box<dyn ChartRenderer>,
    logger: Box<dyn Logger>,
}

impl RenderVerifier {
    /// A verifier of the chart at `chart_path`, rendering with the `helm` found in `PATH`.
    pub fn new(chart_path: impl Into<PathBuf>) -> RenderVerifier {
        RenderVerifier {
            chart: ChartInfo::new(chart_path),
            renderer: Box::new(HelmCliRenderer::new(DEFAULT_HELM_BINARY)),
            logger: Box::new(StdIoLogger::new()),
        }
    }

    pub fn from_settings(settings: &VerifierSettings) -> RenderVerifier {
        let renderer: Box<dyn ChartRenderer> = match settings.renderer {
            RendererKind::Native => Box::new(NativeRenderer::new()),
            RendererKind::Helm => Box::new(HelmCliRenderer::new(&settings.helm_binary)),
        };

        RenderVerifier::new(settings.chart_path.clone())
            .with_renderer(renderer)
            .release_name(&settings.release_name)
            .namespace(&settings.namespace)
            .timeout(settings.render_timeout)
    }

    /// A verifier configured from `THUNDER_CHART_*` and `HELM_BINARY` environment variables.
    pub fn from_env() -> Result<RenderVerifier, VerifierError> {
        Ok(RenderVerifier::from_settings(&VerifierSettings::from_env()?))
    }

    pub fn with_renderer(mut self, renderer: Box<dyn ChartRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_logger(mut self, logger: Box<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn release_name(mut self, release_name: &str) -> Self {
        self.chart.release_name = release_name.to_string();
        self
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.chart.namespace = namespace.to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.chart.timeout = timeout;
        self
    }

    /// Override typed like `helm --set`: `true`, `false`, `null` and integers are not strings.
    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.chart.values.push(ChartSetValue::new(key, value));
        self
    }

    /// Override kept as a string, like `helm --set-string`.
    pub fn set_string(mut self, key: &str, value: &str) -> Self {
        self.chart.values_string.push(ChartSetValue::new(key, value));
        self
    }

    pub fn with_values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.chart
            .values
            .extend(values.into_iter().map(|(key, value)| ChartSetValue::new(key, value)));
        self
    }

    /// Values file layered under `--set` overrides, like `helm -f`.
    pub fn values_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.chart.values_files.push(path.into());
        self
    }

    /// Inline values document, layered after values files.
    pub fn values_yaml(mut self, yaml_content: &str) -> Self {
        let name = format!("inline_{}", self.chart.yaml_files_content.len());
        self.chart
            .yaml_files_content
            .push(ChartValuesGenerated::new(name, yaml_content.to_string()));
        self
    }

    pub fn chart(&self) -> &ChartInfo {
        &self.chart
    }

    pub fn renderer_kind(&self) -> RendererKind {
        self.renderer.kind()
    }

    fn chart_name(&self) -> String {
        self.chart
            .path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    fn log(&self, log_level: LogLevel, template: &str, stage: RenderStage, message: impl Into<String>) {
        self.logger.log(
            log_level,
            RenderEvent::new(&self.chart_name(), &self.chart.release_name, template, stage, message),
        );
    }

    /// Renders `template` (relative to the chart root, `templates/service.yaml`) and splits its documents.
    pub fn render(&self, template: &str) -> Result<RenderedManifest, VerifierError> {
        self.log(
            LogLevel::Info,
            template,
            RenderStage::Render,
            format!("rendering with the {} renderer", self.renderer.kind()),
        );
        let raw = self
            .renderer
            .render(&self.chart.with_show_only(template))
            .inspect_err(|e| self.log(LogLevel::Error, template, RenderStage::Render, e.to_string()))?;

        let manifest = RenderedManifest::parse(raw)
            .inspect_err(|e| self.log(LogLevel::Error, template, RenderStage::Parse, e.to_string()))?;
        self.log(
            LogLevel::Debug,
            template,
            RenderStage::Parse,
            format!("{} document(s) parsed", manifest.documents().len()),
        );

        Ok(manifest)
    }

    fn render_resource<K>(&self, template: &str) -> Result<K, VerifierError>
    where
        K: k8s_openapi::Resource + DeserializeOwned,
    {
        let manifest = self.render(template)?;
        let resource = manifest
            .resource::<K>()
            .inspect_err(|e| self.log(LogLevel::Error, template, RenderStage::Parse, e.to_string()))?;

        Ok(resource)
    }

    pub fn render_config_map(&self) -> Result<ConfigMap, VerifierError> {
        self.render_resource(CONFIGMAP_TEMPLATE)
    }

    pub fn render_deployment(&self) -> Result<Deployment, VerifierError> {
        self.render_resource(DEPLOYMENT_TEMPLATE)
    }

    pub fn render_service(&self) -> Result<Service, VerifierError> {
        self.render_resource(SERVICE_TEMPLATE)
    }

    /// Renders the ConfigMap and parses the application configuration it embeds.
    pub fn render_thunder_config(&self) -> Result<ThunderConfig, VerifierError> {
        let config_map = self.render_config_map()?;
        let config = config_payload(&config_map)
            .and_then(parse_thunder_config)
            .inspect_err(|e| self.log(LogLevel::Error, CONFIGMAP_TEMPLATE, RenderStage::ExtractConfig, e.to_string()))?;

        Ok(config)
    }
}
