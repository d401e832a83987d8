use crate::chart::ChartDirectory;
use crate::helm::ChartInfo;
use crate::render::{ChartRenderer, RenderError, RendererKind};
use crate::template::{TemplateEngine, TemplateError};
use crate::values::{ChartValues, compute_values, validate_against_schema};
use std::fs;
use tera::Context;

const CONFIG_TEMPLATE: &str = "config.j2.yaml";

const EMBEDDED_TEMPLATES: [(&str, &str); 4] = [
    (CONFIG_TEMPLATE, include_str!("templates/config.j2.yaml")),
    (
        "templates/configmap.j2.yaml",
        include_str!("templates/templates/configmap.j2.yaml"),
    ),
    (
        "templates/deployment.j2.yaml",
        include_str!("templates/templates/deployment.j2.yaml"),
    ),
    (
        "templates/service.j2.yaml",
        include_str!("templates/templates/service.j2.yaml"),
    ),
];

// chart sources the tera templates are ported from
const PORTED_CHART_SOURCES: [(&str, &str); 4] = [
    (
        "templates/_helpers.tpl",
        include_str!("../../charts/thunder/templates/_helpers.tpl"),
    ),
    (
        "templates/configmap.yaml",
        include_str!("../../charts/thunder/templates/configmap.yaml"),
    ),
    (
        "templates/deployment.yaml",
        include_str!("../../charts/thunder/templates/deployment.yaml"),
    ),
    (
        "templates/service.yaml",
        include_str!("../../charts/thunder/templates/service.yaml"),
    ),
];

/// In-process fallback renderer: values are merged and validated the way helm does it,
/// then the manifests are produced by tera templates ported from the chart ones.
/// Charts whose templates differ from the ported ones are refused, they need helm.
#[derive(Clone, Debug, Default)]
pub struct NativeRenderer {}

impl NativeRenderer {
    pub fn new() -> NativeRenderer {
        NativeRenderer {}
    }

    // `templates/service.yaml` is embedded as `templates/service.j2.yaml`
    fn j2_path(template: &str) -> Option<&'static str> {
        let (stem, extension) = template.rsplit_once('.')?;
        let j2_path = format!("{stem}.j2.{extension}");
        EMBEDDED_TEMPLATES
            .iter()
            .map(|(name, _)| *name)
            .find(|name| *name != CONFIG_TEMPLATE && *name == j2_path)
    }

    fn check_ported_sources(chart_dir: &ChartDirectory) -> Result<(), RenderError> {
        for (template, ported_source) in PORTED_CHART_SOURCES {
            let source = fs::read_to_string(chart_dir.path.join(template)).unwrap_or_default();
            if source != ported_source {
                return Err(RenderError::DivergedTemplate {
                    chart_name: chart_dir.name().to_string(),
                    template: template.to_string(),
                });
            }
        }

        Ok(())
    }

    fn context(chart: &ChartInfo, chart_name: &str, values: &ChartValues) -> Result<Context, RenderError> {
        let mut context = Context::from_serialize(values).map_err(|e| TemplateError {
            template: chart_name.to_string(),
            msg: format!("cannot build context from values: {e}"),
        })?;
        context.insert("name", chart_name);
        context.insert("fullname", &chart.fullname(chart_name));
        context.insert("release_name", &chart.release_name);
        context.insert("namespace", &chart.namespace);
        context.insert("replicas", &values.effective_replica_count());
        context.insert("has_message_options", &values.has_message_options());

        Ok(context)
    }
}

impl ChartRenderer for NativeRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Native
    }

    fn render(&self, chart: &ChartInfo) -> Result<String, RenderError> {
        let chart_dir = ChartDirectory::load(&chart.path)?;
        Self::check_ported_sources(&chart_dir)?;

        let templates = if chart.show_only.is_empty() {
            chart_dir.manifest_templates()
        } else {
            chart.show_only.clone()
        };

        // resolve every template before rendering anything
        let mut j2_paths = Vec::with_capacity(templates.len());
        for template in &templates {
            chart_dir.template_path(template)?;
            let j2_path = Self::j2_path(template).ok_or_else(|| RenderError::UnsupportedTemplate(template.clone()))?;
            j2_paths.push(j2_path);
        }

        let values = compute_values(&chart_dir.default_values, chart)?;
        if let Some(schema) = &chart_dir.values_schema {
            validate_against_schema(schema, &values)?;
        }
        let values = ChartValues::from_values(values)?;
        let engine = TemplateEngine::new(&EMBEDDED_TEMPLATES)?;
        let mut context = Self::context(chart, chart_dir.name(), &values)?;

        let config_payload = engine.render(CONFIG_TEMPLATE, &context)?;
        context.insert("config_payload", &config_payload.content);

        let mut output = String::new();
        for j2_path in j2_paths {
            let rendered = engine.render(j2_path, &context)?;
            output.push_str("---\n");
            output.push_str(&format!("# Source: {}/{}\n", chart_dir.name(), rendered.path_and_file_name()));
            output.push_str(&rendered.content);
            if !rendered.content.ends_with('\n') {
                output.push('\n');
            }
        }

        Ok(output)
    }
}
