//! Chart rendering engines: the `helm` binary, or the in-process native fallback.

pub mod helm;
pub mod native;

use crate::chart::ChartError;
use crate::cmd::helm::HelmError;
use crate::helm::ChartInfo;
use crate::template::TemplateError;
use crate::values::ValuesError;
use strum_macros::{Display, EnumString};
use thiserror::Error;

pub use self::helm::HelmCliRenderer;
pub use self::native::NativeRenderer;

#[derive(Error, Debug, Clone)]
pub enum RenderError {
    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Values(#[from] ValuesError),

    #[error(transparent)]
    Helm(#[from] HelmError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Template `{0}` is not supported by the native renderer")]
    UnsupportedTemplate(String),

    #[error("Template `{template}` of chart `{chart_name}` differs from the one the native renderer is ported from, render it with helm")]
    DivergedTemplate { chart_name: String, template: String },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum RendererKind {
    Native,
    #[default]
    Helm,
}

/// Turns a chart and its overrides into a rendered manifest stream, one
/// `---` separated document per template, each preceded by a `# Source:` comment.
pub trait ChartRenderer: Send + Sync {
    fn kind(&self) -> RendererKind;
    fn render(&self, chart: &ChartInfo) -> Result<String, RenderError>;
}
