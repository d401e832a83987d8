use crate::cmd::command::CommandKiller;
use crate::cmd::helm::Helm;
use crate::helm::ChartInfo;
use crate::render::{ChartRenderer, RenderError, RendererKind};
use std::path::Path;

/// Renders through `helm template`, the run being killed once `ChartInfo::timeout` is elapsed.
pub struct HelmCliRenderer {
    helm: Helm,
}

impl HelmCliRenderer {
    pub fn new<P: AsRef<Path>>(binary: P) -> HelmCliRenderer {
        HelmCliRenderer {
            helm: Helm::new(binary),
        }
    }

    pub fn version(&self) -> String {
        self.helm.version()
    }
}

impl ChartRenderer for HelmCliRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Helm
    }

    fn render(&self, chart: &ChartInfo) -> Result<String, RenderError> {
        let cmd_killer = CommandKiller::from_timeout(chart.timeout);
        Ok(self.helm.template(chart, &cmd_killer)?)
    }
}
