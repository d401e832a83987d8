use derive_more::Display;
use tracing;

#[derive(Debug, Clone)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum RenderStage {
    #[display("render")]
    Render,
    #[display("parse")]
    Parse,
    #[display("extract_config")]
    ExtractConfig,
}

/// Something that happened while verifying one template of a chart.
#[derive(Clone, Debug)]
pub struct RenderEvent {
    pub chart: String,
    pub release: String,
    pub template: String,
    pub stage: RenderStage,
    pub message: String,
}

impl RenderEvent {
    pub fn new(chart: &str, release: &str, template: &str, stage: RenderStage, message: impl Into<String>) -> Self {
        RenderEvent {
            chart: chart.to_string(),
            release: release.to_string(),
            template: template.to_string(),
            stage,
            message: message.into(),
        }
    }
}

pub trait Logger: Send + Sync {
    fn log(&self, log_level: LogLevel, event: RenderEvent);
    fn clone_dyn(&self) -> Box<dyn Logger>;
}

impl Clone for Box<dyn Logger> {
    fn clone(&self) -> Self {
        self.clone_dyn()
    }
}

#[derive(Clone)]
pub struct StdIoLogger {}

impl StdIoLogger {
    pub fn new() -> StdIoLogger {
        StdIoLogger {}
    }
}

impl Default for StdIoLogger {
    fn default() -> Self {
        StdIoLogger::new()
    }
}

impl Logger for StdIoLogger {
    fn log(&self, log_level: LogLevel, event: RenderEvent) {
        tracing::span!(
            tracing::Level::INFO,
            "std_io_logger",
            chart = event.chart.as_str(),
            release = event.release.as_str(),
            template = event.template.as_str(),
            stage = event.stage.to_string().as_str(),
        )
        .in_scope(|| {
            match log_level {
                LogLevel::Debug => debug!("{}", event.message),
                LogLevel::Info => info!("{}", event.message),
                LogLevel::Warning => warn!("{}", event.message),
                LogLevel::Error => error!("{}", event.message),
            };
        });
    }

    fn clone_dyn(&self) -> Box<dyn Logger> {
        Box::new(self.clone())
    }
}
