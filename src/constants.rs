pub const HELM_BINARY: &str = "HELM_BINARY";
pub const THUNDER_CHART_PATH: &str = "THUNDER_CHART_PATH";
pub const THUNDER_CHART_RELEASE: &str = "THUNDER_CHART_RELEASE";
pub const THUNDER_CHART_NAMESPACE: &str = "THUNDER_CHART_NAMESPACE";
pub const THUNDER_CHART_RENDERER: &str = "THUNDER_CHART_RENDERER";
pub const THUNDER_CHART_RENDER_TIMEOUT: &str = "THUNDER_CHART_RENDER_TIMEOUT";

pub const DEFAULT_HELM_BINARY: &str = "helm";
pub const DEFAULT_RELEASE_NAME: &str = "thunder";
pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_RENDER_TIMEOUT_IN_SECONDS: u64 = 60;

/// Key of the ConfigMap data entry holding the serialized application configuration.
pub const CONFIG_PAYLOAD_KEY: &str = "config.yaml";

pub const CONFIGMAP_TEMPLATE: &str = "templates/configmap.yaml";
pub const DEPLOYMENT_TEMPLATE: &str = "templates/deployment.yaml";
pub const SERVICE_TEMPLATE: &str = "templates/service.yaml";

pub fn bundled_chart_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/charts/thunder")
}
