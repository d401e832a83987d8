use crate::helpers::utilities::{assert_schema_violation, verifier};
use k8s_openapi::api::core::v1::{Container, PodSpec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use thunder_chart_verifier::manifest::ManifestError;

fn pod_spec(deployment: k8s_openapi::api::apps::v1::Deployment) -> PodSpec {
    deployment
        .spec
        .expect("deployment should have a spec")
        .template
        .spec
        .expect("pod template should have a spec")
}

fn env_vars(container: &Container) -> Vec<(String, String)> {
    container
        .env
        .clone()
        .unwrap_or_default()
        .into_iter()
        .map(|env| (env.name, env.value.unwrap_or_default()))
        .collect()
}

#[test]
fn test_local_database_adds_mongo_container() {
    let deployment = verifier(btreemap! {
        "replicaCount" => "3",
        "database.useLocal" => "true",
        "mongoImage" => "mongo:7",
    })
    .render_deployment()
    .unwrap();

    assert_eq!(deployment.spec.as_ref().and_then(|spec| spec.replicas), Some(1));

    let containers = pod_spec(deployment).containers;
    assert_eq!(containers.len(), 2);
    assert_eq!(containers[0].name, "mongo");
    assert_eq!(containers[0].image.as_deref(), Some("mongo:7"));
    assert_eq!(
        containers[0].ports.as_ref().map(|ports| ports[0].container_port),
        Some(27017)
    );
    assert_eq!(containers[1].name, "thunder");
}

#[test]
fn test_without_local_database() {
    let deployment = verifier(btreemap! {
        "replicaCount" => "3",
        "database.useLocal" => "false",
    })
    .render_deployment()
    .unwrap();

    assert_eq!(deployment.spec.as_ref().and_then(|spec| spec.replicas), Some(3));

    let containers = pod_spec(deployment).containers;
    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].name, "thunder");
}

#[test]
fn test_application_container() {
    let deployment = verifier(btreemap! {
        "thunderImageRepository" => "registry.local/thunder",
        "thunderImageTag" => "3",
        "awsAccessKeyId" => "my-access-key",
        "awsSecretAccessKey" => "my-secret-key",
        "serviceBackendPort" => "9000",
        "serviceAdminPort" => "9001",
    })
    .render_deployment()
    .unwrap();

    let containers = pod_spec(deployment).containers;
    let thunder = &containers[0];

    assert_eq!(thunder.image.as_deref(), Some("registry.local/thunder:3"));
    assert_eq!(
        env_vars(thunder),
        vec![
            ("AWS_ACCESS_KEY_ID".to_string(), "my-access-key".to_string()),
            ("AWS_SECRET_ACCESS_KEY".to_string(), "my-secret-key".to_string()),
        ]
    );

    let ports: Vec<(Option<String>, i32)> = thunder
        .ports
        .clone()
        .unwrap_or_default()
        .into_iter()
        .map(|port| (port.name, port.container_port))
        .collect();
    assert_eq!(
        ports,
        vec![(Some("backend".to_string()), 9000), (Some("admin".to_string()), 9001)]
    );

    for probe in [&thunder.liveness_probe, &thunder.readiness_probe] {
        let http_get = probe
            .as_ref()
            .and_then(|probe| probe.http_get.as_ref())
            .expect("probe should be an http get");
        assert_eq!(http_get.path.as_deref(), Some("/healthcheck"));
        assert_eq!(http_get.port, IntOrString::Int(9001));
    }
}

#[test]
fn test_config_volume() {
    let deployment = verifier(btreemap! {}).release_name("staging").render_deployment().unwrap();

    assert_eq!(deployment.metadata.name.as_deref(), Some("staging-thunder"));

    let pod_spec = pod_spec(deployment);
    let mounts = pod_spec.containers[0].volume_mounts.clone().unwrap_or_default();
    assert_eq!(mounts.len(), 1);
    assert_eq!(mounts[0].mount_path, "/home/config");

    let volumes = pod_spec.volumes.unwrap_or_default();
    let volume = volumes
        .iter()
        .find(|volume| volume.name == mounts[0].name)
        .expect("mounted volume should be declared");
    let volume = serde_json::to_value(volume).unwrap();
    assert_eq!(volume["configMap"]["name"], "staging-thunder-config");
}

#[test]
fn test_deployment_is_not_a_config_map() {
    let ret = verifier(btreemap! {})
        .render("templates/deployment.yaml")
        .unwrap()
        .resource::<k8s_openapi::api::core::v1::ConfigMap>();

    assert!(matches!(ret, Err(ManifestError::ResourceNotFound(_))));
}

#[test]
fn test_replica_count_must_be_positive() {
    let verifier = verifier(btreemap! { "replicaCount" => "0" });

    assert_schema_violation(verifier.renderer_kind(), verifier.render_deployment(), "replicaCount=0");
}
