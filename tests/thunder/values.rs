use crate::helpers::utilities::{assert_schema_violation, init, settings, verifier};
use thunder_chart_verifier::chart::ChartError;
use thunder_chart_verifier::cmd::helm::HelmError;
use thunder_chart_verifier::constants::bundled_chart_path;
use thunder_chart_verifier::render::{NativeRenderer, RenderError, RendererKind};
use thunder_chart_verifier::settings::VerifierSettings;
use thunder_chart_verifier::values::ValuesError;
use thunder_chart_verifier::{RenderVerifier, VerifierError};

fn native_verifier() -> RenderVerifier {
    init();
    RenderVerifier::new(bundled_chart_path()).with_renderer(Box::new(NativeRenderer::new()))
}

#[test]
fn test_invalid_chart_path() {
    init();
    let settings = VerifierSettings {
        chart_path: "/does/not/exist/thunder".into(),
        ..settings()
    };

    let ret = RenderVerifier::from_settings(&settings).render_thunder_config();

    match settings.renderer {
        RendererKind::Native => assert!(matches!(
            ret,
            Err(VerifierError::Chart(ChartError::ChartNotFound(_)))
        )),
        RendererKind::Helm => assert!(matches!(
            ret,
            Err(VerifierError::Render(RenderError::Helm(HelmError::CmdError(..))))
        )),
    }
}

#[test]
fn test_unknown_key_is_rejected() {
    let verifier = verifier(btreemap! { "databse.type" => "mongodb" });

    assert_schema_violation(verifier.renderer_kind(), verifier.render_thunder_config(), "databse.type");
}

#[test]
fn test_schema_violations_fail_rendering() {
    let test_cases = vec![
        btreemap! { "database.type" => "cassandra" },
        btreemap! { "serviceBackendPort" => "http" },
        btreemap! { "passwordHashAlgorithm" => "sha1" },
        btreemap! { "authType" => "oauth" },
        btreemap! { "emailEnabled" => "true" },
        btreemap! { "database.maxMemoryPercentage" => "101", "database.type" => "memory" },
        btreemap! { "database.maxMemoryPercentage" => "0" },
        btreemap! { "openApiVersion" => "3" },
        btreemap! { "openApiTitle" => "true" },
        btreemap! { "applicationKeys[1].name" => "second", "applicationKeys[1].secret" => "s" },
    ];

    for overrides in test_cases {
        let description = format!("{overrides:?}");
        let verifier = verifier(overrides);

        assert_schema_violation(verifier.renderer_kind(), verifier.render_thunder_config(), &description);
    }
}

#[test]
fn test_booleans_are_typed_whatever_their_case() {
    let config = verifier(btreemap! { "openApiEnabled" => "False" })
        .render_thunder_config()
        .unwrap();

    assert!(!config.openapi.enabled);
}

#[test]
fn test_invalid_key_path() {
    let ret = native_verifier()
        .set("applicationKeys[65537].name", "x")
        .render_thunder_config();

    assert!(matches!(
        ret,
        Err(VerifierError::Values(ValuesError::InvalidKey { .. }))
    ));
}

#[test]
fn test_missing_values_file() {
    let ret = native_verifier()
        .values_file("/does/not/exist.yaml")
        .render_service();

    assert!(matches!(
        ret,
        Err(VerifierError::Values(ValuesError::CannotReadValuesFile { .. }))
    ));
}

#[test]
fn test_unknown_template() {
    let ret = verifier(btreemap! {}).render("templates/ingress.yaml");

    assert!(ret.is_err());
}
