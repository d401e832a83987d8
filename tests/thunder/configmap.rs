use crate::helpers::utilities::verifier;
use std::io::Write;
use thunder_chart_verifier::thunder_config::{
    AuthKey, AuthKind, ConnectorConfig, DatabaseKind, HashAlgorithm, MessageOptionsConfig, PasswordHashConfig,
    PropertyConfig,
};

#[test]
fn test_configmap_name_and_payload_key() {
    let config_map = verifier(btreemap! {}).release_name("staging").render_config_map().unwrap();

    assert_eq!(config_map.metadata.name.as_deref(), Some("staging-thunder-config"));
    assert!(config_map.data.unwrap().contains_key("config.yaml"));
}

#[test]
fn test_render_is_deterministic() {
    let overrides = btreemap! {
        "database.type" => "mongodb",
        "applicationKeys[0].name" => "myname",
        "applicationKeys[0].secret" => "mysecret",
        "emailEnabled" => "true",
        "emailEndpoint" => "http://localhost:9324",
        "emailRegion" => "us-east-1",
        "emailFromAddress" => "noreply@sanctionco.com",
    };

    let first = verifier(overrides.clone()).render("templates/configmap.yaml").unwrap();
    let second = verifier(overrides).render("templates/configmap.yaml").unwrap();

    assert_eq!(first.raw, second.raw);
    assert_eq!(first, second);
}

#[test]
fn test_server_connectors() {
    let config = verifier(btreemap! {
        "serviceBackendPort" => "9000",
        "serviceAdminPort" => "9001",
    })
    .render_thunder_config()
    .unwrap();

    assert_eq!(
        config.server.application_connectors,
        vec![ConnectorConfig {
            kind: "http".to_string(),
            port: 9000,
        }]
    );
    assert_eq!(
        config.server.admin_connectors,
        vec![ConnectorConfig {
            kind: "http".to_string(),
            port: 9001,
        }]
    );
}

#[test]
fn test_dynamodb_database() {
    let config = verifier(btreemap! {
        "database.type" => "dynamodb",
        "database.endpoint" => "http://dynamo:4567",
        "database.region" => "us-west-2",
        "database.tableName" => "my-table",
    })
    .render_thunder_config()
    .unwrap();

    assert_eq!(config.database.kind, DatabaseKind::Dynamodb);
    assert_eq!(config.database.endpoint.as_deref(), Some("http://dynamo:4567"));
    assert_eq!(config.database.region.as_deref(), Some("us-west-2"));
    assert_eq!(config.database.table_name.as_deref(), Some("my-table"));

    assert_eq!(config.database.connection_string, None);
    assert_eq!(config.database.database_name, None);
    assert_eq!(config.database.collection_name, None);
    assert_eq!(config.database.max_memory_percentage, None);
}

#[test]
fn test_mongodb_database() {
    let config = verifier(btreemap! {
        "database.type" => "mongodb",
        "database.connectionString" => "mongodb://mongo:27017",
        "database.databaseName" => "my-db",
        "database.collectionName" => "my-users",
    })
    .render_thunder_config()
    .unwrap();

    assert_eq!(config.database.kind, DatabaseKind::Mongodb);
    assert_eq!(config.database.connection_string.as_deref(), Some("mongodb://mongo:27017"));
    assert_eq!(config.database.database_name.as_deref(), Some("my-db"));
    assert_eq!(config.database.collection_name.as_deref(), Some("my-users"));

    assert_eq!(config.database.endpoint, None);
    assert_eq!(config.database.region, None);
    assert_eq!(config.database.table_name, None);
}

#[test]
fn test_memory_database() {
    let config = verifier(btreemap! {
        "database.type" => "memory",
        "database.maxMemoryPercentage" => "40",
    })
    .render_thunder_config()
    .unwrap();

    assert_eq!(config.database.kind, DatabaseKind::Memory);
    assert_eq!(config.database.max_memory_percentage, Some(40));
    assert_eq!(config.database.endpoint, None);
    assert_eq!(config.database.connection_string, None);
}

#[test]
fn test_local_database_points_to_local_mongo() {
    let config = verifier(btreemap! {
        "database.useLocal" => "true",
        "database.type" => "dynamodb",
        "database.connectionString" => "mongodb://remote:27017",
    })
    .render_thunder_config()
    .unwrap();

    assert_eq!(config.database.kind, DatabaseKind::Mongodb);
    assert_eq!(
        config.database.connection_string.as_deref(),
        Some("mongodb://localhost:27017")
    );
    assert_eq!(config.database.endpoint, None);
}

#[test]
fn test_email_disabled() {
    let config = verifier(btreemap! {
        "emailEnabled" => "false",
        "emailEndpoint" => "http://localhost:9324",
    })
    .render_thunder_config()
    .unwrap();

    assert_eq!(config.email, None);
}

#[test]
fn test_email_enabled() {
    let config = verifier(btreemap! {
        "emailEnabled" => "true",
        "emailEndpoint" => "http://localhost:9324",
        "emailRegion" => "us-east-1",
        "emailFromAddress" => "noreply@sanctionco.com",
        "messageOptionsSubject" => "Account Verification",
        "messageOptionsBodyHtmlFilePath" => "/home/config/verification.html",
        "messageOptionsBodyTextFilePath" => "/home/config/verification.txt",
        "messageOptionsUrlPlaceholderString" => "CODEGEN-URL",
        "messageOptionsSuccessHtmlFilePath" => "/home/config/success.html",
    })
    .render_thunder_config()
    .unwrap();

    let email = config.email.expect("email should be configured");
    assert_eq!(email.kind, "ses");
    assert_eq!(email.endpoint, "http://localhost:9324");
    assert_eq!(email.region, "us-east-1");
    assert_eq!(email.from_address, "noreply@sanctionco.com");
    assert_eq!(
        email.message_options,
        Some(MessageOptionsConfig {
            subject: Some("Account Verification".to_string()),
            body_html_file_path: Some("/home/config/verification.html".to_string()),
            body_text_file_path: Some("/home/config/verification.txt".to_string()),
            url_placeholder_string: Some("CODEGEN-URL".to_string()),
            success_html_file_path: Some("/home/config/success.html".to_string()),
        })
    );
}

#[test]
fn test_email_message_options_are_only_rendered_when_set() {
    let with_subject = verifier(btreemap! {
        "emailEnabled" => "true",
        "emailEndpoint" => "http://localhost:9324",
        "emailRegion" => "us-east-1",
        "emailFromAddress" => "noreply@sanctionco.com",
        "messageOptionsSubject" => "Welcome",
    })
    .render_thunder_config()
    .unwrap();

    assert_eq!(
        with_subject.email.and_then(|email| email.message_options),
        Some(MessageOptionsConfig {
            subject: Some("Welcome".to_string()),
            ..Default::default()
        })
    );

    let without_options = verifier(btreemap! {
        "emailEnabled" => "true",
        "emailEndpoint" => "http://localhost:9324",
        "emailRegion" => "us-east-1",
        "emailFromAddress" => "noreply@sanctionco.com",
    })
    .render_thunder_config()
    .unwrap();

    assert_eq!(without_options.email.and_then(|email| email.message_options), None);
}

#[test]
fn test_application_keys_keep_order() {
    let config = verifier(btreemap! {
        "applicationKeys[0].name" => "myname",
        "applicationKeys[0].secret" => "mysecret",
        "applicationKeys[1].name" => "mysecondname",
        "applicationKeys[1].secret" => "mysecondsecret",
    })
    .render_thunder_config()
    .unwrap();

    assert_eq!(config.auth.kind, AuthKind::Basic);
    assert_eq!(
        config.auth.keys,
        vec![
            AuthKey {
                application: "myname".to_string(),
                secret: "mysecret".to_string(),
            },
            AuthKey {
                application: "mysecondname".to_string(),
                secret: "mysecondsecret".to_string(),
            },
        ]
    );
}

#[test]
fn test_application_keys_can_be_removed() {
    let config = verifier(btreemap! { "applicationKeys" => "null" })
        .render_thunder_config()
        .unwrap();

    assert_eq!(config.auth.kind, AuthKind::Basic);
    assert!(config.auth.keys.is_empty());
}

#[test]
fn test_oauth() {
    let config = verifier(btreemap! {
        "authType" => "oauth",
        "oauthIssuer" => "thunder-oauth-issuer",
        "oauthHmacSecret" => "qwertyuiopasdfghjklzxcvbnm123456",
    })
    .render_thunder_config()
    .unwrap();

    assert_eq!(config.auth.kind, AuthKind::Oauth);
    assert_eq!(config.auth.issuer.as_deref(), Some("thunder-oauth-issuer"));
    assert_eq!(config.auth.hmac_secret.as_deref(), Some("qwertyuiopasdfghjklzxcvbnm123456"));
    assert_eq!(config.auth.audience, None);
    assert_eq!(config.auth.rsa_public_key_file_path, None);
    assert!(config.auth.keys.is_empty());
}

#[test]
fn test_password_hash() {
    let config = verifier(btreemap! {
        "passwordHashAlgorithm" => "bcrypt",
        "passwordHashServerSideHash" => "true",
        "passwordHashHeaderCheck" => "false",
        "passwordHashAllowCommonMistakes" => "true",
    })
    .render_thunder_config()
    .unwrap();

    assert_eq!(
        config.password_hash,
        PasswordHashConfig {
            algorithm: HashAlgorithm::Bcrypt,
            server_side_hash: true,
            header_check: false,
            allow_common_mistakes: true,
        }
    );
}

#[test]
fn test_properties() {
    let config = verifier(btreemap! {
        "properties[0].name" => "myname",
        "properties[0].type" => "string",
        "properties[1].name" => "mysecondname",
        "properties[1].type" => "integer",
    })
    .render_thunder_config()
    .unwrap();

    assert_eq!(
        config.properties,
        vec![
            PropertyConfig {
                name: "myname".to_string(),
                kind: "string".to_string(),
            },
            PropertyConfig {
                name: "mysecondname".to_string(),
                kind: "integer".to_string(),
            },
        ]
    );
}

#[test]
fn test_no_properties() {
    let config = verifier(btreemap! {}).render_thunder_config().unwrap();

    assert!(config.properties.is_empty());
}

#[test]
fn test_openapi() {
    let config = verifier(btreemap! {
        "openApiEnabled" => "false",
        "openApiTitle" => "My Title",
        "openApiVersion" => "5.0.0",
        "openApiDescription" => "My description, with a comma",
        "openApiContact" => "Rohan",
        "openApiContactEmail" => "rohan@sanctionco.com",
        "openApiLicense" => "Apache",
        "openApiLicenseUrl" => "https://www.apache.org/licenses/LICENSE-2.0",
    })
    .render_thunder_config()
    .unwrap();

    assert!(!config.openapi.enabled);
    assert_eq!(config.openapi.title, "My Title");
    assert_eq!(config.openapi.version, "5.0.0");
    assert_eq!(config.openapi.description, "My description, with a comma");
    assert_eq!(config.openapi.contact, "Rohan");
    assert_eq!(config.openapi.contact_email, "rohan@sanctionco.com");
    assert_eq!(config.openapi.license, "Apache");
    assert_eq!(config.openapi.license_url, "https://www.apache.org/licenses/LICENSE-2.0");
}

#[test]
fn test_values_layering() {
    // setup:
    let mut values_file = tempfile::NamedTempFile::new().unwrap();
    values_file
        .write_all(b"database:\n  type: mongodb\n  databaseName: from-file\n  collectionName: from-file\n")
        .unwrap();

    // execute:
    let config = verifier(btreemap! { "database.collectionName" => "from-set" })
        .values_file(values_file.path())
        .values_yaml("database:\n  databaseName: from-inline\n")
        .render_thunder_config()
        .unwrap();

    // verify:
    assert_eq!(config.database.kind, DatabaseKind::Mongodb);
    assert_eq!(config.database.database_name.as_deref(), Some("from-inline"));
    assert_eq!(config.database.collection_name.as_deref(), Some("from-set"));
    assert_eq!(
        config.database.connection_string.as_deref(),
        Some("mongodb://localhost:27017")
    );
}

#[test]
fn test_set_string_keeps_strings() {
    let config = verifier(btreemap! {})
        .set_string("openApiVersion", "3")
        .set_string("openApiTitle", "true")
        .render_thunder_config()
        .unwrap();

    assert_eq!(config.openapi.version, "3");
    assert_eq!(config.openapi.title, "true");
}
