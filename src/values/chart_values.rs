use crate::thunder_config::{AuthKind, DatabaseKind, HashAlgorithm};
use crate::values::ValuesError;
use serde::de::Error as DeError;
use serde::Deserializer;
use serde_derive::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::Display;

// `--set thunderImageTag=2` types the tag as an integer, which the chart accepts
fn string_or_integer<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match <Value as serde::Deserialize>::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected a string or an integer, got `{other}`"))),
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum ServiceType {
    #[default]
    #[serde(rename = "ClusterIP")]
    #[strum(serialize = "ClusterIP")]
    ClusterIp,
    NodePort,
    LoadBalancer,
}

/// Typed view of the chart values, once defaults and overrides are merged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ChartValues {
    pub replica_count: u32,
    pub thunder_image_repository: String,
    #[serde(deserialize_with = "string_or_integer")]
    pub thunder_image_tag: String,
    pub mongo_image: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,

    pub service_type: ServiceType,
    pub service_frontend_port: u16,
    pub service_backend_port: u16,
    pub service_admin_port: u16,

    pub database: DatabaseValues,

    pub email_enabled: bool,
    pub email_endpoint: String,
    pub email_region: String,
    pub email_from_address: String,
    pub message_options_subject: String,
    pub message_options_body_html_file_path: String,
    pub message_options_body_text_file_path: String,
    pub message_options_url_placeholder_string: String,
    pub message_options_success_html_file_path: String,

    pub auth_type: AuthKind,
    pub application_keys: Vec<ApplicationKey>,
    pub oauth_issuer: String,
    pub oauth_audience: String,
    pub oauth_hmac_secret: String,
    pub oauth_rsa_public_key_file_path: String,

    pub password_hash_algorithm: HashAlgorithm,
    pub password_hash_server_side_hash: bool,
    pub password_hash_header_check: bool,
    pub password_hash_allow_common_mistakes: bool,

    pub properties: Vec<PropertyValue>,

    pub open_api_enabled: bool,
    pub open_api_title: String,
    pub open_api_version: String,
    pub open_api_description: String,
    pub open_api_contact: String,
    pub open_api_contact_email: String,
    pub open_api_license: String,
    pub open_api_license_url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct DatabaseValues {
    pub use_local: bool,
    #[serde(rename = "type")]
    pub kind: DatabaseKind,
    pub endpoint: String,
    pub region: String,
    pub table_name: String,
    pub connection_string: String,
    pub database_name: String,
    pub collection_name: String,
    pub max_memory_percentage: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplicationKey {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub secret: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyValue {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl ChartValues {
    /// Types and validates merged values.
    pub fn from_values(values: Map<String, Value>) -> Result<ChartValues, ValuesError> {
        let chart_values: ChartValues = serde_json::from_value(Value::Object(values))
            .map_err(|e| ValuesError::SchemaViolation(e.to_string()))?;
        chart_values.validate()?;

        Ok(chart_values)
    }

    pub fn validate(&self) -> Result<(), ValuesError> {
        let mut violations = vec![];

        if self.replica_count < 1 {
            violations.push("replicaCount must be at least 1".to_string());
        }

        for (key, port) in [
            ("serviceFrontendPort", self.service_frontend_port),
            ("serviceBackendPort", self.service_backend_port),
            ("serviceAdminPort", self.service_admin_port),
        ] {
            if port == 0 {
                violations.push(format!("{key} must be a valid port"));
            }
        }

        if !(1..=100).contains(&self.database.max_memory_percentage) {
            violations.push("database.maxMemoryPercentage must be between 1 and 100".to_string());
        }

        if self.email_enabled
            && (self.email_endpoint.is_empty() || self.email_region.is_empty() || self.email_from_address.is_empty())
        {
            violations.push("when email is enabled, emailEndpoint, emailRegion and emailFromAddress must be set".to_string());
        }

        for (idx, key) in self.application_keys.iter().enumerate() {
            if key.name.is_empty() || key.secret.is_empty() {
                violations.push(format!("applicationKeys[{idx}] must have a name and a secret"));
            }
        }

        if self.auth_type == AuthKind::Oauth {
            if self.oauth_issuer.is_empty() {
                violations.push("oauthIssuer must be set for oauth".to_string());
            }
            if self.oauth_hmac_secret.is_empty() && self.oauth_rsa_public_key_file_path.is_empty() {
                violations.push(
                    "at least one of oauthHmacSecret or oauthRsaPublicKeyFilePath must be set for oauth".to_string(),
                );
            }
        }

        for (idx, property) in self.properties.iter().enumerate() {
            if property.name.is_empty() {
                violations.push(format!("properties[{idx}] must have a name"));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValuesError::SchemaViolation(violations.join("; ")))
        }
    }

    /// Replica count of the deployment, a local database pins it to one.
    pub fn effective_replica_count(&self) -> u32 {
        if self.database.use_local { 1 } else { self.replica_count }
    }

    pub fn has_message_options(&self) -> bool {
        [
            &self.message_options_subject,
            &self.message_options_body_html_file_path,
            &self.message_options_body_text_file_path,
            &self.message_options_url_placeholder_string,
            &self.message_options_success_html_file_path,
        ]
        .iter()
        .any(|option| !option.is_empty())
    }
}
