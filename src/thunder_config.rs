//! The application configuration embedded in the rendered ConfigMap.

use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DatabaseKind {
    #[default]
    Dynamodb,
    Mongodb,
    Memory,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuthKind {
    #[default]
    Basic,
    Oauth,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Simple,
    Md5,
    Sha256,
    Bcrypt,
    Argon,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThunderConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub email: Option<EmailConfig>,
    pub auth: AuthConfig,
    #[serde(default)]
    pub password_hash: PasswordHashConfig,
    #[serde(default)]
    pub properties: Vec<PropertyConfig>,
    #[serde(default)]
    pub openapi: OpenApiConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default)]
    pub application_connectors: Vec<ConnectorConfig>,
    #[serde(default)]
    pub admin_connectors: Vec<ConnectorConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub port: u16,
}

/// Database settings. Only the fields of the selected `kind` are expected to be present.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    #[serde(rename = "type")]
    pub kind: DatabaseKind,
    // dynamodb
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub table_name: Option<String>,
    // mongodb
    pub connection_string: Option<String>,
    pub database_name: Option<String>,
    pub collection_name: Option<String>,
    // memory
    pub max_memory_percentage: Option<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub endpoint: String,
    pub region: String,
    pub from_address: String,
    #[serde(default)]
    pub message_options: Option<MessageOptionsConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageOptionsConfig {
    pub subject: Option<String>,
    pub body_html_file_path: Option<String>,
    pub body_text_file_path: Option<String>,
    pub url_placeholder_string: Option<String>,
    pub success_html_file_path: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    #[serde(rename = "type")]
    pub kind: AuthKind,
    #[serde(default)]
    pub keys: Vec<AuthKey>,
    // oauth
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub hmac_secret: Option<String>,
    pub rsa_public_key_file_path: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthKey {
    pub application: String,
    pub secret: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PasswordHashConfig {
    pub algorithm: HashAlgorithm,
    pub server_side_hash: bool,
    pub header_check: bool,
    pub allow_common_mistakes: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenApiConfig {
    pub enabled: bool,
    pub title: String,
    pub version: String,
    pub description: String,
    pub contact: String,
    pub contact_email: String,
    pub license: String,
    pub license_url: String,
}
