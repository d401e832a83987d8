//! Values layering: chart defaults, values files and `--set` overrides,
//! merged with the precedence helm applies.

pub mod chart_values;
pub mod strvals;

use crate::helm::ChartInfo;
use jsonschema::{Draft, Validator};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub use chart_values::ChartValues;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValuesError {
    #[error("Invalid key `{key}`: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Cannot read values file `{path}`: {msg}")]
    CannotReadValuesFile { path: String, msg: String },

    #[error("Invalid values document `{source_name}`: {msg}")]
    InvalidValuesDocument { source_name: String, msg: String },

    #[error("Values don't match the chart schema: {0}")]
    SchemaViolation(String),

    #[error("Invalid values schema: {0}")]
    InvalidSchema(String),
}

/// Parses a values document. An empty document is an empty map.
pub fn load_values_yaml(source_name: &str, content: &str) -> Result<Map<String, Value>, ValuesError> {
    let value: Value = serde_yaml::from_str(content).map_err(|e| ValuesError::InvalidValuesDocument {
        source_name: source_name.to_string(),
        msg: e.to_string(),
    })?;

    match value {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        _ => Err(ValuesError::InvalidValuesDocument {
            source_name: source_name.to_string(),
            msg: "top level element is not a map".to_string(),
        }),
    }
}

pub fn load_values_file(path: &Path) -> Result<Map<String, Value>, ValuesError> {
    let content = fs::read_to_string(path).map_err(|e| ValuesError::CannotReadValuesFile {
        path: path.display().to_string(),
        msg: e.to_string(),
    })?;

    load_values_yaml(&path.display().to_string(), &content)
}

/// Merges `overlay` into `base`: maps merge recursively, anything else is replaced.
pub fn merge_maps(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(base_child)), Value::Object(overlay_child)) => merge_maps(base_child, overlay_child),
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Fills `user` with `defaults`: missing keys take the default, nested maps coalesce
/// recursively, and a user `null` removes the default key altogether.
pub fn coalesce(user: &mut Map<String, Value>, defaults: &Map<String, Value>) {
    for (key, default_value) in defaults {
        match user.get_mut(key) {
            None => {
                user.insert(key.clone(), default_value.clone());
            }
            Some(Value::Null) => {
                user.remove(key);
            }
            Some(Value::Object(user_child)) => {
                if let Value::Object(default_child) = default_value {
                    coalesce(user_child, default_child);
                } else {
                    warn!("key `{}` is a map in overrides but not in chart defaults, keeping overrides", key);
                }
            }
            Some(_) => {
                if default_value.is_object() {
                    warn!("key `{}` is a map in chart defaults but not in overrides, keeping overrides", key);
                }
            }
        }
    }
}

pub fn compile_values_schema(schema: &Value) -> Result<Validator, ValuesError> {
    // helm validates values.schema.json as draft 7
    jsonschema::options()
        .with_draft(Draft::Draft7)
        .build(schema)
        .map_err(|e| ValuesError::InvalidSchema(e.to_string()))
}

/// Checks computed values against the chart `values.schema.json`, the way helm does before rendering.
pub fn validate_against_schema(schema: &Value, values: &Map<String, Value>) -> Result<(), ValuesError> {
    let validator = compile_values_schema(schema)?;
    let instance = Value::Object(values.clone());
    let violations: Vec<String> = validator.iter_errors(&instance).map(|e| e.to_string()).collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValuesError::SchemaViolation(violations.join("; ")))
    }
}

/// Computes the values a chart is rendered with.
pub fn compute_values(defaults: &Map<String, Value>, chart: &ChartInfo) -> Result<Map<String, Value>, ValuesError> {
    let mut user = Map::new();

    for path in &chart.values_files {
        merge_maps(&mut user, load_values_file(path)?);
    }

    for generated in &chart.yaml_files_content {
        merge_maps(&mut user, load_values_yaml(&generated.filename, &generated.yaml_content)?);
    }

    let mut user = Value::Object(user);
    for set_value in &chart.values {
        strvals::set_value(&mut user, &set_value.key, strvals::typed_value(&set_value.value))?;
    }
    for set_value in &chart.values_string {
        strvals::set_value(&mut user, &set_value.key, Value::String(set_value.value.clone()))?;
    }

    let mut values = match user {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    coalesce(&mut values, defaults);

    Ok(values)
}
