use serde_json::Value;
use std::collections::HashMap;
use tera::{Error, try_get_value};

/// Custom filters for tera, named after their helm template counterparts.
/// documentation => https://keats.github.io/tera/docs/#advanced-usage

pub trait TeraFilter<'a> {
    fn name() -> &'a str;
    fn implementation() -> fn(&Value, &HashMap<String, Value>) -> Result<Value, tera::Error>;
}

fn as_plain_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Wraps a value in double quotes, escaping it so the result is a valid YAML double quoted scalar.
pub struct QuoteFilter {}

impl QuoteFilter {
    fn quote(s: &str) -> String {
        // a JSON string is a valid YAML double quoted scalar
        serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
    }
}

impl<'a> TeraFilter<'a> for QuoteFilter {
    fn name() -> &'a str {
        "quote"
    }

    fn implementation() -> fn(&Value, &HashMap<String, Value>) -> Result<Value, Error> {
        |value: &Value, _: &HashMap<String, Value>| -> Result<Value, tera::Error> {
            Ok(Value::String(QuoteFilter::quote(&as_plain_string(value))))
        }
    }
}

/// Prefixes a block with a new line and indents each of its non empty lines by `spaces`.
pub struct NindentFilter {}

impl NindentFilter {
    fn nindent(s: &str, spaces: usize) -> String {
        let padding = " ".repeat(spaces);
        s.lines().fold(String::new(), |mut acc, line| {
            acc.push('\n');
            if !line.trim().is_empty() {
                acc.push_str(&padding);
                acc.push_str(line);
            }
            acc
        })
    }
}

impl<'a> TeraFilter<'a> for NindentFilter {
    fn name() -> &'a str {
        "nindent"
    }

    fn implementation() -> fn(&Value, &HashMap<String, Value>) -> Result<Value, Error> {
        |value: &Value, args: &HashMap<String, Value>| -> Result<Value, tera::Error> {
            let s = try_get_value!("nindent", "value", String, value);
            let spaces = match args.get("spaces") {
                Some(spaces) => try_get_value!("nindent", "spaces", usize, spaces),
                None => return Err(Error::msg("filter `nindent` expects a `spaces` argument")),
            };
            Ok(Value::String(NindentFilter::nindent(&s, spaces)))
        }
    }
}
