//! Parsing of `--set` style override keys (`database.type`, `applicationKeys[0].name`)
//! and their application onto a values tree.

use crate::values::ValuesError;
use serde_json::{Map, Number, Value};

/// Highest list index accepted in a key, same bound as helm.
pub const MAX_INDEX: usize = 65536;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

#[derive(PartialEq)]
enum Last {
    Start,
    Name,
    Dot,
    Index,
}

fn invalid_key(key: &str, reason: impl Into<String>) -> ValuesError {
    ValuesError::InvalidKey {
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Splits a key into its segments. `\` escapes the next character, so `a\.b` is a single key.
pub fn parse_key_path(key: &str) -> Result<Vec<PathSegment>, ValuesError> {
    if key.trim().is_empty() {
        return Err(invalid_key(key, "key is empty"));
    }

    let mut segments = vec![];
    let mut name = String::new();
    let mut last = Last::Start;
    let mut chars = key.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if last == Last::Index {
                    return Err(invalid_key(key, "unexpected character after index"));
                }
                let escaped = chars
                    .next()
                    .ok_or_else(|| invalid_key(key, "dangling escape character"))?;
                name.push(escaped);
                last = Last::Name;
            }
            '.' => {
                match last {
                    Last::Name => segments.push(PathSegment::Key(std::mem::take(&mut name))),
                    Last::Index => {}
                    Last::Start | Last::Dot => return Err(invalid_key(key, "empty key segment")),
                }
                last = Last::Dot;
            }
            '[' => {
                match last {
                    Last::Name => segments.push(PathSegment::Key(std::mem::take(&mut name))),
                    Last::Index => {}
                    Last::Start | Last::Dot => return Err(invalid_key(key, "index without a key")),
                }

                let mut raw_index = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    raw_index.push(c);
                }
                if !closed {
                    return Err(invalid_key(key, "unterminated index"));
                }

                segments.push(PathSegment::Index(parse_index(key, raw_index.trim())?));
                last = Last::Index;
            }
            c => {
                if last == Last::Index {
                    return Err(invalid_key(key, "unexpected character after index"));
                }
                name.push(c);
                last = Last::Name;
            }
        }
    }

    match last {
        Last::Name => segments.push(PathSegment::Key(name)),
        Last::Index => {}
        Last::Start | Last::Dot => return Err(invalid_key(key, "empty key segment")),
    }

    Ok(segments)
}

fn parse_index(key: &str, raw_index: &str) -> Result<usize, ValuesError> {
    if raw_index.starts_with('-') {
        return Err(invalid_key(key, format!("negative index {raw_index}")));
    }

    let index = raw_index
        .parse::<usize>()
        .map_err(|_| invalid_key(key, format!("invalid index `{raw_index}`")))?;
    if index > MAX_INDEX {
        return Err(invalid_key(key, format!("index {index} is greater than {MAX_INDEX}")));
    }

    Ok(index)
}

/// Types a raw `--set` value the way helm does: booleans and null (any case) and base 10
/// integers are recognised, anything else stays a string. Integers with a leading zero stay strings.
pub fn typed_value(raw: &str) -> Value {
    match raw {
        _ if raw.eq_ignore_ascii_case("true") => Value::Bool(true),
        _ if raw.eq_ignore_ascii_case("false") => Value::Bool(false),
        _ if raw.eq_ignore_ascii_case("null") => Value::Null,
        _ => {
            if raw.len() > 1 && raw.starts_with('0') {
                return Value::String(raw.to_string());
            }
            match raw.parse::<i64>() {
                Ok(i) => Value::Number(Number::from(i)),
                Err(_) => Value::String(raw.to_string()),
            }
        }
    }
}

fn as_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced by an object"),
    }
}

fn as_array(node: &mut Value) -> &mut Vec<Value> {
    if !node.is_array() {
        *node = Value::Array(vec![]);
    }
    match node {
        Value::Array(list) => list,
        _ => unreachable!("node was just replaced by an array"),
    }
}

/// Writes `value` at `path`, creating intermediate maps / lists. Lists are padded with nulls.
pub fn apply_set_value(node: &mut Value, path: &[PathSegment], value: Value) {
    match path.split_first() {
        None => *node = value,
        Some((PathSegment::Key(key), rest)) => {
            let child = as_object(node).entry(key.clone()).or_insert(Value::Null);
            apply_set_value(child, rest, value)
        }
        Some((PathSegment::Index(index), rest)) => {
            let list = as_array(node);
            if list.len() <= *index {
                list.resize(index + 1, Value::Null);
            }
            apply_set_value(&mut list[*index], rest, value)
        }
    }
}

/// Parses `key` and writes `value` into `root`.
pub fn set_value(root: &mut Value, key: &str, value: Value) -> Result<(), ValuesError> {
    let path = parse_key_path(key)?;
    apply_set_value(root, &path, value);
    Ok(())
}
