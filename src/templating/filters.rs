//! Tera filters for emitting Starlark.
//!
//! - `starlark`: render a string, list or dict as a Starlark literal, one list
//!   element per line once there is more than one, the way buildifier lays
//!   out attribute values
//! - `label`: turn Go package import paths into labels under `//vendor`

use std::collections::HashMap;
use tera::Value;

use crate::constants::VENDOR_DIR;

/// Indentation of an attribute inside a rule call.
const ATTRIBUTE_INDENT: usize = 4;

/// Render a value as a Starlark literal.
///
/// `indent` is the indentation of the line the value starts on; it defaults
/// to that of a rule attribute.
pub fn starlark(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let indent = match args.get("indent") {
        Some(indent) => indent
            .as_u64()
            .and_then(|indent| usize::try_from(indent).ok())
            .ok_or_else(|| tera::Error::msg("starlark filter: indent must be a number"))?,
        None => ATTRIBUTE_INDENT,
    };
    Ok(Value::String(to_starlark(value, indent)?))
}

/// Map package import paths to their `//vendor/<path>` labels.
pub fn label(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let to_label = |value: &Value| -> tera::Result<Value> {
        let name = value.as_str().ok_or_else(|| tera::Error::msg("label filter requires strings"))?;
        Ok(Value::String(format!("//{VENDOR_DIR}/{name}")))
    };

    match value {
        Value::Array(items) => {
            items.iter().map(to_label).collect::<tera::Result<Vec<_>>>().map(Value::Array)
        }
        other => to_label(other),
    }
}

fn to_starlark(value: &Value, indent: usize) -> tera::Result<String> {
    match value {
        Value::String(s) => quote(s),
        Value::Bool(true) => Ok("True".to_string()),
        Value::Bool(false) => Ok("False".to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Array(items) => {
            let items = items
                .iter()
                .map(|item| to_starlark(item, indent + 4))
                .collect::<tera::Result<Vec<_>>>()?;
            Ok(layout('[', ']', &items, indent))
        }
        Value::Object(map) => {
            let entries = map
                .iter()
                .map(|(key, value)| Ok(format!("{}: {}", quote(key)?, to_starlark(value, indent + 4)?)))
                .collect::<tera::Result<Vec<_>>>()?;
            Ok(layout('{', '}', &entries, indent))
        }
        Value::Null => Ok("None".to_string()),
    }
}

fn layout(open: char, close: char, items: &[String], indent: usize) -> String {
    match items {
        [] => format!("{open}{close}"),
        [only] => format!("{open}{only}{close}"),
        _ => {
            let mut out = String::new();
            out.push(open);
            out.push('\n');
            for item in items {
                out.push_str(&" ".repeat(indent + 4));
                out.push_str(item);
                out.push_str(",\n");
            }
            out.push_str(&" ".repeat(indent));
            out.push(close);
            out
        }
    }
}

/// JSON string escaping is a subset of what Starlark accepts.
fn quote(s: &str) -> tera::Result<String> {
    serde_json::to_string(s).map_err(|e| tera::Error::msg(format!("cannot quote {s:?}: {e}")))
}
