//! Canonical JSON encoding for object hashing.
//!
//! Canonical form:
//! - reserved `merkle:*` keys removed at every depth
//! - the integrity extension dropped from `stac_extensions`, the rest sorted,
//!   and the key omitted when nothing is left
//! - object keys in code point order, recursively
//! - no whitespace, `,` and `:` separators
//! - non-ASCII characters escaped as `\uXXXX` (UTF-16 surrogate pairs above U+FFFF)
//!
//! String escaping matches Python's `json.dumps(..., sort_keys=True, separators=(",", ":"))`.

use std::cmp::Ordering;
use std::fmt::Write as _;

use serde_json::{Map, Value};

use crate::method::{FieldSelection, HashMethod};
use crate::{EXTENSIONS_KEY, MERKLE_EXTENSION_URL, RESERVED_KEYS};

/// Encode a JSON value canonically.
pub fn canonical_json_bytes(value: &Value) -> Vec<u8> {
    canonical_json_string(value).into_bytes()
}

/// Encode a JSON value canonically as a `String`.
pub fn canonical_json_string(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

/// Return a copy of `value` with reserved keys removed at every depth and every
/// `stac_extensions` array normalized. A `stac_extensions` array left empty by
/// the normalization is dropped, so adding the marker never changes a digest.
pub fn strip_reserved(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                if RESERVED_KEYS.contains(&k.as_str()) {
                    continue;
                }
                let v = if k == EXTENSIONS_KEY {
                    match normalize_extensions(v) {
                        Value::Array(list) if list.is_empty() => continue,
                        normalized => normalized,
                    }
                } else {
                    strip_reserved(v)
                };
                out.insert(k.clone(), v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(strip_reserved).collect()),
        other => other.clone(),
    }
}

fn normalize_extensions(value: &Value) -> Value {
    let Value::Array(items) = value else {
        return strip_reserved(value);
    };

    let mut kept: Vec<Value> = items
        .iter()
        .filter(|v| v.as_str() != Some(MERKLE_EXTENSION_URL))
        .map(strip_reserved)
        .collect();
    kept.sort_by(compare_entries);
    Value::Array(kept)
}

pub(crate) fn compare_entries(a: &Value, b: &Value) -> Ordering {
    match (a.as_str(), b.as_str()) {
        (Some(a), Some(b)) => a.cmp(b),
        _ => canonical_json_string(a).cmp(&canonical_json_string(b)),
    }
}

/// Keep only the selected top-level fields. Absent fields are skipped.
pub fn select_fields(document: &Value, fields: &FieldSelection) -> Value {
    match fields {
        FieldSelection::Wildcard => document.clone(),
        FieldSelection::Named(names) => {
            let mut out = Map::new();
            if let Value::Object(map) = document {
                for name in names {
                    if let Some(v) = map.get(name) {
                        out.insert(name.clone(), v.clone());
                    }
                }
            }
            Value::Object(out)
        }
    }
}

/// Canonical bytes of a document under a hash method.
pub fn canonicalize_document(document: &Value, method: &HashMethod) -> Vec<u8> {
    let selected = select_fields(document, &method.fields);
    canonical_json_bytes(&strip_reserved(&selected))
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(k, out);
                out.push(':');
                write_value(v, out);
            }
            out.push('}');
        }
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 || (c as u32) > 0x7e => {
                let mut buf = [0u16; 2];
                for unit in c.encode_utf16(&mut buf) {
                    let _ = write!(out, "\\u{unit:04x}");
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
