//! Query-string serialization for endpoint parameters.
//!
//! Keys are snake-cased first. Nested objects use bracket notation
//! (`bounding_box[top_left][lat]=...`) and arrays use indexed brackets
//! (`status[0]=A&status[1]=B`). Null values, empty arrays, and empty objects
//! produce no pairs. Both keys and values are percent-encoded with only the
//! RFC 3986 unreserved characters left bare, so brackets go out as
//! `%5B`/`%5D`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::case::to_snake;
use crate::error::ApiError;

pub(crate) const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Serialize `params` into `?key=value&...`, or `""` when nothing remains.
pub fn stringify_query<T: Serialize + ?Sized>(params: &T) -> Result<String, ApiError> {
    let value = serde_json::to_value(params).map_err(|e| ApiError::Serialization(e.to_string()))?;
    Ok(stringify_value(&value))
}

/// Same as [`stringify_query`] for an already-built JSON value. Anything
/// other than an object serializes to `""`.
pub fn stringify_value(params: &Value) -> String {
    let Value::Object(map) = to_snake(params.clone()) else {
        return String::new();
    };
    let encoded = flatten(&map)
        .into_iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(&key, QUERY_ENCODE_SET),
                utf8_percent_encode(&value, QUERY_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    if encoded.is_empty() {
        encoded
    } else {
        format!("?{encoded}")
    }
}

/// Join a path that may already carry fixed query flags (`?v2=1`) with a
/// serialized query from [`stringify_query`].
pub fn append_query(path: &str, query: &str) -> String {
    let Some(pairs) = query.strip_prefix('?') else {
        return path.to_string();
    };
    if path.contains('?') {
        format!("{path}&{pairs}")
    } else {
        format!("{path}?{pairs}")
    }
}

fn flatten(map: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut stack: Vec<(String, &Value)> = map.iter().rev().map(|(k, v)| (k.clone(), v)).collect();

    while let Some((key, value)) = stack.pop() {
        match value {
            Value::Null => {}
            Value::Bool(b) => pairs.push((key, b.to_string())),
            Value::Number(n) => pairs.push((key, n.to_string())),
            Value::String(s) => pairs.push((key, s.clone())),
            Value::Array(items) => stack.extend(
                items
                    .iter()
                    .enumerate()
                    .rev()
                    .map(|(i, item)| (format!("{key}[{i}]"), item)),
            ),
            Value::Object(fields) => stack.extend(
                fields
                    .iter()
                    .rev()
                    .map(|(field, item)| (format!("{key}[{field}]"), item)),
            ),
        }
    }
    pairs
}
