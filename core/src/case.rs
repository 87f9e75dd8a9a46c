//! Key-case conversion between the wire format (snake_case) and the call
//! surface (camelCase).
//!
//! # Splitting rule
//! A word boundary goes before an ASCII uppercase letter that follows a
//! lowercase letter or a digit, and before a digit run that follows a
//! lowercase letter. Consecutive capitals are never split from each other,
//! so `ticketID` becomes `ticket_id` (which camelizes back to `ticketId`).
//!
//! The inverse drops every interior underscore and uppercases the character
//! after it. Leading underscores are kept as-is, so `_meta` survives both
//! directions.
//!
//! Value traversal uses an explicit work stack rather than recursion, so a
//! deeply nested payload cannot overflow the call stack.

use serde_json::{Map, Value};

/// The two key styles found on either side of the network boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingConvention {
    /// `object_id`, used on the wire.
    Snake,
    /// `objectId`, used by callers.
    Camel,
}

impl NamingConvention {
    pub fn convert_key(self, key: &str) -> String {
        match self {
            NamingConvention::Snake => to_snake_key(key),
            NamingConvention::Camel => to_camel_key(key),
        }
    }

    /// Rewrite every mapping key inside `value` into this convention.
    pub fn apply(self, value: Value) -> Value {
        match self {
            NamingConvention::Snake => to_snake(value),
            NamingConvention::Camel => to_camel(value),
        }
    }
}

pub fn to_snake_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;
    for ch in key.chars() {
        if let Some(p) = prev {
            let upper_after_word = ch.is_ascii_uppercase() && (p.is_ascii_lowercase() || p.is_ascii_digit());
            let digits_after_lower = ch.is_ascii_digit() && p.is_ascii_lowercase();
            if upper_after_word || digits_after_lower {
                out.push('_');
            }
        }
        out.push(ch.to_ascii_lowercase());
        prev = Some(ch);
    }
    out
}

pub fn to_camel_key(key: &str) -> String {
    let body = key.trim_start_matches('_');
    let mut out = String::with_capacity(key.len());
    out.push_str(&key[..key.len() - body.len()]);

    let mut upper_next = false;
    for ch in body.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// camelCase → snake_case for every key in `value`.
pub fn to_snake(value: Value) -> Value {
    rekey(value, to_snake_key)
}

/// snake_case → camelCase for every key in `value`.
pub fn to_camel(value: Value) -> Value {
    rekey(value, to_camel_key)
}

fn rekey(mut value: Value, convert: fn(&str) -> String) -> Value {
    let mut stack: Vec<&mut Value> = vec![&mut value];
    while let Some(node) = stack.pop() {
        match node {
            Value::Object(map) => {
                let entries = std::mem::take(map);
                *map = entries
                    .into_iter()
                    .map(|(key, child)| (convert(&key), child))
                    .collect::<Map<String, Value>>();
                stack.extend(map.values_mut());
            }
            Value::Array(items) => stack.extend(items.iter_mut()),
            _ => {}
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn snake_key_splits_single_humps() {
        assert_eq!(to_snake_key("snakeCase"), "snake_case");
        assert_eq!(to_snake_key("showCustomerMetadata"), "show_customer_metadata");
        assert_eq!(to_snake_key("address2"), "address_2");
        assert_eq!(to_snake_key("line2Text"), "line_2_text");
    }

    #[test]
    fn snake_key_is_idempotent_on_snake_input() {
        for key in ["limit", "snake_case", "organization_id", "address_2", "_meta"] {
            assert_eq!(to_snake_key(key), key);
        }
    }

    #[test]
    fn consecutive_capitals_stay_one_word() {
        assert_eq!(to_snake_key("ticketID"), "ticket_id");
        assert_eq!(to_snake_key("parseHTTPResponse"), "parse_httpresponse");
        assert_eq!(to_snake_key("URL"), "url");
        assert_eq!(to_camel_key("ticket_id"), "ticketId");
    }

    #[test]
    fn camel_key_drops_interior_underscores() {
        assert_eq!(to_camel_key("snake_case"), "snakeCase");
        assert_eq!(to_camel_key("gw_api_response"), "gwApiResponse");
        assert_eq!(to_camel_key("address_2"), "address2");
        assert_eq!(to_camel_key("objectId"), "objectId");
    }

    #[test]
    fn camel_key_keeps_leading_underscores() {
        assert_eq!(to_camel_key("_meta"), "_meta");
        assert_eq!(to_camel_key("__private_field"), "__privateField");
        assert_eq!(to_snake_key(&to_camel_key("_meta_data")), "_meta_data");
    }

    #[test]
    fn single_hump_keys_round_trip() {
        for key in ["queryString", "dashboardVisible", "sortOrder", "line2Text", "topLeft", "id"] {
            assert_eq!(to_camel_key(&to_snake_key(key)), key);
        }
        for key in ["query_string", "bounding_box", "check_expired", "line_2_text"] {
            assert_eq!(to_snake_key(&to_camel_key(key)), key);
        }
    }

    #[test]
    fn nested_values_are_rekeyed() {
        let params = json!({
            "camelCase": "rules",
            "nested": { "objectId": 2 },
            "list": [{ "filterKey": "status", "filterValue": ["A", "B"] }, 3, "plainString"]
        });
        assert_eq!(
            to_snake(params.clone()),
            json!({
                "camel_case": "rules",
                "nested": { "object_id": 2 },
                "list": [{ "filter_key": "status", "filter_value": ["A", "B"] }, 3, "plainString"]
            })
        );
        assert_eq!(to_camel(to_snake(params.clone())), params);
    }

    #[test]
    fn key_order_is_preserved() {
        let out = to_snake(json!({ "zLast": 1, "aFirst": 2, "mMiddle": 3 }));
        let keys: Vec<&str> = out.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z_last", "a_first", "m_middle"]);
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(to_camel(json!("some_string")), json!("some_string"));
        assert_eq!(to_snake(json!(42)), json!(42));
        assert_eq!(to_snake(Value::Null), Value::Null);
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        let mut value = json!({ "leafKey": true });
        for _ in 0..10_000 {
            let mut map = Map::new();
            map.insert("innerValue".to_string(), value);
            value = Value::Object(map);
        }
        let converted = to_snake(value);
        let mut node = &converted;
        let mut depth = 0;
        while let Some(inner) = node.get("inner_value") {
            node = inner;
            depth += 1;
        }
        assert_eq!(depth, 10_000);
        assert_eq!(node, &json!({ "leaf_key": true }));
        dismantle(converted);
    }

    // serde_json drops recursively; tear the tower down level by level.
    fn dismantle(value: Value) {
        let mut stack = vec![value];
        while let Some(node) = stack.pop() {
            match node {
                Value::Object(map) => stack.extend(map.into_iter().map(|(_, child)| child)),
                Value::Array(items) => stack.extend(items),
                _ => {}
            }
        }
    }

    #[test]
    fn convention_dispatches() {
        assert_eq!(NamingConvention::Snake.convert_key("topLeft"), "top_left");
        assert_eq!(NamingConvention::Camel.convert_key("top_left"), "topLeft");
        assert_eq!(
            NamingConvention::Camel.apply(json!({ "bottom_right": { "lat": 1 } })),
            json!({ "bottomRight": { "lat": 1 } })
        );
    }
}
