//! JSON-Schema validation that sanitizes as it checks.
//!
//! # Design
//! A [`Schema`] is compiled once: the document's shape is checked up front
//! (known `type` names, well-formed keywords, regex `pattern`s, resolvable
//! local `$ref`s) so that a malformed schema fails fast as a [`SchemaError`]
//! instead of showing up as a validation result.
//!
//! [`Schema::validate`] never fails. It collects every constraint violation
//! (not just the first), and wherever an object schema says
//! `additionalProperties: false` it deletes undeclared keys from the data in
//! place. Each deletion is reported as a warning, one
//! `Unknown property: data.<dotted.path>` message per removed key, in the
//! order the keys appeared in the data.
//!
//! Validation walks the data with an explicit work stack rather than
//! recursion, so a self-referencing schema can check arbitrarily deep data.
//!
//! Supported keywords: `type`, `enum`, `const`, `properties`, `required`,
//! `additionalProperties`, `items`, `minItems`, `maxItems`, `minLength`,
//! `maxLength`, `pattern`, `format`, `minimum`, `maximum`, `definitions`,
//! `$defs`, and local `$ref`. Other keywords are ignored.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::SchemaError;

const KNOWN_TYPES: [&str; 7] = ["object", "array", "string", "number", "integer", "boolean", "null"];
const KNOWN_FORMATS: [&str; 4] = ["email", "date-time", "date", "uri"];

static DATE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[Tt ]\d{2}:\d{2}:\d{2}(\.\d+)?([Zz]|[+-]\d{2}:\d{2})$")
        .expect("date-time pattern compiles")
});
static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern compiles"));
static URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:\S+$").expect("uri pattern compiles")
});

/// Outcome of one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Constraint violations. Non-empty means the data must not be sent.
    pub errors: Vec<String>,
    /// Unknown properties that were stripped from the data.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// All errors joined by newlines, or `None` when there are none.
    pub fn error_message(&self) -> Option<String> {
        (!self.errors.is_empty()).then(|| self.errors.join("\n"))
    }
}

/// Compile `schema` and validate `data` against it in one go.
pub fn validate(data: &mut Value, schema: &Value) -> Result<ValidationResult, SchemaError> {
    Ok(Schema::compile(schema.clone())?.validate(data))
}

/// A checked schema document, ready to validate any number of values.
#[derive(Debug, Clone)]
pub struct Schema {
    root: Value,
    patterns: HashMap<String, Regex>,
}

impl Schema {
    pub fn compile(root: Value) -> Result<Self, SchemaError> {
        let mut compiler = Compiler {
            root: &root,
            patterns: HashMap::new(),
            followed: HashSet::new(),
        };
        compiler.walk(&root, "#".to_string())?;
        let patterns = compiler.patterns;
        Ok(Self { root, patterns })
    }

    pub fn document(&self) -> &Value {
        &self.root
    }

    /// Validate `data`, stripping undeclared properties where the schema
    /// forbids them. The schema itself is never modified.
    ///
    /// Runs on an explicit work stack, so deeply nested data cannot exhaust
    /// the call stack.
    pub fn validate(&self, data: &mut Value) -> ValidationResult {
        let mut walk = Walk::default();
        let mut stack = vec![Task::Check {
            schema: &self.root,
            data,
            at: None,
        }];
        while let Some(task) = stack.pop() {
            match task {
                Task::Report(errors) => walk.errors.extend(errors),
                Task::Check { schema, data, at } => self.check(schema, data, at, &mut walk, &mut stack),
            }
        }
        walk.finish()
    }

    fn resolve<'a>(&'a self, mut schema: &'a Value) -> &'a Value {
        while let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            match lookup(&self.root, reference) {
                Some(target) => schema = target,
                None => break,
            }
        }
        schema
    }

    fn check<'s, 'd>(
        &'s self,
        schema: &'s Value,
        data: &'d mut Value,
        at: Option<usize>,
        walk: &mut Walk,
        stack: &mut Vec<Task<'s, 'd>>,
    ) {
        let keywords = match self.resolve(schema) {
            Value::Object(keywords) => keywords,
            Value::Bool(false) => {
                walk.error(at, "should NOT be valid");
                return;
            }
            _ => return,
        };

        let current: &Value = data;
        if let Some(expected) = keywords.get("type") {
            let types = type_names(expected);
            if !types.iter().any(|name| type_matches(name, current)) {
                walk.error(at, format_args!("should be {}", types.join(",")));
            }
        }
        if let Some(Value::Array(allowed)) = keywords.get("enum") {
            if !allowed.contains(current) {
                walk.error(at, "should be equal to one of the allowed values");
            }
        }
        if let Some(constant) = keywords.get("const") {
            if constant != current {
                walk.error(at, "should be equal to constant");
            }
        }

        match data {
            Value::String(text) => self.check_string(keywords, text, at, walk),
            Value::Number(number) => {
                let Some(n) = number.as_f64() else { return };
                if let Some(min) = keywords.get("minimum").and_then(Value::as_f64) {
                    if n < min {
                        walk.error(at, format_args!("should be >= {}", keywords["minimum"]));
                    }
                }
                if let Some(max) = keywords.get("maximum").and_then(Value::as_f64) {
                    if n > max {
                        walk.error(at, format_args!("should be <= {}", keywords["maximum"]));
                    }
                }
            }
            Value::Array(items) => {
                if let Some(min) = keywords.get("minItems").and_then(Value::as_u64) {
                    if (items.len() as u64) < min {
                        walk.error(at, format_args!("should NOT have less than {min} items"));
                    }
                }
                if let Some(max) = keywords.get("maxItems").and_then(Value::as_u64) {
                    if items.len() as u64 > max {
                        walk.error(at, format_args!("should NOT have more than {max} items"));
                    }
                }
                if let Some(item_schema) = keywords.get("items") {
                    let children: Vec<_> = items
                        .iter_mut()
                        .enumerate()
                        .map(|(index, item)| Task::Check {
                            schema: item_schema,
                            data: item,
                            at: walk.trail.push(at, Segment::Index(index), index),
                        })
                        .collect();
                    stack.extend(children.into_iter().rev());
                }
            }
            Value::Object(map) => self.check_object(keywords, map, at, walk, stack),
            Value::Bool(_) | Value::Null => {}
        }
    }

    fn check_string(&self, keywords: &Map<String, Value>, text: &str, at: Option<usize>, walk: &mut Walk) {
        let length = text.chars().count() as u64;
        if let Some(min) = keywords.get("minLength").and_then(Value::as_u64) {
            if length < min {
                walk.error(at, format_args!("should NOT be shorter than {min} characters"));
            }
        }
        if let Some(max) = keywords.get("maxLength").and_then(Value::as_u64) {
            if length > max {
                walk.error(at, format_args!("should NOT be longer than {max} characters"));
            }
        }
        if let Some(pattern) = keywords.get("pattern").and_then(Value::as_str) {
            if let Some(regex) = self.patterns.get(pattern) {
                if !regex.is_match(text) {
                    walk.error(at, format_args!("should match pattern \"{pattern}\""));
                }
            }
        }
        if let Some(format) = keywords.get("format").and_then(Value::as_str) {
            if !format_matches(format, text) {
                walk.error(at, format_args!("should match format \"{format}\""));
            }
        }
    }

    /// Strips undeclared keys, then queues the children: extra keys first in
    /// data order, declared properties in schema order, and the `required`
    /// report after all of them.
    fn check_object<'s, 'd>(
        &'s self,
        keywords: &'s Map<String, Value>,
        map: &'d mut Map<String, Value>,
        at: Option<usize>,
        walk: &mut Walk,
        stack: &mut Vec<Task<'s, 'd>>,
    ) {
        let properties = keywords.get("properties").and_then(Value::as_object);
        let declared = |key: &str| properties.is_some_and(|props| props.contains_key(key));

        // Position of each surviving key before stripping.
        let mut positions = Vec::new();
        if let Some(Value::Bool(false)) = keywords.get("additionalProperties") {
            for (position, key) in map.keys().enumerate() {
                if declared(key) {
                    positions.push(position);
                } else {
                    walk.removals.push(Removal {
                        at,
                        key: key.clone(),
                        position,
                    });
                }
            }
            map.retain(|key, _| declared(key));
        }
        let original = |index: usize| positions.get(index).copied().unwrap_or(index);

        let mut missing = Vec::new();
        if let Some(Value::Array(required)) = keywords.get("required") {
            for name in required.iter().filter_map(Value::as_str) {
                if !map.contains_key(name) {
                    missing.push(format!("{} should have required property '{name}'", walk.trail.accessor(at)));
                }
            }
        }
        if !missing.is_empty() {
            stack.push(Task::Report(missing));
        }

        let extra = keywords.get("additionalProperties").filter(|extra| extra.is_object());
        let mut children = Vec::new();
        let mut named = HashMap::new();
        for (index, (key, value)) in map.iter_mut().enumerate() {
            if declared(key) {
                named.insert(key.as_str(), (index, value));
            } else if let Some(extra) = extra {
                children.push(Task::Check {
                    schema: extra,
                    data: value,
                    at: walk.trail.push(at, Segment::Key(key.clone()), original(index)),
                });
            }
        }
        for (name, property_schema) in properties.into_iter().flatten() {
            if let Some((index, value)) = named.remove(name.as_str()) {
                children.push(Task::Check {
                    schema: property_schema,
                    data: value,
                    at: walk.trail.push(at, Segment::Key(name.clone()), original(index)),
                });
            }
        }
        stack.extend(children.into_iter().rev());
    }
}

enum Task<'s, 'd> {
    Check {
        schema: &'s Value,
        data: &'d mut Value,
        at: Option<usize>,
    },
    /// Errors that must follow everything already queued for a node.
    Report(Vec<String>),
}

/// A key deleted from the object at `at`.
struct Removal {
    at: Option<usize>,
    key: String,
    position: usize,
}

#[derive(Default)]
struct Walk {
    trail: Trail,
    errors: Vec<String>,
    removals: Vec<Removal>,
}

impl Walk {
    fn error(&mut self, at: Option<usize>, problem: impl fmt::Display) {
        let path = self.trail.accessor(at);
        self.errors.push(format!("{path} {problem}"));
    }

    /// Warnings come out in document order, one dotted path per removed key.
    fn finish(self) -> ValidationResult {
        let Walk { trail, errors, removals } = self;
        let mut removed: Vec<(Vec<usize>, String)> = removals
            .into_iter()
            .map(|removal| {
                let steps = trail.steps(removal.at);
                let mut order: Vec<usize> = steps.iter().map(|step| step.position).collect();
                order.push(removal.position);
                let mut dotted: Vec<String> = steps.iter().map(|step| step.segment.to_string()).collect();
                dotted.push(removal.key);
                (order, format!("Unknown property: data.{}", dotted.join(".")))
            })
            .collect();
        removed.sort_by(|a, b| a.0.cmp(&b.0));
        let warnings = removed.into_iter().map(|(_, warning)| warning).collect();
        ValidationResult { errors, warnings }
    }
}

struct Compiler<'a> {
    root: &'a Value,
    patterns: HashMap<String, Regex>,
    /// `$ref` targets already walked.
    followed: HashSet<String>,
}

impl Compiler<'_> {
    fn walk(&mut self, node: &Value, at: String) -> Result<(), SchemaError> {
        let keywords = match node {
            Value::Object(keywords) => keywords,
            Value::Bool(_) => return Ok(()),
            _ => return Err(SchemaError::NotASchema { path: at }),
        };

        if let Some(reference) = keywords.get("$ref") {
            let reference = reference.as_str().ok_or_else(|| malformed(&at, "$ref", "must be a string"))?;
            self.check_ref(reference, &at)?;
            if self.followed.insert(reference.to_string()) {
                if let Some(target) = lookup(self.root, reference) {
                    self.walk(target, reference.to_string())?;
                }
            }
        }

        if let Some(expected) = keywords.get("type") {
            let names: Vec<&Value> = match expected {
                Value::Array(list) => list.iter().collect(),
                single => vec![single],
            };
            for name in names {
                let name = name.as_str().ok_or_else(|| malformed(&at, "type", "must be a string or list of strings"))?;
                if !KNOWN_TYPES.contains(&name) {
                    return Err(SchemaError::UnknownType {
                        path: at,
                        name: name.to_string(),
                    });
                }
            }
        }

        if let Some(required) = keywords.get("required") {
            let all_strings = required.as_array().is_some_and(|list| list.iter().all(Value::is_string));
            if !all_strings {
                return Err(malformed(&at, "required", "must be a list of property names"));
            }
        }

        if let Some(allowed) = keywords.get("enum") {
            if !allowed.is_array() {
                return Err(malformed(&at, "enum", "must be a list"));
            }
        }

        for keyword in ["minLength", "maxLength", "minItems", "maxItems"] {
            if let Some(bound) = keywords.get(keyword) {
                if bound.as_u64().is_none() {
                    return Err(malformed(&at, keyword, "must be a non-negative integer"));
                }
            }
        }
        for keyword in ["minimum", "maximum"] {
            if let Some(bound) = keywords.get(keyword) {
                if !bound.is_number() {
                    return Err(malformed(&at, keyword, "must be a number"));
                }
            }
        }

        if let Some(pattern) = keywords.get("pattern") {
            let pattern = pattern.as_str().ok_or_else(|| malformed(&at, "pattern", "must be a string"))?;
            let regex = Regex::new(pattern).map_err(|e| malformed(&at, "pattern", &e.to_string()))?;
            self.patterns.insert(pattern.to_string(), regex);
        }

        if let Some(format) = keywords.get("format") {
            let known = format.as_str().is_some_and(|name| KNOWN_FORMATS.contains(&name));
            if !known {
                return Err(malformed(&at, "format", &format!("unknown format {format}")));
            }
        }

        for keyword in ["properties", "definitions", "$defs"] {
            if let Some(children) = keywords.get(keyword) {
                let children = children.as_object().ok_or_else(|| malformed(&at, keyword, "must be an object"))?;
                for (name, child) in children {
                    self.walk(child, format!("{at}/{keyword}/{name}"))?;
                }
            }
        }
        for keyword in ["additionalProperties", "items"] {
            if let Some(child) = keywords.get(keyword) {
                self.walk(child, format!("{at}/{keyword}"))?;
            }
        }
        Ok(())
    }

    /// The reference must resolve, and following `$ref` links from it must
    /// reach a concrete schema rather than loop.
    fn check_ref(&self, reference: &str, at: &str) -> Result<(), SchemaError> {
        let unresolved = || SchemaError::UnresolvedRef {
            path: at.to_string(),
            reference: reference.to_string(),
        };
        let mut seen = HashSet::new();
        let mut current = reference;
        loop {
            if !seen.insert(current) {
                return Err(unresolved());
            }
            let target = lookup(self.root, current).ok_or_else(unresolved)?;
            match target.get("$ref").and_then(Value::as_str) {
                Some(next) => current = next,
                None => return Ok(()),
            }
        }
    }
}

fn malformed(at: &str, keyword: &'static str, reason: &str) -> SchemaError {
    SchemaError::Malformed {
        path: at.to_string(),
        keyword,
        reason: reason.to_string(),
    }
}

fn lookup<'a>(root: &'a Value, reference: &str) -> Option<&'a Value> {
    let pointer = reference.strip_prefix('#')?;
    if pointer.is_empty() {
        Some(root)
    } else {
        root.pointer(pointer)
    }
}

fn type_names(expected: &Value) -> Vec<&str> {
    match expected {
        Value::Array(list) => list.iter().filter_map(Value::as_str).collect(),
        other => other.as_str().into_iter().collect(),
    }
}

fn type_matches(name: &str, data: &Value) -> bool {
    match name {
        "object" => data.is_object(),
        "array" => data.is_array(),
        "string" => data.is_string(),
        "number" => data.is_number(),
        "integer" => match data {
            Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
            _ => false,
        },
        "boolean" => data.is_boolean(),
        "null" => data.is_null(),
        _ => false,
    }
}

fn format_matches(format: &str, text: &str) -> bool {
    match format {
        "email" => {
            let Some((local, domain)) = text.split_once('@') else {
                return false;
            };
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !text.chars().any(char::is_whitespace)
        }
        "date-time" => DATE_TIME.is_match(text),
        "date" => DATE.is_match(text),
        "uri" => URI.is_match(text),
        _ => true,
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "{index}"),
        }
    }
}

#[derive(Debug)]
struct Step {
    parent: Option<usize>,
    segment: Segment,
    /// Index within the parent as the data arrived.
    position: usize,
}

/// Locations inside the validated value. Steps link to their parent, so
/// siblings share a prefix and `None` is the root.
#[derive(Debug, Default)]
struct Trail(Vec<Step>);

impl Trail {
    fn push(&mut self, parent: Option<usize>, segment: Segment, position: usize) -> Option<usize> {
        self.0.push(Step {
            parent,
            segment,
            position,
        });
        Some(self.0.len() - 1)
    }

    /// Steps from the root down to `at`.
    fn steps(&self, mut at: Option<usize>) -> Vec<&Step> {
        let mut steps = Vec::new();
        while let Some(step) = at.and_then(|index| self.0.get(index)) {
            steps.push(step);
            at = step.parent;
        }
        steps.reverse();
        steps
    }

    /// Rendered the way error messages expect: `data.user.emails[0]`, or
    /// `data['dashed-key']`.
    fn accessor(&self, at: Option<usize>) -> String {
        let mut path = String::from("data");
        for step in self.steps(at) {
            match &step.segment {
                Segment::Key(key) if is_identifier(key) => {
                    path.push('.');
                    path.push_str(key);
                }
                Segment::Key(key) => path.push_str(&format!("['{}']", key.replace('\'', "\\'"))),
                Segment::Index(index) => path.push_str(&format!("[{index}]")),
            }
        }
        path
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn reset_password_schema() -> Value {
        json!({
            "additionalProperties": false,
            "properties": {
                "check_expired": { "type": "boolean" },
                "email": { "type": "string" },
                "password": { "type": "string" },
                "token": { "type": "string" }
            },
            "required": ["email", "password", "token"],
            "type": "object"
        })
    }

    #[test]
    fn conforming_data_has_no_errors_or_warnings() {
        let mut data = json!({
            "email": "marc@gigwalk.com",
            "password": "canhazgigwalklove",
            "token": "7004cf8bb3022b36f6dc68a89b776d0acf936feb"
        });
        let result = validate(&mut data, &reset_password_schema()).unwrap();
        assert_eq!(result, ValidationResult::default());
        assert!(result.is_valid());
    }

    #[test]
    fn unknown_properties_are_removed_with_a_warning() {
        let mut data = json!({
            "email": "marc@gigwalk.com",
            "password": "canhazgigwalklove",
            "token": "7004cf8bb3022b36f6dc68a89b776d0acf936feb",
            "destroy_all_humans": true
        });
        let result = validate(&mut data, &reset_password_schema()).unwrap();
        assert_eq!(result.warnings, vec!["Unknown property: data.destroy_all_humans"]);
        assert!(result.errors.is_empty());
        assert_eq!(
            data,
            json!({
                "email": "marc@gigwalk.com",
                "password": "canhazgigwalklove",
                "token": "7004cf8bb3022b36f6dc68a89b776d0acf936feb"
            })
        );
    }

    #[test]
    fn all_violations_are_reported() {
        let mut data = json!({
            "email": "marc@gigwalk.com",
            "password": "canhazgigwalklove",
            "check_expired": "true"
        });
        let result = validate(&mut data, &reset_password_schema()).unwrap();
        assert_eq!(
            result.errors,
            vec![
                "data.check_expired should be boolean",
                "data should have required property 'token'",
            ]
        );
        assert_eq!(
            result.error_message().unwrap(),
            "data.check_expired should be boolean\ndata should have required property 'token'"
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn schema_is_not_mutated() {
        let schema = reset_password_schema();
        let compiled = Schema::compile(schema.clone()).unwrap();
        let mut data = json!({ "email": "a@b.co", "extra": 1 });
        compiled.validate(&mut data);
        assert_eq!(compiled.document(), &schema);
    }

    #[test]
    fn nested_removals_use_dotted_paths() {
        let schema = json!({
            "type": "object",
            "properties": {
                "bounding_box": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": { "top_left": { "type": "object" } }
                },
                "filters": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "additionalProperties": false,
                        "properties": { "filter_key": { "type": "string" } }
                    }
                }
            }
        });
        let mut data = json!({
            "bounding_box": { "top_left": {}, "zoom": 3 },
            "filters": [{ "filter_key": "status" }, { "filter_key": "title", "boost": 2 }],
            "untouched": true
        });
        let result = validate(&mut data, &schema).unwrap();
        assert_eq!(
            result.warnings,
            vec![
                "Unknown property: data.bounding_box.zoom",
                "Unknown property: data.filters.1.boost",
            ]
        );
        assert_eq!(data["untouched"], json!(true));
        assert_eq!(data["filters"][1], json!({ "filter_key": "title" }));
    }

    #[test]
    fn nested_errors_use_accessor_paths() {
        let schema = json!({
            "type": "object",
            "properties": {
                "sort": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "sort_order": { "enum": ["asc", "desc"] }
                        },
                        "required": ["sort_key"]
                    }
                },
                "due-date": { "type": "string", "format": "date-time" }
            }
        });
        let mut data = json!({
            "sort": [{ "sort_key": "title", "sort_order": "asc" }, { "sort_order": "sideways" }],
            "due-date": "tomorrow"
        });
        let result = validate(&mut data, &schema).unwrap();
        assert_eq!(
            result.errors,
            vec![
                "data.sort[1].sort_order should be equal to one of the allowed values",
                "data.sort[1] should have required property 'sort_key'",
                "data['due-date'] should match format \"date-time\"",
            ]
        );
    }

    #[test]
    fn string_and_number_bounds() {
        let schema = json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "minLength": 3, "maxLength": 5, "pattern": "^[A-Z]" },
                "limit": { "type": "integer", "minimum": 1, "maximum": 100 },
                "ids": { "type": "array", "minItems": 1, "maxItems": 2 }
            }
        });
        let mut data = json!({ "title": "ab", "limit": 0, "ids": [] });
        let result = validate(&mut data, &schema).unwrap();
        assert_eq!(
            result.errors,
            vec![
                "data.title should NOT be shorter than 3 characters",
                "data.title should match pattern \"^[A-Z]\"",
                "data.limit should be >= 1",
                "data.ids should NOT have less than 1 items",
            ]
        );

        let mut data = json!({ "title": "Abcdef", "limit": 101.5, "ids": [1, 2, 3] });
        let result = validate(&mut data, &schema).unwrap();
        assert_eq!(
            result.errors,
            vec![
                "data.title should NOT be longer than 5 characters",
                "data.limit should be integer",
                "data.limit should be <= 100",
                "data.ids should NOT have more than 2 items",
            ]
        );
    }

    #[test]
    fn type_lists_and_null() {
        let schema = json!({ "type": "object", "properties": { "note": { "type": ["string", "null"] } } });
        let mut ok = json!({ "note": null });
        assert!(validate(&mut ok, &schema).unwrap().is_valid());
        let mut bad = json!({ "note": 4 });
        assert_eq!(validate(&mut bad, &schema).unwrap().errors, vec!["data.note should be string,null"]);
    }

    #[test]
    fn local_refs_resolve() {
        let schema = json!({
            "definitions": {
                "email": { "type": "string", "format": "email" },
                "contact": { "$ref": "#/definitions/email" }
            },
            "type": "object",
            "properties": { "email": { "$ref": "#/definitions/contact" } },
            "required": ["email"]
        });
        let mut good = json!({ "email": "marc@gigwalk.com" });
        assert!(validate(&mut good, &schema).unwrap().is_valid());
        let mut bad = json!({ "email": "not-an-email" });
        assert_eq!(
            validate(&mut bad, &schema).unwrap().errors,
            vec!["data.email should match format \"email\""]
        );
    }

    #[test]
    fn additional_properties_schema_validates_extras() {
        let schema = json!({
            "type": "object",
            "properties": { "name": { "type": "string" } },
            "additionalProperties": { "type": "integer" }
        });
        let mut data = json!({ "name": "Blackbriar", "count": 2, "label": "x" });
        let result = validate(&mut data, &schema).unwrap();
        assert_eq!(result.errors, vec!["data.label should be integer"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn malformed_schemas_fail_to_compile() {
        assert!(matches!(
            Schema::compile(json!({ "type": "strng" })),
            Err(SchemaError::UnknownType { .. })
        ));
        assert!(matches!(
            Schema::compile(json!({ "required": "email" })),
            Err(SchemaError::Malformed { keyword: "required", .. })
        ));
        assert!(matches!(
            Schema::compile(json!({ "properties": { "a": 3 } })),
            Err(SchemaError::NotASchema { .. })
        ));
        assert!(matches!(
            Schema::compile(json!({ "pattern": "(" })),
            Err(SchemaError::Malformed { keyword: "pattern", .. })
        ));
        assert!(matches!(
            Schema::compile(json!({ "$ref": "#/definitions/missing" })),
            Err(SchemaError::UnresolvedRef { .. })
        ));
        assert!(matches!(
            Schema::compile(json!({
                "definitions": { "a": { "$ref": "#/definitions/b" }, "b": { "$ref": "#/definitions/a" } },
                "$ref": "#/definitions/a"
            })),
            Err(SchemaError::UnresolvedRef { .. })
        ));
    }

    #[test]
    fn compiled_schema_is_reusable() {
        let schema = Schema::compile(reset_password_schema()).unwrap();
        for _ in 0..3 {
            let mut data = json!({ "email": "a@b.co", "password": "pw", "token": "t", "junk": 1 });
            let result = schema.validate(&mut data);
            assert_eq!(result.warnings, vec!["Unknown property: data.junk"]);
        }
    }

    #[test]
    fn patterns_behind_refs_are_compiled() {
        let schema = json!({
            "components": { "code": { "type": "string", "pattern": "^[A-Z]{3}$" } },
            "type": "object",
            "properties": { "code": { "$ref": "#/components/code" } }
        });
        let mut good = json!({ "code": "GIG" });
        assert!(validate(&mut good, &schema).unwrap().is_valid());
        let mut bad = json!({ "code": "gig" });
        assert_eq!(
            validate(&mut bad, &schema).unwrap().errors,
            vec!["data.code should match pattern \"^[A-Z]{3}$\""]
        );

        assert!(matches!(
            Schema::compile(json!({
                "components": { "broken": { "pattern": "(" } },
                "$ref": "#/components/broken"
            })),
            Err(SchemaError::Malformed { keyword: "pattern", .. })
        ));
    }

    /// Tear a value down without recursing through `Drop`.
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
    fn recursive_schema_checks_deep_data() {
        const DEPTH: usize = 100_000;
        let schema = Schema::compile(json!({
            "definitions": {
                "node": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "name": { "type": "string" },
                        "child": { "$ref": "#/definitions/node" }
                    },
                    "required": ["name"]
                }
            },
            "$ref": "#/definitions/node"
        }))
        .unwrap();

        let mut data = json!({ "name": "leaf", "stray": true });
        for depth in 0..DEPTH {
            let mut node = Map::new();
            node.insert("name".into(), Value::String(format!("node-{depth}")));
            node.insert("child".into(), data);
            data = Value::Object(node);
        }

        let result = schema.validate(&mut data);
        assert!(result.is_valid(), "{:?}", result.errors.first());
        assert_eq!(result.warnings.len(), 1);
        let expected = format!("Unknown property: data{}.stray", ".child".repeat(DEPTH));
        assert!(result.warnings[0] == expected);

        let mut leaf = &data;
        while let Some(child) = leaf.get("child") {
            leaf = child;
        }
        assert_eq!(leaf, &json!({ "name": "leaf" }));
        dismantle(data);
    }
}
