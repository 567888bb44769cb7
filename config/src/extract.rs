//! Value lookup inside JSON documents.
//!
//! Every lookup ends in [`normalize`], which flattens the matched value back
//! to the string form stored in the resolved table.

use serde_json::Value;
use serde_json_path::JsonPath;

use crate::error::{ResolveError, ResolveResult};

/// Parses `json_text` and evaluates `json_path` against it.
///
/// A single match yields that value, several matches yield the array of
/// matched values, no match is [`ResolveError::NotFound`].
pub fn extract(json_text: &str, json_path: &str) -> ResolveResult<String> {
    let tree = parse(json_text)?;
    query(&tree, json_path).map(|value| normalize(&value))
}

/// Evaluates a JSONPath expression against an already parsed tree.
pub fn query(tree: &Value, json_path: &str) -> ResolveResult<Value> {
    let path = JsonPath::parse(json_path).map_err(|e| ResolveError::InvalidJsonPath {
        path: json_path.to_string(),
        message: e.to_string(),
    })?;

    let nodes = path.query(tree).all();
    match nodes.as_slice() {
        [] => Err(ResolveError::not_found(format!("no match for {json_path}"))),
        [single] => Ok((*single).clone()),
        many => Ok(Value::Array(many.iter().map(|v| (*v).clone()).collect())),
    }
}

pub fn parse(json_text: &str) -> ResolveResult<Value> {
    serde_json::from_str(json_text).map_err(|e| ResolveError::InvalidJson(e.to_string()))
}

/// Converts a JSON value to its stored string form: containers become
/// compact JSON text, strings are unquoted, other scalars use their
/// default textual form.
pub fn normalize(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Integral floats print without a fractional part (`1.0` -> `1`).
fn format_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
        _ => n.to_string(),
    }
}

/// Depth-first search for `key` below `node`.
///
/// At each object the key is checked before descending; children are
/// visited in document order and the first hit wins.
pub fn deep_search<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map
            .get(key)
            .or_else(|| map.values().find_map(|child| deep_search(child, key))),
        Value::Array(items) => items.iter().find_map(|child| deep_search(child, key)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
    }
}

/// Finds the first service instance named `name` in a service-bindings
/// tree (`{ "<type>": [ { "name": ..., "credentials": {...} } ] }`).
pub fn find_service_instance<'a>(services: &'a Value, name: &str) -> Option<&'a Value> {
    services
        .as_object()?
        .values()
        .filter_map(Value::as_array)
        .flatten()
        .find(|instance| instance_named(instance, name))
}

/// Finds the entry named `name` inside one service-type array of the
/// bindings tree.
pub fn find_in_service_type<'a>(
    services: &'a Value,
    service_type: &str,
    name: &str,
) -> Option<&'a Value> {
    services
        .get(service_type)?
        .as_array()?
        .iter()
        .find(|instance| instance_named(instance, name))
}

fn instance_named(instance: &Value, name: &str) -> bool {
    instance.get("name").and_then(Value::as_str) == Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SERVICES: &str = r#"{
        "service1": [
            {"name": "service1-name1", "credentials": {"username": "service1-username1"}},
            {"name": "service1-name2", "credentials": {"username": "service1-username2"}}
        ],
        "user-provided": [
            {"credentials": {"writer": {"apikey": "apikey2"}}, "name": "servicename2"}
        ]
    }"#;

    #[test]
    fn extract_scalar() {
        let v = extract(SERVICES, "$.service1[0].credentials.username").unwrap();
        assert_eq!(v, "service1-username1");
    }

    #[test]
    fn extract_object_is_compact_json() {
        let v = extract(r#"{"level1": {"level2": 12345}}"#, "$.level1").unwrap();
        assert_eq!(v, r#"{"level2":12345}"#);
    }

    #[test]
    fn extract_number_and_bool() {
        let doc = r#"{"n": 12345, "f": 1.5, "b": true, "z": null}"#;
        assert_eq!(extract(doc, "$.n").unwrap(), "12345");
        assert_eq!(extract(doc, "$.f").unwrap(), "1.5");
        assert_eq!(extract(doc, "$.b").unwrap(), "true");
        assert_eq!(extract(doc, "$.z").unwrap(), "null");
    }

    #[test]
    fn integral_floats_drop_the_fraction() {
        let doc = r#"{"whole": 1.0, "neg": -42.0, "big": 1e300, "frac": 0.25}"#;
        assert_eq!(extract(doc, "$.whole").unwrap(), "1");
        assert_eq!(extract(doc, "$.neg").unwrap(), "-42");
        assert_eq!(extract(doc, "$.frac").unwrap(), "0.25");
        assert_eq!(extract(doc, "$.big").unwrap(), "1e300");
    }

    #[test]
    fn dotted_dashed_keys_need_bracket_notation() {
        let err = extract(SERVICES, "$.user-provided[0].name").unwrap_err();
        assert!(err.is_invalid_json_path());
        assert_eq!(
            extract(SERVICES, "$['user-provided'][0].name").unwrap(),
            "servicename2"
        );
    }

    #[test]
    fn extract_multiple_matches_become_array() {
        let v = extract(SERVICES, "$.service1[*].name").unwrap();
        assert_eq!(v, r#"["service1-name1","service1-name2"]"#);
    }

    #[test]
    fn extract_bracket_notation_for_dashed_keys() {
        let v = extract(SERVICES, "$['user-provided'][0].name").unwrap();
        assert_eq!(v, "servicename2");
    }

    #[test]
    fn extract_miss_is_not_found() {
        let err = extract(SERVICES, "$.nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn extract_invalid_inputs() {
        assert!(matches!(
            extract("not json", "$.a"),
            Err(ResolveError::InvalidJson(_))
        ));
        assert!(matches!(
            extract("{}", "no-dollar"),
            Err(ResolveError::InvalidJsonPath { .. })
        ));
    }

    #[test]
    fn deep_search_prefers_shallow_then_document_order() {
        let tree = json!({
            "a": {"key": "deep-first"},
            "b": {"c": {"key": "deeper"}},
        });
        assert_eq!(deep_search(&tree, "key"), Some(&json!("deep-first")));

        let tree = json!({"a": {"key": 1}, "key": 2});
        assert_eq!(deep_search(&tree, "key"), Some(&json!(2)));
    }

    #[test]
    fn deep_search_walks_arrays() {
        let tree = json!({"list": [{"x": 1}, {"target": {"y": true}}]});
        assert_eq!(deep_search(&tree, "target"), Some(&json!({"y": true})));
        assert_eq!(deep_search(&tree, "absent"), None);
    }

    #[test]
    fn service_instance_lookup() {
        let tree = parse(SERVICES).unwrap();
        let instance = find_service_instance(&tree, "service1-name2").unwrap();
        assert_eq!(instance["credentials"]["username"], "service1-username2");
        assert!(find_service_instance(&tree, "missing").is_none());
        assert!(find_in_service_type(&tree, "user-provided", "servicename2").is_some());
        assert!(find_in_service_type(&tree, "service1", "servicename2").is_none());
    }
}
