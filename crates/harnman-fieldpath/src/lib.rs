//! Dotted-path access into JSON configuration documents.
//!
//! Field paths are dot-separated key segments (`fuzz.fuzz_cmd`) addressing a
//! location inside a loaded document. The accessor only works on the in-memory
//! tree; persisting a mutated document is the caller's job.
//!
//! `set` auto-creates intermediate objects. A non-object value standing in the
//! way of an intermediate segment is overwritten with a fresh empty object and
//! its previous content is lost. Callers that cannot tolerate that loss must
//! `get` the intermediate path first.

use serde_json::{Map, Value};
use std::fmt;

/// Error for a field path that does not resolve in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyNotFound {
    /// The full original path, not just the failing segment.
    pub path: String,
}

impl fmt::Display for KeyNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key '{}' not found", self.path)
    }
}

impl std::error::Error for KeyNotFound {}

/// Result type for field path operations.
pub type FieldPathResult<T> = Result<T, KeyNotFound>;

/// Reads the value at `path`, walking one object level per segment.
///
/// Fails with [`KeyNotFound`] as soon as the current node is not an object
/// containing the segment. The leaf is returned as-is, whatever its JSON type.
pub fn get<'a>(doc: &'a Value, path: &str) -> FieldPathResult<&'a Value> {
    let mut node = doc;
    for segment in path.split('.') {
        node = node
            .as_object()
            .and_then(|map| map.get(segment))
            .ok_or_else(|| KeyNotFound {
                path: path.to_string(),
            })?;
    }
    Ok(node)
}

/// Writes `value` at `path`, creating intermediate objects as needed.
///
/// Every node on the way to the final segment that is missing or not an
/// object is replaced with a fresh empty object (including the root). This is
/// the create-intermediate-structure policy: it discards whatever non-object
/// value was in the way. Always succeeds.
pub fn set(doc: &mut Value, path: &str, value: Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let last = segments.pop().unwrap_or(path);

    let mut node = doc;
    for segment in segments {
        let map = ensure_object(node);
        node = map
            .entry(segment)
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(node).insert(last.to_string(), value);
}

/// Removes and returns the value at `path`.
///
/// Fails with [`KeyNotFound`] if any intermediate segment is missing or not an
/// object, or if the final segment is absent from its container.
pub fn delete(doc: &mut Value, path: &str) -> FieldPathResult<Value> {
    let mut segments: Vec<&str> = path.split('.').collect();
    let last = segments.pop().unwrap_or(path);

    let mut node = doc;
    for segment in segments {
        node = node
            .as_object_mut()
            .and_then(|map| map.get_mut(segment))
            .ok_or_else(|| KeyNotFound {
                path: path.to_string(),
            })?;
    }
    node.as_object_mut()
        .and_then(|map| map.remove(last))
        .ok_or_else(|| KeyNotFound {
            path: path.to_string(),
        })
}

/// The named overwrite branch of the create-intermediate-structure policy.
fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_top_level() {
        let doc = json!({"a": 1});
        assert_eq!(get(&doc, "a").unwrap(), &json!(1));
    }

    #[test]
    fn get_nested() {
        let doc = json!({"fuzz": {"fuzz_cmd": "./fuzz1"}});
        assert_eq!(get(&doc, "fuzz.fuzz_cmd").unwrap(), &json!("./fuzz1"));
    }

    #[test]
    fn get_returns_subtree_unmodified() {
        let doc = json!({"fuzz": {"options": {"max_runs": 10, "dirs": ["a", "b"]}}});
        assert_eq!(
            get(&doc, "fuzz.options").unwrap(),
            &json!({"max_runs": 10, "dirs": ["a", "b"]})
        );
    }

    #[test]
    fn get_missing_key_names_full_path() {
        let doc = json!({"fuzz": {}});
        let err = get(&doc, "fuzz.fuzz_cmd").unwrap_err();
        assert_eq!(err.path, "fuzz.fuzz_cmd");
    }

    #[test]
    fn get_through_non_object_fails() {
        let doc = json!({"fuzz": "not an object"});
        assert!(get(&doc, "fuzz.fuzz_cmd").is_err());
    }

    #[test]
    fn get_through_array_fails() {
        // Arrays are not addressable by field path.
        let doc = json!({"fuzz": [1, 2, 3]});
        assert!(get(&doc, "fuzz.0").is_err());
    }

    #[test]
    fn set_creates_deep_structure() {
        let mut doc = json!({});
        set(&mut doc, "fuzz.options.max_runs", json!(100));
        assert_eq!(doc, json!({"fuzz": {"options": {"max_runs": 100}}}));
    }

    #[test]
    fn set_overwrites_existing_leaf() {
        let mut doc = json!({"build": {"build_cmd": "make"}});
        set(&mut doc, "build.build_cmd", json!("cmake --build ."));
        assert_eq!(
            get(&doc, "build.build_cmd").unwrap(),
            &json!("cmake --build .")
        );
    }

    #[test]
    fn set_replaces_non_object_intermediate() {
        // The scalar under "fuzz" is discarded to make room for the new
        // intermediate object.
        let mut doc = json!({"fuzz": "scalar"});
        set(&mut doc, "fuzz.fuzz_cmd", json!("./fuzz"));
        assert_eq!(doc, json!({"fuzz": {"fuzz_cmd": "./fuzz"}}));
    }

    #[test]
    fn set_replaces_non_object_root() {
        let mut doc = json!("scalar");
        set(&mut doc, "a", json!(1));
        assert_eq!(doc, json!({"a": 1}));
    }

    #[test]
    fn set_keeps_sibling_keys() {
        let mut doc = json!({"fuzz": {"fuzz_cmd": "./f"}, "build": {"build_cmd": "make"}});
        set(&mut doc, "fuzz.max_time", json!(30));
        assert_eq!(get(&doc, "build.build_cmd").unwrap(), &json!("make"));
        assert_eq!(get(&doc, "fuzz.fuzz_cmd").unwrap(), &json!("./f"));
    }

    #[test]
    fn delete_removes_and_returns() {
        let mut doc = json!({"fuzz": {"fuzz_cmd": "./f", "max_time": 30}});
        let removed = delete(&mut doc, "fuzz.max_time").unwrap();
        assert_eq!(removed, json!(30));
        assert_eq!(doc, json!({"fuzz": {"fuzz_cmd": "./f"}}));
    }

    #[test]
    fn delete_missing_final_key_fails() {
        let mut doc = json!({"fuzz": {}});
        let err = delete(&mut doc, "fuzz.fuzz_cmd").unwrap_err();
        assert_eq!(err.path, "fuzz.fuzz_cmd");
    }

    #[test]
    fn delete_missing_intermediate_fails() {
        let mut doc = json!({});
        assert!(delete(&mut doc, "fuzz.options.max_runs").is_err());
    }

    #[test]
    fn delete_through_non_object_fails() {
        let mut doc = json!({"fuzz": 42});
        assert!(delete(&mut doc, "fuzz.fuzz_cmd").is_err());
    }

    #[test]
    fn delete_then_get_fails() {
        let mut doc = json!({"a": {"b": 1}});
        delete(&mut doc, "a.b").unwrap();
        assert!(get(&doc, "a.b").is_err());
    }

    #[test]
    fn single_segment_path() {
        let mut doc = json!({});
        set(&mut doc, "key", json!("value"));
        assert_eq!(get(&doc, "key").unwrap(), &json!("value"));
        assert_eq!(delete(&mut doc, "key").unwrap(), json!("value"));
    }
}
