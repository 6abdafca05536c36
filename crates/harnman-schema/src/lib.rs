//! JSON Schema validation for harnman harness configurations.
//!
//! Validation is first-failure only: the first offending node is reported with
//! a readable instance path (`nested -> array -> 1`) and the rule message, and
//! no further errors are collected.

use jsonschema::JSONSchema;
use jsonschema::paths::JSONPointer;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use harnman_store::{ConfigStore, StoreError};

pub use harnman_name::InvalidName;

/// Error type for schema loading and validation.
#[derive(Debug)]
pub enum SchemaError {
    /// The schema (or other JSON) file is absent.
    NotFound { path: PathBuf },
    /// The file content is not valid JSON.
    Decode { path: PathBuf, message: String },
    /// The OS refused to read the file.
    PermissionDenied { path: PathBuf },
    /// Any other filesystem failure.
    Io { path: PathBuf, message: String },
    /// The schema document itself does not compile.
    SchemaInvalid { message: String },
    /// The document does not conform; carries the first failure only.
    ValidationFailed { path: String, message: String },
    /// The harness name fails the filename-safety check.
    InvalidName(InvalidName),
    /// Loading the harness document failed.
    Store(StoreError),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::NotFound { path } => {
                write!(f, "file '{}' not found", path.display())
            }
            SchemaError::Decode { path, message } => {
                write!(f, "invalid JSON in '{}': {}", path.display(), message)
            }
            SchemaError::PermissionDenied { path } => {
                write!(f, "permission denied: cannot read '{}'", path.display())
            }
            SchemaError::Io { path, message } => {
                write!(f, "filesystem error on '{}': {}", path.display(), message)
            }
            SchemaError::SchemaInvalid { message } => {
                write!(f, "schema is invalid: {}", message)
            }
            SchemaError::ValidationFailed { path, message } => {
                write!(f, "validation failed at {}: {}", path, message)
            }
            SchemaError::InvalidName(err) => err.fmt(f),
            SchemaError::Store(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchemaError::Store(err) => Some(err),
            SchemaError::InvalidName(err) => Some(err),
            _ => None,
        }
    }
}

impl From<InvalidName> for SchemaError {
    fn from(err: InvalidName) -> Self {
        SchemaError::InvalidName(err)
    }
}

impl From<StoreError> for SchemaError {
    fn from(err: StoreError) -> Self {
        SchemaError::Store(err)
    }
}

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Loads and parses a JSON file at an arbitrary path.
///
/// Same failure shape as the store's document loader, but not tied to the
/// configuration directory; schema files can live anywhere.
pub fn load_json_file(path: &Path) -> SchemaResult<Value> {
    if !path.exists() {
        return Err(SchemaError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => SchemaError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => SchemaError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    })?;
    serde_json::from_str(&text).map_err(|e| SchemaError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Validates `doc` against `schema`, reporting only the first failure.
pub fn validate(doc: &Value, schema: &Value) -> SchemaResult<()> {
    let compiled = JSONSchema::compile(schema).map_err(|e| SchemaError::SchemaInvalid {
        message: e.to_string(),
    })?;
    if let Err(mut errors) = compiled.validate(doc) {
        if let Some(first) = errors.next() {
            return Err(SchemaError::ValidationFailed {
                path: render_instance_path(&first.instance_path),
                message: first.to_string(),
            });
        }
    }
    Ok(())
}

/// Validates the named harness document against the schema at `schema_path`.
///
/// The name is checked before any I/O happens; then schema and document are
/// loaded in that order.
pub fn validate_harness(store: &ConfigStore, name: &str, schema_path: &Path) -> SchemaResult<()> {
    harnman_name::validate(name)?;
    let schema = load_json_file(schema_path)?;
    let doc = store.load(name)?;
    validate(&doc, &schema)
}

fn render_instance_path(pointer: &JSONPointer) -> String {
    let raw = pointer.to_string();
    if raw.is_empty() {
        return "<document root>".to_string();
    }
    raw.trim_start_matches('/')
        .split('/')
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn required_field_schema() -> Value {
        json!({
            "type": "object",
            "required": ["required_field"],
            "properties": {
                "required_field": {"type": "string"}
            }
        })
    }

    #[test]
    fn validate_conforming_document() {
        let doc = json!({"required_field": "present"});
        assert!(validate(&doc, &required_field_schema()).is_ok());
    }

    #[test]
    fn validate_missing_required_field() {
        let doc = json!({"other": 1});
        let err = validate(&doc, &required_field_schema()).unwrap_err();
        match err {
            SchemaError::ValidationFailed { message, .. } => {
                assert!(message.contains("required_field"));
            }
            other => panic!("expected ValidationFailed, got {other}"),
        }
    }

    #[test]
    fn validation_failure_names_nested_array_index() {
        let schema = json!({
            "type": "object",
            "properties": {
                "nested": {
                    "type": "object",
                    "properties": {
                        "array": {"type": "array", "items": {"type": "integer"}}
                    }
                }
            }
        });
        let doc = json!({"nested": {"array": [1, "two", 3]}});
        let err = validate(&doc, &schema).unwrap_err();
        match err {
            SchemaError::ValidationFailed { path, .. } => {
                assert_eq!(path, "nested -> array -> 1");
            }
            other => panic!("expected ValidationFailed, got {other}"),
        }
    }

    #[test]
    fn root_level_failure_uses_root_marker() {
        let err = validate(&json!(5), &json!({"type": "object"})).unwrap_err();
        match err {
            SchemaError::ValidationFailed { path, .. } => {
                assert_eq!(path, "<document root>");
            }
            other => panic!("expected ValidationFailed, got {other}"),
        }
    }

    #[test]
    fn malformed_schema_is_schema_invalid() {
        let err = validate(&json!({}), &json!({"type": 5})).unwrap_err();
        assert!(matches!(err, SchemaError::SchemaInvalid { .. }));
    }

    #[test]
    fn load_json_file_missing() {
        let dir = TempDir::new().unwrap();
        let err = load_json_file(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, SchemaError::NotFound { .. }));
    }

    #[test]
    fn load_json_file_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{").unwrap();
        let err = load_json_file(&path).unwrap_err();
        assert!(matches!(err, SchemaError::Decode { .. }));
    }

    #[test]
    fn validate_harness_rejects_bad_name_before_io() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path());
        // The schema path does not even exist; the name check comes first.
        let err =
            validate_harness(&store, "../bad", &dir.path().join("no-schema.json")).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidName(_)));
    }

    #[test]
    fn validate_harness_end_to_end() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path());
        store
            .add("h", &json!({"required_field": "ok"}))
            .unwrap();
        let schema_path = dir.path().join("schema.json");
        std::fs::write(
            &schema_path,
            serde_json::to_string(&required_field_schema()).unwrap(),
        )
        .unwrap();

        assert!(validate_harness(&store, "h", &schema_path).is_ok());

        store.delete_field("h", "required_field").unwrap();
        let err = validate_harness(&store, "h", &schema_path).unwrap_err();
        assert!(matches!(err, SchemaError::ValidationFailed { .. }));
    }

    #[test]
    fn validate_harness_missing_document() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path());
        let schema_path = dir.path().join("schema.json");
        std::fs::write(&schema_path, "{}").unwrap();

        let err = validate_harness(&store, "missing", &schema_path).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Store(StoreError::NotFound { .. })
        ));
    }
}
