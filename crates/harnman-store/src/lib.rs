//! On-disk JSON configuration store for harnman harnesses.
//!
//! Each harness owns one JSON document at `<dir>/<name>.json`. Documents are
//! loaded whole, mutated in memory, and written back whole; only `add` gets a
//! true atomicity guarantee (exclusive create). `save` overwrites in place and
//! is not crash-atomic: a power loss mid-write can tear the file. Callers must
//! tolerate a torn write; the store does not paper over it.

use serde_json::Value;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub use harnman_name::InvalidName;

/// Error type for store operations.
#[derive(Debug)]
pub enum StoreError {
    /// The configuration directory itself is missing.
    DirectoryNotFound { dir: PathBuf },
    /// No document exists for the harness name.
    NotFound { name: String },
    /// A create or rename target already exists.
    AlreadyExists { name: String },
    /// The harness name fails the filename-safety check.
    InvalidName(InvalidName),
    /// A non-object payload was given to `add`.
    TypeMismatch,
    /// The file content is not valid JSON.
    Decode { path: PathBuf, message: String },
    /// A dotted field path does not resolve in the named document.
    KeyNotFound { name: String, path: String },
    /// The OS refused the operation.
    PermissionDenied { action: &'static str, path: PathBuf },
    /// Any other filesystem failure.
    Io { path: PathBuf, message: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DirectoryNotFound { dir } => {
                write!(f, "configuration directory '{}' not found", dir.display())
            }
            StoreError::NotFound { name } => {
                write!(f, "config file '{}.json' not found", name)
            }
            StoreError::AlreadyExists { name } => {
                write!(f, "config file '{}.json' already exists", name)
            }
            StoreError::InvalidName(err) => err.fmt(f),
            StoreError::TypeMismatch => {
                write!(f, "config document must be a JSON object")
            }
            StoreError::Decode { path, message } => {
                write!(f, "invalid JSON in '{}': {}", path.display(), message)
            }
            StoreError::KeyNotFound { name, path } => {
                write!(f, "key '{}' not found in '{}.json'", path, name)
            }
            StoreError::PermissionDenied { action, path } => {
                write!(f, "permission denied: cannot {} '{}'", action, path.display())
            }
            StoreError::Io { path, message } => {
                write!(f, "filesystem error on '{}': {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<InvalidName> for StoreError {
    fn from(err: InvalidName) -> Self {
        StoreError::InvalidName(err)
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// CRUD over whole JSON documents keyed by harness name.
///
/// The configuration directory is injected at construction; the store never
/// reads the environment itself.
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The configuration directory this store is rooted at.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Builds `<dir>/<name>.json`, failing if the directory is missing.
    ///
    /// Does not validate `name`: operations on already-listed names trust
    /// them, while `add` and schema validation gate free-form input through
    /// [`harnman_name::validate`] before any path is built.
    pub fn resolve_path(&self, name: &str) -> StoreResult<PathBuf> {
        if !self.dir.is_dir() {
            return Err(StoreError::DirectoryNotFound {
                dir: self.dir.clone(),
            });
        }
        Ok(self.dir.join(format!("{name}.json")))
    }

    /// Loads and parses the named document.
    pub fn load(&self, name: &str) -> StoreResult<Value> {
        let path = self.resolve_path(name)?;
        if !path.exists() {
            return Err(StoreError::NotFound {
                name: name.to_string(),
            });
        }
        let text = fs::read_to_string(&path).map_err(|e| io_error("read", &path, &e))?;
        serde_json::from_str(&text).map_err(|e| StoreError::Decode {
            path,
            message: e.to_string(),
        })
    }

    /// Serializes `doc` (pretty-printed) and overwrites the file in full.
    ///
    /// Not crash-atomic; see the crate docs.
    pub fn save(&self, name: &str, doc: &Value) -> StoreResult<()> {
        let path = self.resolve_path(name)?;
        let text = render(doc, &path)?;
        fs::write(&path, text).map_err(|e| io_error("write", &path, &e))
    }

    /// Creates a new document, failing if one already exists.
    ///
    /// The existence check and the creation are a single filesystem primitive
    /// (exclusive create), so two concurrent `add` calls cannot both win.
    pub fn add(&self, name: &str, doc: &Value) -> StoreResult<()> {
        harnman_name::validate(name)?;
        if !doc.is_object() {
            return Err(StoreError::TypeMismatch);
        }
        let path = self.resolve_path(name)?;
        let text = render(doc, &path)?;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => StoreError::AlreadyExists {
                    name: name.to_string(),
                },
                _ => io_error("create", &path, &e),
            })?;
        file.write_all(text.as_bytes())
            .map_err(|e| io_error("write", &path, &e))
    }

    /// Deletes the named document.
    pub fn delete(&self, name: &str) -> StoreResult<()> {
        let path = self.resolve_path(name)?;
        fs::remove_file(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound {
                name: name.to_string(),
            },
            _ => io_error("delete", &path, &e),
        })
    }

    /// Renames `old` to `new` via a filesystem rename; content is untouched.
    ///
    /// Renaming a name onto itself is a no-op success. An existing target is
    /// never overwritten.
    pub fn rename(&self, old: &str, new: &str) -> StoreResult<()> {
        let old_path = self.resolve_path(old)?;
        let new_path = self.resolve_path(new)?;

        if !old_path.exists() {
            return Err(StoreError::NotFound {
                name: old.to_string(),
            });
        }
        if old == new {
            return Ok(());
        }
        if new_path.exists() {
            return Err(StoreError::AlreadyExists {
                name: new.to_string(),
            });
        }
        fs::rename(&old_path, &new_path).map_err(|e| io_error("rename", &old_path, &e))
    }

    /// Lists harness names, sorted ascending.
    ///
    /// Only regular `*.json` files whose stem passes the filename-safety check
    /// are included; anything else in the directory is treated as foreign and
    /// silently skipped.
    pub fn list(&self) -> StoreResult<Vec<String>> {
        if !self.dir.is_dir() {
            return Err(StoreError::DirectoryNotFound {
                dir: self.dir.clone(),
            });
        }
        let entries = fs::read_dir(&self.dir).map_err(|e| io_error("read", &self.dir, &e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error("read", &self.dir, &e))?;
            if !entry.path().is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let Some(stem) = file_name.strip_suffix(".json") else {
                continue;
            };
            if harnman_name::is_valid(stem) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Reads one (possibly nested) field from the named document.
    pub fn read_field(&self, name: &str, field_path: &str) -> StoreResult<Value> {
        let doc = self.load(name)?;
        match harnman_fieldpath::get(&doc, field_path) {
            Ok(value) => Ok(value.clone()),
            Err(err) => Err(StoreError::KeyNotFound {
                name: name.to_string(),
                path: err.path,
            }),
        }
    }

    /// Sets one field in the named document and persists the whole document.
    ///
    /// Load, mutate, overwrite: not atomic across concurrent invocations.
    pub fn update_field(&self, name: &str, field_path: &str, value: Value) -> StoreResult<()> {
        let mut doc = self.load(name)?;
        harnman_fieldpath::set(&mut doc, field_path, value);
        self.save(name, &doc)
    }

    /// Removes one field from the named document and persists the rest.
    pub fn delete_field(&self, name: &str, field_path: &str) -> StoreResult<Value> {
        let mut doc = self.load(name)?;
        let removed =
            harnman_fieldpath::delete(&mut doc, field_path).map_err(|err| StoreError::KeyNotFound {
                name: name.to_string(),
                path: err.path,
            })?;
        self.save(name, &doc)?;
        Ok(removed)
    }
}

fn render(doc: &Value, path: &Path) -> StoreResult<String> {
    let mut text = serde_json::to_string_pretty(doc).map_err(|e| StoreError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    text.push('\n');
    Ok(text)
}

fn io_error(action: &'static str, path: &Path, err: &io::Error) -> StoreError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => StoreError::PermissionDenied {
            action,
            path: path.to_path_buf(),
        },
        _ => StoreError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        },
    }
}
