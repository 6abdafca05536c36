//! Harness identifier validation for harnman.
//!
//! A harness name is also the filename stem of its configuration file, so the
//! accepted charset is deliberately narrow: ASCII letters, digits, underscore,
//! and hyphen. Rejecting separators, dots, and spaces here is the sole defense
//! against path traversal and ambiguous multi-dot filenames.

use std::fmt;

/// Error for a harness name that fails the filename-safety check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidName {
    pub name: String,
}

impl fmt::Display for InvalidName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid harness name '{}': must be non-empty and contain only letters, digits, '_' or '-'",
            self.name
        )
    }
}

impl std::error::Error for InvalidName {}

/// Result type for name validation.
pub type NameResult<T> = Result<T, InvalidName>;

/// Returns true if `name` is a safe harness identifier.
///
/// Safe means non-empty and every character is an ASCII letter, digit,
/// underscore, or hyphen.
pub fn is_valid(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Checks `name` against the filename-safety charset.
///
/// Operations that accept free-form user input (creating a config, validating
/// one by name) must call this before any path is built from the name.
pub fn validate(name: &str) -> NameResult<()> {
    if is_valid(name) {
        Ok(())
    } else {
        Err(InvalidName {
            name: name.to_string(),
        })
    }
}
