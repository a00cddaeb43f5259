//! Error types for conform.
//!
//! Two layers: `CheckFailure` is the only thing a check body may return and
//! always ends up as a `not ok` line in the report. `ConformError` covers
//! everything outside the check protocol (config, policy, report output) and
//! is what the CLI turns into exit code 2.

use std::path::PathBuf;

/// A violated expectation inside a single check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CheckFailure {
    pub message: String,
}

impl CheckFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type returned by every check body.
pub type CheckResult = Result<(), CheckFailure>;

/// Fail the enclosing check unless `cond` holds.
pub fn ensure(cond: bool, message: impl FnOnce() -> String) -> CheckResult {
    if cond {
        Ok(())
    } else {
        Err(CheckFailure::new(message()))
    }
}

/// Fail the enclosing check unless `actual == expected`.
pub fn ensure_eq(label: &str, actual: Option<&str>, expected: &str) -> CheckResult {
    match actual {
        Some(value) if value == expected => Ok(()),
        Some(value) => Err(CheckFailure::new(format!(
            "{label} is {value:?}, expected {expected:?}"
        ))),
        None => Err(CheckFailure::new(format!(
            "{label} is missing, expected {expected:?}"
        ))),
    }
}

/// Errors that abort the tool rather than a single check.
#[derive(Debug, thiserror::Error)]
pub enum ConformError {
    /// The config file could not be read.
    #[error("failed reading config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid TOML for the expected shape.
    #[error("failed parsing config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A variant name that no preset answers to.
    #[error("unknown variant `{0}`; expected one of: browser, main, github")]
    UnknownVariant(String),

    /// A policy value that cannot be used as given.
    #[error("invalid policy value for {field}: {reason}")]
    InvalidPolicy { field: &'static str, reason: String },

    /// Writing the report failed.
    #[error("report output failed: {0}")]
    Report(#[from] std::io::Error),

    /// Rendering the JSON report failed.
    #[error("report rendering failed: {0}")]
    Render(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_eq_names_actual_and_expected() {
        let err = ensure_eq("license", Some("ISC"), "MIT").unwrap_err();
        assert_eq!(err.message, r#"license is "ISC", expected "MIT""#);

        let err = ensure_eq("license", None, "MIT").unwrap_err();
        assert_eq!(err.message, r#"license is missing, expected "MIT""#);

        assert!(ensure_eq("license", Some("MIT"), "MIT").is_ok());
    }

    #[test]
    fn ensure_only_builds_message_on_failure() {
        assert!(ensure(true, || unreachable!()).is_ok());
        assert_eq!(
            ensure(false, || "nope".to_string()).unwrap_err().to_string(),
            "nope"
        );
    }
}
