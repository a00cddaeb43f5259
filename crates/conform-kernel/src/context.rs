//! The check context: raw input sources plus the documents loaded from them.
//!
//! Loading checks populate `manifest`, `ci`, and `readme`; every later check
//! reads them through the accessors below, which turn a missing document into
//! an ordinary `CheckFailure` instead of a crash.

use crate::documents::{CiConfig, Manifest, Readme};
use crate::error::CheckFailure;
use std::fs;
use std::path::Path;

/// One input document as raw text, or the reason it could not be read.
#[derive(Debug, Clone)]
pub struct Source {
    pub label: String,
    pub text: Result<String, String>,
}

impl Source {
    /// Read `path` from disk; read errors are kept, not raised.
    pub fn read(label: impl Into<String>, path: &Path) -> Self {
        let text = fs::read_to_string(path)
            .map_err(|err| format!("failed reading {}: {err}", path.display()));
        Self {
            label: label.into(),
            text,
        }
    }

    pub fn inline(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: Ok(text.into()),
        }
    }

    pub fn missing(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: Err(reason.into()),
        }
    }

    /// The text, or a failure carrying the read error.
    pub fn text(&self) -> Result<&str, CheckFailure> {
        self.text
            .as_deref()
            .map_err(|reason| CheckFailure::new(reason.to_string()))
    }
}

/// The three inputs a full run reads.
#[derive(Debug, Clone)]
pub struct Sources {
    pub manifest: Source,
    pub ci: Source,
    pub readme: Source,
}

impl Sources {
    pub const MANIFEST_FILE: &'static str = "package.json";
    pub const CI_FILE: &'static str = ".gitlab-ci.yml";
    pub const README_FILE: &'static str = "README.md";

    /// Read the conventional file names under `root`.
    pub fn from_root(root: &Path) -> Self {
        Self::from_paths(
            &root.join(Self::MANIFEST_FILE),
            &root.join(Self::CI_FILE),
            &root.join(Self::README_FILE),
        )
    }

    pub fn from_paths(manifest: &Path, ci: &Path, readme: &Path) -> Self {
        Self {
            manifest: Source::read(Self::MANIFEST_FILE, manifest),
            ci: Source::read(Self::CI_FILE, ci),
            readme: Source::read(Self::README_FILE, readme),
        }
    }
}

/// Shared state handed to every check body, in registration order.
#[derive(Debug, Clone)]
pub struct CheckContext {
    pub sources: Sources,
    pub manifest: Option<Manifest>,
    pub ci: Option<CiConfig>,
    pub readme: Option<Readme>,
}

impl CheckContext {
    pub fn new(sources: Sources) -> Self {
        Self {
            sources,
            manifest: None,
            ci: None,
            readme: None,
        }
    }

    pub fn manifest(&self) -> Result<&Manifest, CheckFailure> {
        self.manifest.as_ref().ok_or_else(|| {
            CheckFailure::new(format!("{} was not loaded", Sources::MANIFEST_FILE))
        })
    }

    pub fn ci(&self) -> Result<&CiConfig, CheckFailure> {
        self.ci
            .as_ref()
            .ok_or_else(|| CheckFailure::new(format!("{} was not loaded", Sources::CI_FILE)))
    }

    pub fn readme(&self) -> Result<&Readme, CheckFailure> {
        self.readme
            .as_ref()
            .ok_or_else(|| CheckFailure::new(format!("{} was not loaded", Sources::README_FILE)))
    }
}
