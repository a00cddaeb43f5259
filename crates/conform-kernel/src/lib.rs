//! # Conform Kernel
//!
//! Organizational convention checks for `@gramex/*` packages.
//!
//! A run reads three documents (`package.json`, `.gitlab-ci.yml`,
//! `README.md`), executes an ordered list of named checks against them, and
//! streams a TAP 14 report. Each check is isolated: a failure becomes a
//! `not ok` line and the run moves on.
//!
//! ## Architecture
//!
//! ```text
//! Policy            ← Variant preset + config overrides
//!     │
//! rules             ← Registers every check for a policy
//!     │
//! Runner<C>         ← Ordered checks, isolated execution, TAP output
//!     │
//! CheckContext      ← Sources + documents loaded by earlier checks
//! ```

pub mod context;
pub mod documents;
pub mod error;
pub mod policy;
pub mod report;
pub mod rules;
pub mod runner;

pub use context::{CheckContext, Source, Sources};
pub use documents::{CiConfig, Heading, Manifest, Readme};
pub use error::{CheckFailure, CheckResult, ConformError};
pub use policy::{ConformConfig, Policy, PolicyOverrides, Variant};
pub use report::{TapWriter, summary_json};
pub use rules::runner_for;
pub use runner::{CheckOutcome, Outcome, RunSummary, Runner};
