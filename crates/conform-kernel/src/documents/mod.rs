//! Typed models of the three documents under validation.

pub mod ci;
pub mod manifest;
pub mod readme;

pub use ci::CiConfig;
pub use manifest::{Manifest, PrettierConfig, PublishConfig, Repository};
pub use readme::{Heading, Readme};
