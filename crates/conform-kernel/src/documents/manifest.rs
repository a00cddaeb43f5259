//! Typed view of `package.json`.
//!
//! Every field is optional. A field holding the wrong JSON type is treated as
//! absent; the raw object is kept so checks can still tell "missing" from
//! "present but malformed" when they word a failure.

use crate::error::CheckFailure;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub kind: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrettierConfig {
    pub print_width: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    pub access: Option<String>,
    pub registry: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub module: Option<String>,
    pub main: Option<String>,
    pub browser: Option<String>,
    pub scripts: Option<BTreeMap<String, String>>,
    pub files: Option<Vec<String>>,
    pub repository: Option<Repository>,
    pub keywords: Option<Vec<String>>,
    /// A string author, or the first of `name`, `email`, `url` set on a person object.
    pub author: Option<String>,
    pub license: Option<String>,
    pub bugs_url: Option<String>,
    pub prettier: Option<PrettierConfig>,
    pub homepage: Option<String>,
    pub publish_config: Option<PublishConfig>,
    raw: Map<String, Value>,
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let rows = value.and_then(Value::as_array)?;
    Some(
        rows.iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

/// Name a JSON value's type the way failure messages talk about it.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Manifest {
    /// Parse manifest text. The top level must be a JSON object.
    pub fn parse(text: &str) -> Result<Self, CheckFailure> {
        let value: Value = serde_json::from_str(text)
            .map_err(|err| CheckFailure::new(format!("invalid JSON: {err}")))?;
        match value {
            Value::Object(map) => Ok(Self::from_object(map)),
            other => Err(CheckFailure::new(format!(
                "top-level value must be an object, found {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn from_object(map: Map<String, Value>) -> Self {
        let scripts = map.get("scripts").and_then(Value::as_object).map(|rows| {
            rows.iter()
                .filter_map(|(key, value)| value.as_str().map(|cmd| (key.clone(), cmd.to_string())))
                .collect()
        });
        let repository = map
            .get("repository")
            .and_then(Value::as_object)
            .map(|repo| Repository {
                kind: string_field(repo, "type"),
                url: string_field(repo, "url"),
            });
        let author = match map.get("author") {
            Some(Value::String(name)) => Some(name.clone()),
            Some(Value::Object(person)) => ["name", "email", "url"]
                .into_iter()
                .find_map(|key| string_field(person, key).filter(|text| !text.is_empty())),
            _ => None,
        };
        let bugs_url = match map.get("bugs") {
            Some(Value::Object(bugs)) => string_field(bugs, "url"),
            _ => None,
        };
        let prettier = map
            .get("prettier")
            .and_then(Value::as_object)
            .map(|cfg| PrettierConfig {
                print_width: cfg.get("printWidth").and_then(Value::as_f64),
            });
        let publish_config = map
            .get("publishConfig")
            .and_then(Value::as_object)
            .map(|cfg| PublishConfig {
                access: string_field(cfg, "access"),
                registry: string_field(cfg, "registry"),
            });

        Self {
            name: string_field(&map, "name"),
            version: string_field(&map, "version"),
            description: string_field(&map, "description"),
            module: string_field(&map, "module"),
            main: string_field(&map, "main"),
            browser: string_field(&map, "browser"),
            scripts,
            files: string_list(map.get("files")),
            repository,
            keywords: string_list(map.get("keywords")),
            author,
            license: string_field(&map, "license"),
            bugs_url,
            prettier,
            homepage: string_field(&map, "homepage"),
            publish_config,
            raw: map,
        }
    }

    /// Whether `key` is present with a non-null value, whatever its type.
    pub fn has(&self, key: &str) -> bool {
        self.raw.get(key).is_some_and(|value| !value.is_null())
    }

    /// The JSON type of `key`, if present.
    pub fn kind_of(&self, key: &str) -> Option<&'static str> {
        self.raw.get(key).map(json_kind)
    }

    pub fn script(&self, key: &str) -> Option<&str> {
        self.scripts.as_ref()?.get(key).map(String::as_str)
    }

    /// Second `/`-separated segment of the name: `@gramex/charts` → `charts`.
    pub fn name_slug(&self) -> Option<&str> {
        self.name.as_deref()?.split('/').nth(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_types_read_as_absent() {
        let manifest = Manifest::parse(
            r#"{"name": 3, "files": "dist", "repository": "gitlab:x/y", "browser": {"a": false}}"#,
        )
        .expect("object manifest should parse");
        assert_eq!(manifest.name, None);
        assert_eq!(manifest.files, None);
        assert_eq!(manifest.repository, None);
        assert_eq!(manifest.browser, None);
        assert!(manifest.has("browser"));
        assert_eq!(manifest.kind_of("repository"), Some("string"));
    }

    #[test]
    fn top_level_must_be_object() {
        let err = Manifest::parse("[1, 2]").unwrap_err();
        assert_eq!(err.message, "top-level value must be an object, found array");
        assert!(Manifest::parse("{").unwrap_err().message.starts_with("invalid JSON"));
    }

    #[test]
    fn author_accepts_person_object() {
        let manifest = Manifest::parse(r#"{"author": {"name": "S Anand", "email": "a@b"}}"#)
            .expect("manifest should parse");
        assert_eq!(manifest.author.as_deref(), Some("S Anand"));

        let manifest = Manifest::parse(r#"{"author": {"email": "s.anand@gramener.com"}}"#)
            .expect("manifest should parse");
        assert_eq!(manifest.author.as_deref(), Some("s.anand@gramener.com"));

        let manifest = Manifest::parse(r#"{"author": {}}"#).expect("manifest should parse");
        assert_eq!(manifest.author, None);
    }

    #[test]
    fn name_slug_is_second_segment() {
        let manifest = Manifest::parse(r#"{"name": "@gramex/charts"}"#).expect("parse");
        assert_eq!(manifest.name_slug(), Some("charts"));
        let manifest = Manifest::parse(r#"{"name": "charts"}"#).expect("parse");
        assert_eq!(manifest.name_slug(), None);
    }
}
