//! `.gitlab-ci.yml` as a map of job name to job definition.

use crate::error::CheckFailure;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct CiConfig {
    jobs: BTreeMap<String, Value>,
}

fn yaml_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Render a YAML scalar the way a CI variable would be seen by the job.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

impl CiConfig {
    /// Parse CI text. The document must be a non-empty mapping.
    pub fn parse(text: &str) -> Result<Self, CheckFailure> {
        let value: Value = serde_yaml::from_str(text)
            .map_err(|err| CheckFailure::new(format!("invalid YAML: {err}")))?;
        match value {
            Value::Mapping(map) if !map.is_empty() => Ok(Self::from_mapping(map)),
            Value::Mapping(_) | Value::Null => {
                Err(CheckFailure::new("document is empty".to_string()))
            }
            other => Err(CheckFailure::new(format!(
                "top-level value must be a mapping, found {}",
                yaml_kind(&other)
            ))),
        }
    }

    fn from_mapping(map: Mapping) -> Self {
        let jobs = map
            .into_iter()
            .filter_map(|(key, value)| key.as_str().map(|name| (name.to_string(), value)))
            .collect();
        Self { jobs }
    }

    pub fn job(&self, name: &str) -> Option<&Value> {
        self.jobs.get(name)
    }

    pub fn job_names(&self) -> impl Iterator<Item = &str> {
        self.jobs.keys().map(String::as_str)
    }

    /// A string-valued key of a job, e.g. `deploy.script`.
    pub fn job_str(&self, job: &str, key: &str) -> Option<&str> {
        self.job(job)?.get(key)?.as_str()
    }

    /// A job's `variables` mapping, with scalar values rendered as text.
    pub fn job_variables(&self, job: &str) -> Option<BTreeMap<String, String>> {
        let vars = self.job(job)?.get("variables")?.as_mapping()?;
        Some(
            vars.iter()
                .filter_map(|(key, value)| Some((key.as_str()?.to_string(), scalar_text(value)?)))
                .collect(),
        )
    }
}

/// Build a flat string mapping, used to compare a job against a fixed shape.
pub fn string_mapping<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Value {
    let mut map = Mapping::new();
    for (key, value) in pairs {
        map.insert(Value::String(key.to_string()), Value::String(value.to_string()));
    }
    Value::Mapping(map)
}
