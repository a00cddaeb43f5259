//! Convention parameters.
//!
//! The three historical checker flavours differ only in which entry field
//! carries the minified bundle, what is required of `browser`, where the
//! repository lives, and what `prepublishOnly` runs. Everything else is shared.
//! A `Variant` picks the preset; a TOML config may override individual values.

use crate::error::ConformError;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// `browser` is the minified bundle; repository on the GitLab host.
    #[default]
    Browser,
    /// `main` is the minified bundle and `browser` must be absent.
    Main,
    /// `main` is the minified bundle, `browser` mirrors it; repository on GitHub.
    Github,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Browser, Variant::Main, Variant::Github];

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Browser => "browser",
            Variant::Main => "main",
            Variant::Github => "github",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = ConformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|variant| variant.as_str() == s.trim())
            .ok_or_else(|| ConformError::UnknownVariant(s.to_string()))
    }
}

/// The manifest field that must hold the minified bundle path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryField {
    Browser,
    Main,
}

impl EntryField {
    pub fn key(self) -> &'static str {
        match self {
            EntryField::Browser => "browser",
            EntryField::Main => "main",
        }
    }
}

/// What the `browser` field must look like when it is not the minified entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserRule {
    Absent,
    Minified,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub variant: Variant,
    pub scope_prefix: String,
    pub version_floor: Version,
    pub module_dir: String,
    pub script_ext: String,
    pub minified_ext: String,
    pub minified_entry: EntryField,
    pub browser_rule: Option<BrowserRule>,
    pub prepublish_only: String,
    pub build_command: String,
    pub lint_tools: Vec<String>,
    pub repository_type: String,
    pub repository_prefix: String,
    pub issues_path: String,
    pub license: String,
    pub min_print_width: u64,
    pub homepage_base: String,
    pub homepage_slug_prefix: String,
    pub publish_access: String,
    pub registry: String,
    pub validate_image: String,
    pub validate_script: String,
    pub deploy_script: String,
    pub deploy_server: String,
    pub deploy_version: String,
    pub deploy_setup: String,
    pub example_heading: String,
    pub installation_heading: String,
    pub api_heading: String,
    pub closing_headings: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

impl Policy {
    pub fn for_variant(variant: Variant) -> Self {
        let (minified_entry, browser_rule, repository_prefix, issues_path, prepublish_only) =
            match variant {
                Variant::Browser => (
                    EntryField::Browser,
                    None,
                    "git+https://code.gramener.com/",
                    "/-/issues",
                    "npm run lint && npm run build",
                ),
                Variant::Main => (
                    EntryField::Main,
                    Some(BrowserRule::Absent),
                    "git+https://code.gramener.com/",
                    "/-/issues",
                    "npm run lint && npm run build",
                ),
                Variant::Github => (
                    EntryField::Main,
                    Some(BrowserRule::Minified),
                    "git+https://github.com/gramener/",
                    "/issues",
                    "npm run lint && npm test",
                ),
            };

        Self {
            variant,
            scope_prefix: "@gramex/".to_string(),
            version_floor: Version::new(1, 0, 0),
            module_dir: "dist/".to_string(),
            script_ext: ".js".to_string(),
            minified_ext: ".min.js".to_string(),
            minified_entry,
            browser_rule,
            prepublish_only: prepublish_only.to_string(),
            build_command: "npm run build".to_string(),
            lint_tools: strings(&["prettier", "eslint"]),
            repository_type: "git".to_string(),
            repository_prefix: repository_prefix.to_string(),
            issues_path: issues_path.to_string(),
            license: "MIT".to_string(),
            min_print_width: 100,
            homepage_base: "https://gramener.com/".to_string(),
            homepage_slug_prefix: "gramex-".to_string(),
            publish_access: "public".to_string(),
            registry: "https://registry.npmjs.org/".to_string(),
            validate_image: "gramener/builderrors".to_string(),
            validate_script: "builderrors".to_string(),
            deploy_script: "deploy".to_string(),
            deploy_server: "gramener.com".to_string(),
            deploy_version: "static".to_string(),
            deploy_setup: "npm install && npm run build".to_string(),
            example_heading: "Example".to_string(),
            installation_heading: "Installation".to_string(),
            api_heading: "API".to_string(),
            closing_headings: strings(&["Release notes", "Authors", "License"]),
        }
    }

    /// `dist/index.js` → `dist/index.min.js`. `None` unless the path carries
    /// the script extension.
    pub fn minified_path(&self, module: &str) -> Option<String> {
        module
            .strip_suffix(self.script_ext.as_str())
            .map(|stem| format!("{stem}{}", self.minified_ext))
    }

    /// `git+https://host/x/y.git` → `https://host/x/y` + issues path.
    pub fn bugs_url(&self, repository_url: &str) -> String {
        let base = repository_url
            .strip_prefix("git+")
            .unwrap_or(repository_url);
        let base = base.strip_suffix(".git").unwrap_or(base);
        format!("{base}{}", self.issues_path)
    }

    /// The site slug for a package: `charts` → `gramex-charts`.
    pub fn site_slug(&self, name_slug: &str) -> String {
        format!("{}{name_slug}", self.homepage_slug_prefix)
    }

    /// `charts` → `https://gramener.com/gramex-charts/`.
    pub fn homepage_url(&self, name_slug: &str) -> String {
        format!("{}{}/", self.homepage_base, self.site_slug(name_slug))
    }

    pub fn with_overrides(self, overrides: &PolicyOverrides) -> Result<Self, ConformError> {
        let mut policy = self;
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = &overrides.$field {
                    policy.$field = value.clone();
                })*
            };
        }
        take!(
            scope_prefix,
            module_dir,
            prepublish_only,
            repository_prefix,
            issues_path,
            license,
            homepage_base,
            homepage_slug_prefix,
            registry,
            validate_image,
            validate_script,
            deploy_script,
            deploy_server,
            deploy_version,
            deploy_setup,
            closing_headings,
        );
        if let Some(width) = overrides.min_print_width {
            policy.min_print_width = width;
        }
        if let Some(floor) = &overrides.version_floor {
            policy.version_floor =
                Version::parse(floor.trim()).map_err(|err| ConformError::InvalidPolicy {
                    field: "version_floor",
                    reason: format!("{floor:?}: {err}"),
                })?;
        }
        if policy.closing_headings.is_empty() {
            return Err(ConformError::InvalidPolicy {
                field: "closing_headings",
                reason: "at least one heading required".to_string(),
            });
        }
        Ok(policy)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::for_variant(Variant::default())
    }
}

/// Optional per-value overrides, read from the `[policy]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyOverrides {
    pub scope_prefix: Option<String>,
    pub version_floor: Option<String>,
    pub module_dir: Option<String>,
    pub prepublish_only: Option<String>,
    pub repository_prefix: Option<String>,
    pub issues_path: Option<String>,
    pub license: Option<String>,
    pub min_print_width: Option<u64>,
    pub homepage_base: Option<String>,
    pub homepage_slug_prefix: Option<String>,
    pub registry: Option<String>,
    pub validate_image: Option<String>,
    pub validate_script: Option<String>,
    pub deploy_script: Option<String>,
    pub deploy_server: Option<String>,
    pub deploy_version: Option<String>,
    pub deploy_setup: Option<String>,
    pub closing_headings: Option<Vec<String>>,
}

/// Contents of `conform.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConformConfig {
    pub variant: Option<Variant>,
    pub policy: PolicyOverrides,
}

impl ConformConfig {
    pub const FILE_NAME: &'static str = "conform.toml";

    pub fn parse(text: &str, path: &Path) -> Result<Self, ConformError> {
        toml::from_str(text).map_err(|source| ConformError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConformError> {
        let text = fs::read_to_string(path).map_err(|source| ConformError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Resolve the effective policy. An explicit variant beats the file's.
    pub fn policy(&self, variant: Option<Variant>) -> Result<Policy, ConformError> {
        let variant = variant.or(self.variant).unwrap_or_default();
        Policy::for_variant(variant).with_overrides(&self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minified_path_swaps_extension() {
        let policy = Policy::default();
        assert_eq!(
            policy.minified_path("dist/index.js").as_deref(),
            Some("dist/index.min.js")
        );
        assert_eq!(policy.minified_path("dist/index.mjs"), None);
    }

    #[test]
    fn bugs_url_from_repository() {
        let policy = Policy::default();
        assert_eq!(
            policy.bugs_url("git+https://code.gramener.com/x/y.git"),
            "https://code.gramener.com/x/y/-/issues"
        );
        let github = Policy::for_variant(Variant::Github);
        assert_eq!(
            github.bugs_url("git+https://github.com/gramener/gramex-charts.git"),
            "https://github.com/gramener/gramex-charts/issues"
        );
    }

    #[test]
    fn homepage_from_slug() {
        assert_eq!(
            Policy::default().homepage_url("charts"),
            "https://gramener.com/gramex-charts/"
        );
    }

    #[test]
    fn variants_parse_by_name() {
        assert_eq!("main".parse::<Variant>().expect("known"), Variant::Main);
        assert!(matches!(
            "beta".parse::<Variant>(),
            Err(ConformError::UnknownVariant(name)) if name == "beta"
        ));
    }

    #[test]
    fn config_overrides_apply_over_variant() {
        let config = ConformConfig::parse(
            r#"
variant = "github"

[policy]
license = "Apache-2.0"
version_floor = "2.0.0"
"#,
            Path::new("conform.toml"),
        )
        .expect("config should parse");
        let policy = config.policy(None).expect("policy should resolve");
        assert_eq!(policy.variant, Variant::Github);
        assert_eq!(policy.license, "Apache-2.0");
        assert_eq!(policy.version_floor, Version::new(2, 0, 0));
        assert_eq!(policy.issues_path, "/issues");

        let policy = config.policy(Some(Variant::Main)).expect("policy should resolve");
        assert_eq!(policy.variant, Variant::Main);
        assert_eq!(policy.browser_rule, Some(BrowserRule::Absent));
    }

    #[test]
    fn bad_floor_and_unknown_keys_are_rejected() {
        let config = ConformConfig::parse(
            "[policy]\nversion_floor = \"one\"\n",
            Path::new("conform.toml"),
        )
        .expect("shape is valid");
        assert!(matches!(
            config.policy(None),
            Err(ConformError::InvalidPolicy { field: "version_floor", .. })
        ));

        assert!(matches!(
            ConformConfig::parse("colour = 1\n", Path::new("conform.toml")),
            Err(ConformError::ConfigParse { .. })
        ));
    }
}
