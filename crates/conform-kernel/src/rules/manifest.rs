//! `package.json` conventions.

use crate::context::{CheckContext, Sources};
use crate::documents::Manifest;
use crate::error::{CheckFailure, CheckResult, ensure, ensure_eq};
use crate::policy::{BrowserRule, EntryField, Policy};
use crate::runner::Runner;
use glob::{MatchOptions, Pattern};
use regex::Regex;
use semver::Version;
use std::rc::Rc;

type ManifestCheck = fn(&Manifest, &Policy) -> CheckResult;

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

fn on_manifest(
    runner: &mut Runner<CheckContext>,
    policy: &Rc<Policy>,
    description: String,
    check: ManifestCheck,
) {
    let policy = Rc::clone(policy);
    runner.register(description, move |ctx| check(ctx.manifest()?, &policy));
}

/// A present, non-empty string field.
fn required<'a>(value: Option<&'a str>, label: &str) -> Result<&'a str, CheckFailure> {
    match value {
        Some(text) if !text.is_empty() => Ok(text),
        Some(_) => Err(CheckFailure::new(format!("{label:?} is empty"))),
        None => Err(CheckFailure::new(format!("{label:?} is missing"))),
    }
}

/// Strict semver after trimming whitespace and at most one leading `v`.
pub fn parse_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    Version::parse(trimmed.strip_prefix('v').unwrap_or(trimmed)).ok()
}

/// Whether `script` runs `command` as a whole shell word sequence.
pub fn invokes(script: &str, command: &str) -> bool {
    let words: Vec<String> = command.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return false;
    }
    let pattern = format!(r"(?:^|[\s;&|(]){}(?:$|[\s;&|)])", words.join(r"\s+"));
    Regex::new(&pattern).is_ok_and(|re| re.is_match(script))
}

/// Whether any glob in `patterns` matches `path`. Invalid globs match nothing.
pub fn any_pattern_matches(patterns: &[String], path: &str) -> bool {
    patterns.iter().any(|pattern| {
        Pattern::new(pattern).is_ok_and(|glob| glob.matches_with(path, GLOB_OPTIONS))
    })
}

pub fn load(ctx: &mut CheckContext) -> CheckResult {
    ctx.manifest = None;
    let manifest = Manifest::parse(ctx.sources.manifest.text()?)?;
    log::info!("loaded {}", ctx.sources.manifest.label);
    ctx.manifest = Some(manifest);
    Ok(())
}

pub fn name(m: &Manifest, p: &Policy) -> CheckResult {
    let name = required(m.name.as_deref(), "name")?;
    ensure(name.starts_with(&p.scope_prefix), || {
        format!("name {name:?} does not start with {:?}", p.scope_prefix)
    })
}

pub fn version(m: &Manifest, p: &Policy) -> CheckResult {
    let raw = required(m.version.as_deref(), "version")?;
    let parsed = parse_version(raw)
        .ok_or_else(|| CheckFailure::new(format!("version {raw:?} is not valid semver")))?;
    ensure(parsed >= p.version_floor, || {
        format!("version {parsed} is below {}", p.version_floor)
    })
}

pub fn description(m: &Manifest, _: &Policy) -> CheckResult {
    required(m.description.as_deref(), "description").map(|_| ())
}

pub fn module(m: &Manifest, p: &Policy) -> CheckResult {
    let module = required(m.module.as_deref(), "module")?;
    ensure(module.starts_with(&p.module_dir), || {
        format!("module {module:?} does not begin with {:?}", p.module_dir)
    })?;
    ensure(module.ends_with(&p.script_ext), || {
        format!("module {module:?} does not end with {:?}", p.script_ext)
    })
}

fn entry_value(m: &Manifest, field: EntryField) -> Option<&str> {
    match field {
        EntryField::Browser => m.browser.as_deref(),
        EntryField::Main => m.main.as_deref(),
    }
}

fn minified_field(m: &Manifest, p: &Policy, field: EntryField) -> CheckResult {
    let key = field.key();
    let actual = required(entry_value(m, field), key)?;
    let module = required(m.module.as_deref(), "module")?;
    let expected = p.minified_path(module).ok_or_else(|| {
        CheckFailure::new(format!(
            "module {module:?} does not end with {:?}, cannot derive {key}",
            p.script_ext
        ))
    })?;
    ensure_eq(key, Some(actual), &expected)
}

pub fn minified_entry(m: &Manifest, p: &Policy) -> CheckResult {
    minified_field(m, p, p.minified_entry)
}

pub fn browser(m: &Manifest, p: &Policy) -> CheckResult {
    match p.browser_rule {
        Some(BrowserRule::Absent) => ensure(!m.has("browser"), || {
            "browser is defined, expected it to be absent".to_string()
        }),
        Some(BrowserRule::Minified) => minified_field(m, p, EntryField::Browser),
        None => Ok(()),
    }
}

fn scripts_present(m: &Manifest) -> CheckResult {
    ensure(m.scripts.is_some(), || "scripts is missing".to_string())
}

pub fn build_script(m: &Manifest, _: &Policy) -> CheckResult {
    scripts_present(m)?;
    required(m.script("build"), "scripts.build").map(|_| ())
}

pub fn prepublish_only(m: &Manifest, p: &Policy) -> CheckResult {
    scripts_present(m)?;
    ensure_eq("scripts.prepublishOnly", m.script("prepublishOnly"), &p.prepublish_only)
}

pub fn lint_script(m: &Manifest, p: &Policy) -> CheckResult {
    scripts_present(m)?;
    let lint = required(m.script("lint"), "scripts.lint")?;
    let missing: Vec<&str> = p
        .lint_tools
        .iter()
        .map(String::as_str)
        .filter(|tool| !lint.contains(tool))
        .collect();
    ensure(missing.is_empty(), || {
        format!("scripts.lint {lint:?} does not run {}", missing.join(", "))
    })
}

pub fn no_prepublish(m: &Manifest, _: &Policy) -> CheckResult {
    ensure(m.script("prepublish").is_none(), || {
        "scripts.prepublish is defined; use prepublishOnly instead".to_string()
    })
}

pub fn pretest(m: &Manifest, p: &Policy) -> CheckResult {
    if m.script("test").is_none() {
        return Ok(());
    }
    match m.script("pretest") {
        None => Ok(()),
        Some(pretest) => ensure(invokes(pretest, &p.build_command), || {
            format!("scripts.pretest {pretest:?} does not run {:?}", p.build_command)
        }),
    }
}

pub fn files(m: &Manifest, _: &Policy) -> CheckResult {
    let patterns = m.files.as_ref().ok_or_else(|| match m.kind_of("files") {
        Some(kind) => CheckFailure::new(format!("files must be an array, found {kind}")),
        None => CheckFailure::new("files is missing".to_string()),
    })?;
    let mut required_paths = vec![Sources::README_FILE];
    required_paths.extend(m.module.as_deref());
    required_paths.extend(m.browser.as_deref());
    let unmatched: Vec<String> = required_paths
        .into_iter()
        .filter(|path| !any_pattern_matches(patterns, path))
        .map(|path| format!("{path:?}"))
        .collect();
    ensure(unmatched.is_empty(), || {
        format!("files has no pattern matching {}", unmatched.join(", "))
    })
}

pub fn repository(m: &Manifest, p: &Policy) -> CheckResult {
    let repo = m.repository.as_ref().ok_or_else(|| match m.kind_of("repository") {
        Some(kind) => CheckFailure::new(format!("repository must be an object, found {kind}")),
        None => CheckFailure::new("repository is missing".to_string()),
    })?;
    ensure_eq("repository.type", repo.kind.as_deref(), &p.repository_type)?;
    let url = required(repo.url.as_deref(), "repository.url")?;
    ensure(url.starts_with(&p.repository_prefix), || {
        format!(
            "repository.url {url:?} does not start with {:?}",
            p.repository_prefix
        )
    })
}

pub fn keywords(m: &Manifest, _: &Policy) -> CheckResult {
    ensure(m.keywords.is_some(), || match m.kind_of("keywords") {
        Some(kind) => format!("keywords must be an array, found {kind}"),
        None => "keywords is missing".to_string(),
    })
}

pub fn author(m: &Manifest, _: &Policy) -> CheckResult {
    required(m.author.as_deref(), "author").map(|_| ())
}

pub fn license(m: &Manifest, p: &Policy) -> CheckResult {
    ensure_eq("license", m.license.as_deref(), &p.license)
}

pub fn bugs(m: &Manifest, p: &Policy) -> CheckResult {
    let bugs_url = required(m.bugs_url.as_deref(), "bugs.url")?;
    let repo_url = m
        .repository
        .as_ref()
        .and_then(|repo| repo.url.as_deref())
        .ok_or_else(|| {
            CheckFailure::new("repository.url is missing, cannot derive bugs.url".to_string())
        })?;
    ensure_eq("bugs.url", Some(bugs_url), &p.bugs_url(repo_url))
}

pub fn prettier(m: &Manifest, p: &Policy) -> CheckResult {
    let prettier = m
        .prettier
        .as_ref()
        .ok_or_else(|| CheckFailure::new("prettier is missing".to_string()))?;
    let width = prettier
        .print_width
        .ok_or_else(|| CheckFailure::new("prettier.printWidth is missing".to_string()))?;
    ensure(width >= p.min_print_width as f64, || {
        format!(
            "prettier.printWidth {width} is below {}",
            p.min_print_width
        )
    })
}

pub fn homepage(m: &Manifest, p: &Policy) -> CheckResult {
    let Some(homepage) = m.homepage.as_deref().filter(|url| !url.is_empty()) else {
        return Ok(());
    };
    let slug = m.name_slug().ok_or_else(|| {
        CheckFailure::new("name has no second path segment, cannot derive homepage".to_string())
    })?;
    ensure_eq("homepage", Some(homepage), &p.homepage_url(slug))
}

pub fn publish_config(m: &Manifest, p: &Policy) -> CheckResult {
    let config = m
        .publish_config
        .as_ref()
        .ok_or_else(|| CheckFailure::new("publishConfig is missing".to_string()))?;
    ensure_eq("publishConfig.access", config.access.as_deref(), &p.publish_access)?;
    ensure_eq("publishConfig.registry", config.registry.as_deref(), &p.registry)
}

pub fn register(runner: &mut Runner<CheckContext>, policy: &Rc<Policy>) {
    let p: &Policy = policy;
    let file = Sources::MANIFEST_FILE;

    runner.register(format!("{file} should be a valid JSON file"), load);
    on_manifest(
        runner,
        policy,
        format!(r#"{file} "name" property should start with "{}""#, p.scope_prefix),
        name,
    );
    on_manifest(
        runner,
        policy,
        format!(
            r#"{file} "version" should be a valid semver and at least {}"#,
            p.version_floor
        ),
        version,
    );
    on_manifest(
        runner,
        policy,
        format!(r#"{file} "description" property should exist"#),
        description,
    );
    on_manifest(
        runner,
        policy,
        format!(
            r#"{file} "module" should begin with "{}" and end with "{}""#,
            p.module_dir, p.script_ext
        ),
        module,
    );
    on_manifest(
        runner,
        policy,
        format!(
            r#"{file} "{}" should be the same as "module" but end with "{}" instead of "{}""#,
            p.minified_entry.key(),
            p.minified_ext,
            p.script_ext
        ),
        minified_entry,
    );
    if p.minified_entry != EntryField::Browser {
        match p.browser_rule {
            Some(BrowserRule::Absent) => on_manifest(
                runner,
                policy,
                format!(r#"{file} "browser" should not be defined"#),
                browser,
            ),
            Some(BrowserRule::Minified) => on_manifest(
                runner,
                policy,
                format!(
                    r#"{file} "browser" should be the same as "module" but end with "{}" instead of "{}""#,
                    p.minified_ext, p.script_ext
                ),
                browser,
            ),
            None => {}
        }
    }
    on_manifest(
        runner,
        policy,
        format!(r#"{file} "scripts.build" should be defined"#),
        build_script,
    );
    on_manifest(
        runner,
        policy,
        format!(
            r#"{file} "scripts.prepublishOnly" should run "{}""#,
            p.prepublish_only
        ),
        prepublish_only,
    );
    on_manifest(
        runner,
        policy,
        format!(
            r#"{file} "scripts.lint" should run {}"#,
            p.lint_tools.join(" and ")
        ),
        lint_script,
    );
    on_manifest(
        runner,
        policy,
        format!(r#"{file} "scripts.prepublish" should not be defined"#),
        no_prepublish,
    );
    on_manifest(
        runner,
        policy,
        format!(
            r#"{file} "scripts.pretest" should run "{}" (if "scripts.test" is defined)"#,
            p.build_command
        ),
        pretest,
    );
    on_manifest(
        runner,
        policy,
        format!(r#"{file} "files" should include "{}", module, browser"#, Sources::README_FILE),
        files,
    );
    on_manifest(
        runner,
        policy,
        format!(
            r#"{file} "repository" should point to a {{type: {}, url: "{}..."}}"#,
            p.repository_type, p.repository_prefix
        ),
        repository,
    );
    on_manifest(
        runner,
        policy,
        format!(r#"{file} "keywords" should be defined"#),
        keywords,
    );
    on_manifest(
        runner,
        policy,
        format!(r#"{file} "author" should be defined"#),
        author,
    );
    on_manifest(
        runner,
        policy,
        format!(r#"{file} "license" should be "{}""#, p.license),
        license,
    );
    on_manifest(
        runner,
        policy,
        format!(
            r#"{file} "bugs" should point the same code base as repository, but with "{}" added"#,
            p.issues_path
        ),
        bugs,
    );
    on_manifest(
        runner,
        policy,
        format!(
            r#"{file} "prettier" should have a "printWidth" of {} or more"#,
            p.min_print_width
        ),
        prettier,
    );
    on_manifest(
        runner,
        policy,
        format!(
            r#"{file} "homepage" is at {}{}<name>/ (if defined)"#,
            p.homepage_base, p.homepage_slug_prefix
        ),
        homepage,
    );
    on_manifest(
        runner,
        policy,
        format!(r#"{file} "publishConfig" should push to {}"#, p.registry),
        publish_config,
    );
}
