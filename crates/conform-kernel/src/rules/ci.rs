//! `.gitlab-ci.yml` conventions.

use crate::context::{CheckContext, Sources};
use crate::documents::ci::string_mapping;
use crate::documents::{CiConfig, Manifest};
use crate::error::{CheckFailure, CheckResult, ensure_eq};
use crate::policy::Policy;
use crate::runner::Runner;
use serde_yaml::Value;
use std::rc::Rc;

const VALIDATE_JOB: &str = "validate";
const DEPLOY_JOB: &str = "deploy";

fn render(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
}

pub fn load(ctx: &mut CheckContext) -> CheckResult {
    ctx.ci = None;
    let ci = CiConfig::parse(ctx.sources.ci.text()?)?;
    log::info!("loaded {}", ctx.sources.ci.label);
    ctx.ci = Some(ci);
    Ok(())
}

pub fn validate_job(ci: &CiConfig, p: &Policy) -> CheckResult {
    let expected = string_mapping([
        ("image", p.validate_image.as_str()),
        ("script", p.validate_script.as_str()),
    ]);
    match ci.job(VALIDATE_JOB) {
        Some(actual) if *actual == expected => Ok(()),
        Some(actual) => Err(CheckFailure::new(format!(
            "{VALIDATE_JOB} job is {}, expected {}",
            render(actual),
            render(&expected)
        ))),
        None => Err(CheckFailure::new(format!(
            "{VALIDATE_JOB} job is missing, expected {}",
            render(&expected)
        ))),
    }
}

pub fn deploy_job(manifest: &Manifest, ci: &CiConfig, p: &Policy) -> CheckResult {
    if manifest.homepage.as_deref().is_none_or(str::is_empty) {
        return Ok(());
    }
    if ci.job(DEPLOY_JOB).is_none() {
        return Err(CheckFailure::new(format!("{DEPLOY_JOB} job is missing")));
    }
    ensure_eq(
        &format!("{DEPLOY_JOB}.script"),
        ci.job_str(DEPLOY_JOB, "script"),
        &p.deploy_script,
    )?;
    let variables = ci.job_variables(DEPLOY_JOB).ok_or_else(|| {
        CheckFailure::new(format!("{DEPLOY_JOB}.variables is missing"))
    })?;
    let slug = manifest.name_slug().ok_or_else(|| {
        CheckFailure::new("name has no second path segment, cannot derive deploy URL".to_string())
    })?;
    let site = p.site_slug(slug);
    let expected = [
        ("SERVER", p.deploy_server.as_str()),
        ("URL", site.as_str()),
        ("VERSION", p.deploy_version.as_str()),
        ("SETUP", p.deploy_setup.as_str()),
    ];
    for (key, value) in expected {
        ensure_eq(
            &format!("{DEPLOY_JOB}.variables.{key}"),
            variables.get(key).map(String::as_str),
            value,
        )?;
    }
    Ok(())
}

pub fn register(runner: &mut Runner<CheckContext>, policy: &Rc<Policy>) {
    let file = Sources::CI_FILE;
    runner.register(format!("{file} should be a valid YAML file"), load);

    let p = Rc::clone(policy);
    runner.register(format!("{file} should validate build errors"), move |ctx| {
        validate_job(ctx.ci()?, &p)
    });

    let p = Rc::clone(policy);
    runner.register(
        format!("{file} should deploy to package.homepage as static (if defined)"),
        move |ctx| deploy_job(ctx.manifest()?, ctx.ci()?, &p),
    );
}
