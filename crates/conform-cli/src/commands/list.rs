use crate::support;
use conform_kernel::{Variant, runner_for};
use serde_json::json;
use std::path::PathBuf;

pub fn run(root: String, variant: Option<Variant>, config: Option<String>, json_output: bool) {
    let root = PathBuf::from(root);
    let policy = support::policy_or_exit(&root, config.as_deref(), variant);
    let runner = runner_for(&policy);

    if json_output {
        let checks: Vec<_> = runner
            .checks()
            .map(|check| json!({"id": check.id, "description": check.description}))
            .collect();
        let payload = json!({
            "schema": 1,
            "variant": policy.variant.as_str(),
            "total": runner.len(),
            "checks": checks,
        });
        let rendered = serde_json::to_string_pretty(&payload).unwrap_or_else(|err| {
            eprintln!("error: failed to render check list: {err}");
            std::process::exit(2);
        });
        println!("{rendered}");
    } else {
        println!("[conform] variant={} checks={}", policy.variant, runner.len());
        for check in runner.checks() {
            println!("  {:>2} - {}", check.id, check.description);
        }
    }
}
