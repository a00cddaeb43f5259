use crate::support;
use conform_kernel::{CheckContext, Variant, runner_for, summary_json};
use std::io;
use std::path::PathBuf;

pub struct Args {
    pub root: String,
    pub manifest: Option<String>,
    pub ci: Option<String>,
    pub readme: Option<String>,
    pub variant: Option<Variant>,
    pub config: Option<String>,
    pub json: bool,
}

pub fn run(args: Args) {
    let root = PathBuf::from(&args.root);
    let policy = support::policy_or_exit(&root, args.config.as_deref(), args.variant);
    let runner = runner_for(&policy);
    let mut ctx = CheckContext::new(support::sources(
        &root,
        args.manifest.as_deref(),
        args.ci.as_deref(),
        args.readme.as_deref(),
    ));

    let summary = if args.json {
        let summary = runner.run_silent(&mut ctx);
        let payload = summary_json(&summary, policy.variant.as_str());
        let rendered = serde_json::to_string_pretty(&payload).unwrap_or_else(|err| {
            eprintln!("error: failed to render check payload: {err}");
            std::process::exit(2);
        });
        println!("{rendered}");
        summary
    } else {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        runner.run(&mut ctx, &mut out).unwrap_or_else(|err| {
            eprintln!("error: failed writing report: {err}");
            std::process::exit(2);
        })
    };

    log::info!(
        "{} of {} checks passed ({} crashed)",
        summary.passed(),
        summary.total(),
        summary.crashed()
    );
    if !summary.is_success() {
        std::process::exit(1);
    }
}
