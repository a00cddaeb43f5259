use conform_kernel::{ConformConfig, Policy, Sources, Variant};
use std::path::{Path, PathBuf};

pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();
}

/// Absolute paths as given; relative paths under `root`.
pub fn resolve_path(path: &str, root: &Path) -> PathBuf {
    let candidate = PathBuf::from(path);
    if candidate.is_absolute() {
        return candidate;
    }
    root.join(candidate)
}

/// Load the config named on the command line, or `<root>/conform.toml` when
/// it exists. An explicitly named config that is missing is an error.
fn load_config(root: &Path, config: Option<&str>) -> Result<ConformConfig, String> {
    let path = match config {
        Some(path) => resolve_path(path, root),
        None => {
            let default = root.join(ConformConfig::FILE_NAME);
            if !default.exists() {
                log::debug!("no {} under {}", ConformConfig::FILE_NAME, root.display());
                return Ok(ConformConfig::default());
            }
            default
        }
    };
    log::info!("using config {}", path.display());
    ConformConfig::load(&path).map_err(|e| e.to_string())
}

pub fn policy_or_exit(root: &Path, config: Option<&str>, variant: Option<Variant>) -> Policy {
    load_config(root, config)
        .and_then(|cfg| cfg.policy(variant).map_err(|e| e.to_string()))
        .unwrap_or_else(|e| {
            eprintln!("error: {e}");
            std::process::exit(2);
        })
}

pub fn sources(
    root: &Path,
    manifest: Option<&str>,
    ci: Option<&str>,
    readme: Option<&str>,
) -> Sources {
    let pick = |given: Option<&str>, default: &str| match given {
        Some(path) => resolve_path(path, root),
        None => root.join(default),
    };
    Sources::from_paths(
        &pick(manifest, Sources::MANIFEST_FILE),
        &pick(ci, Sources::CI_FILE),
        &pick(readme, Sources::README_FILE),
    )
}
