use clap::{Parser, Subcommand, ValueEnum};
use conform_kernel::Variant;

#[derive(Parser)]
#[command(
    name = "conform",
    about = "Conform: check a @gramex package against organizational conventions",
    version
)]
pub struct Cli {
    /// Log check progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum VariantArg {
    /// `browser` holds the minified bundle (GitLab repository)
    Browser,
    /// `main` holds the minified bundle, `browser` must be absent
    Main,
    /// `main` holds the minified bundle, `browser` mirrors it (GitHub repository)
    Github,
}

impl From<VariantArg> for Variant {
    fn from(value: VariantArg) -> Self {
        match value {
            VariantArg::Browser => Variant::Browser,
            VariantArg::Main => Variant::Main,
            VariantArg::Github => Variant::Github,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every convention check and print a TAP report
    Check {
        /// Package root holding package.json, .gitlab-ci.yml, and README.md
        #[arg(long, default_value = ".")]
        root: String,

        /// Manifest path, relative to --root (default: package.json)
        #[arg(long)]
        manifest: Option<String>,

        /// CI config path, relative to --root (default: .gitlab-ci.yml)
        #[arg(long)]
        ci: Option<String>,

        /// README path, relative to --root (default: README.md)
        #[arg(long)]
        readme: Option<String>,

        /// Convention variant (overrides the config file)
        #[arg(long, value_enum)]
        variant: Option<VariantArg>,

        /// Config file, relative to --root (default: conform.toml when present)
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON instead of TAP
        #[arg(long)]
        json: bool,
    },

    /// List the checks a run would execute, without running them
    List {
        /// Package root used to find conform.toml
        #[arg(long, default_value = ".")]
        root: String,

        /// Convention variant (overrides the config file)
        #[arg(long, value_enum)]
        variant: Option<VariantArg>,

        /// Config file, relative to --root (default: conform.toml when present)
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
