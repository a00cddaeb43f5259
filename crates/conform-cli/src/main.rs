//! Conform CLI: the `conform` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    support::init_logging(cli.verbose);

    match cli.command {
        Commands::Check {
            root,
            manifest,
            ci,
            readme,
            variant,
            config,
            json,
        } => commands::check::run(commands::check::Args {
            root,
            manifest,
            ci,
            readme,
            variant: variant.map(Into::into),
            config,
            json,
        }),

        Commands::List {
            root,
            variant,
            config,
            json,
        } => commands::list::run(root, variant.map(Into::into), config, json),
    }
}
