//! `bindery` inspects handler catalogs.
//!
//! Every subcommand loads one or more TOML catalogs (later files override
//! earlier ones by id), resolves their server objects against the types
//! registered in this binary and builds a registry snapshot.

mod builtin;
mod cli;
mod commands;

use clap::Parser;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let stdout = std::io::stdout();
	commands::run(&cli, &mut stdout.lock())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("bindery=trace,debug")
		} else {
			EnvFilter::new("info")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
