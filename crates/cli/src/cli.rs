use std::path::PathBuf;

use bindery_primitives::OperationType;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bindery")]
#[command(about = "Inspect handler catalogs and the registry built from them")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Catalog file; repeat to layer several catalogs
	#[arg(short, long = "catalog", value_name = "PATH", global = true)]
	pub catalogs: Vec<PathBuf>,

	/// Treat every data source as metadata only and skip server objects
	#[arg(long, global = true)]
	pub skip_dmi: bool,

	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Build the registry and report what it contains
	Check,
	/// List the relations derived for a data source
	Relations {
		data_source: String,
	},
	/// Show the effective operation binding and whether it needs templating
	Templating {
		data_source: String,
		operation: OperationType,
		/// Operation id of the request
		#[arg(long)]
		operation_id: Option<String>,
	},
	/// Send a request to a handler and print the response as JSON
	Invoke {
		handler: String,
		/// Request body as JSON; defaults to a bare fetch
		#[arg(long, value_name = "JSON")]
		request: Option<String>,
	},
}
