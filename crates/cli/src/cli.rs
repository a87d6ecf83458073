use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use elmc_compiler::{Mode, Options, OptionsBuilder};

#[derive(Parser, Debug)]
#[command(name = "elmc")]
#[command(about = "Run the Elm compiler and capture its output")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Elm source files, passed to `elm make` in order
	#[arg(required = true, value_name = "SOURCES")]
	pub sources: Vec<PathBuf>,

	/// Output file for the compiled artifact
	#[arg(long, short = 'o', value_name = "PATH")]
	pub output: Option<PathBuf>,

	/// Error report style (e.g. json)
	#[arg(long)]
	pub report: Option<String>,

	/// Compile with the time-travelling debugger
	#[arg(long, conflicts_with = "optimize")]
	pub debug: bool,

	/// Compile with optimizations
	#[arg(long)]
	pub optimize: bool,

	/// Generate a docs.json file at this path
	#[arg(long, value_name = "PATH")]
	pub docs: Option<PathBuf>,

	/// Runtime options wrapped in `+RTS ... -RTS`
	#[arg(long = "rts", value_name = "OPTS", allow_hyphen_values = true)]
	pub runtime_options: Option<String>,

	/// Path to the Elm compiler executable
	#[arg(long = "elm", value_name = "PATH")]
	pub path_to_elm: Option<String>,

	/// Working directory for the compiler
	#[arg(long, value_name = "DIR")]
	pub cwd: Option<PathBuf>,

	/// Pass `--help` to the compiler
	#[arg(long)]
	pub compiler_help: bool,

	/// TOML file of compiler options; flags given here override it
	#[arg(long, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// What to produce
	#[arg(long, value_enum, default_value_t = Emit::Direct)]
	pub emit: Emit,

	/// Log the compiler command line and debug events
	#[arg(long, short = 'v')]
	pub verbose: bool,
}

/// Output modes, one per library operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Emit {
	/// Let the compiler write its output and print to the terminal
	Direct,
	/// Print the compiled script to stdout
	Text,
	/// Write an ES module to the output path
	Module,
	/// Print an ES module to stdout
	ModuleText,
}

impl Cli {
	/// Loads the options file, if any, and overlays the command-line flags.
	pub fn options(&self) -> elmc_compiler::Result<Options> {
		let base = match &self.config {
			Some(path) => OptionsBuilder::from_toml_file(path)?,
			None => Options::default(),
		};
		Ok(self.overlay(base))
	}

	fn overlay(&self, mut options: Options) -> Options {
		if self.debug {
			options.mode = Mode::Debug;
		} else if self.optimize {
			options.mode = Mode::Optimize;
		}
		if let Some(output) = &self.output {
			options.output = Some(output.clone());
		}
		if let Some(report) = &self.report {
			options.report = Some(report.clone());
		}
		if let Some(docs) = &self.docs {
			options.docs = Some(docs.clone());
		}
		if let Some(rts) = &self.runtime_options {
			options.runtime_options = Some(rts.clone());
		}
		if let Some(path) = &self.path_to_elm {
			options.path_to_elm = path.clone();
		}
		if let Some(cwd) = &self.cwd {
			options.cwd = Some(cwd.clone());
		}
		options.help |= self.compiler_help;
		options.verbose |= self.verbose;
		options
	}
}
