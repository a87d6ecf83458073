//! Compiler options and their defaults.
//!
//! [`Options`] is the typed configuration for one invocation. Dynamic option bags (JSON objects,
//! TOML files) go through [`OptionsBuilder`], which rejects keys outside [`OptionKey`].

mod builder;

use std::collections::BTreeMap;
use std::path::PathBuf;

pub use builder::OptionsBuilder;
use serde::Deserialize;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::launcher::StdioMode;

/// Binary name looked up on `PATH` when no explicit compiler path is configured.
pub const ELM_BINARY_NAME: &str = "elm";

/// Compiler execution mode. Exactly one is active per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Mode {
	/// No instrumentation flag is passed.
	#[default]
	NoMode,
	/// `--debug`
	Debug,
	/// `--optimize`
	Optimize,
}

/// Recognized option keys, in the order their tokens are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub enum OptionKey {
	Run,
	Mode,
	PathToElm,
	Cwd,
	Help,
	Output,
	Report,
	Verbose,
	ProcessOpts,
	Docs,
	RuntimeOptions,
}

/// Overrides applied to the process launch after the defaults, so the caller wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessOverrides {
	/// Extra environment variables.
	pub env: BTreeMap<String, String>,
	/// Working directory, taking precedence over [`Options::cwd`].
	pub cwd: Option<PathBuf>,
	/// Stdio disposition for stdout and stderr.
	pub stdio: Option<StdioMode>,
}

/// Complete configuration for one compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
	pub mode: Mode,
	/// Compiler executable, either a name resolved on `PATH` or a path.
	pub path_to_elm: String,
	pub cwd: Option<PathBuf>,
	pub help: bool,
	pub output: Option<PathBuf>,
	pub report: Option<String>,
	/// Logs the assembled command line before launching.
	pub verbose: bool,
	pub process: ProcessOverrides,
	pub docs: Option<PathBuf>,
	/// Passed through to the compiler runtime as `+RTS <value> -RTS`.
	pub runtime_options: Option<String>,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			mode: Mode::NoMode,
			path_to_elm: ELM_BINARY_NAME.to_string(),
			cwd: None,
			help: false,
			output: None,
			report: None,
			verbose: false,
			process: ProcessOverrides::default(),
			docs: None,
			runtime_options: None,
		}
	}
}

impl Options {
	/// Fills in defaults for an absent configuration.
	pub fn normalize(options: Option<Self>) -> Self {
		options.unwrap_or_default()
	}

	pub fn mode(mut self, mode: Mode) -> Self {
		self.mode = mode;
		self
	}

	pub fn path_to_elm(mut self, path: impl Into<String>) -> Self {
		self.path_to_elm = path.into();
		self
	}

	pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
		self.cwd = Some(cwd.into());
		self
	}

	pub fn help(mut self, help: bool) -> Self {
		self.help = help;
		self
	}

	pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
		self.output = Some(output.into());
		self
	}

	pub fn report(mut self, report: impl Into<String>) -> Self {
		self.report = Some(report.into());
		self
	}

	pub fn verbose(mut self, verbose: bool) -> Self {
		self.verbose = verbose;
		self
	}

	pub fn process(mut self, process: ProcessOverrides) -> Self {
		self.process = process;
		self
	}

	/// Adds a single environment override for the compiler process.
	pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.process.env.insert(key.into(), value.into());
		self
	}

	pub fn docs(mut self, docs: impl Into<PathBuf>) -> Self {
		self.docs = Some(docs.into());
		self
	}

	pub fn runtime_options(mut self, runtime_options: impl Into<String>) -> Self {
		self.runtime_options = Some(runtime_options.into());
		self
	}
}
