//! Invocation drivers for the four public compile operations.
//!
//! Every driver runs the same linear sequence: normalize options, build arguments, launch,
//! drain streams, inspect the exit status, translate the outcome and close the process. The
//! process handle never outlives the call, and the temporary directory used by the capturing
//! modes is removed whether or not the call succeeds.


use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::args::{Sources, build_arguments};
use crate::error::{CompileError, Result};
use crate::launcher::{LaunchRequest, ProcessHandle, ProcessLauncher, StdioMode, TokioLauncher};
use crate::module::wrap_as_module;
use crate::options::Options;
use crate::translate;

/// File name used for captured output when the caller does not choose one.
pub const DEFAULT_OUTPUT: &str = "elm.js";

/// Runs the Elm compiler through a [`ProcessLauncher`].
#[derive(Clone)]
pub struct Compiler {
	launcher: Arc<dyn ProcessLauncher>,
}

impl Default for Compiler {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Compiler {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Compiler").finish_non_exhaustive()
	}
}

impl Compiler {
	/// Creates a compiler that spawns real processes.
	pub fn new() -> Self {
		Self::with_launcher(TokioLauncher)
	}

	pub fn with_launcher(launcher: impl ProcessLauncher + 'static) -> Self {
		Self {
			launcher: Arc::new(launcher),
		}
	}

	/// Compiles with inherited stdio, so compiler output reaches the caller's terminal.
	///
	/// # Errors
	///
	/// Fails on malformed options, launch failures and any unsuccessful exit.
	pub async fn compile(&self, sources: impl Into<Sources>, options: Option<Options>) -> Result<()> {
		let options = Options::normalize(options);
		let request = self.prepare(&sources.into(), &options, None)?;
		let mut process = self.spawn(&request, &options)?;

		let outcome = await_direct(process.as_mut(), &options.path_to_elm).await;
		process.close().await;
		outcome
	}

	/// Compiles into a scoped temporary directory and returns the produced file as text.
	///
	/// Only the file name of a caller-supplied output path is kept; it selects the artifact
	/// kind (`.js` or `.html`) inside the temporary directory.
	///
	/// # Errors
	///
	/// Anything written to stderr fails the call with that text. An unsuccessful exit with a
	/// clean stderr is logged and the output file is read anyway.
	pub async fn compile_to_text(&self, sources: impl Into<Sources>, options: Option<Options>) -> Result<String> {
		let mut options = Options::normalize(options);
		let dir = tempfile::Builder::new()
			.prefix("elmc-")
			.tempdir()
			.map_err(CompileError::TempDir)?;

		let file_name = options
			.output
			.as_deref()
			.and_then(Path::file_name)
			.unwrap_or_else(|| OsStr::new(DEFAULT_OUTPUT))
			.to_owned();
		let output_path = dir.path().join(file_name);
		options.output = Some(output_path.clone());
		debug!(dir = %dir.path().display(), output = %output_path.display(), "Capturing compiler output");

		let request = self.prepare(&sources.into(), &options, Some(StdioMode::Piped))?;
		let mut process = self.spawn(&request, &options)?;

		let outcome = await_captured(process.as_mut(), &options.path_to_elm).await;
		process.close().await;
		outcome?;

		let bytes = tokio::fs::read(&output_path).await.map_err(|source| CompileError::ReadOutput {
			path: output_path.clone(),
			source,
		})?;
		let text = String::from_utf8(bytes).map_err(|source| CompileError::DecodeOutput {
			path: output_path,
			source,
		})?;

		dir.close().map_err(CompileError::TempDir)?;
		Ok(text)
	}

	/// Compiles to text and rewrites it into an ES module exporting the `Elm` root.
	pub async fn compile_to_module_text(
		&self,
		sources: impl Into<Sources>,
		options: Option<Options>,
	) -> Result<String> {
		let mut options = Options::normalize(options);
		options.output = Some(module_output_path(&options));
		let script = self.compile_to_text(sources, Some(options)).await?;
		Ok(wrap_as_module(&script))
	}

	/// Like [`compile_to_module_text`](Self::compile_to_module_text), but writes the module to
	/// the configured output path (`elm.js` by default).
	pub async fn compile_to_module(&self, sources: impl Into<Sources>, options: Option<Options>) -> Result<()> {
		let options = Options::normalize(options);
		let path = module_output_path(&options);
		let module = self.compile_to_module_text(sources, Some(options)).await?;

		tokio::fs::write(&path, module)
			.await
			.map_err(|source| CompileError::WriteModule { path: path.clone(), source })?;
		info!(output = %path.display(), "Wrote compiled module");
		Ok(())
	}

	fn prepare(&self, sources: &Sources, options: &Options, stdio: Option<StdioMode>) -> Result<LaunchRequest> {
		let args = build_arguments(sources, options)?;
		Ok(LaunchRequest::new(resolve_binary(&options.path_to_elm), args, options, stdio))
	}

	fn spawn(&self, request: &LaunchRequest, options: &Options) -> Result<Box<dyn ProcessHandle>> {
		if options.verbose {
			info!("Running {}", request.command_line());
		} else {
			debug!(command = %request.command_line(), "Running compiler");
		}
		self.launcher
			.launch(request)
			.map_err(|e| translate::launch_error(e, &options.path_to_elm))
	}
}

async fn await_direct(process: &mut dyn ProcessHandle, path: &str) -> Result<()> {
	process.drain().await.map_err(|e| translate::launch_error(e, path))?;
	let status = process.status().await.map_err(|e| translate::launch_error(e, path))?;
	translate::exit_status(status, path)
}

async fn await_captured(process: &mut dyn ProcessHandle, path: &str) -> Result<()> {
	let captured = process.drain().await.map_err(|e| translate::launch_error(e, path))?;
	translate::captured_stderr(&captured)?;
	let status = process.status().await.map_err(|e| translate::launch_error(e, path))?;
	translate::advisory_exit(status, path);
	Ok(())
}

fn module_output_path(options: &Options) -> PathBuf {
	options
		.output
		.clone()
		.filter(|path| !path.as_os_str().is_empty())
		.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
}

/// Resolves a bare binary name on `PATH`. Unresolvable names are launched as given so the OS
/// reports them as missing.
fn resolve_binary(path_to_elm: &str) -> PathBuf {
	match which::which(path_to_elm) {
		Ok(resolved) => resolved,
		Err(e) => {
			debug!(binary = %path_to_elm, error = %e, "Compiler not resolved on PATH");
			PathBuf::from(path_to_elm)
		}
	}
}

/// [`Compiler::compile`] with the default launcher.
pub async fn compile(sources: impl Into<Sources>, options: Option<Options>) -> Result<()> {
	Compiler::new().compile(sources, options).await
}

/// [`Compiler::compile_to_text`] with the default launcher.
pub async fn compile_to_text(sources: impl Into<Sources>, options: Option<Options>) -> Result<String> {
	Compiler::new().compile_to_text(sources, options).await
}

/// [`Compiler::compile_to_module`] with the default launcher.
pub async fn compile_to_module(sources: impl Into<Sources>, options: Option<Options>) -> Result<()> {
	Compiler::new().compile_to_module(sources, options).await
}

/// [`Compiler::compile_to_module_text`] with the default launcher.
pub async fn compile_to_module_text(sources: impl Into<Sources>, options: Option<Options>) -> Result<String> {
	Compiler::new().compile_to_module_text(sources, options).await
}
