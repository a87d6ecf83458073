//! Driver for the external Elm compiler.
//!
//! Builds `elm make` invocations from typed [`Options`], runs the compiler through a
//! [`ProcessLauncher`] and turns exit codes, captured streams and OS errors into
//! [`CompileError`]s. Four operations are exposed, both as [`Compiler`] methods and as free
//! functions using the default [`TokioLauncher`]:
//!
//! - [`compile`]: stdio is inherited, the compiler writes wherever `--output` points.
//! - [`compile_to_text`]: output is captured through a scoped temporary directory.
//! - [`compile_to_module_text`]: captured output rewritten into an ES module.
//! - [`compile_to_module`]: the module text written to the configured output path.
//!
//! ```no_run
//! use elmc_compiler::{Mode, Options};
//!
//! # async fn run() -> elmc_compiler::Result<()> {
//! let js = elmc_compiler::compile_to_text("src/Main.elm", Some(Options::default().mode(Mode::Optimize))).await?;
//! # let _ = js;
//! # Ok(())
//! # }
//! ```

mod args;
mod driver;
mod error;
mod launcher;
pub mod module;
mod options;
#[cfg(test)]
mod testing;
mod translate;

pub use args::{MAKE_SUBCOMMAND, Sources, build_arguments};
pub use driver::{Compiler, DEFAULT_OUTPUT, compile, compile_to_module, compile_to_module_text, compile_to_text};
pub use error::{CompileError, ErrorKind, Result};
pub use launcher::{
	Captured, LaunchRequest, ProcessHandle, ProcessLauncher, ProcessStatus, StdioMode, TokioLauncher,
};
pub use options::{ELM_BINARY_NAME, Mode, OptionKey, Options, OptionsBuilder, ProcessOverrides};
