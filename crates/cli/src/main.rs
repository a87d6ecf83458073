//! `elmc` binary.
//!
//! Runs one Elm compiler invocation in the requested output mode and exits.

mod cli;

use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Emit};
use elmc_compiler::Compiler;

#[tokio::main]
async fn main() -> ExitCode {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	match run(cli).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			tracing::debug!(error = ?e, "elmc failed");
			eprintln!("{e:#}");
			ExitCode::FAILURE
		}
	}
}

async fn run(cli: Cli) -> anyhow::Result<()> {
	let options = cli.options().context("invalid compiler options")?;
	let compiler = Compiler::new();
	let sources = cli.sources.clone();

	match cli.emit {
		Emit::Direct => compiler.compile(sources, Some(options)).await?,
		Emit::Module => compiler.compile_to_module(sources, Some(options)).await?,
		Emit::Text => print(&compiler.compile_to_text(sources, Some(options)).await?)?,
		Emit::ModuleText => print(&compiler.compile_to_module_text(sources, Some(options)).await?)?,
	}
	Ok(())
}

fn print(text: &str) -> anyhow::Result<()> {
	let mut stdout = std::io::stdout().lock();
	stdout.write_all(text.as_bytes()).context("failed to write to stdout")?;
	stdout.flush()?;
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("ELMC_LOG").unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("elmc=debug,elmc_compiler=debug,info")
		} else {
			EnvFilter::new("warn,elmc_compiler=info")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}
