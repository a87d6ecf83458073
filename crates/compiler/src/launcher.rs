//! Process launching abstraction for production and testing.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

use crate::options::Options;

/// Locale forced on the compiler so its output encoding is stable.
const LOCALE: (&str, &str) = ("LANG", "en_US.UTF-8");

/// Where the compiler's stdout and stderr go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StdioMode {
	/// Shared with the calling process.
	#[default]
	Inherit,
	/// Captured and returned by [`ProcessHandle::drain`].
	Piped,
	/// Discarded.
	Null,
}

impl StdioMode {
	fn to_stdio(self) -> Stdio {
		match self {
			Self::Inherit => Stdio::inherit(),
			Self::Piped => Stdio::piped(),
			Self::Null => Stdio::null(),
		}
	}
}

/// Everything needed to start one compiler process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
	pub program: PathBuf,
	pub args: Vec<String>,
	/// Complete environment; the child does not inherit anything else.
	pub env: BTreeMap<OsString, OsString>,
	pub cwd: Option<PathBuf>,
	pub stdio: StdioMode,
}

impl LaunchRequest {
	/// Assembles a request from normalized options.
	///
	/// The environment is the inherited one with the locale forced, then the caller's
	/// overrides. `stdio` replaces whatever disposition the options asked for.
	pub fn new(program: PathBuf, args: Vec<String>, options: &Options, stdio: Option<StdioMode>) -> Self {
		let mut env: BTreeMap<OsString, OsString> = std::env::vars_os().collect();
		env.insert(LOCALE.0.into(), LOCALE.1.into());
		for (key, value) in &options.process.env {
			env.insert(key.into(), value.into());
		}

		Self {
			program,
			args,
			env,
			cwd: options.process.cwd.clone().or_else(|| options.cwd.clone()),
			stdio: stdio.or(options.process.stdio).unwrap_or_default(),
		}
	}

	/// Renders the command line for logging.
	pub fn command_line(&self) -> String {
		std::iter::once(self.program.to_string_lossy().into_owned())
			.chain(self.args.iter().cloned())
			.collect::<Vec<_>>()
			.join(" ")
	}
}

/// Output collected from piped streams. Empty for inherited or discarded streams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
	pub stdout: Vec<u8>,
	pub stderr: Vec<u8>,
}

/// Exit status of a finished process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStatus {
	/// `None` when the process was terminated by a signal.
	pub code: Option<i32>,
}

impl ProcessStatus {
	pub fn success(&self) -> bool {
		self.code == Some(0)
	}
}

/// A running compiler process.
///
/// Owned by exactly one driver call, which must call [`close`](Self::close) on every path.
#[async_trait]
pub trait ProcessHandle: Send {
	/// Reads piped stdout and stderr to end of file.
	async fn drain(&mut self) -> io::Result<Captured>;

	/// Waits for the process to exit.
	async fn status(&mut self) -> io::Result<ProcessStatus>;

	/// Releases the process, killing it if it is still running.
	async fn close(&mut self);
}

/// Capability to start compiler processes.
///
/// Production code uses [`TokioLauncher`]; tests substitute scripted fakes.
pub trait ProcessLauncher: Send + Sync {
	fn launch(&self, request: &LaunchRequest) -> io::Result<Box<dyn ProcessHandle>>;
}

/// Launcher that spawns real child processes on the tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLauncher;

impl ProcessLauncher for TokioLauncher {
	fn launch(&self, request: &LaunchRequest) -> io::Result<Box<dyn ProcessHandle>> {
		let mut cmd = Command::new(&request.program);
		cmd.args(&request.args)
			.env_clear()
			.envs(&request.env)
			.stdin(Stdio::null())
			.stdout(request.stdio.to_stdio())
			.stderr(request.stdio.to_stdio())
			.kill_on_drop(true);

		if let Some(cwd) = &request.cwd {
			cmd.current_dir(cwd);
		}

		let child = cmd.spawn()?;
		tracing::trace!(pid = ?child.id(), "Compiler process started");
		Ok(Box::new(ChildProcess { child }))
	}
}

struct ChildProcess {
	child: Child,
}

#[async_trait]
impl ProcessHandle for ChildProcess {
	async fn drain(&mut self) -> io::Result<Captured> {
		let stdout = self.child.stdout.take();
		let stderr = self.child.stderr.take();
		let (stdout, stderr) = tokio::try_join!(read_pipe(stdout), read_pipe(stderr))?;
		Ok(Captured { stdout, stderr })
	}

	async fn status(&mut self) -> io::Result<ProcessStatus> {
		let status = self.child.wait().await?;
		Ok(ProcessStatus { code: status.code() })
	}

	async fn close(&mut self) {
		if let Ok(Some(_)) = self.child.try_wait() {
			return;
		}
		if let Err(e) = self.child.start_kill() {
			tracing::debug!(error = %e, "Failed to kill compiler process");
		}
		let _ = self.child.wait().await;
	}
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> io::Result<Vec<u8>> {
	let mut buf = Vec::new();
	if let Some(mut pipe) = pipe {
		pipe.read_to_end(&mut buf).await?;
	}
	Ok(buf)
}
