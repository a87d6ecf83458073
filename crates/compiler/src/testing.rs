//! Scripted [`ProcessLauncher`] for driver tests.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::launcher::{Captured, LaunchRequest, ProcessHandle, ProcessLauncher, ProcessStatus, StdioMode};

/// What the fake compiler does when launched.
#[derive(Debug, Clone, Default)]
pub struct Script {
	pub spawn_error: Option<io::ErrorKind>,
	pub status_error: Option<io::ErrorKind>,
	pub stdout: Vec<u8>,
	pub stderr: Vec<u8>,
	/// Exit code; `None` simulates a signal.
	pub code: Option<i32>,
	/// Contents written to the path following `--output`, if any.
	pub artifact: Option<Vec<u8>>,
}

impl Script {
	pub fn success() -> Self {
		Self {
			code: Some(0),
			..Self::default()
		}
	}

	pub fn writing(artifact: &str) -> Self {
		Self {
			artifact: Some(artifact.as_bytes().to_vec()),
			..Self::success()
		}
	}
}

#[derive(Clone, Default)]
pub struct FakeLauncher {
	script: Script,
	requests: Arc<Mutex<Vec<LaunchRequest>>>,
	closed: Arc<AtomicUsize>,
}

impl FakeLauncher {
	pub fn new(script: Script) -> Self {
		Self {
			script,
			..Self::default()
		}
	}

	pub fn requests(&self) -> Vec<LaunchRequest> {
		self.requests.lock().clone()
	}

	/// Number of handles that were closed.
	pub fn closed(&self) -> usize {
		self.closed.load(Ordering::SeqCst)
	}

	/// Output path passed on the last command line.
	pub fn output_path(&self) -> Option<PathBuf> {
		output_arg(&self.requests.lock().last()?.args)
	}
}

fn output_arg(args: &[String]) -> Option<PathBuf> {
	let flag = args.iter().position(|arg| arg == "--output")?;
	args.get(flag + 1).map(PathBuf::from)
}

impl ProcessLauncher for FakeLauncher {
	fn launch(&self, request: &LaunchRequest) -> io::Result<Box<dyn ProcessHandle>> {
		self.requests.lock().push(request.clone());
		if let Some(kind) = self.script.spawn_error {
			return Err(io::Error::from(kind));
		}

		if let Some(artifact) = &self.script.artifact
			&& let Some(path) = output_arg(&request.args)
		{
			std::fs::write(path, artifact)?;
		}

		let piped = request.stdio == StdioMode::Piped;
		Ok(Box::new(FakeProcess {
			captured: Captured {
				stdout: if piped { self.script.stdout.clone() } else { Vec::new() },
				stderr: if piped { self.script.stderr.clone() } else { Vec::new() },
			},
			script: self.script.clone(),
			closed: Arc::clone(&self.closed),
		}))
	}
}

struct FakeProcess {
	captured: Captured,
	script: Script,
	closed: Arc<AtomicUsize>,
}

#[async_trait]
impl ProcessHandle for FakeProcess {
	async fn drain(&mut self) -> io::Result<Captured> {
		Ok(std::mem::take(&mut self.captured))
	}

	async fn status(&mut self) -> io::Result<ProcessStatus> {
		match self.script.status_error {
			Some(kind) => Err(io::Error::from(kind)),
			None => Ok(ProcessStatus { code: self.script.code }),
		}
	}

	async fn close(&mut self) {
		self.closed.fetch_add(1, Ordering::SeqCst);
	}
}
