//! Classification of process outcomes into [`CompileError`]s.

use std::io;

use crate::error::{CompileError, Result};
use crate::launcher::{Captured, ProcessStatus};

/// Maps a failure to launch or wait on the compiler.
///
/// `path` is the configured compiler path, so messages name what the caller asked for rather
/// than whatever `PATH` resolution produced.
pub fn launch_error(err: io::Error, path: &str) -> CompileError {
	match err.kind() {
		io::ErrorKind::NotFound => CompileError::BinaryNotFound { path: path.to_string() },
		io::ErrorKind::PermissionDenied => CompileError::PermissionDenied { path: path.to_string() },
		_ if err.raw_os_error().is_some() => CompileError::Spawn {
			path: path.to_string(),
			source: err,
		},
		_ => {
			let message = err.to_string();
			if message.is_empty() {
				CompileError::Unknown { path: path.to_string() }
			} else {
				CompileError::Exception(json_escape(&message))
			}
		}
	}
}

/// Direct mode: any unsuccessful exit fails the call.
pub fn exit_status(status: ProcessStatus, path: &str) -> Result<()> {
	if status.success() {
		Ok(())
	} else {
		Err(CompileError::NonZeroExit {
			path: path.to_string(),
			code: status.code,
		})
	}
}

/// Capture modes: anything on stderr is fatal, verbatim.
pub fn captured_stderr(captured: &Captured) -> Result<()> {
	let stderr = String::from_utf8_lossy(&captured.stderr);
	if stderr.is_empty() {
		Ok(())
	} else {
		Err(CompileError::StderrNonEmpty(stderr.into_owned()))
	}
}

/// Capture modes: an unsuccessful exit with a clean stderr is only logged.
pub fn advisory_exit(status: ProcessStatus, path: &str) {
	if !status.success() {
		tracing::warn!(binary = %path, code = ?status.code, "Compiler exited unsuccessfully without writing to stderr");
	}
}

fn json_escape(message: &str) -> String {
	serde_json::to_string(message).unwrap_or_else(|_| format!("{message:?}"))
}
