//! Error taxonomy for compiler invocations.

use std::io;
use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Coarse classification of a [`CompileError`].
///
/// Configuration errors are raised before any process is spawned. Launch errors come from the
/// OS while starting the compiler. Exit status and stderr errors describe a compiler that ran
/// but reported failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	Configuration,
	Launch,
	ExitStatus,
	Stderr,
	Io,
}

/// Errors produced while building or running a compiler invocation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
	/// Unknown, retired or badly shaped options.
	#[error("{0}")]
	MalformedOptions(String),
	/// The compiler executable does not exist.
	#[error("Could not find Elm compiler \"{path}\". Is it installed?")]
	BinaryNotFound { path: String },
	/// The compiler executable exists but may not be executed.
	#[error(
		"Elm compiler \"{path}\" did not have permission to run. Do you need to give it executable permissions?"
	)]
	PermissionDenied { path: String },
	/// Any other OS-level failure carrying an error code.
	#[error("Error attempting to run Elm compiler \"{path}\":\n{source}")]
	Spawn {
		path: String,
		#[source]
		source: io::Error,
	},
	/// A failure that only carries a message, JSON-escaped.
	#[error("{0}")]
	Exception(String),
	/// A failure with no usable description.
	#[error("Exception thrown when attempting to run Elm compiler \"{path}\"")]
	Unknown { path: String },
	/// The compiler ran and exited unsuccessfully.
	#[error("Exception thrown when attempting to run Elm compiler \"{path}\" ({})", describe_exit(.code))]
	NonZeroExit { path: String, code: Option<i32> },
	/// The compiler wrote to standard error in a capturing mode.
	#[error("{0}")]
	StderrNonEmpty(String),
	#[error("failed to create temporary directory: {0}")]
	TempDir(#[source] io::Error),
	#[error("failed to read compiler output {}: {source}", .path.display())]
	ReadOutput {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("compiler output {} is not valid UTF-8", .path.display())]
	DecodeOutput {
		path: PathBuf,
		#[source]
		source: FromUtf8Error,
	},
	#[error("failed to write module {}: {source}", .path.display())]
	WriteModule {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("failed to read options file {}: {source}", .path.display())]
	ConfigRead {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("failed to parse options file: {0}")]
	ConfigParse(#[from] toml::de::Error),
}

impl CompileError {
	/// Returns the taxonomy bucket this error belongs to.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::MalformedOptions(_) | Self::ConfigParse(_) => ErrorKind::Configuration,
			Self::BinaryNotFound { .. }
			| Self::PermissionDenied { .. }
			| Self::Spawn { .. }
			| Self::Exception(_)
			| Self::Unknown { .. } => ErrorKind::Launch,
			Self::NonZeroExit { .. } => ErrorKind::ExitStatus,
			Self::StderrNonEmpty(_) => ErrorKind::Stderr,
			Self::TempDir(_)
			| Self::ReadOutput { .. }
			| Self::DecodeOutput { .. }
			| Self::WriteModule { .. }
			| Self::ConfigRead { .. } => ErrorKind::Io,
		}
	}

	pub(crate) fn malformed(message: impl Into<String>) -> Self {
		Self::MalformedOptions(message.into())
	}
}

fn describe_exit(code: &Option<i32>) -> String {
	match code {
		Some(code) => format!("exit code {code}"),
		None => "terminated by signal".to_string(),
	}
}

/// Result type for compiler operations.
pub type Result<T, E = CompileError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn nonzero_exit_keeps_exception_prefix() {
		let err = CompileError::NonZeroExit {
			path: "elm".into(),
			code: Some(1),
		};
		let message = err.to_string();
		assert!(message.starts_with("Exception thrown when attempting to run Elm compiler"));
		assert!(message.ends_with("(exit code 1)"));
		assert_eq!(err.kind(), ErrorKind::ExitStatus);
	}

	#[test]
	fn signal_exit_has_no_code() {
		let err = CompileError::NonZeroExit { path: "elm".into(), code: None };
		assert!(err.to_string().ends_with("(terminated by signal)"));
	}
}
