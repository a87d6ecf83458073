//! Conversion of options and sources into the compiler's command line.

use std::path::{Path, PathBuf};

use strum::IntoEnumIterator;

use crate::error::{CompileError, Result};
use crate::options::{Mode, OptionKey, Options};

/// Subcommand token that always comes first.
pub const MAKE_SUBCOMMAND: &str = "make";

/// Ordered list of source files handed to the compiler verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sources(Vec<PathBuf>);

impl Sources {
	pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
		Self(paths.into_iter().map(Into::into).collect())
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Path> {
		self.0.iter().map(PathBuf::as_path)
	}
}

impl From<&str> for Sources {
	fn from(path: &str) -> Self {
		Self(vec![path.into()])
	}
}

impl From<String> for Sources {
	fn from(path: String) -> Self {
		Self(vec![path.into()])
	}
}

impl From<&Path> for Sources {
	fn from(path: &Path) -> Self {
		Self(vec![path.to_path_buf()])
	}
}

impl From<PathBuf> for Sources {
	fn from(path: PathBuf) -> Self {
		Self(vec![path])
	}
}

impl<T: Into<PathBuf>> From<Vec<T>> for Sources {
	fn from(paths: Vec<T>) -> Self {
		Self::new(paths)
	}
}

impl<T: Into<PathBuf>, const N: usize> From<[T; N]> for Sources {
	fn from(paths: [T; N]) -> Self {
		Self::new(paths)
	}
}

impl<T: Into<PathBuf> + Clone> From<&[T]> for Sources {
	fn from(paths: &[T]) -> Self {
		Self::new(paths.iter().cloned())
	}
}

impl OptionKey {
	/// Tokens contributed by this option. Unset or falsy values contribute nothing.
	fn tokens(self, options: &Options) -> Vec<String> {
		match self {
			Self::Help if options.help => vec!["--help".into()],
			Self::Output => path_flag("--output", options.output.as_deref()),
			Self::Report => string_flag("--report", options.report.as_deref()),
			Self::Mode => match options.mode {
				Mode::Debug => vec!["--debug".into()],
				Mode::Optimize => vec!["--optimize".into()],
				Mode::NoMode => Vec::new(),
			},
			Self::Docs => path_flag("--docs", options.docs.as_deref()),
			Self::RuntimeOptions => match options.runtime_options.as_deref() {
				Some(rts) if !rts.is_empty() => vec!["+RTS".into(), rts.into(), "-RTS".into()],
				_ => Vec::new(),
			},
			Self::Run | Self::PathToElm | Self::Cwd | Self::Help | Self::Verbose | Self::ProcessOpts => Vec::new(),
		}
	}
}

fn path_flag(flag: &str, value: Option<&Path>) -> Vec<String> {
	match value {
		Some(path) if !path.as_os_str().is_empty() => vec![flag.into(), path.to_string_lossy().into_owned()],
		_ => Vec::new(),
	}
}

fn string_flag(flag: &str, value: Option<&str>) -> Vec<String> {
	match value {
		Some(value) if !value.is_empty() => vec![flag.into(), value.into()],
		_ => Vec::new(),
	}
}

/// Builds `make <sources...> <flags...>`, with flags in [`OptionKey`] order.
///
/// # Errors
///
/// Returns [`CompileError::MalformedOptions`] when `sources` is empty.
pub fn build_arguments(sources: &Sources, options: &Options) -> Result<Vec<String>> {
	if sources.is_empty() {
		return Err(CompileError::malformed("compile() received an empty list of sources"));
	}

	let mut args = vec![MAKE_SUBCOMMAND.to_string()];
	args.extend(sources.iter().map(|path| path.to_string_lossy().into_owned()));
	for key in OptionKey::iter() {
		args.extend(key.tokens(options));
	}
	Ok(args)
}
