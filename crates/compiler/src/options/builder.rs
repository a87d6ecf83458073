//! Strict construction of [`Options`] from untyped key/value bags.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::{ELM_BINARY_NAME, Mode, OptionKey, Options};
use crate::error::{CompileError, Result};

/// Overlays untyped option values onto the defaults, one key at a time.
///
/// Values follow JavaScript truthiness: `null`, `false`, `0` and `""` leave the option unset.
/// Keys outside [`OptionKey`] fail immediately instead of being dropped.
#[derive(Debug, Clone, Default)]
pub struct OptionsBuilder {
	options: Options,
}

impl OptionsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts from an existing configuration instead of the defaults.
	pub fn with_base(options: Options) -> Self {
		Self { options }
	}

	/// Sets one option by its external key name.
	pub fn set(&mut self, key: &str, value: Value) -> Result<&mut Self> {
		let Ok(option) = key.parse::<OptionKey>() else {
			return Err(unrecognized_key(key));
		};

		let options = &mut self.options;
		match option {
			OptionKey::Run => {
				if !value.is_null() {
					return Err(CompileError::malformed(format!(
						"options.run was a(n) {} instead of a function.",
						js_type_name(&value)
					)));
				}
			}
			OptionKey::Mode => {
				options.mode = match optional_string(option, value)? {
					Some(mode) => mode
						.parse()
						.map_err(|_| CompileError::malformed(format!("unrecognized Elm compiler mode: {mode}")))?,
					None => Mode::NoMode,
				};
			}
			OptionKey::PathToElm => {
				options.path_to_elm = optional_string(option, value)?.unwrap_or_else(|| ELM_BINARY_NAME.to_string());
			}
			OptionKey::Cwd => options.cwd = optional_string(option, value)?.map(PathBuf::from),
			OptionKey::Help => options.help = is_truthy(&value),
			OptionKey::Output => options.output = optional_string(option, value)?.map(PathBuf::from),
			OptionKey::Report => options.report = optional_string(option, value)?,
			OptionKey::Verbose => options.verbose = is_truthy(&value),
			OptionKey::ProcessOpts => {
				options.process = if is_truthy(&value) {
					serde_json::from_value(value)
						.map_err(|e| CompileError::malformed(format!("invalid `{option}` option: {e}")))?
				} else {
					Default::default()
				};
			}
			OptionKey::Docs => options.docs = optional_string(option, value)?.map(PathBuf::from),
			OptionKey::RuntimeOptions => options.runtime_options = optional_string(option, value)?,
		}
		Ok(self)
	}

	/// Applies every entry of `bag` in iteration order.
	pub fn merge(&mut self, bag: Map<String, Value>) -> Result<&mut Self> {
		for (key, value) in bag {
			self.set(&key, value)?;
		}
		Ok(self)
	}

	pub fn build(self) -> Options {
		self.options
	}

	/// Builds options from a JSON object.
	pub fn from_json(value: Value) -> Result<Options> {
		let Value::Object(bag) = value else {
			return Err(CompileError::malformed(format!(
				"options must be an object, got a(n) {}",
				js_type_name(&value)
			)));
		};
		let mut builder = Self::new();
		builder.merge(bag)?;
		Ok(builder.build())
	}

	/// Builds options from a TOML document whose top-level keys are option names.
	pub fn from_toml_str(source: &str) -> Result<Options> {
		let bag: Map<String, Value> = toml::from_str(source)?;
		let mut builder = Self::new();
		builder.merge(bag)?;
		Ok(builder.build())
	}

	pub fn from_toml_file(path: &Path) -> Result<Options> {
		let source = std::fs::read_to_string(path).map_err(|source| CompileError::ConfigRead {
			path: path.to_path_buf(),
			source,
		})?;
		tracing::debug!(path = %path.display(), "Loading compiler options");
		Self::from_toml_str(&source)
	}
}

fn unrecognized_key(key: &str) -> CompileError {
	let message = match key {
		"yes" | "warn" => format!(
			"elmc received the `{key}` option, but that was removed in Elm 0.19. Try re-running without passing the `{key}` option."
		),
		"pathToMake" => "elmc received the `pathToMake` option, but that was renamed to `pathToElm` in Elm 0.19. \
		                 Try re-running after renaming the parameter to `pathToElm`."
			.to_string(),
		_ => format!("elmc was given an unrecognized Elm compiler option: {key}"),
	};
	CompileError::MalformedOptions(message)
}

fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
		Value::String(s) => !s.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}

fn optional_string(key: OptionKey, value: Value) -> Result<Option<String>> {
	if !is_truthy(&value) {
		return Ok(None);
	}
	match value {
		Value::String(s) => Ok(Some(s)),
		other => Err(CompileError::malformed(format!(
			"the `{key}` option must be a string, got a(n) {}",
			js_type_name(&other)
		))),
	}
}

fn js_type_name(value: &Value) -> &'static str {
	match value {
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Null | Value::Array(_) | Value::Object(_) => "object",
	}
}
