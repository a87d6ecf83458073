//! Rewrites the compiler's self-invoking script into an ES module.

/// First line of a compiled script.
pub const SCRIPT_PROLOGUE: &str = "(function(scope){";
/// Closing of a compiled script, invoking the wrapper on the global object.
pub const SCRIPT_EPILOGUE: &str = ";}(this));";

const INIT_PROLOGUE: &str = "function init(scope){";
const INIT_EPILOGUE: &str = ";}";

/// Turns `(function(scope){ ... }(this));` into a named `init` function, runs it against a
/// private scope object and exports that scope's `Elm` root as the default export.
pub fn wrap_as_module(script: &str) -> String {
	let body = script
		.replacen(SCRIPT_PROLOGUE, INIT_PROLOGUE, 1)
		.replacen(SCRIPT_EPILOGUE, INIT_EPILOGUE, 1);

	format!(
		"{body}
  const moduleScope = {{}};
  init(moduleScope);
  export default moduleScope.Elm;"
	)
}
