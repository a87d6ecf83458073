//! Drives the real process launcher against a shell script standing in for `elm`.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use elmc_compiler::module::SCRIPT_PROLOGUE;
use elmc_compiler::{CompileError, ErrorKind, Mode, Options, compile, compile_to_module, compile_to_text};
use serial_test::serial;
use tempfile::TempDir;

const FAKE_ELM: &str = r#"#!/bin/sh
out=""
prev=""
for arg in "$@"; do
	if [ "$prev" = "--output" ]; then out="$arg"; fi
	prev="$arg"
done
if [ -n "$ELMC_TRACE" ]; then
	printf '%s\n' "$out" > "$ELMC_TRACE"
	printf '%s\n' "$*" >> "$ELMC_TRACE"
fi
if [ "$LANG" != "en_US.UTF-8" ]; then
	echo "unexpected locale $LANG" >&2
	exit 3
fi
code=0
case "$2" in
	*Broken.elm) echo "-- SYNTAX PROBLEM --" >&2; exit 1 ;;
	*Warn.elm) code=1 ;;
esac
if [ -n "$out" ]; then
	printf '(function(scope){\n"use strict";\nscope.Elm = {};}(this));\n' > "$out"
fi
exit $code
"#;

struct Fixture {
	dir: TempDir,
	elm: PathBuf,
}

impl Fixture {
	fn new() -> Self {
		Self::with_mode(0o755)
	}

	fn with_mode(mode: u32) -> Self {
		let dir = tempfile::tempdir().unwrap();
		let elm = dir.path().join("elm");
		fs::write(&elm, FAKE_ELM).unwrap();
		fs::set_permissions(&elm, fs::Permissions::from_mode(mode)).unwrap();
		Self { dir, elm }
	}

	fn trace_path(&self) -> PathBuf {
		self.dir.path().join("trace")
	}

	fn options(&self) -> Options {
		Options::default()
			.path_to_elm(self.elm.to_string_lossy())
			.env("ELMC_TRACE", self.trace_path().to_string_lossy())
	}

	/// The `--output` path and full argument line seen by the last run.
	fn trace(&self) -> (PathBuf, String) {
		let trace = fs::read_to_string(self.trace_path()).unwrap();
		let mut lines = trace.lines();
		let output = PathBuf::from(lines.next().unwrap_or_default());
		(output, lines.next().unwrap_or_default().to_string())
	}
}

fn temp_dir_removed(output: &Path) -> bool {
	!output.parent().unwrap().exists()
}

#[tokio::test]
#[serial]
async fn compile_writes_requested_output() {
	let fixture = Fixture::new();
	let target = fixture.dir.path().join("out.js");
	compile("src/Main.elm", Some(fixture.options().output(&target).mode(Mode::Debug)))
		.await
		.unwrap();

	assert!(target.exists());
	let (_, args) = fixture.trace();
	assert_eq!(args, format!("make src/Main.elm --debug --output {}", target.display()));
}

#[tokio::test]
#[serial]
async fn compile_fails_on_nonzero_exit() {
	let fixture = Fixture::new();
	let err = compile("src/Warn.elm", Some(fixture.options())).await.unwrap_err();
	assert!(matches!(err, CompileError::NonZeroExit { code: Some(1), .. }));
}

#[tokio::test]
#[serial]
async fn missing_binary_is_reported() {
	let fixture = Fixture::new();
	let missing = fixture.dir.path().join("no-such-elm");
	let options = Options::default().path_to_elm(missing.to_string_lossy());
	let err = compile("src/Main.elm", Some(options)).await.unwrap_err();

	assert!(matches!(err, CompileError::BinaryNotFound { .. }));
	assert!(err.to_string().contains(&*missing.to_string_lossy()));
}

#[tokio::test]
#[serial]
async fn non_executable_binary_is_reported() {
	let fixture = Fixture::with_mode(0o644);
	let err = compile("src/Main.elm", Some(fixture.options())).await.unwrap_err();
	assert!(matches!(err, CompileError::PermissionDenied { .. }), "{err:?}");
}

#[tokio::test]
#[serial]
async fn text_mode_returns_script_and_cleans_up() {
	let fixture = Fixture::new();
	let text = compile_to_text("src/Main.elm", Some(fixture.options())).await.unwrap();

	assert_eq!(text.lines().next(), Some(SCRIPT_PROLOGUE));
	let (output, _) = fixture.trace();
	assert!(output.ends_with("elm.js"));
	assert!(temp_dir_removed(&output));
}

#[tokio::test]
#[serial]
async fn text_mode_fails_on_stderr_and_cleans_up() {
	let fixture = Fixture::new();
	let err = compile_to_text("src/Broken.elm", Some(fixture.options())).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Stderr);
	assert_eq!(err.to_string(), "-- SYNTAX PROBLEM --\n");
	let (output, _) = fixture.trace();
	assert!(temp_dir_removed(&output));
}

#[tokio::test]
#[serial]
async fn text_mode_tolerates_nonzero_exit_without_stderr() {
	let fixture = Fixture::new();
	let text = compile_to_text("src/Warn.elm", Some(fixture.options())).await.unwrap();
	assert!(text.starts_with(SCRIPT_PROLOGUE));
}

#[tokio::test]
#[serial]
async fn module_mode_writes_es_module() {
	let fixture = Fixture::new();
	let target = fixture.dir.path().join("elm.mjs");
	compile_to_module(["src/Main.elm"], Some(fixture.options().output(&target)))
		.await
		.unwrap();

	let module = fs::read_to_string(&target).unwrap();
	assert!(!module.contains(SCRIPT_PROLOGUE));
	assert!(module.contains("function init(scope){"));
	assert!(module.ends_with("export default moduleScope.Elm;"));
}
