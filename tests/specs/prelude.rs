// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for specs: temp projects and command assertions.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::{Duration, Instant};

use assert_cmd::Command;
use tempfile::TempDir;

/// Upper bound for polling waits in specs
pub const SPEC_WAIT_MAX_MS: u64 = 5_000;

/// `kiln` with no project; state goes to a throwaway directory.
pub fn cli() -> CliBuilder {
    let state = tempfile::tempdir().unwrap();
    let mut builder = CliBuilder::new(state.path(), None);
    builder.keep = Some(state);
    builder
}

/// A command under construction, run by `passes` or `fails`.
pub struct CliBuilder {
    cmd: Command,
    keep: Option<TempDir>,
}

impl CliBuilder {
    fn new(state_dir: &Path, cwd: Option<&Path>) -> Self {
        let mut cmd = Command::cargo_bin("kiln").unwrap();
        cmd.env("KILN_STATE_DIR", state_dir).env("NO_COLOR", "1").env_remove("KILN_BUILD_FILE");
        if let Some(cwd) = cwd {
            cmd.current_dir(cwd);
        }
        Self { cmd, keep: None }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    fn run(mut self) -> RunResult {
        let output = self.cmd.output().unwrap();
        RunResult { output, _keep: self.keep }
    }

    /// Run and require exit code 0.
    #[track_caller]
    pub fn passes(self) -> RunResult {
        let result = self.run();
        assert!(
            result.output.status.success(),
            "expected success, got {:?}\nstdout:\n{}\nstderr:\n{}",
            result.output.status.code(),
            result.stdout(),
            result.stderr()
        );
        result
    }

    /// Run and require a non-zero exit.
    #[track_caller]
    pub fn fails(self) -> RunResult {
        let result = self.run();
        assert!(!result.output.status.success(), "expected failure\nstdout:\n{}", result.stdout());
        result
    }
}

pub struct RunResult {
    output: Output,
    _keep: Option<TempDir>,
}

impl RunResult {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn code(&self) -> Option<i32> {
        self.output.status.code()
    }

    #[track_caller]
    pub fn stdout_has(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(needle), "stdout missing {:?}:\n{}", needle, stdout);
        self
    }

    #[track_caller]
    pub fn stderr_has(self, needle: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(needle), "stderr missing {:?}:\n{}", needle, stderr);
        self
    }

    #[track_caller]
    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    #[track_caller]
    pub fn exits_with(self, code: i32) -> Self {
        assert_eq!(self.code(), Some(code), "stderr:\n{}", self.stderr());
        self
    }
}

/// Temporary repository plus its own daemon state directory.
pub struct Project {
    root: TempDir,
    state: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self { root: tempfile::tempdir().unwrap(), state: tempfile::tempdir().unwrap() }
    }

    pub fn state_path(&self) -> &Path {
        self.state.path()
    }

    /// Write `content` at `rel`, creating parent directories.
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn dir(&self, rel: &str) -> PathBuf {
        let path = self.root.path().join(rel);
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    /// `kiln` run from the project root with the project's state directory.
    pub fn kiln(&self) -> CliBuilder {
        CliBuilder::new(self.state.path(), Some(self.root.path()))
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        if self.state.path().join("kilnd.sock").exists() {
            let _ = self.kiln().args(&["daemon", "stop"]).run();
        }
    }
}

/// Poll `check` until it holds or `max_ms` passes.
pub fn wait_for(max_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    check()
}
