//! Test helpers for behavioral specifications.
//!
//! Provides high-level DSL for testing berth CLI behavior.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

// Short lock waits so a wedged spec fails fast.
const BERTH_LOCK_WAIT_MS: &str = "2000";
const BERTH_LOCK_POLL_MS: &str = "5";
const BERTH_STOP_GRACE_MS: &str = "500";

// Spec polling timeouts
pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 2000;

/// Returns the path to a binary, checking llvm-cov target directory first.
/// Falls back to resolving relative to the test binary itself when
/// CARGO_MANIFEST_DIR is stale.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    // The test binary lives at target/debug/deps/specs-<hash>, so its
    // grandparent is target/debug/.
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

pub fn berth_cmd() -> Command {
    Command::new(binary_path("berth"))
}

/// Create a CLI builder for berth commands
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// High-level CLI builder for fluent test assertions
pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
            envs: vec![
                ("BERTH_LOCK_WAIT_MS".into(), BERTH_LOCK_WAIT_MS.into()),
                ("BERTH_LOCK_POLL_MS".into(), BERTH_LOCK_POLL_MS.into()),
                ("BERTH_STOP_GRACE_MS".into(), BERTH_STOP_GRACE_MS.into()),
                ("BERTH_NO_DOCKER".into(), "1".into()),
                ("NO_COLOR".into(), "1".into()),
            ],
        }
    }

    /// Add CLI arguments
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set working directory
    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    /// Set environment variable
    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((
            key.to_string(),
            value.as_ref().to_string_lossy().to_string(),
        ));
        self
    }

    /// Build the command without running it
    pub fn command(self) -> Command {
        let mut cmd = berth_cmd();
        cmd.args(&self.args);

        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }

        // Keep the caller's settings from leaking into specs.
        cmd.env_remove("BERTH_HOME");
        cmd.env_remove("BERTH_LOG");

        for (key, value) in self.envs {
            cmd.env(key, value);
        }

        cmd
    }

    fn output(self) -> Output {
        self.command().output().expect("command should run")
    }

    /// Run and expect success (exit code 0)
    pub fn passes(self) -> RunAssert {
        let output = self.output();
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run and expect failure (non-zero exit code)
    pub fn fails(self) -> RunAssert {
        let output = self.output();
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

/// Result of a CLI run for chaining assertions
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout())
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}):\n{}", self.stdout()))
    }

    /// Assert the exit code.
    pub fn code(self, expected: i32) -> Self {
        assert_eq!(
            self.output.status.code(),
            Some(expected),
            "stdout: {}\nstderr: {}",
            self.stdout(),
            self.stderr()
        );
        self
    }

    /// Assert stdout equals expected exactly.
    pub fn stdout_eq(self, expected: &str) -> Self {
        assert_eq!(self.stdout(), expected);
        self
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain '{}'\nstdout: {}",
            expected,
            stdout
        );
        self
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            !stdout.contains(unexpected),
            "stdout should not contain '{}'\nstdout: {}",
            unexpected,
            stdout
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain '{}'\nstderr: {}",
            expected,
            stderr
        );
        self
    }
}

// =============================================================================
// Polling
// =============================================================================

/// Poll a condition until it returns true or timeout is reached.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    let poll_interval = std::time::Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

// =============================================================================
// Workspace
// =============================================================================

/// A workspace checkout in a temp dir with its own isolated registry.
///
/// The checkout directory is named after the workspace, so its hashed base
/// port is deterministic. Give every spec a distinct name.
pub struct Workspace {
    dir: tempfile::TempDir,
    name: String,
    home: tempfile::TempDir,
}

impl Workspace {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(name)).unwrap();
        Self {
            dir,
            name: name.to_string(),
            home: tempfile::tempdir().unwrap(),
        }
    }

    /// A workspace with `berth.toml` already written.
    pub fn with_manifest(name: &str, manifest: &str) -> Self {
        let ws = Self::new(name);
        ws.file("berth.toml", manifest);
        ws
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checkout root
    pub fn path(&self) -> PathBuf {
        self.dir.path().join(&self.name)
    }

    /// Isolated BERTH_HOME
    pub fn home(&self) -> &Path {
        self.home.path()
    }

    /// Write a file under the checkout (parent directories created)
    pub fn file(&self, path: impl AsRef<Path>, content: &str) {
        let full_path = self.path().join(path.as_ref());
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full_path, content).unwrap();
    }

    pub fn registry_contents(&self) -> String {
        std::fs::read_to_string(self.home().join("registry.tsv")).unwrap_or_default()
    }

    /// Run berth in this checkout
    pub fn berth(&self) -> CliBuilder {
        cli().pwd(self.path()).env("BERTH_HOME", self.home())
    }

    /// Primary port of a resource, via `berth port`.
    pub fn port(&self, resource: &str) -> u16 {
        self.berth()
            .args(&["port", resource])
            .passes()
            .stdout()
            .trim()
            .parse()
            .unwrap()
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        // Never leave supervised processes behind
        let mut cmd = self.berth().args(&["stop"]).command();
        cmd.stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null());
        let _ = cmd.status();
    }
}

/// Two docker services and one dev server
pub const BASIC_MANIFEST: &str = r#"
[project]
name = "shop"

[[docker]]
name = "postgres"

[[docker]]
name = "minio"
container_ports = [9000, 9001]

[[dev_server]]
name = "web"
command = "sleep 30"
offset = 10
"#;
