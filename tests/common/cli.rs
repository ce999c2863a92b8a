#![allow(dead_code)]

use assert_cmd::Command;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tempfile::TempDir;

#[derive(Debug)]
pub struct TdRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
    pub duration: Duration,
    pub log_path: PathBuf,
}

impl TdRun {
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(self.stdout.trim())
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}):\n{}", self.stdout))
    }

    /// The `error.code` of the structured error printed after any log lines.
    pub fn error_code(&self) -> String {
        let lines: Vec<&str> = self.stderr.lines().collect();
        let start = lines
            .iter()
            .rposition(|line| *line == "{")
            .unwrap_or_else(|| panic!("no JSON error on stderr:\n{}", self.stderr));
        let value: serde_json::Value = serde_json::from_str(&lines[start..].join("\n"))
            .unwrap_or_else(|e| panic!("bad JSON error ({e}):\n{}", self.stderr));
        value["error"]["code"].as_str().unwrap_or_default().to_string()
    }
}

pub struct TdWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub log_dir: PathBuf,
}

impl TdWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        let log_dir = root.join("logs");
        fs::create_dir_all(&log_dir).expect("log dir");
        Self {
            temp_dir,
            root,
            log_dir,
        }
    }

    pub fn outbox(&self) -> PathBuf {
        self.root.join(".tickets").join("outbox")
    }

    pub fn outbox_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = fs::read_dir(self.outbox())
            .map(|entries| entries.filter_map(|e| e.ok().map(|e| e.path())).collect())
            .unwrap_or_default();
        files.sort();
        files
    }
}

pub fn run_td<I, S>(workspace: &TdWorkspace, args: I, label: &str) -> TdRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_td_with_env(
        workspace,
        args,
        std::iter::empty::<(String, String)>(),
        label,
    )
}

pub fn run_td_with_env<I, S, E, K, V>(
    workspace: &TdWorkspace,
    args: I,
    env_vars: E,
    label: &str,
) -> TdRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("td"));
    cmd.current_dir(&workspace.root);
    cmd.env_remove("TD_DIR");
    cmd.env_remove("TD_ACTOR");
    cmd.env("NO_COLOR", "1");
    cmd.env("RUST_LOG", "ticket_desk=debug");
    cmd.env("RUST_BACKTRACE", "1");
    cmd.env("HOME", &workspace.root);
    cmd.args(args);
    cmd.envs(env_vars);

    let start = Instant::now();
    let output = cmd.output().expect("run td");
    let duration = start.elapsed();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let log_path = workspace.log_dir.join(format!("{label}.log"));
    let log_body = format!(
        "label: {label}\nduration: {duration:?}\nstatus: {}\nargs: {:?}\n\nstdout:\n{stdout}\n\nstderr:\n{stderr}\n",
        output.status,
        cmd.get_args().collect::<Vec<_>>(),
    );
    fs::write(&log_path, log_body).expect("write log");

    TdRun {
        stdout,
        stderr,
        status: output.status,
        duration,
        log_path,
    }
}
