#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

pub const PER_DAY_CONFIG: &str = "layout = \"per_day\"\n";

pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    /// Data directory configured for the per-day layout
    pub fn per_day() -> Self {
        let dir = Self::new();
        dir.write_config(PER_DAY_CONFIG).expect("write config");
        dir
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        self.write_file(".dayplan.toml", contents)
    }

    pub fn read_json(&self, rel_path: &str) -> Result<Value, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(self.dir.path().join(rel_path))?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// `dayplan` running inside this directory with a clean environment
    pub fn cmd(&self) -> Command {
        let mut cmd = dayplan_cmd();
        cmd.current_dir(self.path());
        cmd
    }

    /// Same as [`TestDir::cmd`] with a fixed identity
    pub fn user_cmd(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.args(["--id", "kim", "--password", "1234"]);
        cmd
    }

    /// Run with `--json`, assert success, and return the envelope's `data`.
    pub fn json_data(&self, mut cmd: Command, args: &[&str]) -> Result<Value, Box<dyn std::error::Error>> {
        let output = cmd.arg("--json").args(args).output()?;
        if !output.status.success() {
            return Err(format!(
                "dayplan {:?} failed: {}{}",
                args,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            )
            .into());
        }
        let value: Value = serde_json::from_slice(&output.stdout)?;
        assert_eq!(value["status"], "success");
        Ok(value["data"].clone())
    }
}

pub fn dayplan_cmd() -> Command {
    let mut cmd = Command::cargo_bin("dayplan").expect("binary");
    cmd.env_remove("DAYPLAN_DIR")
        .env_remove("DAYPLAN_ID")
        .env_remove("DAYPLAN_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}
