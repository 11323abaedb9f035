#![allow(dead_code)]
use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    _dir: TempDir,
    pub cfg: PathBuf,
    pub state: PathBuf,
    pub catalog: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = dir.path().join("config");
        let state = dir.path().join("state");
        std::fs::create_dir_all(&cfg).expect("cfg dir");
        let catalog = dir.path().join("archive.json");
        std::fs::write(&catalog, include_str!("fixtures/archive.json")).expect("catalog");
        Self {
            _dir: dir,
            cfg,
            state,
            catalog,
        }
    }

    pub fn bin(&self) -> Command {
        let mut cmd = Command::cargo_bin("pinback").unwrap();
        cmd.env("XDG_CONFIG_HOME", &self.cfg);
        cmd.env("XDG_STATE_HOME", &self.state);
        cmd.env_remove("PINBACK_LOG");
        cmd
    }

    /// `bin()` reading from the local fixture catalog.
    pub fn offline(&self) -> Command {
        let mut cmd = self.bin();
        cmd.arg("--catalog").arg(&self.catalog);
        cmd
    }

    pub fn write_settings(&self, toml: &str) -> PathBuf {
        let dir = self.cfg.join("pinback");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(&path, toml).unwrap();
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
