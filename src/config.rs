use crate::model::TankRules;
use crate::poller::PollerConfig;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub poll_interval_ms: u64,
    pub poll_timeout_ms: u64,
    pub frame_ms: u64,
    /// Horizontal px represented by one terminal column.
    pub px_per_col: u32,
    pub seed: Option<u64>,
    pub rules: TankRules,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 3000,
            poll_timeout_ms: 2500,
            frame_ms: 33,
            px_per_col: 8,
            seed: None,
            rules: TankRules::default(),
        }
    }
}

impl Settings {
    pub fn poller(&self) -> PollerConfig {
        PollerConfig {
            period: Duration::from_millis(self.poll_interval_ms.max(100)),
            timeout: Duration::from_millis(self.poll_timeout_ms.max(1)),
        }
    }
}

pub struct Paths {
    pub settings_path: PathBuf,
    pub log_path: PathBuf,
}

pub fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "fishtank", "FishTank")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir)
        .with_context(|| format!("could not create {}", dir.display()))?;
    Ok(Paths {
        settings_path: dir.join("settings.json"),
        log_path: dir.join("fishtank.log"),
    })
}

/// Missing file means defaults; a file that does not parse also falls back
/// to defaults, with a warning.
pub fn load_settings(path: &Path) -> Settings {
    let Ok(s) = fs::read_to_string(path) else {
        return Settings::default();
    };
    match serde_json::from_str::<Settings>(&s) {
        Ok(v) => v,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable settings");
            Settings::default()
        }
    }
}

pub fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // rename over an existing file is not atomic on Windows
    if cfg!(windows) && to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fishtank-{}-{name}", std::process::id()))
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let path = scratch("partial.json");
        fs::write(&path, r#"{"poll_interval_ms": 5000, "rules": {"exit_margin_px": 300}}"#).unwrap();
        let s = load_settings(&path);
        assert_eq!(s.poll_interval_ms, 5000);
        assert_eq!(s.frame_ms, 33);
        assert_eq!(s.rules.exit_margin_px, 300);
        assert_eq!(s.rules.tick_ms, 100);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn malformed_file_falls_back() {
        let path = scratch("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(&path), Settings::default());
        fs::remove_file(&path).ok();
    }

    #[test]
    fn save_then_load() {
        let path = scratch("saved.json");
        let s = Settings {
            seed: Some(17),
            px_per_col: 10,
            ..Settings::default()
        };
        save_settings_atomic(&path, &s).unwrap();
        assert_eq!(load_settings(&path), s);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn poller_period_has_a_floor() {
        let s = Settings {
            poll_interval_ms: 0,
            ..Settings::default()
        };
        assert_eq!(s.poller().period, Duration::from_millis(100));
    }
}
