use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::input::DEFAULT_DEVICE_SWITCH_GRACE;
use crate::widget::PresserAttrs;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub buttons: Vec<PresserAttrs>,
    pub frame_ms: u64,
    pub fade_ms: u64,
    pub device_switch_grace_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buttons: vec![PresserAttrs::default(); 3],
            frame_ms: 16,
            fade_ms: 250,
            device_switch_grace_ms: DEFAULT_DEVICE_SWITCH_GRACE.as_millis() as u64,
        }
    }
}

impl Config {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_ms.max(1))
    }

    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }

    pub fn device_switch_grace(&self) -> Duration {
        Duration::from_millis(self.device_switch_grace_ms)
    }

    /// Resize the button list to `count`, cycling through the configured
    /// buttons (or defaults when none are configured).
    pub fn with_count(mut self, count: usize) -> Self {
        if self.buttons.is_empty() {
            self.buttons.push(PresserAttrs::default());
        }
        self.buttons = self.buttons.iter().cycle().take(count).cloned().collect();
        self
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> crate::error::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "longpress") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("longpress_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), %err, "ignoring unreadable config")
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> crate::error::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
