use crate::error::{RemapError, Result};
use crate::host::VirtualDeviceSource;
use crate::input::VirtualDevice;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const MAX_RECENT_PROFILES: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Switch profiles automatically when a mapped executable starts.
    #[serde(default)]
    pub autoload_profiles: bool,
    #[serde(default = "default_true")]
    pub highlight_input: bool,
    #[serde(default)]
    pub close_to_tray: bool,
    #[serde(default)]
    pub start_minimized: bool,
    /// Action added to an input when the user does not pick one.
    #[serde(default = "default_action")]
    pub default_action: String,
    #[serde(default)]
    pub mode_change_message: bool,
}

fn default_true() -> bool {
    true
}

fn default_action() -> String {
    "Remap".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            autoload_profiles: false,
            highlight_input: true,
            close_to_tray: false,
            start_minimized: false,
            default_action: default_action(),
            mode_change_message: false,
        }
    }
}

fn default_virtual_devices() -> Vec<VirtualDevice> {
    vec![VirtualDevice::new(1, 8, 128, 4)]
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: Settings,
    /// Executable path to profile path.
    #[serde(default)]
    pub profiles: BTreeMap<String, String>,
    /// Profile path to the name of the mode it was last in.
    #[serde(default)]
    pub last_mode: BTreeMap<String, String>,
    #[serde(default)]
    pub last_profile: Option<String>,
    #[serde(default)]
    pub recent_profiles: Vec<String>,
    #[serde(default = "default_virtual_devices")]
    pub virtual_devices: Vec<VirtualDevice>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            profiles: BTreeMap::new(),
            last_mode: BTreeMap::new(),
            last_profile: None,
            recent_profiles: vec![],
            virtual_devices: default_virtual_devices(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| RemapError::Config("Cannot find config directory".into()))?
            .join("vjoy-remap");
        std::fs::create_dir_all(&dir)?;
        Ok(dir.join("config.json"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Loads `path`, writing defaults there if it does not exist yet.
    /// A file that does not parse yields defaults and is left untouched.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }
        let data = std::fs::read_to_string(path)?;
        match serde_json::from_str(&data) {
            Ok(config) => Ok(config),
            Err(e) => {
                log::warn!("Ignoring unreadable config {}: {}", path.display(), e);
                Ok(Self::default())
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    pub fn executable_list(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    pub fn profile_for(&self, exec_path: &str) -> Option<&str> {
        self.profiles.get(exec_path).map(String::as_str)
    }

    pub fn set_profile(&mut self, exec_path: &str, profile_path: &str) {
        self.profiles.insert(exec_path.into(), profile_path.into());
    }

    pub fn remove_profile(&mut self, exec_path: &str) -> Option<String> {
        self.profiles.remove(exec_path)
    }

    pub fn set_last_mode(&mut self, profile_path: &str, mode_name: &str) {
        if profile_path.is_empty() || mode_name.is_empty() {
            return;
        }
        self.last_mode.insert(profile_path.into(), mode_name.into());
    }

    pub fn last_mode(&self, profile_path: &str) -> Option<&str> {
        self.last_mode.get(profile_path).map(String::as_str)
    }

    /// Records the most recently opened profile and moves it to the front of
    /// the recent list.
    pub fn set_last_profile(&mut self, profile_path: Option<&str>) {
        self.last_profile = profile_path.map(String::from);
        if let Some(path) = profile_path {
            self.recent_profiles.retain(|p| p != path);
            self.recent_profiles.insert(0, path.into());
            self.recent_profiles.truncate(MAX_RECENT_PROFILES);
        }
    }
}

impl VirtualDeviceSource for AppConfig {
    fn enumerate_virtual_devices(&self) -> Result<Vec<VirtualDevice>> {
        Ok(self.virtual_devices.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
        assert_eq!(config.settings.default_action, "Remap");
        assert_eq!(config.virtual_devices[0].buttons, 128);
    }

    #[test]
    fn unreadable_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "last_profile": "a.xml", "settings": { "close_to_tray": true } }"#)
            .unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.last_profile.as_deref(), Some("a.xml"));
        assert!(config.settings.close_to_tray);
        assert!(config.settings.highlight_input);
        assert_eq!(config.virtual_devices.len(), 1);
    }

    #[test]
    fn save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = AppConfig::default();
        config.set_profile("C:/games/sim.exe", "sim.xml");
        config.set_last_mode("sim.xml", "Flight");
        config.virtual_devices.push(VirtualDevice::new(2, 4, 16, 0));
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.profile_for("C:/games/sim.exe"), Some("sim.xml"));
        assert_eq!(loaded.last_mode("sim.xml"), Some("Flight"));
        assert_eq!(loaded.enumerate_virtual_devices().unwrap().len(), 2);
    }

    #[test]
    fn executable_mapping() {
        let mut config = AppConfig::default();
        config.set_profile("b.exe", "b.xml");
        config.set_profile("a.exe", "a.xml");
        assert_eq!(config.executable_list(), vec!["a.exe", "b.exe"]);
        assert_eq!(config.remove_profile("a.exe").as_deref(), Some("a.xml"));
        assert_eq!(config.profile_for("a.exe"), None);
    }

    #[test]
    fn empty_last_mode_is_ignored() {
        let mut config = AppConfig::default();
        config.set_last_mode("", "Flight");
        config.set_last_mode("sim.xml", "");
        assert!(config.last_mode.is_empty());
    }

    #[test]
    fn recent_profiles_are_capped_and_deduplicated() {
        let mut config = AppConfig::default();
        for name in ["1", "2", "3", "4", "5", "6"] {
            config.set_last_profile(Some(name));
        }
        config.set_last_profile(Some("4"));
        assert_eq!(config.recent_profiles, vec!["4", "6", "5", "3", "2"]);
        assert_eq!(config.last_profile.as_deref(), Some("4"));

        config.set_last_profile(None);
        assert_eq!(config.last_profile, None);
        assert_eq!(config.recent_profiles.len(), 5);
    }
}
