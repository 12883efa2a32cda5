//! Application configuration and persisted settings
//!
//! Everything lives in one `config.toml`. Each recognised key is decoded on
//! its own, so one bad value only resets that key to its default.

use crate::command::CommandId;
use crate::error::AppError;
use crate::navigation::MAX_STEPS;
use crate::picker::PickerMode;
use directories::ProjectDirs;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub viewer: ViewerSettings,
    pub picker: PickerSettings,
    /// Last window position and size; `None` until the window first closes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowBounds>,
    /// Command id -> key names
    pub keybindings: BTreeMap<String, Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            viewer: ViewerSettings::default(),
            picker: PickerSettings::default(),
            window: None,
            keybindings: default_keybindings(),
        }
    }
}

/// Settings changed from the keyboard and saved immediately
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerSettings {
    /// Images per page, between 1 and `MAX_STEPS`
    pub steps: usize,
    /// Show the metadata tooltip over each image
    pub tooltip_enabled: bool,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            steps: 1,
            tooltip_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PickerSettings {
    pub mode: PickerMode,
}

/// Window position and inner size in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl WindowBounds {
    pub const DEFAULT_WIDTH: u32 = 1280;
    pub const DEFAULT_HEIGHT: u32 = 960;
}

impl AppConfig {
    /// Decode a config file, substituting defaults for anything missing or
    /// of the wrong type. A file that is not valid TOML gives the defaults.
    pub fn from_toml_str(content: &str) -> Self {
        let table: toml::Table = match content.parse() {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("Config is not valid TOML, using defaults: {}", e);
                return Self::default();
            }
        };

        let defaults = ViewerSettings::default();
        let mut steps: usize = read_key(&table, "viewer", "steps", defaults.steps);
        if steps == 0 {
            tracing::warn!("viewer.steps must be at least 1, using 1");
            steps = 1;
        } else if steps > MAX_STEPS {
            tracing::warn!("viewer.steps must be at most {}, using {}", MAX_STEPS, MAX_STEPS);
            steps = MAX_STEPS;
        }
        let viewer = ViewerSettings {
            steps,
            tooltip_enabled: read_key(&table, "viewer", "tooltip_enabled", defaults.tooltip_enabled),
        };

        let picker = PickerSettings {
            mode: read_key(&table, "picker", "mode", PickerMode::default()),
        };

        let window = match table.get("window") {
            None => None,
            Some(value) => match value.clone().try_into::<WindowBounds>() {
                Ok(bounds) if bounds.width > 0 && bounds.height > 0 => Some(bounds),
                Ok(_) => {
                    tracing::warn!("Ignoring empty window bounds");
                    None
                }
                Err(e) => {
                    tracing::warn!("Ignoring malformed window bounds: {}", e);
                    None
                }
            },
        };

        let mut keybindings = default_keybindings();
        if let Some(value) = table.get("keybindings") {
            match value.as_table() {
                Some(user) => {
                    for (id, keys) in user {
                        match keys.clone().try_into::<Vec<String>>() {
                            Ok(keys) => {
                                keybindings.insert(id.clone(), keys);
                            }
                            Err(_) => tracing::warn!("keybindings.{} must be a list of key names", id),
                        }
                    }
                }
                None => tracing::warn!("keybindings must be a table"),
            }
        }

        Self {
            viewer,
            picker,
            window,
            keybindings,
        }
    }

    pub fn to_toml_string(&self) -> Result<String, AppError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "MinimalImageViewer", "MinimalImageViewer")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }
}

/// `table[section][key]` decoded as `T`, or `default` (with a warning on mismatch)
fn read_key<T: DeserializeOwned>(table: &toml::Table, section: &str, key: &str, default: T) -> T {
    let Some(value) = table.get(section).and_then(|s| s.get(key)) else {
        return default;
    };

    match value.clone().try_into::<T>() {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("Invalid value for {}.{} ({}), using default", section, key, e);
            default
        }
    }
}

/// Key bindings modelled on `less`
pub fn default_keybindings() -> BTreeMap<String, Vec<String>> {
    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|k| k.to_string()).collect()
    }

    let mut kb = BTreeMap::new();

    kb.insert(CommandId::APP_OPEN.into(), keys(&["o", "O"]));
    kb.insert(CommandId::APP_RELOAD.into(), keys(&["r", "R"]));
    kb.insert(CommandId::APP_QUIT.into(), keys(&["q", "Q"]));
    kb.insert(CommandId::APP_TOGGLE_DEVTOOLS.into(), keys(&["F12"]));

    kb.insert(CommandId::VIEW_TOGGLE_HELP.into(), keys(&["h", "H"]));
    kb.insert(CommandId::VIEW_TOGGLE_TOOLTIP.into(), keys(&["i", "I"]));
    kb.insert(CommandId::VIEW_MORE_PER_PAGE.into(), keys(&["ArrowRight"]));
    kb.insert(CommandId::VIEW_FEWER_PER_PAGE.into(), keys(&["ArrowLeft"]));

    kb.insert(
        CommandId::NAV_NEXT_PAGE.into(),
        keys(&["f", "j", "PageDown", "ArrowDown", "Space", "Enter"]),
    );
    kb.insert(CommandId::NAV_PREV_PAGE.into(), keys(&["b", "k", "PageUp", "ArrowUp"]));
    kb.insert(CommandId::NAV_FIRST_PAGE.into(), keys(&["g", "<", "Home"]));
    kb.insert(CommandId::NAV_LAST_PAGE.into(), keys(&["G", ">", "End"]));

    kb
}

/// Persistent key-value settings
pub trait SettingsStore: Send + Sync {
    /// Current settings; defaults when nothing was saved yet
    fn load(&self) -> AppConfig;

    fn save(&self, config: &AppConfig) -> Result<(), AppError>;

    /// Load, modify, save
    fn update(&self, f: &dyn Fn(&mut AppConfig)) -> Result<(), AppError> {
        let mut config = self.load();
        f(&mut config);
        self.save(&config)
    }
}

/// Settings stored in a TOML file
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform config location
    pub fn default_location() -> Self {
        Self::new(AppConfig::config_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> AppConfig {
        if !self.path.exists() {
            tracing::info!("Using default configuration");
            return AppConfig::default();
        }

        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let config = AppConfig::from_toml_str(&content);
                tracing::info!("Configuration loaded from {:?}", self.path);
                config
            }
            Err(e) => {
                tracing::warn!("Failed to read {:?}, using defaults: {}", self.path, e);
                AppConfig::default()
            }
        }
    }

    fn save(&self, config: &AppConfig) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.path, config.to_toml_string()?)?;

        tracing::debug!("Configuration saved to {:?}", self.path);
        Ok(())
    }
}

/// Settings kept in memory only
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    config: RwLock<AppConfig>,
}

impl MemorySettingsStore {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> AppConfig {
        self.config.read().clone()
    }

    fn save(&self, config: &AppConfig) -> Result<(), AppError> {
        *self.config.write() = config.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(AppConfig::from_toml_str(""), AppConfig::default());
        assert_eq!(AppConfig::from_toml_str("this is = = not toml"), AppConfig::default());
    }

    #[test]
    fn test_valid_values_are_read() {
        let config = AppConfig::from_toml_str(
            r#"
            [viewer]
            steps = 4
            tooltip_enabled = true

            [picker]
            mode = "files"

            [window]
            x = 10
            y = -20
            width = 800
            height = 600
            "#,
        );

        assert_eq!(config.viewer.steps, 4);
        assert!(config.viewer.tooltip_enabled);
        assert_eq!(config.picker.mode, PickerMode::Files);
        assert_eq!(
            config.window,
            Some(WindowBounds { x: 10, y: -20, width: 800, height: 600 })
        );
    }

    #[test]
    fn test_type_mismatch_uses_default_per_key() {
        let config = AppConfig::from_toml_str(
            r#"
            [viewer]
            steps = "three"
            tooltip_enabled = true

            [picker]
            mode = 7
            "#,
        );

        assert_eq!(config.viewer.steps, 1);
        assert!(config.viewer.tooltip_enabled);
        assert_eq!(config.picker.mode, PickerMode::Multi);
    }

    #[test]
    fn test_steps_floor() {
        let zero = AppConfig::from_toml_str("[viewer]\nsteps = 0\n");
        assert_eq!(zero.viewer.steps, 1);

        let negative = AppConfig::from_toml_str("[viewer]\nsteps = -3\n");
        assert_eq!(negative.viewer.steps, 1);
    }

    #[test]
    fn test_steps_ceiling() {
        let huge = AppConfig::from_toml_str("[viewer]\nsteps = 9223372036854775807\n");
        assert_eq!(huge.viewer.steps, MAX_STEPS);

        let state = crate::state::ViewerState::new(huge.viewer);
        assert!(state.shows_help());

        let at_cap = AppConfig::from_toml_str(&format!("[viewer]\nsteps = {}\n", MAX_STEPS));
        assert_eq!(at_cap.viewer.steps, MAX_STEPS);
    }

    #[test]
    fn test_malformed_window_is_dropped() {
        let config = AppConfig::from_toml_str("[window]\nx = 1\ny = 2\nwidth = \"wide\"\nheight = 3\n");
        assert_eq!(config.window, None);

        let config = AppConfig::from_toml_str("[window]\nx = 1\ny = 2\nwidth = 0\nheight = 3\n");
        assert_eq!(config.window, None);
    }

    #[test]
    fn test_keybindings_override_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [keybindings]
            "app.quit" = ["x"]
            "nav.next_page" = "n"
            "#,
        );

        assert_eq!(config.keybindings["app.quit"], vec!["x"]);
        assert_eq!(config.keybindings["nav.next_page"], default_keybindings()["nav.next_page"]);
        assert_eq!(config.keybindings["app.open"], vec!["o", "O"]);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("nested").join("config.toml"));

        assert_eq!(store.load(), AppConfig::default());

        let mut config = AppConfig::default();
        config.viewer.steps = 6;
        config.window = Some(WindowBounds { x: 0, y: 0, width: 640, height: 480 });
        store.save(&config).unwrap();

        assert_eq!(store.load(), config);
    }

    #[test]
    fn test_update_keeps_other_keys() {
        let store = MemorySettingsStore::default();
        store
            .update(&|c| c.window = Some(WindowBounds { x: 1, y: 2, width: 3, height: 4 }))
            .unwrap();
        store.update(&|c| c.viewer.tooltip_enabled = true).unwrap();

        let config = store.load();
        assert!(config.viewer.tooltip_enabled);
        assert_eq!(config.window.map(|w| w.width), Some(3));
    }
}
