//! Settings management for stagelink.
//!
//! Handles loading/saving of the XML settings file and environment
//! overrides.

use quick_xml::de::from_str;
use quick_xml::se::to_string;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::scene::Transform;

/// Vector components as stored in the settings file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3Seed {
    #[serde(rename = "x", default)]
    pub x: f32,
    #[serde(rename = "y", default)]
    pub y: f32,
    #[serde(rename = "z", default)]
    pub z: f32,
}

/// A button seeded into the scene at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonSeed {
    /// Button id, unique within the scene
    #[serde(rename = "id")]
    pub id: String,

    /// Initial position
    #[serde(rename = "position", default)]
    pub position: Vec3Seed,

    /// Initial Euler rotation in radians
    #[serde(rename = "rotation", default)]
    pub rotation: Vec3Seed,

    /// Initial uniform scale
    #[serde(rename = "scale", default = "default_scale")]
    pub scale: f32,
}

impl ButtonSeed {
    /// Scene-side transform for this seed.
    pub fn transform(&self) -> Transform {
        Transform::new(
            glam::Vec3::new(self.position.x, self.position.y, self.position.z),
            glam::Vec3::new(self.rotation.x, self.rotation.y, self.rotation.z),
            self.scale,
        )
    }
}

/// Server settings stored in settings.xml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "StagelinkSettings")]
pub struct ServerSettings {
    /// Port for the HTTP/WebSocket server
    #[serde(rename = "apiPort", default = "default_api_port")]
    pub api_port: u16,

    /// Path of the persisted button config file.
    ///
    /// Relative paths resolve against the working directory. When absent,
    /// `button_config.json` in the stagelink config directory is used.
    #[serde(rename = "storePath", default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<String>,

    /// Whether external edits to the store file are reloaded and broadcast
    #[serde(rename = "watchStore", default = "default_watch_store")]
    pub watch_store: bool,

    /// Buttons created at scene initialization
    #[serde(rename = "buttons", default = "default_buttons")]
    pub buttons: Vec<ButtonSeed>,
}

/// Default API server port
fn default_api_port() -> u16 {
    5000
}

/// Default store watching state
fn default_watch_store() -> bool {
    true
}

/// Default uniform scale for seed buttons
fn default_scale() -> f32 {
    1.0
}

/// Default scene contents: one example button above the origin
fn default_buttons() -> Vec<ButtonSeed> {
    vec![ButtonSeed {
        id: "exampleButton".to_string(),
        position: Vec3Seed {
            x: 0.0,
            y: 1.0,
            z: 0.0,
        },
        rotation: Vec3Seed::default(),
        scale: default_scale(),
    }]
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            store_path: None,
            watch_store: default_watch_store(),
            buttons: default_buttons(),
        }
    }
}

impl ServerSettings {
    /// Get the stagelink config directory
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("stagelink");
            p
        })
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.xml"))
    }

    /// Load settings from an XML file
    pub fn load_from_file(path: &PathBuf) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(SettingsError::Io)?;
        from_str(&contents).map_err(SettingsError::XmlParse)
    }

    /// Save settings to an XML file
    pub fn save_to_file(&self, path: &PathBuf) -> Result<(), SettingsError> {
        let xml = to_string(self).map_err(SettingsError::XmlWrite)?;
        let formatted = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", xml);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(SettingsError::Io)?;
        }
        fs::write(path, formatted).map_err(SettingsError::Io)?;
        Ok(())
    }

    /// Load settings from the config directory, writing a default file on
    /// first run, then apply environment overrides.
    ///
    /// A broken settings file logs a warning and falls back to defaults
    /// rather than refusing to start.
    pub fn load_or_init() -> Self {
        let mut settings = match Self::settings_path() {
            Some(path) if path.exists() => match Self::load_from_file(&path) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("Failed to load settings, using defaults: {}", e);
                    Self::default()
                }
            },
            Some(path) => {
                let settings = Self::default();
                match settings.save_to_file(&path) {
                    Ok(()) => tracing::info!(path = %path.display(), "Wrote default settings"),
                    Err(e) => tracing::warn!("Failed to write default settings: {}", e),
                }
                settings
            }
            None => {
                tracing::warn!("Could not find config directory, using default settings");
                Self::default()
            }
        };
        settings.apply_env_overrides();
        settings
    }

    /// Apply environment overrides (`STAGELINK_PORT`, then `PORT`).
    pub fn apply_env_overrides(&mut self) {
        let raw = std::env::var("STAGELINK_PORT").or_else(|_| std::env::var("PORT"));
        if let Ok(raw) = raw {
            if let Some(port) = parse_port(&raw) {
                tracing::info!(port, "API port overridden from environment");
                self.api_port = port;
            }
        }
    }

    /// Resolve the button store path: explicit setting, config directory,
    /// or the working directory as a last resort.
    pub fn resolved_store_path(&self) -> PathBuf {
        if let Some(path) = &self.store_path {
            return PathBuf::from(path);
        }
        match Self::config_dir() {
            Some(dir) => dir.join("button_config.json"),
            None => PathBuf::from("button_config.json"),
        }
    }
}

/// Parse a port value from an environment variable.
fn parse_port(raw: &str) -> Option<u16> {
    match raw.trim().parse() {
        Ok(port) => Some(port),
        Err(_) => {
            tracing::warn!(raw, "Ignoring unparseable port override");
            None
        }
    }
}

/// Settings-related errors
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    XmlParse(quick_xml::DeError),
    XmlWrite(quick_xml::SeError),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "IO error: {}", e),
            SettingsError::XmlParse(e) => write!(f, "XML parse error: {}", e),
            SettingsError::XmlWrite(e) => write!(f, "XML write error: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_default_settings() {
        let settings = ServerSettings::default();
        assert_eq!(settings.api_port, 5000);
        assert!(settings.watch_store);
        assert!(settings.store_path.is_none());
        assert_eq!(settings.buttons.len(), 1);
        assert_eq!(settings.buttons[0].id, "exampleButton");
    }

    #[test]
    fn test_seed_transform() {
        let settings = ServerSettings::default();
        let transform = settings.buttons[0].transform();
        assert_eq!(transform.position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(transform.rotation, Vec3::ZERO);
        assert_eq!(transform.scale, 1.0);
    }

    #[test]
    fn test_xml_round_trip() {
        let mut settings = ServerSettings::default();
        settings.api_port = 8123;
        settings.store_path = Some("buttons.json".to_string());
        settings.buttons.push(ButtonSeed {
            id: "second".to_string(),
            position: Vec3Seed {
                x: 1.0,
                y: 0.0,
                z: -2.0,
            },
            rotation: Vec3Seed::default(),
            scale: 0.5,
        });

        let xml = to_string(&settings).unwrap();
        let parsed: ServerSettings = from_str(&xml).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("5000"), Some(5000));
        assert_eq!(parse_port(" 8080 "), Some(8080));
        assert_eq!(parse_port("not-a-port"), None);
        assert_eq!(parse_port("70000"), None);
    }
}
