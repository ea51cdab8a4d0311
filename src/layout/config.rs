//! Layout configuration.
//!
//! Every field has a default matching the installer image this crate was
//! built for, so an empty YAML document is a valid configuration.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};
use crate::dsstore::{DsStoreError, ViewStyle, WindowInfo};

/// Default mounted volume of the installer image
pub const DEFAULT_TARGET: &str = "/Volumes/GitHub Copilot for Xcode";

/// Default store file name; the packaging script renames it to `.DS_Store`
pub const DEFAULT_STORE_FILE: &str = "DSStore.template";

/// Background image location relative to the target
pub const DEFAULT_BACKGROUND: &str = ".background/background.png";

/// Complete description of one installer window layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Directory whose window is being laid out. Must exist.
    pub target: PathBuf,
    /// Name of the store file written inside `target`.
    pub store_file: String,
    /// Background image. Defaults to `.background/background.png` under the
    /// target.
    pub background: Option<PathBuf>,
    pub window: WindowBounds,
    pub icons: Vec<IconPlacement>,
    pub view: IconViewOptions,
    /// `fwsw`
    pub sidebar_width: u32,
    /// `fwvh`
    pub window_height: u16,
    /// `ICVO`
    pub icon_view_flag: bool,
    /// `icvt`
    pub label_text_size: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            target: PathBuf::from(DEFAULT_TARGET),
            store_file: DEFAULT_STORE_FILE.to_string(),
            background: None,
            window: WindowBounds::default(),
            icons: vec![
                IconPlacement::new("GitHub Copilot for Xcode.app", 100, 150),
                IconPlacement::new("Applications", 300, 150),
                IconPlacement::new(".DS_Store", 650, 175),
                IconPlacement::new(".background", 700, 175),
            ],
            view: IconViewOptions::default(),
            sidebar_width: 0,
            window_height: 300,
            icon_view_flag: true,
            label_text_size: 12,
        }
    }
}

impl LayoutConfig {
    /// Configuration rooted at `target` with every other value defaulted.
    pub fn for_target<P: Into<PathBuf>>(target: P) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    /// Parse a YAML document. Missing keys keep their defaults.
    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_saphyr::from_str(yaml)
            .map_err(|e| Error::Config(format!("failed to parse layout YAML: {}", e)))
    }

    #[cfg(not(feature = "yaml"))]
    pub fn from_yaml_str(_yaml: &str) -> Result<Self> {
        Err(Error::FeatureDisabled("yaml".to_string()))
    }

    /// Read and parse a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Path of the store file.
    pub fn store_path(&self) -> PathBuf {
        self.target.join(&self.store_file)
    }

    /// Path of the background image.
    pub fn background_path(&self) -> PathBuf {
        match &self.background {
            Some(path) => path.clone(),
            None => self.target.join(DEFAULT_BACKGROUND),
        }
    }

    /// Check the configuration before anything touches the disk.
    pub fn validate(&self) -> Result<()> {
        if !self.target.is_dir() {
            return Err(DsStoreError::TargetMissing(self.target.clone()).into());
        }
        if self.store_file.is_empty() || self.store_file.contains('/') {
            return Err(Error::Config(format!(
                "store file name {:?} must be a plain file name",
                self.store_file
            )));
        }
        self.window.validate()?;

        let mut seen = HashSet::new();
        for icon in &self.icons {
            if icon.name.is_empty() {
                return Err(Error::Config("icon entry with an empty name".to_string()));
            }
            if !seen.insert(icon.name.as_str()) {
                return Err(Error::Config(format!(
                    "icon entry {:?} is placed twice",
                    icon.name
                )));
            }
        }

        self.view.background_color.validate()
    }
}

/// Window frame in screen points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowBounds {
    pub top: u16,
    pub left: u16,
    pub bottom: u16,
    pub right: u16,
}

impl Default for WindowBounds {
    fn default() -> Self {
        Self {
            top: 100,
            left: 200,
            bottom: 400,
            right: 600,
        }
    }
}

impl WindowBounds {
    fn validate(&self) -> Result<()> {
        if self.top >= self.bottom || self.left >= self.right {
            return Err(Error::Config(format!(
                "window frame ({}, {}, {}, {}) is empty or inverted",
                self.top, self.left, self.bottom, self.right
            )));
        }
        Ok(())
    }

    /// `fwi0` value for an icon-view window with these bounds.
    pub fn to_window_info(self) -> WindowInfo {
        WindowInfo {
            top: self.top,
            left: self.left,
            bottom: self.bottom,
            right: self.right,
            view: ViewStyle::Icon,
        }
    }
}

/// Icon position for one directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconPlacement {
    pub name: String,
    pub x: u32,
    pub y: u32,
}

impl IconPlacement {
    pub fn new(name: impl Into<String>, x: u32, y: u32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
        }
    }
}

/// Values for the icon-view property list (`icvp`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconViewOptions {
    pub view_options_version: i64,
    pub grid_offset_x: i64,
    pub grid_offset_y: i64,
    pub grid_spacing: u32,
    pub icon_size: u32,
    pub text_size: u32,
    pub show_icon_preview: bool,
    pub show_item_info: bool,
    pub label_on_bottom: bool,
    pub scroll_position_x: i64,
    pub scroll_position_y: i64,
    pub arrange_by: String,
    pub background_color: BackgroundColor,
    /// 0 default, 1 colour, 2 picture
    pub background_type: u32,
}

impl Default for IconViewOptions {
    fn default() -> Self {
        Self {
            view_options_version: 1,
            grid_offset_x: 0,
            grid_offset_y: 0,
            grid_spacing: 100,
            icon_size: 128,
            text_size: 12,
            show_icon_preview: true,
            show_item_info: false,
            label_on_bottom: true,
            scroll_position_x: 0,
            scroll_position_y: 0,
            arrange_by: "none".to_string(),
            background_color: BackgroundColor::default(),
            background_type: 2,
        }
    }
}

/// RGB components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundColor {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self {
            red: 1.0,
            green: 1.0,
            blue: 1.0,
        }
    }
}

impl BackgroundColor {
    fn validate(&self) -> Result<()> {
        for (channel, value) in [("red", self.red), ("green", self.green), ("blue", self.blue)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "background {} component {} is outside 0..=1",
                    channel, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LayoutConfig::default();
        assert_eq!(
            config.store_path(),
            PathBuf::from("/Volumes/GitHub Copilot for Xcode/DSStore.template")
        );
        assert_eq!(
            config.background_path(),
            PathBuf::from("/Volumes/GitHub Copilot for Xcode/.background/background.png")
        );
        assert_eq!(config.icons.len(), 4);
        assert_eq!(config.icons[1], IconPlacement::new("Applications", 300, 150));
        assert_eq!(config.view.grid_spacing, 100);
        assert_eq!(config.view.background_type, 2);
        assert_eq!(config.window_height, 300);
    }

    #[test]
    fn test_validate_accepts_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        LayoutConfig::for_target(dir.path()).validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_missing_target() {
        let dir = tempfile::tempdir().unwrap();
        let err = LayoutConfig::for_target(dir.path().join("missing"))
            .validate()
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let dir = tempfile::tempdir().unwrap();

        let mut config = LayoutConfig::for_target(dir.path());
        config.window.bottom = config.window.top;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = LayoutConfig::for_target(dir.path());
        config.icons.push(IconPlacement::new("Applications", 1, 1));
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = LayoutConfig::for_target(dir.path());
        config.icons[0].name.clear();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = LayoutConfig::for_target(dir.path());
        config.store_file = "a/b".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = LayoutConfig::for_target(dir.path());
        config.view.background_color.blue = 1.5;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_yaml_overrides_keep_defaults() {
        let yaml = r#"
target: /tmp/installer
window:
  top: 10
  bottom: 500
view:
  icon_size: 96
  background_color:
    red: 0.5
"#;
        let config = LayoutConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.target, PathBuf::from("/tmp/installer"));
        assert_eq!(config.window.top, 10);
        assert_eq!(config.window.left, 200);
        assert_eq!(config.window.bottom, 500);
        assert_eq!(config.view.icon_size, 96);
        assert_eq!(config.view.grid_spacing, 100);
        assert_eq!(config.view.background_color.red, 0.5);
        assert_eq!(config.view.background_color.green, 1.0);
        assert_eq!(config.icons.len(), 4);
        assert_eq!(config.store_file, DEFAULT_STORE_FILE);
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_yaml_icons_replace_defaults() {
        let yaml = r#"
icons:
  - name: Installer.app
    x: 120
    y: 160
"#;
        let config = LayoutConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.icons, vec![IconPlacement::new("Installer.app", 120, 160)]);
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_yaml_errors_are_config_errors() {
        let err = LayoutConfig::from_yaml_str("window: [1, 2").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.yaml");
        std::fs::write(&path, "store_file: .DS_Store\n").unwrap();
        let config = LayoutConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.store_file, ".DS_Store");
    }

    #[cfg(not(feature = "yaml"))]
    #[test]
    fn test_yaml_requires_feature() {
        assert!(matches!(
            LayoutConfig::from_yaml_str(""),
            Err(Error::FeatureDisabled(_))
        ));
    }
}
