//! Configuration types for Flowpad.
//!
//! This module provides configuration structures that control layout
//! spacing, where the diagram is persisted and how it is styled on export.
//! All types implement [`serde::Deserialize`] so a front end can load them
//! from TOML or any other serde format.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`LayoutConfig`] - Node size, spacing and default direction.
//! - [`StorageConfig`] - Storage file location and slot key.
//! - [`StyleConfig`] - Visual options such as background color.
//!
//! # Example
//!
//! ```
//! # use flowpad::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.storage().key(), "flowpad-flow");
//! assert!(config.style().background_color().is_ok());
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use flowpad_core::{
    color::{Color, ParseColorError},
    direction::Direction,
    geometry::Size,
};

/// Key used for the persisted slot when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "flowpad-flow";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Storage configuration section.
    #[serde(default)]
    storage: StorageConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(layout: LayoutConfig, storage: StorageConfig, style: StyleConfig) -> Self {
        Self {
            layout,
            storage,
            style,
        }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the storage configuration.
    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Node size and spacing handed to the layout engine.
///
/// Every node is laid out with the same fixed size regardless of its label.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    node_width: f32,
    node_height: f32,
    /// Distance between consecutive layers along the flow axis.
    layer_spacing: f32,
    /// Distance between neighbouring nodes within a layer.
    node_spacing: f32,
    /// Margin kept around the whole layout.
    padding: f32,
    /// Direction used when a layout is requested without one.
    direction: Direction,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 150.0,
            node_height: 50.0,
            layer_spacing: 100.0,
            node_spacing: 80.0,
            padding: 12.0,
            direction: Direction::Down,
        }
    }
}

impl LayoutConfig {
    /// Returns the fixed node size used for layout.
    pub fn node_size(&self) -> Size {
        Size::new(self.node_width, self.node_height)
    }

    pub fn layer_spacing(&self) -> f32 {
        self.layer_spacing
    }

    pub fn node_spacing(&self) -> f32 {
        self.node_spacing
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// Where the diagram is persisted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file backing the key/value store. `None` keeps data in memory.
    path: Option<PathBuf>,
    /// Slot the snapshot is saved under.
    key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl StorageConfig {
    pub fn new(path: Option<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path,
            key: key.into(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Visual styling configuration for exported diagrams.
///
/// Fields that are not set fall back to renderer defaults.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    /// Background [`Color`] for exports, as a color string.
    #[serde(default)]
    background_color: Option<String>,
}

impl StyleConfig {
    pub fn new(background_color: Option<String>) -> Self {
        Self { background_color }
    }

    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, ParseColorError> {
        self.background_color.as_deref().map(Color::new).transpose()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_layout_defaults() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.node_size(), Size::new(150.0, 50.0));
        assert_eq!(layout.layer_spacing(), 100.0);
        assert_eq!(layout.node_spacing(), 80.0);
        assert_eq!(layout.direction(), Direction::Down);
    }

    #[test]
    fn test_partial_sections_deserialize() {
        let config: AppConfig = serde_json::from_value(json!({
            "layout": { "node_width": 200.0, "direction": "RIGHT" },
            "storage": { "path": "flow.json" },
        }))
        .unwrap();

        assert_eq!(config.layout().node_size(), Size::new(200.0, 50.0));
        assert_eq!(config.layout().direction(), Direction::Right);
        assert_eq!(config.storage().path(), Some(Path::new("flow.json")));
        assert_eq!(config.storage().key(), DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn test_background_color() {
        let style = StyleConfig::new(Some("#f5f5f5".to_string()));
        assert!(style.background_color().unwrap().is_some());

        let invalid = StyleConfig::new(Some("not-a-color".to_string()));
        assert!(invalid.background_color().is_err());

        assert!(StyleConfig::default().background_color().unwrap().is_none());
    }
}
