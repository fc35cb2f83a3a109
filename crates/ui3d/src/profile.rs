//! Profiles: reusable visual and geometric defaults for widgets.
//!
//! Profiles are plain values. Factories clone them before tweaking a field,
//! so two widgets never share one profile record.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Defaults for a standard panel's behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelProfile {
    /// Hide the panel as soon as it is created.
    pub hide_on_awake: bool,
    /// Whether the panel can be grabbed to move its target.
    pub grabbable: bool,
    /// Panel background color.
    pub background_color: [f32; 4],
}

impl Default for PanelProfile {
    fn default() -> Self {
        Self {
            hide_on_awake: true,
            grabbable: true,
            background_color: [0.1, 0.1, 0.1, 0.8],
        }
    }
}

/// Geometry for panel containers and the rows/columns inside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelContainerProfile {
    /// Gap between a container edge and its content.
    pub padding: f32,
    /// Gap between neighboring children.
    pub spacing: f32,
    /// Local z every generated button is pinned to.
    pub button_z: f32,
    /// Container width floor.
    pub min_width: f32,
    /// Container height floor.
    pub min_height: f32,
    /// Thickness of the container body.
    pub depth: f32,
}

impl Default for PanelContainerProfile {
    fn default() -> Self {
        Self {
            padding: 0.005,
            spacing: 0.002,
            button_z: -0.008,
            min_width: 0.1,
            min_height: 0.1,
            depth: 0.002,
        }
    }
}

/// Look and size of a button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonProfile {
    /// Label glyph scale multiplier.
    pub character_size: f32,
    /// Body width floor.
    pub min_width: f32,
    /// Body size (x is recomputed from the label, y and z are kept).
    pub body_scale: Vec3,
    /// Label node scale.
    pub label_scale: Vec3,
    /// Label local z (in front of the body).
    pub label_z: f32,
    /// Horizontal gap between label and body edge.
    pub label_padding: f32,
    /// World width of one glyph at character size 1.
    pub glyph_advance: f32,
    /// Font size handed to the text renderer.
    pub font_size: u32,
    /// Label color.
    pub font_color: [f32; 4],
    /// Body color when idle.
    pub body_color: [f32; 4],
    /// Body color while touched or held down.
    pub body_active_color: [f32; 4],
    /// Clip played on press, if any.
    pub click_down: Option<String>,
    /// Clip played on release, if any.
    pub click_up: Option<String>,
}

impl Default for ButtonProfile {
    fn default() -> Self {
        Self {
            character_size: 1.0,
            min_width: 0.025,
            body_scale: Vec3::new(0.025, 0.025, 0.01),
            label_scale: Vec3::splat(0.005),
            label_z: -0.006,
            label_padding: 0.002,
            glyph_advance: 0.012,
            font_size: 48,
            font_color: [1.0, 1.0, 1.0, 1.0],
            body_color: [0.25, 0.25, 0.25, 1.0],
            body_active_color: [0.6, 0.6, 1.0, 1.0],
            click_down: None,
            click_up: None,
        }
    }
}

impl ButtonProfile {
    /// Body width needed to fit `text`, never below `min_width`.
    pub fn body_width(&self, text: &str) -> f32 {
        let glyphs = text.chars().count() as f32;
        let label = glyphs * self.glyph_advance * self.character_size + 2.0 * self.label_padding;
        label.max(self.min_width)
    }

    /// Builder: set character size.
    pub fn with_character_size(mut self, size: f32) -> Self {
        self.character_size = size;
        self
    }

    /// Builder: set minimum width.
    pub fn with_min_width(mut self, width: f32) -> Self {
        self.min_width = width;
        self
    }
}
