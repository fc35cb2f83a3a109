//! 3D Label Component - text shown on buttons and keyboard displays

use vrkit_core::{Component, NodeId};

/// Text rendered on a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Label3D {
    /// Displayed text
    pub text: String,
    /// Font size handed to the text renderer
    pub font_size: u32,
    /// Text color (RGBA)
    pub color: [f32; 4],
}

impl Default for Label3D {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 48,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl Label3D {
    /// Create a new label
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Builder: Set color
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Builder: Set font size
    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = size;
        self
    }
}

impl Component for Label3D {}

/// Marks a label that mirrors a keyboard's typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardLabel {
    /// Keyboard whose value is shown
    pub keyboard: NodeId,
}

impl Component for KeyboardLabel {}
