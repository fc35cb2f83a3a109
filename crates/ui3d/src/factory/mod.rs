//! Widget factories.
//!
//! Factories turn profiles and key lists into node trees. Each factory is a
//! plain value holding everything it needs (its own profile copies included),
//! so a build pass can park them on a scratch node and throw the whole lot
//! away when it is done.

pub mod button;
pub mod container;
pub mod key;
pub mod keyboard;

pub use button::{ButtonFactory, SpacerFactory};
pub use container::{ColumnContainerFactory, PanelContainerFactory, RowContainerFactory};
pub use key::{Key, KeyType, KeyboardLayouts};
pub use keyboard::{KeyboardFactory, KeyboardSettings};

use crate::components::PanelKind;
use crate::profile::{ButtonProfile, PanelContainerProfile, PanelProfile};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vrkit_core::{NodeId, SceneError};

/// Why a build pass failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// A required profile was not supplied. Raised before any node exists.
    #[error("missing required profile: {0}")]
    MissingProfile(&'static str),
    /// A row was requested for a node that is not a keyboard panel.
    #[error("node {0} is not a keyboard panel")]
    NotAPanel(NodeId),
    /// Scene operation failed mid-build.
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Profiles a keyboard build reads. Any of them may be absent; the build
/// checks them all before touching the scene.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyboardProfiles<'a> {
    pub panel: Option<&'a PanelProfile>,
    pub container: Option<&'a PanelContainerProfile>,
    pub momentary: Option<&'a ButtonProfile>,
    pub toggle: Option<&'a ButtonProfile>,
}

/// Owned profile set, as stored in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSet {
    pub panel: PanelProfile,
    pub container: PanelContainerProfile,
    pub momentary: ButtonProfile,
    pub toggle: ButtonProfile,
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self {
            panel: PanelProfile::default(),
            container: PanelContainerProfile::default(),
            momentary: ButtonProfile::default(),
            toggle: ButtonProfile {
                body_active_color: [0.4, 0.8, 0.4, 1.0],
                ..ButtonProfile::default()
            },
        }
    }
}

impl ProfileSet {
    /// Borrow every profile.
    pub fn borrowed(&self) -> KeyboardProfiles<'_> {
        KeyboardProfiles {
            panel: Some(&self.panel),
            container: Some(&self.container),
            momentary: Some(&self.momentary),
            toggle: Some(&self.toggle),
        }
    }
}

/// A built keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardHandle {
    /// Keyboard root node.
    pub node: NodeId,
}

/// A built keyboard panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelHandle {
    /// Panel container node.
    pub node: NodeId,
    /// Which panel.
    pub kind: PanelKind,
}
