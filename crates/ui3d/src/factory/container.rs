//! Row, column and panel container factories.

use crate::layout::{Alignment, ColumnContainer, PanelContainer, RowContainer};
use crate::profile::PanelContainerProfile;
use glam::Vec3;
use vrkit_core::{Component, NodeId, Scene, SceneError};

#[derive(Debug, Clone)]
pub struct RowContainerFactory {
    pub parent: NodeId,
    pub name: Option<String>,
    pub padding: f32,
    pub spacing: f32,
    pub alignment: Alignment,
}

impl Component for RowContainerFactory {}

impl RowContainerFactory {
    pub fn generate(&self, scene: &mut Scene) -> Result<NodeId, SceneError> {
        let name = self.name.as_deref().unwrap_or("Row");
        let row = scene.spawn_child(self.parent, name)?;
        scene.attach(row, RowContainer::new(self.padding, self.spacing, self.alignment))?;
        Ok(row)
    }
}

#[derive(Debug, Clone)]
pub struct ColumnContainerFactory {
    pub parent: NodeId,
    pub padding: f32,
    pub spacing: f32,
}

impl Component for ColumnContainerFactory {}

impl ColumnContainerFactory {
    pub fn generate(&self, scene: &mut Scene) -> Result<NodeId, SceneError> {
        let column = scene.spawn_child(self.parent, "Column")?;
        scene.attach(column, ColumnContainer::new(self.padding, self.spacing))?;
        Ok(column)
    }
}

/// Builds a container node with a unit body of the profile's depth. The
/// first resize scales the body to fit the children.
#[derive(Debug, Clone)]
pub struct PanelContainerFactory {
    pub parent: NodeId,
    pub name: String,
    pub profile: PanelContainerProfile,
}

impl Component for PanelContainerFactory {}

impl PanelContainerFactory {
    pub fn generate(&self, scene: &mut Scene) -> Result<NodeId, SceneError> {
        let container = scene.spawn_child(self.parent, self.name.clone())?;
        scene.node_mut(container)?.extents = Some(Vec3::new(1.0, 1.0, self.profile.depth));
        scene.attach(
            container,
            PanelContainer::new(self.profile.min_width, self.profile.min_height),
        )?;
        Ok(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containers_carry_layout_components() {
        let mut scene = Scene::new();
        let root = scene.spawn("root");
        let profile = PanelContainerProfile::default();

        let panel = PanelContainerFactory {
            parent: root,
            name: "PanelLowerCase".into(),
            profile: profile.clone(),
        }
        .generate(&mut scene)
        .unwrap();
        let column = ColumnContainerFactory {
            parent: panel,
            padding: profile.padding,
            spacing: profile.spacing,
        }
        .generate(&mut scene)
        .unwrap();
        let row = RowContainerFactory {
            parent: column,
            name: Some("DisplayRow".into()),
            padding: profile.padding,
            spacing: profile.spacing,
            alignment: Alignment::Left,
        }
        .generate(&mut scene)
        .unwrap();

        assert_eq!(scene.node(panel).unwrap().name, "PanelLowerCase");
        assert!(scene.has::<PanelContainer>(panel));
        assert!(scene.has::<ColumnContainer>(column));
        assert_eq!(
            scene.get::<RowContainer>(row).unwrap().alignment,
            Alignment::Left
        );
        assert_eq!(scene.node(row).unwrap().name, "DisplayRow");
    }
}
