//! Scene graph arena.
//!
//! Nodes live in a generational arena so that ids held by other systems (the
//! interaction dispatcher, keyboard back-references) can detect that their
//! target was destroyed instead of aliasing a reused slot.

use crate::capability::{Capabilities, Grabbable, Touchable, Triggerable};
use crate::components::{Component, Components};
use crate::SceneError;
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Generational handle to a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Local transform relative to the parent node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3D {
    /// Translation.
    pub position: Vec3,
    /// Orientation.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform3D {
    /// Identity transform at `position`.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder: set scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Builder: set rotation.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Local matrix.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Decompose a matrix back into a transform.
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, position) = matrix.to_scale_rotation_translation();
        Self {
            position,
            rotation,
            scale,
        }
    }
}

/// A scene-graph entity.
#[derive(Debug)]
pub struct Node {
    /// Display name.
    pub name: String,
    /// Local transform.
    pub transform: Transform3D,
    /// Whether the node itself is enabled.
    pub active: bool,
    /// Local-space box, centered on the origin, that the node occupies.
    /// `None` for pure grouping nodes.
    pub extents: Option<Vec3>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    components: Components,
    capabilities: Capabilities,
    detach_in_progress: bool,
}

impl Node {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform3D::default(),
            active: true,
            extents: None,
            parent: None,
            children: Vec::new(),
            components: Components::new(),
            capabilities: Capabilities::default(),
            detach_in_progress: false,
        }
    }

    /// Parent node, if attached.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Attached components.
    pub fn components(&self) -> &Components {
        &self.components
    }

    /// Registered capability handlers.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// True while the node's children are detached for an internal rescale.
    pub fn detach_in_progress(&self) -> bool {
        self.detach_in_progress
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena owning every node.
#[derive(Debug, Default)]
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    pending_destroy: Vec<NodeId>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    /// Returns true if the scene holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of every live node, in slot order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node.as_ref().map(|_| NodeId {
                index: index as u32,
                generation: slot.generation,
            })
        })
    }

    /// Create a root node.
    pub fn spawn(&mut self, name: impl Into<String>) -> NodeId {
        let node = Node::new(name);
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation += 1;
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index: (self.slots.len() - 1) as u32,
                generation: 0,
            }
        }
    }

    /// Create an empty node under `parent` with an identity local transform.
    pub fn spawn_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
    ) -> Result<NodeId, SceneError> {
        self.node(parent)?;
        let child = self.spawn(name);
        self.add_child(parent, child)?;
        Ok(child)
    }

    /// Whether `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.slot_node(id).is_some()
    }

    fn slot_node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.slot_node(id).ok_or(SceneError::UnknownNode(id))
    }

    /// Borrow a node mutably.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(SceneError::UnknownNode(id))
    }

    /// Parent of `id`.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, SceneError> {
        Ok(self.node(id)?.parent)
    }

    /// Children of `id`, in order.
    pub fn children(&self, id: NodeId) -> Result<&[NodeId], SceneError> {
        Ok(&self.node(id)?.children)
    }

    /// Number of direct children.
    pub fn child_count(&self, id: NodeId) -> Result<usize, SceneError> {
        Ok(self.node(id)?.children.len())
    }

    /// Child at position `index`.
    pub fn child_at(&self, id: NodeId, index: usize) -> Result<Option<NodeId>, SceneError> {
        Ok(self.node(id)?.children.get(index).copied())
    }

    /// First direct child named `name`.
    pub fn find_child(&self, id: NodeId, name: &str) -> Result<Option<NodeId>, SceneError> {
        Ok(self
            .node(id)?
            .children
            .iter()
            .copied()
            .find(|child| self.slot_node(*child).is_some_and(|node| node.name == name)))
    }

    /// First direct child carrying a component of type `T`.
    pub fn find_child_with<T: Component>(&self, id: NodeId) -> Result<Option<NodeId>, SceneError> {
        Ok(self
            .node(id)?
            .children
            .iter()
            .copied()
            .find(|child| self.has::<T>(*child)))
    }

    /// `id` and every descendant, depth first, parents before children.
    pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>, SceneError> {
        self.node(id)?;
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(node) = self.slot_node(current) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        Ok(out)
    }

    /// Number of ancestors above `id`.
    pub fn depth(&self, id: NodeId) -> Result<usize, SceneError> {
        let mut depth = 0;
        let mut current = self.node(id)?.parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.node(parent)?.parent;
        }
        Ok(depth)
    }

    /// True if the node and all of its ancestors are active.
    pub fn is_active_in_hierarchy(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.slot_node(node_id) {
                Some(node) if node.active => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Enable or disable a node.
    pub fn set_active(&mut self, id: NodeId, active: bool) -> Result<(), SceneError> {
        self.node_mut(id)?.active = active;
        Ok(())
    }

    // === Hierarchy ===

    /// Append `child` to `parent`, keeping the child's local transform.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.set_parent(child, Some(parent), false)
    }

    /// Remove `child` from `parent`, keeping its world transform. The child
    /// becomes a root.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if self.node(child)?.parent != Some(parent) {
            return Ok(());
        }
        self.set_parent(child, None, true)
    }

    /// Move `child` under `parent` (or to the root). With `keep_world` the
    /// child's local transform is recomputed so its world pose is unchanged.
    pub fn set_parent(
        &mut self,
        child: NodeId,
        parent: Option<NodeId>,
        keep_world: bool,
    ) -> Result<(), SceneError> {
        self.node(child)?;
        if let Some(parent) = parent {
            self.node(parent)?;
            let mut current = Some(parent);
            while let Some(ancestor) = current {
                if ancestor == child {
                    return Err(SceneError::CyclicAttach { child, parent });
                }
                current = self.node(ancestor)?.parent;
            }
        }

        let world = if keep_world {
            Some(self.world_matrix(child)?)
        } else {
            None
        };

        let old_parent = self.node(child)?.parent;
        if let Some(old_parent) = old_parent {
            let node = self.node_mut(old_parent)?;
            node.children.retain(|id| *id != child);
            self.children_changed(old_parent)?;
        }

        self.node_mut(child)?.parent = parent;
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.push(child);
            self.children_changed(parent)?;
        }

        if let Some(world) = world {
            self.set_world_matrix(child, world)?;
        }
        Ok(())
    }

    fn children_changed(&mut self, id: NodeId) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        if !node.detach_in_progress {
            node.components.children_changed();
        }
        Ok(())
    }

    /// Temporarily detach every child of `id`, keeping world transforms, and
    /// return them in their original order. Child-list notifications are
    /// suppressed until [`Scene::reattach_children`].
    pub fn detach_children(&mut self, id: NodeId) -> Result<Vec<NodeId>, SceneError> {
        let children = self.node(id)?.children.clone();
        self.node_mut(id)?.detach_in_progress = true;
        for child in &children {
            self.set_parent(*child, None, true)?;
        }
        Ok(children)
    }

    /// Reattach children previously returned by [`Scene::detach_children`] in
    /// order, keeping world transforms, then lift the notification guard.
    pub fn reattach_children(&mut self, children: &[NodeId], id: NodeId) -> Result<(), SceneError> {
        for child in children {
            if self.contains(*child) {
                self.set_parent(*child, Some(id), true)?;
            }
        }
        self.node_mut(id)?.detach_in_progress = false;
        Ok(())
    }

    // === Transforms ===

    /// Local transform of `id`.
    pub fn transform(&self, id: NodeId) -> Result<Transform3D, SceneError> {
        Ok(self.node(id)?.transform)
    }

    /// Replace the local transform of `id`.
    pub fn set_transform(&mut self, id: NodeId, transform: Transform3D) -> Result<(), SceneError> {
        self.node_mut(id)?.transform = transform;
        Ok(())
    }

    /// Set only the local position of `id`.
    pub fn set_local_position(&mut self, id: NodeId, position: Vec3) -> Result<(), SceneError> {
        self.node_mut(id)?.transform.position = position;
        Ok(())
    }

    /// Set only the local scale of `id`.
    pub fn set_local_scale(&mut self, id: NodeId, scale: Vec3) -> Result<(), SceneError> {
        self.node_mut(id)?.transform.scale = scale;
        Ok(())
    }

    /// World matrix of `id`.
    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        let node = self.node(id)?;
        let local = node.transform.to_matrix();
        match node.parent {
            Some(parent) => Ok(self.world_matrix(parent)? * local),
            None => Ok(local),
        }
    }

    /// World matrix of the parent of `id`, identity for roots.
    fn parent_world_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        match self.node(id)?.parent {
            Some(parent) => self.world_matrix(parent),
            None => Ok(Mat4::IDENTITY),
        }
    }

    /// Place `id` so that its world matrix equals `world`.
    pub fn set_world_matrix(&mut self, id: NodeId, world: Mat4) -> Result<(), SceneError> {
        let local = self.parent_world_matrix(id)?.inverse() * world;
        self.node_mut(id)?.transform = Transform3D::from_matrix(local);
        Ok(())
    }

    /// World position of `id`.
    pub fn world_position(&self, id: NodeId) -> Result<Vec3, SceneError> {
        Ok(self.world_matrix(id)?.transform_point3(Vec3::ZERO))
    }

    /// Unit right axis of `id` in world space.
    pub fn right(&self, id: NodeId) -> Result<Vec3, SceneError> {
        Ok(self.world_matrix(id)?.transform_vector3(Vec3::X).normalize_or_zero())
    }

    /// Unit up axis of `id` in world space.
    pub fn up(&self, id: NodeId) -> Result<Vec3, SceneError> {
        Ok(self.world_matrix(id)?.transform_vector3(Vec3::Y).normalize_or_zero())
    }

    /// Move `id` by a world-space offset.
    pub fn translate_world(&mut self, id: NodeId, delta: Vec3) -> Result<(), SceneError> {
        let local_delta = self.parent_world_matrix(id)?.inverse().transform_vector3(delta);
        self.node_mut(id)?.transform.position += local_delta;
        Ok(())
    }

    // === Components ===

    /// Attach a component to `id`.
    pub fn attach<T: Component>(&mut self, id: NodeId, component: T) -> Result<(), SceneError> {
        self.node_mut(id)?.components.attach(component);
        Ok(())
    }

    /// First component of type `T` on `id`, if the node is alive and has one.
    pub fn get<T: Component>(&self, id: NodeId) -> Option<&T> {
        self.slot_node(id).and_then(|node| node.components.get::<T>())
    }

    /// Mutable access to the first component of type `T` on `id`.
    pub fn get_mut<T: Component>(&mut self, id: NodeId) -> Option<&mut T> {
        self.node_mut(id)
            .ok()
            .and_then(|node| node.components.get_mut::<T>())
    }

    /// Every component of type `T` on `id`.
    pub fn get_all<T: Component>(&self, id: NodeId) -> Vec<&T> {
        self.slot_node(id)
            .map(|node| node.components.get_all::<T>())
            .unwrap_or_default()
    }

    /// Whether `id` carries a component of type `T`.
    pub fn has<T: Component>(&self, id: NodeId) -> bool {
        self.get::<T>(id).is_some()
    }

    // === Capabilities ===

    /// Register a touch handler on `id`.
    pub fn add_touchable(
        &mut self,
        id: NodeId,
        handler: Arc<dyn Touchable>,
    ) -> Result<(), SceneError> {
        self.node_mut(id)?.capabilities.touchable.push(handler);
        Ok(())
    }

    /// Register a trigger handler on `id`.
    pub fn add_triggerable(
        &mut self,
        id: NodeId,
        handler: Arc<dyn Triggerable>,
    ) -> Result<(), SceneError> {
        self.node_mut(id)?.capabilities.triggerable.push(handler);
        Ok(())
    }

    /// Register a grab handler on `id`.
    pub fn add_grabbable(
        &mut self,
        id: NodeId,
        handler: Arc<dyn Grabbable>,
    ) -> Result<(), SceneError> {
        self.node_mut(id)?.capabilities.grabbable.push(handler);
        Ok(())
    }

    /// Touch handlers on `id` (empty for stale ids).
    pub fn touchables(&self, id: NodeId) -> Vec<Arc<dyn Touchable>> {
        self.slot_node(id)
            .map(|node| node.capabilities.touchable.clone())
            .unwrap_or_default()
    }

    /// First trigger handler on `id`.
    pub fn triggerable(&self, id: NodeId) -> Option<Arc<dyn Triggerable>> {
        self.slot_node(id)
            .and_then(|node| node.capabilities.triggerable.first().cloned())
    }

    /// First grab handler on `id`.
    pub fn grabbable(&self, id: NodeId) -> Option<Arc<dyn Grabbable>> {
        self.slot_node(id)
            .and_then(|node| node.capabilities.grabbable.first().cloned())
    }

    // === Destruction ===

    /// Destroy `id` and its subtree now.
    pub fn destroy(&mut self, id: NodeId) -> Result<(), SceneError> {
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.retain(|child| *child != id);
            self.children_changed(parent)?;
        }
        for node_id in self.descendants(id)? {
            let slot = &mut self.slots[node_id.index as usize];
            slot.node = None;
            self.free.push(node_id.index);
        }
        tracing::trace!(node = %id, "destroyed node");
        Ok(())
    }

    /// Queue `id` for destruction at the next [`Scene::flush_destroyed`].
    pub fn destroy_deferred(&mut self, id: NodeId) -> Result<(), SceneError> {
        self.node(id)?;
        if !self.pending_destroy.contains(&id) {
            self.pending_destroy.push(id);
        }
        Ok(())
    }

    /// Nodes waiting for deferred destruction.
    pub fn pending_destroy(&self) -> &[NodeId] {
        &self.pending_destroy
    }

    /// Destroy every queued node still alive; returns how many subtrees went.
    pub fn flush_destroyed(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending_destroy);
        let mut destroyed = 0;
        for id in pending {
            if self.contains(id) && self.destroy(id).is_ok() {
                destroyed += 1;
            }
        }
        destroyed
    }
}
