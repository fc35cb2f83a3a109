//! Typed behavior records attached to scene nodes.
//!
//! A node owns an ordered list of components. Attaching is a plain insert;
//! lookups downcast by concrete type, so several records of the same type
//! may live on one node and all of them are visible through [`Components::get_all`].

use std::any::Any;
use std::fmt;

/// Data record that can be attached to a node.
pub trait Component: Any + Send + Sync + fmt::Debug {
    /// Called when the owning node's child list changes outside of a
    /// detach/reattach pass.
    fn children_changed(&mut self) {}
}

/// Object-safe bridge that lets stored components be downcast.
trait AnyComponent: Component {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn notify_children_changed(&mut self);
}

impl<T: Component> AnyComponent for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn notify_children_changed(&mut self) {
        self.children_changed();
    }
}

/// Ordered component storage for one node.
#[derive(Debug, Default)]
pub struct Components {
    entries: Vec<Box<dyn AnyComponent>>,
}

impl Components {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a component.
    pub fn attach<T: Component>(&mut self, component: T) {
        self.entries.push(Box::new(component));
    }

    /// First component of type `T`.
    pub fn get<T: Component>(&self) -> Option<&T> {
        self.entries
            .iter()
            .find_map(|entry| entry.as_any().downcast_ref::<T>())
    }

    /// First component of type `T`, mutably.
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find_map(|entry| entry.as_any_mut().downcast_mut::<T>())
    }

    /// Every component of type `T`, in attachment order.
    pub fn get_all<T: Component>(&self) -> Vec<&T> {
        self.entries
            .iter()
            .filter_map(|entry| entry.as_any().downcast_ref::<T>())
            .collect()
    }

    /// Whether a component of type `T` is attached.
    pub fn has<T: Component>(&self) -> bool {
        self.get::<T>().is_some()
    }

    /// Number of attached components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn children_changed(&mut self) {
        for entry in &mut self.entries {
            entry.notify_children_changed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Marker(u32);
    impl Component for Marker {}

    #[derive(Debug, Default)]
    struct Dirty(bool);
    impl Component for Dirty {
        fn children_changed(&mut self) {
            self.0 = true;
        }
    }

    #[test]
    fn get_returns_first_of_type() {
        let mut components = Components::new();
        components.attach(Marker(1));
        components.attach(Dirty::default());
        components.attach(Marker(2));

        assert_eq!(components.get::<Marker>(), Some(&Marker(1)));
        assert_eq!(components.get_all::<Marker>(), vec![&Marker(1), &Marker(2)]);
        assert_eq!(components.len(), 3);
    }

    #[test]
    fn get_mut_edits_in_place() {
        let mut components = Components::new();
        components.attach(Marker(1));
        components.get_mut::<Marker>().unwrap().0 = 7;
        assert_eq!(components.get::<Marker>(), Some(&Marker(7)));
    }

    #[test]
    fn children_changed_reaches_every_component() {
        let mut components = Components::new();
        components.attach(Dirty::default());
        components.attach(Marker(0));
        components.children_changed();
        assert!(components.get::<Dirty>().unwrap().0);
    }
}
