//! 3D UI Interaction System
//!
//! Pointer overlap against box colliders feeds touch enter/exit into a
//! per-controller dispatcher, which routes trigger and grip edges to the
//! capabilities of the touched nodes.

pub mod collider;
pub mod controller;

pub use collider::{BoxCollider, ColliderAabb, OverlapEvent, OverlapTracker};
pub use controller::TouchController;
