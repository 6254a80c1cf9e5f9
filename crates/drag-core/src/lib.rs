//! Pointer-driven dragging of objects in a camera-projected 3D scene.
//!
//! The [`DragEngine`] turns pixel pointer events from any number of
//! simultaneous pointers into translations of scene objects. It picks with a
//! camera ray on pointer-down, freezes the hit distance and the offset between
//! hit point and object origin, and re-projects that point on every move (or
//! per-frame [`DragEngine::update`]) so the object stays under its pointer even
//! while the camera moves.
//!
//! The scene and camera are reached through the [`SceneGraph`] and
//! [`Projector`] traits; [`Scene`] and [`Camera`] are ready-made
//! implementations. [`PointerTracker`] is a matching pointer source.

pub mod camera;
pub mod constants;
pub mod demo;
pub mod engine;
pub mod error;
pub mod picking;
pub mod pointers;
pub mod scene;
pub mod signal;

pub use camera::*;
pub use constants::*;
pub use demo::*;
pub use engine::*;
pub use error::DragError;
pub use picking::*;
pub use pointers::*;
pub use scene::*;
pub use signal::*;
