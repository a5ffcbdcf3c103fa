//! The CanvAnim scene.
//!
//! A [`Scene`] owns an ordered list of items drawn onto one
//! [`Surface`](canvanim_render::Surface). It turns raw pointer input into
//! scene and per-item events, applies selector-based bulk operations, keeps
//! a scrollable view origin and repaints the whole list after every change.

mod dispatch;
pub mod input;
mod ops;
pub mod options;
mod scene;

pub use input::{Gesture, PointerInput, RawPointer};
pub use options::{SceneOptions, ScrollRegion};
pub use scene::Scene;
