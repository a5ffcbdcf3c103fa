pub mod hit;
pub mod paint;
pub mod record;
pub mod surface;
pub mod vector;

pub use hit::{find_enclosed, find_overlapping, find_targeted};
pub use paint::{apply_pattern, draw_item};
pub use record::{DrawOp, RecordingSurface};
pub use surface::{FillStyle, LineCap, LineJoin, Shadow, Surface, SurfaceError, TextBaseline};
pub use vector::VelloSurface;
