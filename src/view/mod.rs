//! Everything between the layout and the pixels: the pan/zoom transform,
//! node dragging, selection lineage and the per-frame draw list.

pub mod drag;
pub mod lineage;
pub mod render;
pub mod viewport;

pub use drag::{DragController, PointerId};
pub use lineage::Lineage;
pub use render::{DrawList, EdgeDraw, Emphasis, Highlight, LabelDraw, NodeDraw, RenderStyle};
pub use render::{build_draw_list, pick_node};
pub use viewport::{CursorState, Gesture, ViewportConfig, ViewportController, ViewportTransform};
