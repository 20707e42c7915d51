//! Depth-only rendering primitives.

pub mod depth_buffer;
pub mod edge;
pub mod framebuffer;
pub mod rasterizer;

pub use depth_buffer::DepthBuffer;
pub use edge::{Edge, EdgeRounding};
pub use framebuffer::{DepthTarget, DepthView, FrameBuffer, Span};
pub use rasterizer::{Rasterizer, ScanlineRasterizer, Triangle};
