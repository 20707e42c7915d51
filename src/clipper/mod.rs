//! Clip & project stage shared by occluders and occludees.
//!
//! - [`near_plane`]: view-space clipping against `z = -near` and the
//!   view-space back-face test.
//! - [`projection`]: projection, perspective divide, screen mapping and the
//!   screen-space back-face test.

pub mod near_plane;
pub mod projection;

pub use near_plane::{clip_triangle_near, is_back_facing_view, ClipResult};
pub use projection::{is_back_facing_screen, project_to_screen, to_screen};
