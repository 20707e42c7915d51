//! Occludee tests against a finished depth buffer.
//!
//! Every test is conservative: when in doubt (near-plane crossings, camera
//! inside the bound, silhouettes too small to fill) the bound is visible.

pub mod bounding_box;
pub mod bounding_sphere;

pub use bounding_box::{clipped_envelope, is_box_occluded, project_box, OutCode, ScreenEnvelope};
pub use bounding_sphere::{is_sphere_occluded, SphereSilhouette};
