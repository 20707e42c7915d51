//! Screen-space triangle edge used by the scanline walk.

use crate::math::vec3::Vec3;

/// One triangle edge, stored top-down (`y0 <= y1`).
///
/// `z` starts out as the view distance `w` of the endpoints and is turned
/// into `1/w` by [`Edge::invert_z`] once the edge has been rounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub x0: f32,
    pub y0: f32,
    pub z0: f32,
    pub x1: f32,
    pub y1: f32,
    pub z1: f32,
}

impl Edge {
    pub fn new(a: Vec3, b: Vec3) -> Self {
        let (top, bottom) = if a.y <= b.y { (a, b) } else { (b, a) };
        Self {
            x0: top.x,
            y0: top.y,
            z0: top.z,
            x1: bottom.x,
            y1: bottom.y,
            z1: bottom.z,
        }
    }

    #[inline]
    pub fn dy(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Rounds both endpoints to the nearest pixel.
    pub fn round_occluder(&mut self) {
        self.x0 = self.x0.round();
        self.y0 = self.y0.round();
        self.x1 = self.x1.round();
        self.y1 = self.y1.round();
    }

    /// Grows the edge vertically so every partially covered row is visited.
    pub fn round_occludee(&mut self) {
        self.x0 = self.x0.round();
        self.y0 = self.y0.floor();
        self.x1 = self.x1.round();
        self.y1 = self.y1.ceil();
    }

    /// Shrinks the edge vertically to rows it fully covers.
    pub fn round_shrink(&mut self) {
        self.x0 = self.x0.round();
        self.y0 = self.y0.ceil();
        self.x1 = self.x1.round();
        self.y1 = self.y1.floor();
    }

    /// Replaces the view distances with their reciprocals.
    pub fn invert_z(&mut self) {
        self.z0 = 1.0 / self.z0;
        self.z1 = 1.0 / self.z1;
    }
}

/// Which rounding an edge receives before the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeRounding {
    /// Nearest pixel.
    #[default]
    Nearest,
    /// Outward, for occludee tests.
    Grow,
    /// Inward, for conservative occluders.
    Shrink,
}

impl EdgeRounding {
    #[inline]
    pub fn apply(self, edge: &mut Edge) {
        match self {
            EdgeRounding::Nearest => edge.round_occluder(),
            EdgeRounding::Grow => edge.round_occludee(),
            EdgeRounding::Shrink => edge.round_shrink(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_top_down() {
        let e = Edge::new(Vec3::new(1.0, 5.0, 2.0), Vec3::new(3.0, 1.0, 4.0));
        assert_eq!((e.x0, e.y0, e.z0), (3.0, 1.0, 4.0));
        assert_eq!((e.x1, e.y1, e.z1), (1.0, 5.0, 2.0));
        assert_eq!(e.dy(), 4.0);
    }

    #[test]
    fn rounding_policies() {
        let base = Edge::new(Vec3::new(1.4, 1.4, 1.0), Vec3::new(2.6, 3.6, 1.0));

        let mut nearest = base;
        EdgeRounding::Nearest.apply(&mut nearest);
        assert_eq!((nearest.y0, nearest.y1), (1.0, 4.0));

        let mut grow = base;
        EdgeRounding::Grow.apply(&mut grow);
        assert_eq!((grow.y0, grow.y1), (1.0, 4.0));
        assert_eq!((grow.x0, grow.x1), (1.0, 3.0));

        let mut shrink = base;
        EdgeRounding::Shrink.apply(&mut shrink);
        assert_eq!((shrink.y0, shrink.y1), (2.0, 3.0));
    }

    #[test]
    fn invert_z_takes_reciprocal() {
        let mut e = Edge::new(Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 1.0, 4.0));
        e.invert_z();
        assert_eq!((e.z0, e.z1), (0.5, 0.25));
    }
}
