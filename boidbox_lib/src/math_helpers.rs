use glam::Vec2;

/// Euclidean distance between two points of the enclosed simulation space.
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    distance_sq(a, b).sqrt()
}

pub fn distance_sq(a: Vec2, b: Vec2) -> f32 {
    (a.x - b.x).powi(2) + (a.y - b.y).powi(2)
}

// glam's clamp wants Vec2 bounds on both sides, the simulation only ever
// clamps both axes to the same scalar range
pub trait Limit {
    /// Clamps each axis independently to `[lower, upper]`.
    fn limit(self, lower: f32, upper: f32) -> Self;
}

impl Limit for Vec2 {
    #[inline]
    fn limit(self, lower: f32, upper: f32) -> Self {
        Vec2::new(self.x.clamp(lower, upper), self.y.clamp(lower, upper))
    }
}
