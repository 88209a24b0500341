//! Vector helpers shared by the steering behaviors
//!
//! glam covers most of what is needed; these fill the gaps where the
//! behaviors need a defined result for degenerate input.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Normalize a vector, returning zero for zero-length or non-finite input
#[inline]
#[must_use]
pub fn safe_normalize(v: Vec3) -> Vec3 {
    v.normalize_or_zero()
}

/// Project `v` onto the line spanned by `normal`
///
/// The normal does not need to be unit length. Returns zero when it is zero.
#[must_use]
pub fn project_onto_normal(v: Vec3, normal: Vec3) -> Vec3 {
    let n = normal.normalize_or_zero();
    n * v.dot(n)
}

/// Horizontal (XY) distance between two points, ignoring height
#[inline]
#[must_use]
pub fn distance_2d(a: Vec3, b: Vec3) -> f32 {
    horizontal(a).distance(horizontal(b))
}

/// Drop the vertical component
#[inline]
#[must_use]
pub fn horizontal(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Difference of two uniform draws in [0, 1)
///
/// The result lies in (-1, 1) with a triangular distribution peaking at 0.
pub fn random_clamped<R: Rng>(rng: &mut R) -> f32 {
    let a: f32 = rng.random();
    let b: f32 = rng.random();
    a - b
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Bounds {
    /// Create bounds from two corners
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Create bounds from a center and half extents
    #[must_use]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Center point
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_safe_normalize_zero() {
        assert_eq!(safe_normalize(Vec3::ZERO), Vec3::ZERO);
        assert!((safe_normalize(Vec3::new(3.0, 4.0, 0.0)).length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_project_onto_normal() {
        let projected = project_onto_normal(Vec3::new(2.0, 3.0, 0.0), Vec3::new(0.0, 5.0, 0.0));
        assert!((projected - Vec3::new(0.0, 3.0, 0.0)).length() < 1e-6);
        assert_eq!(project_onto_normal(Vec3::ONE, Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn test_distance_2d_ignores_height() {
        let d = distance_2d(Vec3::new(0.0, 0.0, 0.0), Vec3::new(3.0, 4.0, 100.0));
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_random_clamped_range_and_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples: Vec<f32> = (0..10_000).map(|_| random_clamped(&mut rng)).collect();

        assert!(samples.iter().all(|s| *s > -1.0 && *s < 1.0));

        // Triangular: about 75% of the mass lies in (-0.5, 0.5), versus 50% for uniform
        let central = samples.iter().filter(|s| s.abs() < 0.5).count() as f32 / 10_000.0;
        assert!(central > 0.7 && central < 0.8, "central mass {central}");
    }

    #[test]
    fn test_bounds_orders_corners() {
        let b = Bounds::new(Vec3::new(1.0, -1.0, 2.0), Vec3::new(-1.0, 1.0, 0.0));
        assert_eq!(b.min, Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 1.0, 2.0));
        assert_eq!(b.center(), Vec3::new(0.0, 0.0, 1.0));
    }
}
