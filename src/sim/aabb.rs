//! Axis-aligned bounding boxes for player/enemy/pickup overlap tests

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// An axis-aligned box in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box resting on `base` (the bottom-center point) with the given half-extents
    pub fn from_base(base: Vec3, half_extents: Vec3) -> Self {
        let center = base + Vec3::Y * half_extents.y;
        Self::from_center(center, half_extents)
    }

    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Grow (or shrink, with a negative amount) every face by `amount`
    pub fn expanded(mut self, amount: f32) -> Self {
        self.min -= Vec3::splat(amount);
        self.max += Vec3::splat(amount);
        self
    }

    /// True when the box has no volume (over-shrunk)
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Overlap test; touching faces count as intersecting
    pub fn intersects(&self, other: &Aabb) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_base_sits_on_base() {
        let b = Aabb::from_base(Vec3::new(1.0, 0.0, -3.0), Vec3::new(0.5, 1.0, 0.5));
        assert_eq!(b.min, Vec3::new(0.5, 0.0, -3.5));
        assert_eq!(b.max, Vec3::new(1.5, 2.0, -2.5));
    }

    #[test]
    fn test_intersects_and_separates() {
        let a = Aabb::from_center(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::from_center(Vec3::new(1.5, 0.0, 0.0), Vec3::ONE);
        let c = Aabb::from_center(Vec3::new(2.5, 0.0, 0.0), Vec3::ONE);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.expanded(0.5).intersects(&c));
    }

    #[test]
    fn test_over_shrunk_box_never_hits() {
        let tiny = Aabb::from_center(Vec3::ZERO, Vec3::splat(0.2)).expanded(-0.5);
        assert!(tiny.is_empty());
        assert!(!tiny.intersects(&Aabb::from_center(Vec3::ZERO, Vec3::splat(10.0))));
    }
}
