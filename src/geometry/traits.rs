use crate::helpers::aliases::Point3f;

use super::primitives::Box3;

/// 3D bounding box
pub trait HasBBox3 {
    fn bbox(&self) -> Box3;
}

pub trait ClosestPoint3 {
    /// Returns closest point on shape to given point
    fn closest_point(&self, point: &Point3f) -> Point3f;

    #[inline]
    fn squared_distance(&self, point: &Point3f) -> f32 {
        return (point - self.closest_point(point)).norm_squared();
    }
}
