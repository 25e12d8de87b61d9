use nalgebra::UnitVector3;
use num_traits::Float;

use crate::geometry::traits::ClosestPoint3;
use crate::geometry::{INTERSECTION_EPSILON, PARALLEL_EPSILON, SEPARATION_EPSILON};
use crate::helpers::aliases::{Point3f, Vec3f};

use super::{
    box3::Box3, cylinder3::Cylinder3, ellipsoid3::Ellipsoid3, line3::Line3,
    line_segment3::LineSegment3, obb3::Obb3, ray3::Ray3, sphere3::Sphere3, triangle3::Triangle3,
    Intersection,
};

/// Plane satisfying `dot(n, x) + d = 0`
#[derive(Debug, Clone, Copy)]
pub struct Plane3 {
    normal: UnitVector3<f32>,
    distance: f32,
}

impl Plane3 {
    /// `normal` is normalized on construction
    pub fn new(normal: Vec3f, distance: f32) -> Self {
        return Self {
            normal: UnitVector3::new_normalize(normal),
            distance,
        };
    }

    /// Given three noncollinear points (ordered ccw), compute plane equation
    pub fn from_points(a: &Point3f, b: &Point3f, c: &Point3f) -> Self {
        let normal = UnitVector3::new_normalize((b - a).cross(&(c - a)));
        let distance = -normal.dot(&a.coords);

        return Self { normal, distance };
    }

    #[inline]
    pub fn get_normal(&self) -> &Vec3f {
        return &self.normal;
    }

    #[inline]
    pub fn get_distance(&self) -> f32 {
        return self.distance;
    }

    /// Returns signed distance from point to plane
    #[inline]
    pub fn signed_distance(&self, point: &Point3f) -> f32 {
        return self.normal.dot(&point.coords) + self.distance;
    }

    #[inline]
    pub fn project_point(&self, point: &Point3f) -> Point3f {
        let dist = self.signed_distance(point);
        return point - self.normal.into_inner() * dist;
    }

    // Containment, within a caller-supplied tolerance

    #[inline]
    pub fn contains_point(&self, point: &Point3f, epsilon: f32) -> bool {
        return Float::abs(self.signed_distance(point)) <= epsilon;
    }

    /// The line must lie on the plane: origin on it, direction perpendicular
    /// to the normal
    pub fn contains_line3(&self, inner: &Line3, epsilon: f32) -> bool {
        if !self.contains_point(inner.get_point(), epsilon) {
            return false;
        }

        return Float::abs(self.normal.dot(inner.get_direction())) <= epsilon;
    }

    pub fn contains_plane3(&self, inner: &Plane3, epsilon: f32) -> bool {
        let dot = self.normal.dot(inner.get_normal());

        if Float::abs(Float::abs(dot) - 1.0) > epsilon {
            return false;
        }

        if dot > 0.0 {
            return Float::abs(self.distance - inner.distance) <= epsilon;
        }

        return Float::abs(self.distance + inner.distance) <= epsilon;
    }

    pub fn contains_ray3(&self, inner: &Ray3, epsilon: f32) -> bool {
        if !self.contains_point(inner.get_origin(), epsilon) {
            return false;
        }

        return Float::abs(self.normal.dot(inner.get_direction())) <= epsilon;
    }

    #[inline]
    pub fn contains_line_segment3(&self, inner: &LineSegment3, epsilon: f32) -> bool {
        return self.contains_point(inner.get_start(), epsilon)
            && self.contains_point(inner.get_end(), epsilon);
    }

    #[inline]
    pub fn contains_triangle3(&self, inner: &Triangle3, epsilon: f32) -> bool {
        return self.contains_point(inner.a(), epsilon)
            && self.contains_point(inner.b(), epsilon)
            && self.contains_point(inner.c(), epsilon);
    }

    // Intersection

    /// Projection-radius test against the box extents
    pub fn intersects_box3(&self, bbox: &Box3) -> bool {
        let center = bbox.get_center();
        let extent = bbox.extent();

        let s = self.signed_distance(&center);
        let r = extent.x * Float::abs(self.normal.x)
            + extent.y * Float::abs(self.normal.y)
            + extent.z * Float::abs(self.normal.z);

        return Float::abs(s) <= r;
    }

    #[inline]
    pub fn intersects_obb3(&self, obb: &Obb3) -> bool {
        return obb.intersects_plane3(self);
    }

    #[inline]
    pub fn intersects_sphere3(&self, sphere: &Sphere3) -> bool {
        return Float::abs(self.signed_distance(sphere.get_center())) <= sphere.get_radius();
    }

    #[inline]
    pub fn intersects_cylinder3(&self, cylinder: &Cylinder3) -> bool {
        return cylinder.intersects_plane3(self);
    }

    #[inline]
    pub fn intersects_ellipsoid3(&self, ellipsoid: &Ellipsoid3) -> bool {
        return ellipsoid.intersects_plane3(self);
    }

    /// Parallel planes only intersect when coincident
    pub fn intersects_plane3(&self, other: &Plane3) -> bool {
        let dot = self.normal.dot(other.get_normal());
        let abs_dot = Float::abs(dot);

        if Float::abs(abs_dot - 1.0) <= PARALLEL_EPSILON {
            if dot > 0.0 {
                return Float::abs(self.distance - other.distance) <= INTERSECTION_EPSILON;
            }
            return Float::abs(self.distance + other.distance) <= INTERSECTION_EPSILON;
        }

        return true;
    }

    pub fn intersects_line3_at(&self, line: &Line3) -> Intersection {
        let denom = self.normal.dot(line.get_direction());
        if Float::abs(denom) <= INTERSECTION_EPSILON {
            // Parallel; a coincident line has no unique parameter
            return Intersection::Miss;
        }

        let num = -self.signed_distance(line.get_point());
        return Intersection::Hit(num / denom);
    }

    #[inline]
    pub fn intersects_line3(&self, line: &Line3) -> bool {
        return self.intersects_line3_at(line).is_hit();
    }

    pub fn intersects_ray3_at(&self, ray: &Ray3) -> Intersection {
        let denom = self.normal.dot(ray.get_direction());
        if Float::abs(denom) <= PARALLEL_EPSILON {
            return Intersection::Miss;
        }

        let t = -self.signed_distance(ray.get_origin()) / denom;
        if t < 0.0 {
            return Intersection::Miss;
        }

        return Intersection::Hit(t);
    }

    #[inline]
    pub fn intersects_ray3(&self, ray: &Ray3) -> bool {
        return self.intersects_ray3_at(ray).is_hit();
    }

    pub fn intersects_line_segment3_at(&self, segment: &LineSegment3) -> Intersection {
        let direction = segment.direction();
        let denom = self.normal.dot(&direction);
        if Float::abs(denom) <= SEPARATION_EPSILON {
            return Intersection::Miss;
        }

        let t = -self.signed_distance(segment.get_start()) / denom;
        if t < 0.0 || t > 1.0 {
            return Intersection::Miss;
        }

        return Intersection::Hit(t);
    }

    #[inline]
    pub fn intersects_line_segment3(&self, segment: &LineSegment3) -> bool {
        return self.intersects_line_segment3_at(segment).is_hit();
    }

    /// Vertices on opposite sides (or touching) mean intersection
    pub fn intersects_triangle3(&self, triangle: &Triangle3) -> bool {
        let d0 = self.signed_distance(triangle.a());
        let d1 = self.signed_distance(triangle.b());
        let d2 = self.signed_distance(triangle.c());

        let min_d = Float::min(d0, Float::min(d1, d2));
        let max_d = Float::max(d0, Float::max(d1, d2));

        return min_d * max_d <= 0.0;
    }
}

impl ClosestPoint3 for Plane3 {
    /// Returns closest point on plane to given point
    #[inline]
    fn closest_point(&self, point: &Point3f) -> Point3f {
        return self.project_point(point);
    }

    fn squared_distance(&self, point: &Point3f) -> f32 {
        let dist = self.signed_distance(point);
        return dist * dist;
    }
}
