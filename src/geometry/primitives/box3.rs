use nalgebra_glm::{max2, min2};
use num_traits::Float;

use crate::geometry::traits::{ClosestPoint3, HasBBox3};
use crate::geometry::SEPARATION_EPSILON;
use crate::helpers::aliases::{Point3f, Vec3f};

use super::{
    cylinder3::Cylinder3, ellipsoid3::Ellipsoid3, line3::Line3, line_segment3::LineSegment3,
    obb3::Obb3, plane3::Plane3, ray3::Ray3, sphere3::Sphere3, triangle3::Triangle3, Intersection,
};

/// 3D axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box3 {
    min: Point3f,
    max: Point3f,
}

impl Box3 {
    pub fn new(min: Point3f, max: Point3f) -> Self {
        return Self { min, max };
    }

    /// Inverted box that absorbs unions
    pub fn empty() -> Self {
        return Self {
            min: Point3f::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3f::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        };
    }

    #[inline]
    pub fn from_point(point: &Point3f) -> Self {
        return Self { min: *point, max: *point };
    }

    #[inline]
    pub fn from_center_extent(center: &Point3f, extent: &Vec3f) -> Self {
        return Self {
            min: center - extent,
            max: center + extent,
        };
    }

    #[inline]
    pub fn get_min(&self) -> &Point3f {
        return &self.min;
    }

    #[inline]
    pub fn get_max(&self) -> &Point3f {
        return &self.max;
    }

    #[inline]
    pub fn get_center(&self) -> Point3f {
        return (self.min + self.max.coords) * 0.5;
    }

    #[inline]
    pub fn size(&self) -> Vec3f {
        return self.max - self.min;
    }

    #[inline]
    pub fn extent(&self) -> Vec3f {
        return self.size() * 0.5;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        return self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z;
    }

    #[inline]
    pub fn surface_area(&self) -> f32 {
        let s = self.size();
        return 2.0 * (s.x * s.y + s.y * s.z + s.x * s.z);
    }

    #[inline]
    pub fn volume(&self) -> f32 {
        let s = self.size();
        return s.x * s.y * s.z;
    }

    /// Returns the ith box corner; bit 0 selects max x, bit 1 max y, bit 2 max z
    #[inline]
    pub fn corner(&self, i: u8) -> Point3f {
        return Point3f::new(
            if i & 1 != 0 { self.max.x } else { self.min.x },
            if i & 2 != 0 { self.max.y } else { self.min.y },
            if i & 4 != 0 { self.max.z } else { self.min.z },
        );
    }

    #[inline]
    pub fn corners(&self) -> [Point3f; 8] {
        return core::array::from_fn(|i| self.corner(i as u8));
    }

    #[inline]
    pub fn union_box3(&mut self, other: &Box3) -> &mut Self {
        self.min = min2(&self.min.coords, &other.min.coords).into();
        self.max = max2(&self.max.coords, &other.max.coords).into();

        return self;
    }

    #[inline]
    pub fn union_point3(&mut self, point: &Point3f) -> &mut Self {
        self.min = min2(&self.min.coords, &point.coords).into();
        self.max = max2(&self.max.coords, &point.coords).into();

        return self;
    }

    #[inline]
    pub fn contains_point(&self, point: &Point3f) -> bool {
        return point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z;
    }

    #[inline]
    pub fn contains_box3(&self, inner: &Box3) -> bool {
        for i in 0..3 {
            if inner.min[i] < self.min[i] || inner.max[i] > self.max[i] {
                return false;
            }
        }

        return true;
    }

    #[inline]
    pub fn contains_sphere3(&self, inner: &Sphere3) -> bool {
        for i in 0..3 {
            if inner.get_center()[i] - inner.get_radius() < self.min[i] {
                return false;
            }

            if inner.get_center()[i] + inner.get_radius() > self.max[i] {
                return false;
            }
        }

        return true;
    }

    pub fn contains_obb3(&self, inner: &Obb3) -> bool {
        return inner.corners().iter().all(|corner| self.contains_point(corner));
    }

    /// Tests cap centers and eight samples on each cap rim
    pub fn contains_cylinder3(&self, inner: &Cylinder3) -> bool {
        let top = inner.top_center();
        let bottom = inner.bottom_center();

        if !self.contains_point(&top) || !self.contains_point(&bottom) {
            return false;
        }

        let (perp1, perp2) = inner.axis_frame();

        for i in 0..8 {
            let angle = i as f32 * core::f32::consts::FRAC_PI_4;
            let offset = (perp1 * angle.cos() + perp2 * angle.sin()) * inner.get_radius();

            if !self.contains_point(&(top + offset)) || !self.contains_point(&(bottom + offset)) {
                return false;
            }
        }

        return true;
    }

    /// Conservative test against the world-axis extents of the oriented ellipsoid
    pub fn contains_ellipsoid3(&self, inner: &Ellipsoid3) -> bool {
        let rotation = inner.get_orientation().matrix();
        let radii = inner.get_radii();

        let mut half_extents = Vec3f::zeros();
        for i in 0..3 {
            half_extents[i] = rotation[(i, 0)].abs() * radii.x
                + rotation[(i, 1)].abs() * radii.y
                + rotation[(i, 2)].abs() * radii.z;
        }

        let ellipsoid_min = inner.get_center() - half_extents;
        let ellipsoid_max = inner.get_center() + half_extents;

        for i in 0..3 {
            if ellipsoid_min[i] < self.min[i] || ellipsoid_max[i] > self.max[i] {
                return false;
            }
        }

        return true;
    }

    #[inline]
    pub fn contains_line_segment3(&self, inner: &LineSegment3) -> bool {
        return self.contains_point(inner.get_start()) && self.contains_point(inner.get_end());
    }

    #[inline]
    pub fn contains_triangle3(&self, inner: &Triangle3) -> bool {
        return self.contains_point(inner.a())
            && self.contains_point(inner.b())
            && self.contains_point(inner.c());
    }

    /// Test bbox - bbox intersection
    pub fn intersects_box3(&self, other: &Box3) -> bool {
        for i in 0..3 {
            if self.max[i] < other.min[i] || self.min[i] > other.max[i] {
                return false;
            }
        }

        return true;
    }

    #[inline]
    pub fn intersects_sphere3(&self, sphere: &Sphere3) -> bool {
        let radius = sphere.get_radius();
        return self.squared_distance(sphere.get_center()) <= radius * radius;
    }

    #[inline]
    pub fn intersects_plane3(&self, plane: &Plane3) -> bool {
        return plane.intersects_box3(self);
    }

    #[inline]
    pub fn intersects_obb3(&self, obb: &Obb3) -> bool {
        return obb.intersects_box3(self);
    }

    #[inline]
    pub fn intersects_triangle3(&self, triangle: &Triangle3) -> bool {
        return triangle.intersects_box3(self);
    }

    #[inline]
    pub fn intersects_cylinder3(&self, cylinder: &Cylinder3) -> bool {
        return cylinder.intersects_box3(self);
    }

    #[inline]
    pub fn intersects_ellipsoid3(&self, ellipsoid: &Ellipsoid3) -> bool {
        return ellipsoid.intersects_box3(self);
    }

    /// Slab test over an unbounded parameter range
    pub fn intersects_line3_at(&self, line: &Line3) -> Intersection {
        return self.slab_test(line.get_point(), line.get_direction(), f32::NEG_INFINITY, f32::INFINITY);
    }

    #[inline]
    pub fn intersects_line3(&self, line: &Line3) -> bool {
        return self.intersects_line3_at(line).is_hit();
    }

    pub fn intersects_ray3_at(&self, ray: &Ray3) -> Intersection {
        return self.slab_test(ray.get_origin(), ray.get_direction(), 0.0, f32::INFINITY);
    }

    #[inline]
    pub fn intersects_ray3(&self, ray: &Ray3) -> bool {
        return self.intersects_ray3_at(ray).is_hit();
    }

    pub fn intersects_line_segment3_at(&self, segment: &LineSegment3) -> Intersection {
        return self.slab_test(segment.get_start(), &segment.direction(), 0.0, 1.0);
    }

    #[inline]
    pub fn intersects_line_segment3(&self, segment: &LineSegment3) -> bool {
        return self.intersects_line_segment3_at(segment).is_hit();
    }

    /// Near-zero direction components require the origin to lie inside the slab
    fn slab_test(&self, origin: &Point3f, direction: &Vec3f, t_start: f32, t_end: f32) -> Intersection {
        let mut t_min = t_start;
        let mut t_max = t_end;

        for i in 0..3 {
            let o = origin[i];
            let d = direction[i];

            if Float::abs(d) <= SEPARATION_EPSILON {
                if o < self.min[i] || o > self.max[i] {
                    return Intersection::Miss;
                }
            } else {
                let inv = 1.0 / d;
                let mut t0 = (self.min[i] - o) * inv;
                let mut t1 = (self.max[i] - o) * inv;

                if t0 > t1 {
                    core::mem::swap(&mut t0, &mut t1);
                }

                t_min = Float::max(t_min, t0);
                t_max = Float::min(t_max, t1);

                if t_max < t_min {
                    return Intersection::Miss;
                }
            }
        }

        return Intersection::Span { t_min, t_max };
    }
}

impl HasBBox3 for Box3 {
    #[inline]
    fn bbox(&self) -> Box3 {
        return *self;
    }
}

impl ClosestPoint3 for Box3 {
    #[inline]
    fn closest_point(&self, point: &Point3f) -> Point3f {
        return Point3f::from(min2(&max2(&self.min.coords, &point.coords), &self.max.coords));
    }

    fn squared_distance(&self, point: &Point3f) -> f32 {
        let mut sq_distance = 0.0;

        for i in 0..3 {
            let v = point[i];

            if v < self.min[i] {
                sq_distance += (self.min[i] - v) * (self.min[i] - v);
            }

            if v > self.max[i] {
                sq_distance += (v - self.max[i]) * (v - self.max[i]);
            }
        }

        return sq_distance;
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;
    use test_case::test_case;

    use super::*;

    fn unit_box() -> Box3 {
        return Box3::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn union_accumulates_bounds() {
        let mut bbox = Box3::empty();
        bbox.union_point3(&Point3f::new(1.0, -2.0, 0.5));
        bbox.union_point3(&Point3f::new(-1.0, 3.0, 0.0));

        assert_eq!(*bbox.get_min(), Point3f::new(-1.0, -2.0, 0.0));
        assert_eq!(*bbox.get_max(), Point3f::new(1.0, 3.0, 0.5));

        let mut other = Box3::from_point(&Point3f::new(5.0, 0.0, 0.0));
        other.union_box3(&bbox);
        assert_eq!(*other.get_max(), Point3f::new(5.0, 3.0, 0.5));
    }

    #[test_case(Point3f::new(0.5, 0.5, 0.5), 0.0; "inside")]
    #[test_case(Point3f::new(2.0, 0.5, 0.5), 1.0; "outside one axis")]
    #[test_case(Point3f::new(2.0, 2.0, 0.5), 2.0; "outside two axes")]
    fn squared_distance_to_point(point: Point3f, expected: f32) {
        assert_eq!(unit_box().squared_distance(&point), expected);
    }

    #[test]
    fn ray_slab_test() {
        let bbox = unit_box();

        let hit = bbox.intersects_ray3_at(&Ray3::new(
            Point3f::new(-1.0, 0.5, 0.5),
            Vector3::new(1.0, 0.0, 0.0),
        ));
        assert_eq!(hit, Intersection::Span { t_min: 1.0, t_max: 2.0 });

        // Axis-parallel ray outside the slab
        let miss = bbox.intersects_ray3_at(&Ray3::new(
            Point3f::new(-1.0, 2.0, 0.5),
            Vector3::new(1.0, 0.0, 0.0),
        ));
        assert_eq!(miss, Intersection::Miss);

        // Ray pointing away
        let behind = bbox.intersects_ray3_at(&Ray3::new(
            Point3f::new(-1.0, 0.5, 0.5),
            Vector3::new(-1.0, 0.0, 0.0),
        ));
        assert_eq!(behind, Intersection::Miss);
    }

    #[test]
    fn segment_slab_test_clamps_parameters() {
        let bbox = unit_box();

        let segment = LineSegment3::new(&Point3f::new(0.5, 0.5, 0.5), &Point3f::new(3.5, 0.5, 0.5));
        match bbox.intersects_line_segment3_at(&segment) {
            Intersection::Span { t_min, t_max } => {
                assert_eq!(t_min, 0.0);
                assert!((t_max - 1.0 / 6.0).abs() < 1e-6);
            }
            other => panic!("expected span, got {:?}", other),
        }

        let outside = LineSegment3::new(&Point3f::new(2.0, 0.5, 0.5), &Point3f::new(3.0, 0.5, 0.5));
        assert!(!bbox.intersects_line_segment3(&outside));
    }

    #[test]
    fn contains_shapes() {
        let bbox = Box3::new(Point3f::new(-2.0, -2.0, -2.0), Point3f::new(2.0, 2.0, 2.0));

        assert!(bbox.contains_sphere3(&Sphere3::new(Point3f::origin(), 1.0)));
        assert!(!bbox.contains_sphere3(&Sphere3::new(Point3f::new(1.5, 0.0, 0.0), 1.0)));
        assert!(bbox.contains_box3(&unit_box()));
        assert!(!bbox.contains_box3(&Box3::new(
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(3.0, 1.0, 1.0)
        )));
    }
}
