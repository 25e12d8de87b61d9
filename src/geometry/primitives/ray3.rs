use num_traits::Float;

use crate::geometry::traits::ClosestPoint3;
use crate::geometry::{INTERSECTION_EPSILON, PARALLEL_EPSILON};
use crate::helpers::aliases::{Point3f, Vec3f};

use super::{
    box3::Box3, cylinder3::Cylinder3, ellipsoid3::Ellipsoid3, line3::Line3,
    line_segment3::LineSegment3, obb3::Obb3, plane3::Plane3, sphere3::Sphere3,
    triangle3::Triangle3, Intersection,
};

/// 3D ray given by origin and direction, `t >= 0`
#[derive(Debug, Clone, Copy)]
pub struct Ray3 {
    origin: Point3f,
    direction: Vec3f,
}

impl Ray3 {
    pub fn new(origin: Point3f, direction: Vec3f) -> Self {
        return Self { origin, direction };
    }

    #[inline]
    pub fn get_origin(&self) -> &Point3f {
        return &self.origin;
    }

    #[inline]
    pub fn get_direction(&self) -> &Vec3f {
        return &self.direction;
    }

    #[inline]
    pub fn point_at(&self, t: f32) -> Point3f {
        return self.origin + self.direction * t;
    }

    /// Closest-approach test restricted to `t >= 0` on the ray
    pub fn intersects_line3_at(&self, line: &Line3) -> Intersection {
        let w0 = self.origin - line.get_point();
        let a = self.direction.norm_squared();
        let b = self.direction.dot(line.get_direction());
        let c = line.get_direction().norm_squared();
        let d = self.direction.dot(&w0);
        let e = line.get_direction().dot(&w0);

        let denom = a * c - b * b;

        if denom.abs() <= PARALLEL_EPSILON {
            // Parallel; accept only coincident lines
            let dist_sq = (w0 - line.get_direction() * (e / c)).norm_squared();
            if dist_sq > INTERSECTION_EPSILON * INTERSECTION_EPSILON {
                return Intersection::Miss;
            }

            return Intersection::Hit(0.0);
        }

        let t_ray = (b * e - c * d) / denom;
        let t_line = (a * e - b * d) / denom;

        if t_ray < 0.0 {
            return Intersection::Miss;
        }

        let p_ray = self.point_at(t_ray);
        let p_line = line.point_at(t_line);

        if (p_ray - p_line).norm_squared() > INTERSECTION_EPSILON * INTERSECTION_EPSILON {
            return Intersection::Miss;
        }

        return Intersection::Hit(t_ray);
    }

    #[inline]
    pub fn intersects_line3(&self, line: &Line3) -> bool {
        return self.intersects_line3_at(line).is_hit();
    }

    pub fn intersects_ray3_at(&self, other: &Ray3) -> Intersection {
        let w0 = self.origin - other.origin;
        let a = self.direction.norm_squared();
        let b = self.direction.dot(&other.direction);
        let c = other.direction.norm_squared();
        let d = self.direction.dot(&w0);
        let e = other.direction.dot(&w0);

        let denom = a * c - b * b;

        if denom.abs() <= PARALLEL_EPSILON {
            let dist_sq = (w0 - other.direction * (e / c)).norm_squared();
            if dist_sq > INTERSECTION_EPSILON * INTERSECTION_EPSILON {
                return Intersection::Miss;
            }

            // Opposed parallel rays never overlap forward
            if b < 0.0 {
                return Intersection::Miss;
            }

            return Intersection::Hit(0.0);
        }

        let t_a = (b * e - c * d) / denom;
        let t_b = (a * e - b * d) / denom;

        if t_a < 0.0 || t_b < 0.0 {
            return Intersection::Miss;
        }

        let p_a = self.point_at(t_a);
        let p_b = other.point_at(t_b);

        if (p_a - p_b).norm_squared() > INTERSECTION_EPSILON * INTERSECTION_EPSILON {
            return Intersection::Miss;
        }

        return Intersection::Hit(t_a);
    }

    #[inline]
    pub fn intersects_ray3(&self, other: &Ray3) -> bool {
        return self.intersects_ray3_at(other).is_hit();
    }

    /// The segment parameter is clamped first, then the ray parameter is
    /// recomputed for the clamped point
    pub fn intersects_line_segment3_at(&self, segment: &LineSegment3) -> Intersection {
        let seg_dir = segment.direction();
        let w0 = self.origin - segment.get_start();

        let a = self.direction.norm_squared();
        let b = self.direction.dot(&seg_dir);
        let c = seg_dir.norm_squared();
        let e = seg_dir.dot(&w0);

        let denom = a * c - b * b;

        let t_seg = if denom.abs() <= PARALLEL_EPSILON {
            if b > c {
                e / b
            } else {
                0.0
            }
        } else {
            let d = self.direction.dot(&w0);
            (a * e - b * d) / denom
        };

        let t_seg = t_seg.clamp(0.0, 1.0);

        let seg_point = segment.point_at(t_seg);
        let t_ray = (seg_point - self.origin).dot(&self.direction) / a;

        if t_ray < 0.0 {
            return Intersection::Miss;
        }

        let p_ray = self.point_at(t_ray);
        if (p_ray - seg_point).norm_squared() > INTERSECTION_EPSILON * INTERSECTION_EPSILON {
            return Intersection::Miss;
        }

        return Intersection::Hit(t_ray);
    }

    #[inline]
    pub fn intersects_line_segment3(&self, segment: &LineSegment3) -> bool {
        return self.intersects_line_segment3_at(segment).is_hit();
    }

    // Shape forwards

    #[inline]
    pub fn intersects_box3_at(&self, bbox: &Box3) -> Intersection {
        return bbox.intersects_ray3_at(self);
    }

    #[inline]
    pub fn intersects_box3(&self, bbox: &Box3) -> bool {
        return bbox.intersects_ray3(self);
    }

    #[inline]
    pub fn intersects_sphere3_at(&self, sphere: &Sphere3) -> Intersection {
        return sphere.intersects_ray3_at(self);
    }

    #[inline]
    pub fn intersects_sphere3(&self, sphere: &Sphere3) -> bool {
        return sphere.intersects_ray3(self);
    }

    #[inline]
    pub fn intersects_cylinder3_at(&self, cylinder: &Cylinder3) -> Intersection {
        return cylinder.intersects_ray3_at(self);
    }

    #[inline]
    pub fn intersects_cylinder3(&self, cylinder: &Cylinder3) -> bool {
        return cylinder.intersects_ray3(self);
    }

    #[inline]
    pub fn intersects_ellipsoid3_at(&self, ellipsoid: &Ellipsoid3) -> Intersection {
        return ellipsoid.intersects_ray3_at(self);
    }

    #[inline]
    pub fn intersects_ellipsoid3(&self, ellipsoid: &Ellipsoid3) -> bool {
        return ellipsoid.intersects_ray3(self);
    }

    #[inline]
    pub fn intersects_obb3_at(&self, obb: &Obb3) -> Intersection {
        return obb.intersects_ray3_at(self);
    }

    #[inline]
    pub fn intersects_obb3(&self, obb: &Obb3) -> bool {
        return obb.intersects_ray3(self);
    }

    #[inline]
    pub fn intersects_plane3_at(&self, plane: &Plane3) -> Intersection {
        return plane.intersects_ray3_at(self);
    }

    #[inline]
    pub fn intersects_plane3(&self, plane: &Plane3) -> bool {
        return plane.intersects_ray3(self);
    }

    #[inline]
    pub fn intersects_triangle3_at(&self, triangle: &Triangle3) -> Intersection {
        return triangle.intersects_ray3_at(self);
    }

    #[inline]
    pub fn intersects_triangle3(&self, triangle: &Triangle3) -> bool {
        return triangle.intersects_ray3(self);
    }
}

impl ClosestPoint3 for Ray3 {
    fn closest_point(&self, point: &Point3f) -> Point3f {
        let denom = self.direction.norm_squared();
        if denom == 0.0 {
            return self.origin;
        }

        let t = (point - self.origin).dot(&self.direction) / denom;
        return self.point_at(Float::max(t, 0.0));
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::*;

    #[test]
    fn closest_point_clamps_to_origin() {
        let ray = Ray3::new(Point3f::origin(), Vector3::x());

        assert_eq!(
            ray.closest_point(&Point3f::new(2.0, 3.0, 0.0)),
            Point3f::new(2.0, 0.0, 0.0)
        );
        assert_eq!(
            ray.closest_point(&Point3f::new(-5.0, 1.0, 0.0)),
            Point3f::origin()
        );
    }

    #[test]
    fn ray_meets_crossing_line() {
        let ray = Ray3::new(Point3f::origin(), Vector3::x());
        let ahead = Line3::new(Point3f::new(2.0, -1.0, 0.0), Vector3::y());
        let behind = Line3::new(Point3f::new(-2.0, -1.0, 0.0), Vector3::y());

        assert_eq!(ray.intersects_line3_at(&ahead), Intersection::Hit(2.0));
        assert!(!ray.intersects_line3(&behind));
    }

    #[test]
    fn parallel_rays_need_same_direction() {
        let a = Ray3::new(Point3f::origin(), Vector3::x());

        let trailing = Ray3::new(Point3f::new(4.0, 0.0, 0.0), Vector3::x());
        assert!(a.intersects_ray3(&trailing));

        // Coincident but opposed rays are rejected
        let facing = Ray3::new(Point3f::new(4.0, 0.0, 0.0), Vector3::x() * -1.0);
        assert!(!a.intersects_ray3(&facing));

        let offset = Ray3::new(Point3f::new(0.0, 1.0, 0.0), Vector3::x());
        assert!(!a.intersects_ray3(&offset));

        let crossing = Ray3::new(Point3f::new(2.0, -2.0, 0.0), Vector3::y());
        assert_eq!(a.intersects_ray3_at(&crossing), Intersection::Hit(2.0));
    }

    #[test]
    fn ray_reaches_segment() {
        let ray = Ray3::new(Point3f::origin(), Vector3::x());
        let crossing = LineSegment3::new(&Point3f::new(3.0, -1.0, 0.0), &Point3f::new(3.0, 1.0, 0.0));
        assert_eq!(ray.intersects_line_segment3_at(&crossing), Intersection::Hit(3.0));

        let off_axis = LineSegment3::new(&Point3f::new(3.0, 1.0, 0.0), &Point3f::new(3.0, 2.0, 0.0));
        assert!(!ray.intersects_line_segment3(&off_axis));
    }
}
