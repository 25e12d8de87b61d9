use num_traits::Float;

use crate::geometry::traits::ClosestPoint3;
use crate::geometry::{INTERSECTION_EPSILON, PARALLEL_EPSILON};
use crate::helpers::aliases::{Point3f, Vec3f};

use super::{
    box3::Box3, cylinder3::Cylinder3, ellipsoid3::Ellipsoid3, line3::Line3, obb3::Obb3,
    plane3::Plane3, ray3::Ray3, sphere3::Sphere3, triangle3::Triangle3, Intersection,
};

/// 3D line segment, `t` in `[0, 1]`
#[derive(Debug, Clone, Copy)]
pub struct LineSegment3 {
    start: Point3f,
    end: Point3f,
}

impl LineSegment3 {
    pub fn new(start: &Point3f, end: &Point3f) -> Self {
        return Self {
            start: *start,
            end: *end,
        };
    }

    #[inline]
    pub fn get_start(&self) -> &Point3f {
        return &self.start;
    }

    #[inline]
    pub fn get_end(&self) -> &Point3f {
        return &self.end;
    }

    #[inline]
    pub fn direction(&self) -> Vec3f {
        return self.end - self.start;
    }

    #[inline]
    pub fn length(&self) -> f32 {
        return self.direction().norm();
    }

    #[inline]
    pub fn point_at(&self, t: f32) -> Point3f {
        return self.start + self.direction() * t;
    }

    /// Closest point together with its clamped parameter
    pub fn closest_point_with_t(&self, point: &Point3f) -> (Point3f, f32) {
        let direction = self.direction();
        let length_sq = direction.norm_squared();
        if length_sq == 0.0 {
            return (self.start, 0.0);
        }

        let t = (point - self.start).dot(&direction) / length_sq;
        let clamped = t.clamp(0.0, 1.0);
        return (self.start + direction * clamped, clamped);
    }

    pub fn intersects_line3_at(&self, line: &Line3) -> Intersection {
        let seg_dir = self.direction();
        let w0 = self.start - line.get_point();

        let a = seg_dir.norm_squared();
        let b = seg_dir.dot(line.get_direction());
        let c = line.get_direction().norm_squared();
        let d = seg_dir.dot(&w0);
        let e = line.get_direction().dot(&w0);

        let denom = a * c - b * b;

        if denom.abs() <= PARALLEL_EPSILON {
            let cross = seg_dir.cross(&w0);
            if cross.norm_squared() <= INTERSECTION_EPSILON {
                return Intersection::Hit(0.0);
            }
            return Intersection::Miss;
        }

        let t_seg = (b * e - c * d) / denom;
        let t_line = (a * e - b * d) / denom;

        if !(0.0..=1.0).contains(&t_seg) {
            return Intersection::Miss;
        }

        let p_seg = self.point_at(t_seg);
        let p_line = line.point_at(t_line);

        if (p_seg - p_line).norm_squared() > INTERSECTION_EPSILON * INTERSECTION_EPSILON {
            return Intersection::Miss;
        }

        return Intersection::Hit(t_seg);
    }

    #[inline]
    pub fn intersects_line3(&self, line: &Line3) -> bool {
        return self.intersects_line3_at(line).is_hit();
    }

    pub fn intersects_ray3_at(&self, ray: &Ray3) -> Intersection {
        let seg_dir = self.direction();
        let w0 = self.start - ray.get_origin();

        let a = seg_dir.norm_squared();
        let b = seg_dir.dot(ray.get_direction());
        let c = ray.get_direction().norm_squared();
        let d = seg_dir.dot(&w0);
        let e = ray.get_direction().dot(&w0);

        let denom = a * c - b * b;

        if denom.abs() <= PARALLEL_EPSILON {
            let cross = seg_dir.cross(&w0);
            if cross.norm_squared() <= INTERSECTION_EPSILON {
                return Intersection::Hit(0.0);
            }
            return Intersection::Miss;
        }

        let t_seg = (b * e - c * d) / denom;
        let t_ray = (a * e - b * d) / denom;

        if !(0.0..=1.0).contains(&t_seg) || t_ray < 0.0 {
            return Intersection::Miss;
        }

        let p_seg = self.point_at(t_seg);
        let p_ray = ray.point_at(t_ray);

        if (p_seg - p_ray).norm_squared() > INTERSECTION_EPSILON * INTERSECTION_EPSILON {
            return Intersection::Miss;
        }

        return Intersection::Hit(t_seg);
    }

    #[inline]
    pub fn intersects_ray3(&self, ray: &Ray3) -> bool {
        return self.intersects_ray3_at(ray).is_hit();
    }

    /// Clamped closest-approach test; coincident overlapping segments report
    /// the start of the overlap
    pub fn intersects_line_segment3_at(&self, other: &LineSegment3) -> Intersection {
        let dir_a = self.direction();
        let dir_b = other.direction();
        let w0 = self.start - other.start;

        let a = dir_a.norm_squared();
        let b = dir_a.dot(&dir_b);
        let c = dir_b.norm_squared();
        let d = dir_a.dot(&w0);
        let e = dir_b.dot(&w0);

        let denom = a * c - b * b;

        if denom.abs() <= PARALLEL_EPSILON {
            let cross = dir_a.cross(&w0);
            if cross.norm_squared() <= INTERSECTION_EPSILON {
                // Coincident; overlap iff the projected ranges overlap
                let proj_end_a = a;
                let proj_start_b = dir_b.dot(&w0);
                let proj_end_b = proj_start_b + b;

                let overlap_min = Float::max(0.0, Float::min(proj_start_b, proj_end_b));
                let overlap_max = Float::min(proj_end_a, Float::max(proj_start_b, proj_end_b));

                if overlap_min <= overlap_max {
                    return Intersection::Hit(overlap_min / proj_end_a);
                }
            }
            return Intersection::Miss;
        }

        let t_a = ((b * e - c * d) / denom).clamp(0.0, 1.0);
        let t_b = ((a * e - b * d) / denom).clamp(0.0, 1.0);

        let p_a = self.point_at(t_a);
        let p_b = other.point_at(t_b);

        if (p_a - p_b).norm_squared() > INTERSECTION_EPSILON * INTERSECTION_EPSILON {
            return Intersection::Miss;
        }

        return Intersection::Hit(t_a);
    }

    #[inline]
    pub fn intersects_line_segment3(&self, other: &LineSegment3) -> bool {
        return self.intersects_line_segment3_at(other).is_hit();
    }

    // Shape forwards

    #[inline]
    pub fn intersects_box3_at(&self, bbox: &Box3) -> Intersection {
        return bbox.intersects_line_segment3_at(self);
    }

    #[inline]
    pub fn intersects_box3(&self, bbox: &Box3) -> bool {
        return bbox.intersects_line_segment3(self);
    }

    #[inline]
    pub fn intersects_sphere3_at(&self, sphere: &Sphere3) -> Intersection {
        return sphere.intersects_line_segment3_at(self);
    }

    #[inline]
    pub fn intersects_sphere3(&self, sphere: &Sphere3) -> bool {
        return sphere.intersects_line_segment3(self);
    }

    #[inline]
    pub fn intersects_cylinder3_at(&self, cylinder: &Cylinder3) -> Intersection {
        return cylinder.intersects_line_segment3_at(self);
    }

    #[inline]
    pub fn intersects_cylinder3(&self, cylinder: &Cylinder3) -> bool {
        return cylinder.intersects_line_segment3(self);
    }

    #[inline]
    pub fn intersects_ellipsoid3_at(&self, ellipsoid: &Ellipsoid3) -> Intersection {
        return ellipsoid.intersects_line_segment3_at(self);
    }

    #[inline]
    pub fn intersects_ellipsoid3(&self, ellipsoid: &Ellipsoid3) -> bool {
        return ellipsoid.intersects_line_segment3(self);
    }

    #[inline]
    pub fn intersects_obb3_at(&self, obb: &Obb3) -> Intersection {
        return obb.intersects_line_segment3_at(self);
    }

    #[inline]
    pub fn intersects_obb3(&self, obb: &Obb3) -> bool {
        return obb.intersects_line_segment3(self);
    }

    #[inline]
    pub fn intersects_plane3_at(&self, plane: &Plane3) -> Intersection {
        return plane.intersects_line_segment3_at(self);
    }

    #[inline]
    pub fn intersects_plane3(&self, plane: &Plane3) -> bool {
        return plane.intersects_line_segment3(self);
    }

    #[inline]
    pub fn intersects_triangle3_at(&self, triangle: &Triangle3) -> Intersection {
        return triangle.intersects_line_segment3_at(self);
    }

    #[inline]
    pub fn intersects_triangle3(&self, triangle: &Triangle3) -> bool {
        return triangle.intersects_line_segment3(self);
    }
}

impl ClosestPoint3 for LineSegment3 {
    #[inline]
    fn closest_point(&self, point: &Point3f) -> Point3f {
        return self.closest_point_with_t(point).0;
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::*;

    #[test]
    fn closest_point_clamps_to_endpoints() {
        let segment = LineSegment3::new(&Point3f::origin(), &Point3f::new(2.0, 0.0, 0.0));

        let (mid, t_mid) = segment.closest_point_with_t(&Point3f::new(1.0, 5.0, 0.0));
        assert_eq!(mid, Point3f::new(1.0, 0.0, 0.0));
        assert_eq!(t_mid, 0.5);

        let (end, t_end) = segment.closest_point_with_t(&Point3f::new(7.0, 0.0, 0.0));
        assert_eq!(end, Point3f::new(2.0, 0.0, 0.0));
        assert_eq!(t_end, 1.0);

        let degenerate = LineSegment3::new(&Point3f::origin(), &Point3f::origin());
        assert_eq!(degenerate.closest_point(&Point3f::new(1.0, 1.0, 1.0)), Point3f::origin());
    }

    #[test]
    fn crossing_segments_intersect() {
        let a = LineSegment3::new(&Point3f::new(-1.0, 0.0, 0.0), &Point3f::new(1.0, 0.0, 0.0));
        let b = LineSegment3::new(&Point3f::new(0.0, -1.0, 0.0), &Point3f::new(0.0, 1.0, 0.0));

        assert_eq!(a.intersects_line_segment3_at(&b), Intersection::Hit(0.5));
    }

    #[test]
    fn disjoint_collinear_segments_miss() {
        let a = LineSegment3::new(&Point3f::origin(), &Point3f::new(1.0, 0.0, 0.0));
        let apart = LineSegment3::new(&Point3f::new(2.0, 0.0, 0.0), &Point3f::new(3.0, 0.0, 0.0));
        let overlapping = LineSegment3::new(&Point3f::new(0.5, 0.0, 0.0), &Point3f::new(3.0, 0.0, 0.0));

        assert!(!a.intersects_line_segment3(&apart));
        assert!(a.intersects_line_segment3(&overlapping));
    }

    #[test]
    fn segment_reaches_line_within_range() {
        let segment = LineSegment3::new(&Point3f::new(0.0, -1.0, 0.0), &Point3f::new(0.0, 1.0, 0.0));
        let line = Line3::new(Point3f::new(-1.0, 0.0, 0.0), Vector3::x());

        assert_eq!(segment.intersects_line3_at(&line), Intersection::Hit(0.5));

        let far_line = Line3::new(Point3f::new(-1.0, 5.0, 0.0), Vector3::x());
        assert!(!segment.intersects_line3(&far_line));
    }
}
