use crate::geometry::traits::ClosestPoint3;
use crate::geometry::{INTERSECTION_EPSILON, PARALLEL_EPSILON};
use crate::helpers::aliases::{Point3f, Vec3f};

use super::{
    box3::Box3, cylinder3::Cylinder3, ellipsoid3::Ellipsoid3, line_segment3::LineSegment3,
    obb3::Obb3, plane3::Plane3, ray3::Ray3, sphere3::Sphere3, triangle3::Triangle3, Intersection,
};

/// 3D line given by point and direction
#[derive(Debug, Clone, Copy)]
pub struct Line3 {
    point: Point3f,
    direction: Vec3f,
}

impl Line3 {
    pub fn new(point: Point3f, direction: Vec3f) -> Self {
        return Self { point, direction };
    }

    /// point = p1, direction = p2 - p1
    pub fn from_points(p1: &Point3f, p2: &Point3f) -> Self {
        return Self {
            point: *p1,
            direction: p2 - p1,
        };
    }

    #[inline]
    pub fn get_point(&self) -> &Point3f {
        return &self.point;
    }

    #[inline]
    pub fn get_direction(&self) -> &Vec3f {
        return &self.direction;
    }

    #[inline]
    pub fn point_at(&self, t: f32) -> Point3f {
        return self.point + self.direction * t;
    }

    /// Orthogonal projection onto the line
    #[inline]
    pub fn project_point(&self, point: &Point3f) -> Point3f {
        return self.closest_point(point);
    }

    /// Closest-approach test; skew lines miss
    pub fn intersects_line3_at(&self, other: &Line3) -> Intersection {
        let w = self.point - other.point;
        let a_dot = self.direction.norm_squared();
        let b_dot = other.direction.norm_squared();
        let ab_dot = self.direction.dot(&other.direction);

        let denom = a_dot * b_dot - ab_dot * ab_dot;

        if denom.abs() <= PARALLEL_EPSILON {
            // Parallel; coincident lines meet everywhere
            let cross = self.direction.cross(&w);
            if cross.norm_squared() <= INTERSECTION_EPSILON {
                return Intersection::Hit(0.0);
            }
            return Intersection::Miss;
        }

        let w_dot_a = w.dot(&self.direction);
        let w_dot_b = w.dot(&other.direction);

        let t_a = (ab_dot * w_dot_b - b_dot * w_dot_a) / denom;
        let t_b = (a_dot * w_dot_b - ab_dot * w_dot_a) / denom;

        let p_a = self.point_at(t_a);
        let p_b = other.point_at(t_b);

        if (p_a - p_b).norm_squared() > INTERSECTION_EPSILON * INTERSECTION_EPSILON {
            return Intersection::Miss;
        }

        return Intersection::Hit(t_a);
    }

    #[inline]
    pub fn intersects_line3(&self, other: &Line3) -> bool {
        return self.intersects_line3_at(other).is_hit();
    }

    /// Solves on the ray first, then reports the parameter on this line
    pub fn intersects_ray3_at(&self, ray: &Ray3) -> Intersection {
        let t_ray = match ray.intersects_line3_at(self) {
            Intersection::Hit(t) => t,
            _ => return Intersection::Miss,
        };

        let intersection = ray.point_at(t_ray);
        let diff = intersection - self.point;
        let t_line = diff.dot(&self.direction) / self.direction.norm_squared();

        return Intersection::Hit(t_line);
    }

    #[inline]
    pub fn intersects_ray3(&self, ray: &Ray3) -> bool {
        return self.intersects_ray3_at(ray).is_hit();
    }

    pub fn intersects_line_segment3_at(&self, segment: &LineSegment3) -> Intersection {
        let seg_dir = segment.direction();
        let w = self.point - segment.get_start();

        let a_dot = self.direction.norm_squared();
        let b_dot = seg_dir.norm_squared();
        let ab_dot = self.direction.dot(&seg_dir);

        let denom = a_dot * b_dot - ab_dot * ab_dot;

        if denom.abs() <= PARALLEL_EPSILON {
            let cross = self.direction.cross(&w);
            if cross.norm_squared() <= INTERSECTION_EPSILON {
                return Intersection::Hit(0.0);
            }
            return Intersection::Miss;
        }

        let w_dot_line = w.dot(&self.direction);
        let w_dot_seg = w.dot(&seg_dir);

        let t_line = (ab_dot * w_dot_seg - b_dot * w_dot_line) / denom;
        let t_seg = (a_dot * w_dot_seg - ab_dot * w_dot_line) / denom;

        if !(0.0..=1.0).contains(&t_seg) {
            return Intersection::Miss;
        }

        let p_line = self.point_at(t_line);
        let p_seg = segment.point_at(t_seg);

        if (p_line - p_seg).norm_squared() > INTERSECTION_EPSILON * INTERSECTION_EPSILON {
            return Intersection::Miss;
        }

        return Intersection::Hit(t_line);
    }

    #[inline]
    pub fn intersects_line_segment3(&self, segment: &LineSegment3) -> bool {
        return self.intersects_line_segment3_at(segment).is_hit();
    }

    // Shape forwards

    #[inline]
    pub fn intersects_box3_at(&self, bbox: &Box3) -> Intersection {
        return bbox.intersects_line3_at(self);
    }

    #[inline]
    pub fn intersects_box3(&self, bbox: &Box3) -> bool {
        return bbox.intersects_line3(self);
    }

    #[inline]
    pub fn intersects_sphere3_at(&self, sphere: &Sphere3) -> Intersection {
        return sphere.intersects_line3_at(self);
    }

    #[inline]
    pub fn intersects_sphere3(&self, sphere: &Sphere3) -> bool {
        return sphere.intersects_line3(self);
    }

    #[inline]
    pub fn intersects_cylinder3_at(&self, cylinder: &Cylinder3) -> Intersection {
        return cylinder.intersects_line3_at(self);
    }

    #[inline]
    pub fn intersects_cylinder3(&self, cylinder: &Cylinder3) -> bool {
        return cylinder.intersects_line3(self);
    }

    #[inline]
    pub fn intersects_ellipsoid3_at(&self, ellipsoid: &Ellipsoid3) -> Intersection {
        return ellipsoid.intersects_line3_at(self);
    }

    #[inline]
    pub fn intersects_ellipsoid3(&self, ellipsoid: &Ellipsoid3) -> bool {
        return ellipsoid.intersects_line3(self);
    }

    #[inline]
    pub fn intersects_obb3_at(&self, obb: &Obb3) -> Intersection {
        return obb.intersects_line3_at(self);
    }

    #[inline]
    pub fn intersects_obb3(&self, obb: &Obb3) -> bool {
        return obb.intersects_line3(self);
    }

    #[inline]
    pub fn intersects_plane3_at(&self, plane: &Plane3) -> Intersection {
        return plane.intersects_line3_at(self);
    }

    #[inline]
    pub fn intersects_plane3(&self, plane: &Plane3) -> bool {
        return plane.intersects_line3(self);
    }

    #[inline]
    pub fn intersects_triangle3_at(&self, triangle: &Triangle3) -> Intersection {
        return triangle.intersects_line3_at(self);
    }

    #[inline]
    pub fn intersects_triangle3(&self, triangle: &Triangle3) -> bool {
        return triangle.intersects_line3(self);
    }
}

impl ClosestPoint3 for Line3 {
    fn closest_point(&self, point: &Point3f) -> Point3f {
        let denom = self.direction.norm_squared();
        if denom == 0.0 {
            return self.point;
        }

        let t = (point - self.point).dot(&self.direction) / denom;
        return self.point_at(t);
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::*;

    #[test]
    fn closest_point_on_line() {
        let line = Line3::new(Point3f::origin(), Vector3::x());

        assert_eq!(
            line.closest_point(&Point3f::new(1.0, 1.0, 0.0)),
            Point3f::new(1.0, 0.0, 0.0)
        );
        assert_eq!(
            line.closest_point(&Point3f::new(0.25, 5.0, 0.0)),
            Point3f::new(0.25, 0.0, 0.0)
        );

        let degenerate = Line3::new(Point3f::new(1.0, 2.0, 3.0), Vector3::zeros());
        assert_eq!(
            degenerate.closest_point(&Point3f::new(9.0, 9.0, 9.0)),
            Point3f::new(1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn crossing_lines_intersect() {
        let a = Line3::new(Point3f::origin(), Vector3::x());
        let b = Line3::new(Point3f::new(2.0, -1.0, 0.0), Vector3::y());

        assert_eq!(a.intersects_line3_at(&b), Intersection::Hit(2.0));
    }

    #[test]
    fn skew_lines_miss() {
        let a = Line3::new(Point3f::origin(), Vector3::x());
        let b = Line3::new(Point3f::new(0.0, 1.0, 1.0), Vector3::y());

        assert!(!a.intersects_line3(&b));
    }

    #[test]
    fn parallel_lines_only_meet_when_coincident() {
        let a = Line3::new(Point3f::origin(), Vector3::x());
        let coincident = Line3::new(Point3f::new(5.0, 0.0, 0.0), Vector3::x() * 2.0);
        let offset = Line3::new(Point3f::new(0.0, 1.0, 0.0), Vector3::x());

        assert!(a.intersects_line3(&coincident));
        assert!(!a.intersects_line3(&offset));
    }

    #[test]
    fn line_hits_segment_interior_only() {
        let line = Line3::new(Point3f::new(0.0, -1.0, 0.0), Vector3::y());

        let crossing = LineSegment3::new(&Point3f::new(-1.0, 0.0, 0.0), &Point3f::new(1.0, 0.0, 0.0));
        assert!(line.intersects_line_segment3(&crossing));

        let short = LineSegment3::new(&Point3f::new(1.0, 0.0, 0.0), &Point3f::new(2.0, 0.0, 0.0));
        assert!(!line.intersects_line_segment3(&short));
    }
}
