use num_traits::Float;

use crate::geometry::traits::ClosestPoint3;
use crate::geometry::PARALLEL_EPSILON;
use crate::helpers::aliases::{Point3f, Vec3f};

use super::{
    box3::Box3, cylinder3::Cylinder3, ellipsoid3::Ellipsoid3, line3::Line3,
    line_segment3::LineSegment3, obb3::Obb3, plane3::Plane3, ray3::Ray3, triangle3::Triangle3,
    Intersection,
};

/// 3D sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere3 {
    center: Point3f,
    radius: f32,
}

impl Sphere3 {
    pub fn new(center: Point3f, radius: f32) -> Self {
        return Self { center, radius };
    }

    #[inline]
    pub fn get_center(&self) -> &Point3f {
        return &self.center;
    }

    #[inline]
    pub fn get_radius(&self) -> f32 {
        return self.radius;
    }

    #[inline]
    pub fn surface_area(&self) -> f32 {
        return 4.0 * core::f32::consts::PI * self.radius * self.radius;
    }

    #[inline]
    pub fn volume(&self) -> f32 {
        return 4.0 / 3.0 * core::f32::consts::PI * self.radius * self.radius * self.radius;
    }

    #[inline]
    pub fn bounding_box3(&self) -> Box3 {
        let radius_vec = Vec3f::new(self.radius, self.radius, self.radius);
        return Box3::new(self.center - radius_vec, self.center + radius_vec);
    }

    // Bounding sphere constructors

    #[inline]
    pub fn enclosing_point(point: &Point3f) -> Self {
        return Self { center: *point, radius: 0.0 };
    }

    #[inline]
    pub fn enclosing_box3(bbox: &Box3) -> Self {
        return Self {
            center: bbox.get_center(),
            radius: bbox.extent().norm(),
        };
    }

    pub fn enclosing_obb3(obb: &Obb3) -> Self {
        let mut max_distance_sq = 0.0f32;
        for corner in obb.corners() {
            let dist_sq = (corner - obb.get_center()).norm_squared();
            max_distance_sq = Float::max(max_distance_sq, dist_sq);
        }

        return Self {
            center: *obb.get_center(),
            radius: max_distance_sq.sqrt(),
        };
    }

    #[inline]
    pub fn enclosing_line_segment3(segment: &LineSegment3) -> Self {
        return Self {
            center: segment.get_start() + segment.direction() * 0.5,
            radius: segment.length() * 0.5,
        };
    }

    #[inline]
    pub fn enclosing_cylinder3(cylinder: &Cylinder3) -> Self {
        let radial_sq = cylinder.get_radius() * cylinder.get_radius();
        let height_sq = cylinder.get_half_height() * cylinder.get_half_height();
        return Self {
            center: *cylinder.get_center(),
            radius: (radial_sq + height_sq).sqrt(),
        };
    }

    #[inline]
    pub fn enclosing_ellipsoid3(ellipsoid: &Ellipsoid3) -> Self {
        return Self {
            center: *ellipsoid.get_center(),
            radius: ellipsoid.get_radii().max(),
        };
    }

    /// Circumsphere for acute triangles, largest-edge sphere otherwise
    pub fn enclosing_triangle3(triangle: &Triangle3) -> Self {
        let (a, b, c) = (*triangle.a(), *triangle.b(), *triangle.c());

        let ab = b - a;
        let ac = c - a;
        let bc = c - b;

        let ab_len_sq = ab.norm_squared();
        let ac_len_sq = ac.norm_squared();
        let bc_len_sq = bc.norm_squared();

        // Obtuse (or right) triangles are bounded by their longest edge
        if bc_len_sq >= ab_len_sq + ac_len_sq {
            return Self::enclosing_line_segment3(&LineSegment3::new(&b, &c));
        }
        if ac_len_sq >= bc_len_sq + ab_len_sq {
            return Self::enclosing_line_segment3(&LineSegment3::new(&a, &c));
        }
        if ab_len_sq >= bc_len_sq + ac_len_sq {
            return Self::enclosing_line_segment3(&LineSegment3::new(&a, &b));
        }

        let normal = ab.cross(&ac);
        let normal_len_sq = normal.norm_squared();
        if normal_len_sq == 0.0 {
            // Degenerate triangle, use the longest edge
            let mut max_len_sq = ab_len_sq;
            let mut best = Self::enclosing_line_segment3(&LineSegment3::new(&a, &b));
            if ac_len_sq > max_len_sq {
                max_len_sq = ac_len_sq;
                best = Self::enclosing_line_segment3(&LineSegment3::new(&a, &c));
            }
            if bc_len_sq > max_len_sq {
                best = Self::enclosing_line_segment3(&LineSegment3::new(&b, &c));
            }
            return best;
        }

        let denom = 2.0 * normal_len_sq;
        let offset = (normal.cross(&ab) * ac_len_sq + ac.cross(&normal) * ab_len_sq) / denom;
        let center = a + offset;

        return Self {
            center,
            radius: (center - a).norm(),
        };
    }

    /// Grows the sphere to enclose `other`
    pub fn merge(&mut self, other: &Sphere3) -> &mut Self {
        let offset = other.center - self.center;
        let distance = offset.norm();
        if distance == 0.0 {
            self.radius = Float::max(self.radius, other.radius);
            return self;
        }

        let far_point = other.center + offset * (other.radius / distance);
        return self.merge_point(&far_point);
    }

    /// Grows the sphere to enclose `point`
    pub fn merge_point(&mut self, point: &Point3f) -> &mut Self {
        let offset = point - self.center;
        let dist_sq = offset.norm_squared();

        if dist_sq <= self.radius * self.radius {
            return self;
        }

        let dist = dist_sq.sqrt();
        let new_radius = (self.radius + dist) * 0.5;
        let k = (new_radius - self.radius) / dist;

        self.center += offset * k;
        self.radius = new_radius;

        return self;
    }

    // Containment

    #[inline]
    pub fn contains_point(&self, point: &Point3f) -> bool {
        return (point - self.center).norm_squared() <= self.radius * self.radius;
    }

    pub fn contains_sphere3(&self, inner: &Sphere3) -> bool {
        if inner.radius > self.radius {
            return false;
        }

        let radius_diff = self.radius - inner.radius;
        return (inner.center - self.center).norm_squared() <= radius_diff * radius_diff;
    }

    /// The farthest corner per axis decides containment
    pub fn contains_box3(&self, inner: &Box3) -> bool {
        let mut farthest = Point3f::origin();
        for i in 0..3 {
            let to_min = (inner.get_min()[i] - self.center[i]).abs();
            let to_max = (inner.get_max()[i] - self.center[i]).abs();
            farthest[i] = if to_min > to_max { inner.get_min()[i] } else { inner.get_max()[i] };
        }

        return self.contains_point(&farthest);
    }

    pub fn contains_obb3(&self, inner: &Obb3) -> bool {
        let radius_sq = self.radius * self.radius;
        return inner
            .corners()
            .iter()
            .all(|corner| (corner - self.center).norm_squared() <= radius_sq);
    }

    pub fn contains_cylinder3(&self, inner: &Cylinder3) -> bool {
        let axis_dir = inner.axis_direction();
        let delta = inner.get_center() - self.center;

        let parallel_center = delta.dot(&axis_dir);
        let perp = delta - axis_dir * parallel_center;
        let perp_len = perp.norm();

        let mut max_dist_sq = 0.0f32;
        for t in [inner.get_half_height(), -inner.get_half_height()] {
            let parallel = parallel_center + t;
            let radial = perp_len + inner.get_radius();
            let dist_sq = parallel * parallel + radial * radial;
            max_dist_sq = Float::max(max_dist_sq, dist_sq);
        }

        return max_dist_sq <= self.radius * self.radius;
    }

    /// Finds the farthest ellipsoid surface point via a bisection on the
    /// Lagrange multiplier of the constrained maximization, in f64.
    pub fn contains_ellipsoid3(&self, inner: &Ellipsoid3) -> bool {
        let radii = inner.get_radii();
        if radii.x <= 0.0 || radii.y <= 0.0 || radii.z <= 0.0 {
            let diff = inner.get_center() - self.center;
            return diff.norm_squared() <= self.radius * self.radius;
        }

        let local = inner
            .get_orientation()
            .inverse_transform_vector(&(inner.get_center() - self.center));

        let diff_len_sq = (inner.get_center() - self.center).norm_squared();
        if diff_len_sq.abs() <= PARALLEL_EPSILON {
            return radii.max() <= self.radius;
        }

        let values = [local.x as f64, local.y as f64, local.z as f64];
        let radii_sq = [
            (radii.x as f64) * (radii.x as f64),
            (radii.y as f64) * (radii.y as f64),
            (radii.z as f64) * (radii.z as f64),
        ];

        let evaluate = |lambda: f64| {
            let mut sum = 0.0;
            for i in 0..3 {
                let denom = lambda - radii_sq[i];
                let numer = radii_sq[i] * values[i];
                sum += (numer * numer) / (denom * denom);
            }
            return sum - 1.0;
        };

        let max_r_sq = radii_sq[0].max(radii_sq[1]).max(radii_sq[2]);
        let mut low = max_r_sq + 1e-6;
        let mut high = low;
        while evaluate(high) > 0.0 {
            high *= 2.0;
        }

        for _ in 0..64 {
            let mid = 0.5 * (low + high);
            if evaluate(mid) > 0.0 {
                low = mid;
            } else {
                high = mid;
            }
        }
        let lambda = high;

        let mut farthest_local = Vec3f::zeros();
        for i in 0..3 {
            let denom = lambda - radii_sq[i];
            farthest_local[i] = (radii_sq[i] * values[i] / denom) as f32;
        }

        let local_point = local + farthest_local;
        return local_point.norm_squared() <= self.radius * self.radius;
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

    // Intersection

    pub fn intersects_sphere3(&self, other: &Sphere3) -> bool {
        let radius_sum = self.radius + other.radius;
        return (other.center - self.center).norm_squared() <= radius_sum * radius_sum;
    }

    #[inline]
    pub fn intersects_box3(&self, bbox: &Box3) -> bool {
        return bbox.intersects_sphere3(self);
    }

    #[inline]
    pub fn intersects_obb3(&self, obb: &Obb3) -> bool {
        return obb.intersects_sphere3(self);
    }

    #[inline]
    pub fn intersects_cylinder3(&self, cylinder: &Cylinder3) -> bool {
        return cylinder.intersects_sphere3(self);
    }

    #[inline]
    pub fn intersects_ellipsoid3(&self, ellipsoid: &Ellipsoid3) -> bool {
        return ellipsoid.intersects_sphere3(self);
    }

    #[inline]
    pub fn intersects_plane3(&self, plane: &Plane3) -> bool {
        return plane.intersects_sphere3(self);
    }

    #[inline]
    pub fn intersects_triangle3(&self, triangle: &Triangle3) -> bool {
        return triangle.squared_distance(&self.center) <= self.radius * self.radius;
    }

    /// Quadratic over the whole line, both roots reported
    pub fn intersects_line3_at(&self, line: &Line3) -> Intersection {
        let oc = line.get_point() - self.center;
        let a = line.get_direction().norm_squared();
        let b = 2.0 * oc.dot(line.get_direction());
        let c = oc.norm_squared() - self.radius * self.radius;

        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 || a == 0.0 {
            return Intersection::Miss;
        }

        let root = disc.sqrt();
        let mut t0 = (-b - root) / (2.0 * a);
        let mut t1 = (-b + root) / (2.0 * a);
        if t0 > t1 {
            core::mem::swap(&mut t0, &mut t1);
        }

        return Intersection::Span { t_min: t0, t_max: t1 };
    }

    #[inline]
    pub fn intersects_line3(&self, line: &Line3) -> bool {
        return self.intersects_line3_at(line).is_hit();
    }

    pub fn intersects_ray3_at(&self, ray: &Ray3) -> Intersection {
        let line = Line3::new(*ray.get_origin(), *ray.get_direction());
        match self.intersects_line3_at(&line) {
            Intersection::Span { t_min, t_max } if t_max >= 0.0 => {
                return Intersection::Span { t_min, t_max };
            }
            _ => return Intersection::Miss,
        }
    }

    #[inline]
    pub fn intersects_ray3(&self, ray: &Ray3) -> bool {
        return self.intersects_ray3_at(ray).is_hit();
    }

    pub fn intersects_line_segment3_at(&self, segment: &LineSegment3) -> Intersection {
        let line = Line3::new(*segment.get_start(), segment.direction());
        match self.intersects_line3_at(&line) {
            Intersection::Span { t_min, t_max } if t_max >= 0.0 && t_min <= 1.0 => {
                return Intersection::Span {
                    t_min: Float::max(0.0, t_min),
                    t_max: Float::min(1.0, t_max),
                };
            }
            _ => return Intersection::Miss,
        }
    }

    #[inline]
    pub fn intersects_line_segment3(&self, segment: &LineSegment3) -> bool {
        return self.intersects_line_segment3_at(segment).is_hit();
    }
}

impl ClosestPoint3 for Sphere3 {
    fn closest_point(&self, point: &Point3f) -> Point3f {
        let offset = point - self.center;
        let dist_sq = offset.norm_squared();
        if dist_sq <= self.radius * self.radius || dist_sq == 0.0 {
            return *point;
        }

        let scale = self.radius / dist_sq.sqrt();
        return self.center + offset * scale;
    }

    fn squared_distance(&self, point: &Point3f) -> f32 {
        let dist_sq = (point - self.center).norm_squared();
        let radius_sq = self.radius * self.radius;
        if dist_sq <= radius_sq {
            return 0.0;
        }

        let delta = dist_sq.sqrt() - self.radius;
        return delta * delta;
    }
}
