use nalgebra::Rotation3;
use num_traits::Float;

use crate::geometry::traits::ClosestPoint3;
use crate::geometry::PARALLEL_EPSILON;
use crate::helpers::aliases::{Point3f, Vec3f};

use super::{
    box3::Box3, cylinder3::Cylinder3, line3::Line3, line_segment3::LineSegment3, obb3::Obb3,
    plane3::Plane3, ray3::Ray3, sphere3::Sphere3, triangle3::Triangle3, Intersection,
};

/// 3D ellipsoid given by center, principal radii and orientation
#[derive(Debug, Clone, Copy)]
pub struct Ellipsoid3 {
    center: Point3f,
    radii: Vec3f,
    orientation: Rotation3<f32>,
}

impl Ellipsoid3 {
    pub fn new(center: Point3f, radii: Vec3f, orientation: Rotation3<f32>) -> Self {
        return Self {
            center,
            radii,
            orientation,
        };
    }

    #[inline]
    pub fn get_center(&self) -> &Point3f {
        return &self.center;
    }

    #[inline]
    pub fn get_radii(&self) -> &Vec3f {
        return &self.radii;
    }

    #[inline]
    pub fn get_orientation(&self) -> &Rotation3<f32> {
        return &self.orientation;
    }

    #[inline]
    pub fn volume(&self) -> f32 {
        return 4.0 / 3.0 * core::f32::consts::PI * self.radii.x * self.radii.y * self.radii.z;
    }

    /// Principal axes with their radii
    pub fn principal_extents(&self) -> [(Vec3f, f32); 3] {
        let rotation = self.orientation.matrix();
        return core::array::from_fn(|i| {
            let axis = Vec3f::new(rotation[(0, i)], rotation[(1, i)], rotation[(2, i)]);
            return (axis, self.radii[i]);
        });
    }

    /// Surface point at spherical angles in the local frame
    pub fn surface_point(&self, theta: f32, phi: f32) -> Point3f {
        let local = Vec3f::new(
            self.radii.x * phi.sin() * theta.cos(),
            self.radii.y * phi.sin() * theta.sin(),
            self.radii.z * phi.cos(),
        );
        return self.center + self.orientation * local;
    }

    /// Maps a world point into the frame where the ellipsoid is a unit sphere
    #[inline]
    fn to_unit(&self, point: &Point3f) -> Vec3f {
        let local = self.orientation.inverse_transform_vector(&(point - self.center));
        return Vec3f::new(
            local.x / self.radii.x,
            local.y / self.radii.y,
            local.z / self.radii.z,
        );
    }

    // Containment

    #[inline]
    pub fn contains_point(&self, point: &Point3f) -> bool {
        return self.to_unit(point).norm_squared() <= 1.0;
    }

    pub fn contains_box3(&self, inner: &Box3) -> bool {
        return inner.corners().iter().all(|corner| self.contains_point(corner));
    }

    /// Samples the lateral surface on a 16 x 8 grid plus both cap centers
    pub fn contains_cylinder3(&self, inner: &Cylinder3) -> bool {
        const ANGLE_SAMPLES: usize = 16;
        const HEIGHT_SAMPLES: usize = 8;

        let (perp1, perp2) = inner.axis_frame();
        let axis = inner.axis_direction();

        for i in 0..ANGLE_SAMPLES {
            let angle = 2.0 * core::f32::consts::PI * i as f32 / ANGLE_SAMPLES as f32;
            let radial = (perp1 * angle.cos() + perp2 * angle.sin()) * inner.get_radius();

            for j in 0..HEIGHT_SAMPLES {
                let t = -1.0 + 2.0 * j as f32 / (HEIGHT_SAMPLES - 1) as f32;
                let point = inner.get_center() + axis * (t * inner.get_half_height()) + radial;
                if !self.contains_point(&point) {
                    return false;
                }
            }
        }

        return self.contains_point(&inner.top_center()) && self.contains_point(&inner.bottom_center());
    }

    /// Tests the extreme points along the inner ellipsoid's principal axes
    pub fn contains_ellipsoid3(&self, inner: &Ellipsoid3) -> bool {
        for (axis, radius) in inner.principal_extents() {
            if !self.contains_point(&(inner.center + axis * radius))
                || !self.contains_point(&(inner.center - axis * radius))
            {
                return false;
            }
        }

        return true;
    }

    pub fn contains_obb3(&self, inner: &Obb3) -> bool {
        return inner.corners().iter().all(|corner| self.contains_point(corner));
    }

    #[inline]
    pub fn contains_line_segment3(&self, inner: &LineSegment3) -> bool {
        return self.contains_point(inner.get_start()) && self.contains_point(inner.get_end());
    }

    /// The sphere fits iff the clearance from its center to the surface along
    /// the center ray is at least its radius
    pub fn contains_sphere3(&self, inner: &Sphere3) -> bool {
        if self.radii.x <= 0.0 || self.radii.y <= 0.0 || self.radii.z <= 0.0 {
            if inner.get_radius() > 0.0 {
                return false;
            }
            return self.to_unit(inner.get_center()).norm_squared() <= PARALLEL_EPSILON;
        }

        let local = self
            .orientation
            .inverse_transform_vector(&(inner.get_center() - self.center));
        let scaled = Vec3f::new(
            local.x / self.radii.x,
            local.y / self.radii.y,
            local.z / self.radii.z,
        );

        let scaled_len = scaled.norm();
        if scaled_len >= 1.0 {
            // Center outside or on the boundary
            return false;
        }

        if local.norm_squared() <= PARALLEL_EPSILON {
            return inner.get_radius() <= self.radii.min();
        }

        let local_len = local.norm();
        let t = 1.0 / scaled_len;
        let clearance = local_len * (t - 1.0);
        return clearance >= inner.get_radius();
    }

    #[inline]
    pub fn contains_triangle3(&self, inner: &Triangle3) -> bool {
        return self.contains_point(inner.a())
            && self.contains_point(inner.b())
            && self.contains_point(inner.c());
    }

    // Intersection

    /// Closest box point tested in the unit-sphere frame
    pub fn intersects_box3(&self, bbox: &Box3) -> bool {
        let closest = bbox.closest_point(&self.center);
        return self.to_unit(&closest).norm_squared() <= 1.0;
    }

    #[inline]
    pub fn intersects_cylinder3(&self, cylinder: &Cylinder3) -> bool {
        return cylinder.intersects_ellipsoid3(self);
    }

    pub fn intersects_ellipsoid3(&self, other: &Ellipsoid3) -> bool {
        let dist_sq = (other.center - self.center).norm_squared();

        let sum_max = self.radii.max() + other.radii.max();
        if dist_sq > sum_max * sum_max {
            return false;
        }

        let closest_on_self = self.closest_point(&other.center);
        if other.contains_point(&closest_on_self) {
            return true;
        }

        let closest_on_other = other.closest_point(&self.center);
        return self.contains_point(&closest_on_other);
    }

    /// Quadratic against the unit sphere in the scaled local frame
    pub fn intersects_line3_at(&self, line: &Line3) -> Intersection {
        let local_origin = self
            .orientation
            .inverse_transform_vector(&(line.get_point() - self.center));
        let local_dir = self.orientation.inverse_transform_vector(line.get_direction());

        let os = Vec3f::new(
            local_origin.x / self.radii.x,
            local_origin.y / self.radii.y,
            local_origin.z / self.radii.z,
        );
        let ds = Vec3f::new(
            local_dir.x / self.radii.x,
            local_dir.y / self.radii.y,
            local_dir.z / self.radii.z,
        );

        let a = ds.norm_squared();
        let b = 2.0 * os.dot(&ds);
        let c = os.norm_squared() - 1.0;

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

    pub fn intersects_obb3(&self, obb: &Obb3) -> bool {
        let closest = obb.closest_point(&self.center);
        return self.contains_point(&closest) || obb.contains_point(&self.center);
    }

    /// Compares the support extent along the plane normal with the center
    /// distance
    pub fn intersects_plane3(&self, plane: &Plane3) -> bool {
        let local_normal = self.orientation.inverse_transform_vector(plane.get_normal());

        let scaled_normal = Vec3f::new(
            self.radii.x * local_normal.x,
            self.radii.y * local_normal.y,
            self.radii.z * local_normal.z,
        );
        let max_extent = scaled_normal.norm();

        let signed_dist = plane.signed_distance(&self.center);
        return Float::abs(signed_dist) <= max_extent;
    }

    #[inline]
    pub fn intersects_sphere3(&self, sphere: &Sphere3) -> bool {
        let radius = sphere.get_radius();
        return self.squared_distance(sphere.get_center()) <= radius * radius;
    }

    #[inline]
    pub fn intersects_triangle3(&self, triangle: &Triangle3) -> bool {
        let closest = triangle.closest_point(&self.center);
        return self.contains_point(&closest);
    }
}

impl ClosestPoint3 for Ellipsoid3 {
    /// Newton iteration on the Lagrange multiplier of the projection problem,
    /// run in f64; at most 32 steps, stopping at |f| <= 1e-7 or a step below
    /// 1e-7, with the multiplier kept non-negative
    fn closest_point(&self, point: &Point3f) -> Point3f {
        let min_radius = self.radii.min();
        if min_radius <= 0.0 {
            return self.center;
        }

        let local = self.orientation.inverse_transform_vector(&(point - self.center));

        let radii = [
            self.radii.x as f64,
            self.radii.y as f64,
            self.radii.z as f64,
        ];
        let values = [local.x as f64, local.y as f64, local.z as f64];

        let mut inside = 0.0;
        for i in 0..3 {
            inside += values[i] * values[i] / (radii[i] * radii[i]);
        }
        if inside <= 1.0 {
            return *point;
        }

        let mut lambda = 0.0f64;
        for _ in 0..32 {
            let mut function = -1.0;
            let mut derivative = 0.0;
            for i in 0..3 {
                let radius_sq = radii[i] * radii[i];
                let denom = radius_sq + lambda;
                let term = values[i] * values[i] * radius_sq;
                function += term / (denom * denom);
                derivative += -2.0 * term / (denom * denom * denom);
            }

            if function.abs() <= 1e-7 || derivative == 0.0 {
                break;
            }

            let step = function / derivative;
            lambda -= step;
            if lambda < 0.0 {
                lambda = 0.0;
            }
            if step.abs() <= 1e-7 {
                break;
            }
        }

        let closest_local = Vec3f::new(
            (values[0] * radii[0] * radii[0] / (radii[0] * radii[0] + lambda)) as f32,
            (values[1] * radii[1] * radii[1] / (radii[1] * radii[1] + lambda)) as f32,
            (values[2] * radii[2] * radii[2] / (radii[2] * radii[2] + lambda)) as f32,
        );

        return self.center + self.orientation * closest_local;
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;
    use test_case::test_case;

    use super::*;

    fn unit_sphereoid() -> Ellipsoid3 {
        return Ellipsoid3::new(
            Point3f::origin(),
            Vec3f::new(2.0, 1.0, 1.0),
            Rotation3::identity(),
        );
    }

    #[test_case(Point3f::new(1.9, 0.0, 0.0) => true; "inside long axis")]
    #[test_case(Point3f::new(0.0, 0.9, 0.0) => true; "inside short axis")]
    #[test_case(Point3f::new(0.0, 1.1, 0.0) => false; "outside short axis")]
    #[test_case(Point3f::new(2.1, 0.0, 0.0) => false; "outside long axis")]
    fn contains_point(point: Point3f) -> bool {
        return unit_sphereoid().contains_point(&point);
    }

    #[test]
    fn closest_point_projects_onto_surface() {
        let ellipsoid = unit_sphereoid();

        let on_axis = ellipsoid.closest_point(&Point3f::new(5.0, 0.0, 0.0));
        assert!((on_axis - Point3f::new(2.0, 0.0, 0.0)).norm() < 1e-4);

        let inside = Point3f::new(0.5, 0.2, 0.0);
        assert_eq!(ellipsoid.closest_point(&inside), inside);

        // Projection satisfies the surface equation
        let skew = ellipsoid.closest_point(&Point3f::new(3.0, 2.0, 1.0));
        let unit = Vec3f::new(skew.x / 2.0, skew.y, skew.z);
        assert!((unit.norm_squared() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn closest_point_respects_orientation() {
        let rotated = Ellipsoid3::new(
            Point3f::origin(),
            Vec3f::new(2.0, 1.0, 1.0),
            Rotation3::from_axis_angle(&Vector3::z_axis(), core::f32::consts::FRAC_PI_2),
        );

        // The long axis now points along y
        assert!(rotated.contains_point(&Point3f::new(0.0, 1.9, 0.0)));
        assert!(!rotated.contains_point(&Point3f::new(1.9, 0.0, 0.0)));
    }

    #[test]
    fn line_intersection_in_scaled_frame() {
        let ellipsoid = unit_sphereoid();
        let line = Line3::new(Point3f::new(-5.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));

        match ellipsoid.intersects_line3_at(&line) {
            Intersection::Span { t_min, t_max } => {
                assert!((t_min - 3.0).abs() < 1e-5);
                assert!((t_max - 7.0).abs() < 1e-5);
            }
            other => panic!("expected span, got {:?}", other),
        }
    }

    #[test]
    fn plane_support_extent() {
        let ellipsoid = unit_sphereoid();

        // Plane x = 1.9 still cuts the long axis
        assert!(ellipsoid.intersects_plane3(&Plane3::new(Vector3::x(), -1.9)));
        // Plane y = 1.9 does not reach the short axis
        assert!(!ellipsoid.intersects_plane3(&Plane3::new(Vector3::y(), -1.9)));
    }

    #[test]
    fn degenerate_radii_collapse_to_center() {
        let degenerate = Ellipsoid3::new(
            Point3f::new(1.0, 2.0, 3.0),
            Vec3f::new(0.0, 1.0, 1.0),
            Rotation3::identity(),
        );
        assert_eq!(
            degenerate.closest_point(&Point3f::new(5.0, 5.0, 5.0)),
            Point3f::new(1.0, 2.0, 3.0)
        );
    }
}
