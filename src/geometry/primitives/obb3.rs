use nalgebra::Rotation3;
use num_traits::Float;

use crate::geometry::traits::ClosestPoint3;
use crate::geometry::SEPARATION_EPSILON;
use crate::helpers::aliases::{Point3f, Vec3f};

use super::{
    box3::Box3, cylinder3::Cylinder3, ellipsoid3::Ellipsoid3, line3::Line3,
    line_segment3::LineSegment3, plane3::Plane3, ray3::Ray3, sphere3::Sphere3,
    triangle3::Triangle3, Intersection,
};

/// 3D oriented bounding box
#[derive(Debug, Clone, Copy)]
pub struct Obb3 {
    center: Point3f,
    half_extents: Vec3f,
    orientation: Rotation3<f32>,
}

impl Obb3 {
    pub fn new(center: Point3f, half_extents: Vec3f, orientation: Rotation3<f32>) -> Self {
        return Self {
            center,
            half_extents,
            orientation,
        };
    }

    #[inline]
    pub fn from_box3(bbox: &Box3) -> Self {
        return Self {
            center: bbox.get_center(),
            half_extents: bbox.extent(),
            orientation: Rotation3::identity(),
        };
    }

    #[inline]
    pub fn get_center(&self) -> &Point3f {
        return &self.center;
    }

    #[inline]
    pub fn get_half_extents(&self) -> &Vec3f {
        return &self.half_extents;
    }

    #[inline]
    pub fn get_orientation(&self) -> &Rotation3<f32> {
        return &self.orientation;
    }

    #[inline]
    pub fn size(&self) -> Vec3f {
        return self.half_extents * 2.0;
    }

    #[inline]
    pub fn extent(&self) -> Vec3f {
        return self.half_extents;
    }

    #[inline]
    pub fn volume(&self) -> f32 {
        let s = self.size();
        return s.x * s.y * s.z;
    }

    pub fn corners(&self) -> [Point3f; 8] {
        return core::array::from_fn(|i| {
            let local = Vec3f::new(
                if i & 1 != 0 { self.half_extents.x } else { -self.half_extents.x },
                if i & 2 != 0 { self.half_extents.y } else { -self.half_extents.y },
                if i & 4 != 0 { self.half_extents.z } else { -self.half_extents.z },
            );
            return self.center + self.orientation * local;
        });
    }

    pub fn bounding_box3(&self) -> Box3 {
        let mut bbox = Box3::empty();
        for corner in self.corners() {
            bbox.union_point3(&corner);
        }

        return bbox;
    }

    #[inline]
    fn to_local(&self, point: &Point3f) -> Vec3f {
        return self.orientation.inverse_transform_vector(&(point - self.center));
    }

    // Containment

    pub fn contains_point(&self, point: &Point3f) -> bool {
        let local = self.to_local(point);

        for i in 0..3 {
            if Float::abs(local[i]) > self.half_extents[i] {
                return false;
            }
        }

        return true;
    }

    pub fn contains_box3(&self, inner: &Box3) -> bool {
        return inner.corners().iter().all(|corner| self.contains_point(corner));
    }

    pub fn contains_obb3(&self, inner: &Obb3) -> bool {
        return inner.corners().iter().all(|corner| self.contains_point(corner));
    }

    pub fn contains_sphere3(&self, inner: &Sphere3) -> bool {
        let local = self.to_local(inner.get_center());

        for i in 0..3 {
            let limit = self.half_extents[i] - inner.get_radius();
            if limit < 0.0 || Float::abs(local[i]) > limit {
                return false;
            }
        }

        return true;
    }

    /// Tests eight samples on each cap rim
    pub fn contains_cylinder3(&self, inner: &Cylinder3) -> bool {
        let (perp1, perp2) = inner.axis_frame();
        let top = inner.top_center();
        let bottom = inner.bottom_center();

        for i in 0..8 {
            let angle = i as f32 * core::f32::consts::FRAC_PI_4;
            let offset = (perp1 * angle.cos() + perp2 * angle.sin()) * inner.get_radius();

            if !self.contains_point(&(top + offset)) || !self.contains_point(&(bottom + offset)) {
                return false;
            }
        }

        return true;
    }

    /// Tests the extreme points along the ellipsoid's principal axes
    pub fn contains_ellipsoid3(&self, inner: &Ellipsoid3) -> bool {
        for (axis, radius) in inner.principal_extents() {
            if !self.contains_point(&(inner.get_center() + axis * radius))
                || !self.contains_point(&(inner.get_center() - axis * radius))
            {
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

    // Intersection

    /// Separating-axis test over the 15 candidate axes
    pub fn intersects_obb3(&self, other: &Obb3) -> bool {
        // Rotation bringing the other box into this box's frame
        let rotation = self.orientation.inverse() * other.orientation;
        let r = rotation.matrix();

        let mut abs_r = [[0.0f32; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                abs_r[i][j] = Float::abs(r[(i, j)]) + SEPARATION_EPSILON;
            }
        }

        let a_extents = self.half_extents;
        let b_extents = other.half_extents;
        let translation = self
            .orientation
            .inverse_transform_vector(&(other.center - self.center));

        // This box's axes
        for i in 0..3 {
            let ra = a_extents[i];
            let rb = b_extents.x * abs_r[i][0] + b_extents.y * abs_r[i][1] + b_extents.z * abs_r[i][2];
            if Float::abs(translation[i]) > ra + rb {
                return false;
            }
        }

        // Other box's axes
        for j in 0..3 {
            let ra = a_extents.x * abs_r[0][j] + a_extents.y * abs_r[1][j] + a_extents.z * abs_r[2][j];
            let rb = b_extents[j];
            let t = Float::abs(
                translation.x * r[(0, j)] + translation.y * r[(1, j)] + translation.z * r[(2, j)],
            );
            if t > ra + rb {
                return false;
            }
        }

        // Cross products of axes
        for i in 0..3 {
            let i1 = (i + 1) % 3;
            let i2 = (i + 2) % 3;
            for j in 0..3 {
                let j1 = (j + 1) % 3;
                let j2 = (j + 2) % 3;

                let ra = a_extents[i1] * abs_r[i2][j] + a_extents[i2] * abs_r[i1][j];
                let rb = b_extents[j1] * abs_r[i][j2] + b_extents[j2] * abs_r[i][j1];
                let t = Float::abs(translation[i2] * r[(i1, j)] - translation[i1] * r[(i2, j)]);

                if t > ra + rb {
                    return false;
                }
            }
        }

        return true;
    }

    #[inline]
    pub fn intersects_box3(&self, bbox: &Box3) -> bool {
        return Obb3::from_box3(bbox).intersects_obb3(self);
    }

    #[inline]
    pub fn intersects_sphere3(&self, sphere: &Sphere3) -> bool {
        let radius = sphere.get_radius();
        return self.squared_distance(sphere.get_center()) <= radius * radius;
    }

    /// Compares the box's projection radius onto the plane normal with the
    /// center distance
    pub fn intersects_plane3(&self, plane: &Plane3) -> bool {
        let normal = plane.get_normal();
        let rotation = self.orientation.matrix();

        let mut radius = 0.0;
        for i in 0..3 {
            let axis = Vec3f::new(rotation[(0, i)], rotation[(1, i)], rotation[(2, i)]);
            radius += self.half_extents[i] * Float::abs(axis.dot(normal));
        }

        let s = plane.signed_distance(&self.center);
        return Float::abs(s) <= radius;
    }

    #[inline]
    fn local_box(&self) -> Box3 {
        return Box3::from_center_extent(&Point3f::origin(), &self.half_extents);
    }

    pub fn intersects_line3_at(&self, line: &Line3) -> Intersection {
        let local = Line3::new(
            Point3f::origin() + self.to_local(line.get_point()),
            self.orientation.inverse_transform_vector(line.get_direction()),
        );
        return self.local_box().intersects_line3_at(&local);
    }

    #[inline]
    pub fn intersects_line3(&self, line: &Line3) -> bool {
        return self.intersects_line3_at(line).is_hit();
    }

    pub fn intersects_ray3_at(&self, ray: &Ray3) -> Intersection {
        let local = Ray3::new(
            Point3f::origin() + self.to_local(ray.get_origin()),
            self.orientation.inverse_transform_vector(ray.get_direction()),
        );
        return self.local_box().intersects_ray3_at(&local);
    }

    #[inline]
    pub fn intersects_ray3(&self, ray: &Ray3) -> bool {
        return self.intersects_ray3_at(ray).is_hit();
    }

    pub fn intersects_line_segment3_at(&self, segment: &LineSegment3) -> Intersection {
        let local = LineSegment3::new(
            &(Point3f::origin() + self.to_local(segment.get_start())),
            &(Point3f::origin() + self.to_local(segment.get_end())),
        );
        return self.local_box().intersects_line_segment3_at(&local);
    }

    #[inline]
    pub fn intersects_line_segment3(&self, segment: &LineSegment3) -> bool {
        return self.intersects_line_segment3_at(segment).is_hit();
    }

    /// Rotates the triangle into the box frame and reuses the axis-aligned test
    pub fn intersects_triangle3(&self, triangle: &Triangle3) -> bool {
        let local = Triangle3::new(
            Point3f::origin() + self.to_local(triangle.a()),
            Point3f::origin() + self.to_local(triangle.b()),
            Point3f::origin() + self.to_local(triangle.c()),
        );
        return local.intersects_box3(&self.local_box());
    }

    #[inline]
    pub fn intersects_cylinder3(&self, cylinder: &Cylinder3) -> bool {
        return cylinder.intersects_obb3(self);
    }

    #[inline]
    pub fn intersects_ellipsoid3(&self, ellipsoid: &Ellipsoid3) -> bool {
        return ellipsoid.intersects_obb3(self);
    }
}

impl ClosestPoint3 for Obb3 {
    fn closest_point(&self, point: &Point3f) -> Point3f {
        let local = self.to_local(point);
        let clamped = Vec3f::new(
            local.x.clamp(-self.half_extents.x, self.half_extents.x),
            local.y.clamp(-self.half_extents.y, self.half_extents.y),
            local.z.clamp(-self.half_extents.z, self.half_extents.z),
        );

        return self.center + self.orientation * clamped;
    }
}
