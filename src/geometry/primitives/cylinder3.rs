use nalgebra::UnitVector3;
use num_traits::Float;

use crate::geometry::traits::ClosestPoint3;
use crate::geometry::PARALLEL_EPSILON;
use crate::helpers::aliases::{Point3f, Vec3f};

use super::{
    box3::Box3, ellipsoid3::Ellipsoid3, line3::Line3, line_segment3::LineSegment3, obb3::Obb3,
    plane3::Plane3, ray3::Ray3, sphere3::Sphere3, triangle3::Triangle3, Intersection,
};

/// 3D cylinder given by center, unit axis, radius and half height
#[derive(Debug, Clone, Copy)]
pub struct Cylinder3 {
    center: Point3f,
    axis: UnitVector3<f32>,
    radius: f32,
    half_height: f32,
}

impl Cylinder3 {
    /// `axis` is normalized on construction
    pub fn new(center: Point3f, axis: Vec3f, radius: f32, half_height: f32) -> Self {
        return Self {
            center,
            axis: UnitVector3::new_normalize(axis),
            radius,
            half_height,
        };
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
    pub fn get_half_height(&self) -> f32 {
        return self.half_height;
    }

    #[inline]
    pub fn axis_direction(&self) -> Vec3f {
        return self.axis.into_inner();
    }

    #[inline]
    pub fn top_center(&self) -> Point3f {
        return self.center + self.axis_direction() * self.half_height;
    }

    #[inline]
    pub fn bottom_center(&self) -> Point3f {
        return self.center - self.axis_direction() * self.half_height;
    }

    #[inline]
    pub fn axis_segment(&self) -> LineSegment3 {
        return LineSegment3::new(&self.bottom_center(), &self.top_center());
    }

    #[inline]
    pub fn volume(&self) -> f32 {
        return core::f32::consts::PI * self.radius * self.radius * self.half_height * 2.0;
    }

    #[inline]
    pub fn lateral_surface_area(&self) -> f32 {
        return 2.0 * core::f32::consts::PI * self.radius * self.half_height * 2.0;
    }

    #[inline]
    pub fn surface_area(&self) -> f32 {
        return self.lateral_surface_area()
            + 2.0 * core::f32::consts::PI * self.radius * self.radius;
    }

    /// Orthonormal pair spanning the plane perpendicular to the axis
    pub(super) fn axis_frame(&self) -> (Vec3f, Vec3f) {
        let axis = self.axis_direction();

        let perp1 = if Float::abs(axis.x) < 0.9 {
            axis.cross(&Vec3f::x()).normalize()
        } else {
            axis.cross(&Vec3f::y()).normalize()
        };
        let perp2 = axis.cross(&perp1);

        return (perp1, perp2);
    }

    /// Signed axial offset and squared radial distance of a point
    #[inline]
    fn decompose(&self, point: &Point3f) -> (f32, f32) {
        let axis_dir = self.axis_direction();
        let delta = point - self.center;
        let axial = delta.dot(&axis_dir);
        let radial = delta - axis_dir * axial;

        return (axial, radial.norm_squared());
    }

    // Containment

    pub fn contains_point(&self, point: &Point3f) -> bool {
        let (axial, radial_sq) = self.decompose(point);

        if Float::abs(axial) > self.half_height {
            return false;
        }

        return radial_sq <= self.radius * self.radius;
    }

    pub fn contains_box3(&self, inner: &Box3) -> bool {
        return inner.corners().iter().all(|corner| self.contains_point(corner));
    }

    pub fn contains_cylinder3(&self, inner: &Cylinder3) -> bool {
        let outer_axis = self.axis_direction();
        let inner_axis = inner.axis_direction();

        let dot = outer_axis.dot(&inner_axis);
        let parallel = Float::abs(Float::abs(dot) - 1.0) < PARALLEL_EPSILON;

        if !parallel {
            let inner_top = inner.top_center();
            let inner_bottom = inner.bottom_center();

            if !self.contains_point(&inner_top) || !self.contains_point(&inner_bottom) {
                return false;
            }

            let (perp1, perp2) = inner.axis_frame();
            for i in 0..8 {
                let angle = i as f32 * core::f32::consts::FRAC_PI_4;
                let offset = (perp1 * angle.cos() + perp2 * angle.sin()) * inner.radius;

                if !self.contains_point(&(inner_top + offset))
                    || !self.contains_point(&(inner_bottom + offset))
                {
                    return false;
                }
            }

            return true;
        }

        let center_delta = inner.center - self.center;
        let axial = center_delta.dot(&outer_axis);
        let radial = center_delta - outer_axis * axial;

        if radial.norm() + inner.radius > self.radius {
            return false;
        }

        let inner_extent = Float::abs(axial) + inner.half_height;
        return inner_extent <= self.half_height;
    }

    /// Samples a 16 x 8 grid on the ellipsoid surface
    pub fn contains_ellipsoid3(&self, inner: &Ellipsoid3) -> bool {
        const ANGLE_SAMPLES: usize = 16;
        const POLAR_SAMPLES: usize = 8;

        for i in 0..ANGLE_SAMPLES {
            let theta = 2.0 * core::f32::consts::PI * i as f32 / ANGLE_SAMPLES as f32;
            for j in 0..POLAR_SAMPLES {
                let phi = core::f32::consts::PI * j as f32 / (POLAR_SAMPLES - 1) as f32;
                if !self.contains_point(&inner.surface_point(theta, phi)) {
                    return false;
                }
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

    pub fn contains_sphere3(&self, inner: &Sphere3) -> bool {
        let axis_dir = self.axis_direction();
        let delta = inner.get_center() - self.center;

        let axial = delta.dot(&axis_dir);
        let axial_allow = self.half_height - inner.get_radius();
        if axial_allow < 0.0 || Float::abs(axial) > axial_allow {
            return false;
        }

        let radial_sq = (delta - axis_dir * axial).norm_squared();
        let radial_allow = self.radius - inner.get_radius();
        if radial_allow < 0.0 {
            return false;
        }

        return radial_sq <= radial_allow * radial_allow;
    }

    #[inline]
    pub fn contains_triangle3(&self, inner: &Triangle3) -> bool {
        return self.contains_point(inner.a())
            && self.contains_point(inner.b())
            && self.contains_point(inner.c());
    }

    // Intersection

    /// Clamps the axis segment into the box, then checks the nearest axis
    /// point against the radius
    pub fn intersects_box3(&self, bbox: &Box3) -> bool {
        let axis_dir = self.axis_direction();
        let axis_start = self.bottom_center();
        let axis_end = self.top_center();

        let mut p1 = axis_start;
        let mut p2 = axis_end;
        for i in 0..3 {
            p1[i] = p1[i].clamp(bbox.get_min()[i], bbox.get_max()[i]);
            p2[i] = p2[i].clamp(bbox.get_min()[i], bbox.get_max()[i]);
        }

        let seg_dir = p2 - p1;
        let to_center = self.center - p1;
        let seg_len_sq = seg_dir.norm_squared();

        let closest = if seg_len_sq.abs() <= PARALLEL_EPSILON {
            p1
        } else {
            let t = (to_center.dot(&seg_dir) / seg_len_sq).clamp(0.0, 1.0);
            p1 + seg_dir * t
        };

        let delta = closest - self.center;
        let axial = delta.dot(&axis_dir);
        if Float::abs(axial) > self.half_height {
            return false;
        }

        let radial_sq = (delta - axis_dir * axial).norm_squared();
        return radial_sq <= self.radius * self.radius;
    }

    pub fn intersects_cylinder3(&self, other: &Cylinder3) -> bool {
        // Bounding spheres give a quick reject
        let sphere_a = Sphere3::enclosing_cylinder3(self);
        let sphere_b = Sphere3::enclosing_cylinder3(other);
        if !sphere_a.intersects_sphere3(&sphere_b) {
            return false;
        }

        if self.contains_point(&other.top_center()) || self.contains_point(&other.bottom_center()) {
            return true;
        }
        if other.contains_point(&self.top_center()) || other.contains_point(&self.bottom_center()) {
            return true;
        }

        let segment = self.axis_segment();
        let other_segment = other.axis_segment();

        let (closest, _) = other_segment.closest_point_with_t(segment.get_start());
        let dist_sq = segment.squared_distance(&closest);
        let radius_sum = self.radius + other.radius;

        return dist_sq <= radius_sum * radius_sum;
    }

    /// Probes the axis against the ellipsoid, then falls back to nine point
    /// samples along the axis; thin ellipsoids between samples can be missed
    pub fn intersects_ellipsoid3(&self, ellipsoid: &Ellipsoid3) -> bool {
        let axis_line = Line3::new(self.center, self.axis_direction());
        if ellipsoid.intersects_line3(&axis_line) {
            let axis_seg = self.axis_segment();
            if ellipsoid.intersects_line_segment3(&axis_seg) {
                return true;
            }
        }

        let top = self.top_center();
        let bottom = self.bottom_center();

        for i in 0..=8 {
            let t = i as f32 / 8.0;
            let axis_point = bottom + (top - bottom) * t;
            if ellipsoid.squared_distance(&axis_point) <= self.radius * self.radius {
                return true;
            }
        }

        return false;
    }

    /// Quadratic on the component perpendicular to the axis, clipped to the
    /// cap planes
    pub fn intersects_line3_at(&self, line: &Line3) -> Intersection {
        let axis_dir = self.axis_direction();
        let w = line.get_point() - self.center;
        let d = *line.get_direction();

        let a_dot_d = axis_dir.dot(&d);
        let a_dot_w = axis_dir.dot(&w);

        let d_perp = d - axis_dir * a_dot_d;
        let w_perp = w - axis_dir * a_dot_w;

        let a = d_perp.norm_squared();
        let b = 2.0 * w_perp.dot(&d_perp);
        let c = w_perp.norm_squared() - self.radius * self.radius;

        if a.abs() <= PARALLEL_EPSILON {
            // Line parallel to the axis
            if c > 0.0 || a_dot_d == 0.0 {
                return Intersection::Miss;
            }

            let t1 = (-self.half_height - a_dot_w) / a_dot_d;
            let t2 = (self.half_height - a_dot_w) / a_dot_d;

            return Intersection::Span {
                t_min: Float::min(t1, t2),
                t_max: Float::max(t1, t2),
            };
        }

        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return Intersection::Miss;
        }

        let sqrt_disc = disc.sqrt();
        let mut t0 = (-b - sqrt_disc) / (2.0 * a);
        let mut t1 = (-b + sqrt_disc) / (2.0 * a);

        let h0 = a_dot_w + t0 * a_dot_d;
        let h1 = a_dot_w + t1 * a_dot_d;

        if Float::abs(h0) > self.half_height && Float::abs(h1) > self.half_height {
            // Both lateral hits beyond the caps on the same side
            if (h0 > 0.0) == (h1 > 0.0) {
                return Intersection::Miss;
            }
        }

        // Clip lateral hits to the cap planes
        if Float::abs(h0) > self.half_height {
            let h_target = if h0 > 0.0 { self.half_height } else { -self.half_height };
            t0 = (h_target - a_dot_w) / a_dot_d;
        }
        if Float::abs(h1) > self.half_height {
            let h_target = if h1 > 0.0 { self.half_height } else { -self.half_height };
            t1 = (h_target - a_dot_w) / a_dot_d;
        }

        return Intersection::Span {
            t_min: Float::min(t0, t1),
            t_max: Float::max(t0, t1),
        };
    }

    #[inline]
    pub fn intersects_line3(&self, line: &Line3) -> bool {
        return self.intersects_line3_at(line).is_hit();
    }

    pub fn intersects_ray3_at(&self, ray: &Ray3) -> Intersection {
        let line = Line3::new(*ray.get_origin(), *ray.get_direction());
        match self.intersects_line3_at(&line) {
            Intersection::Span { t_min, t_max } if t_max >= 0.0 => {
                return Intersection::Span {
                    t_min: Float::max(0.0, t_min),
                    t_max,
                };
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
            Intersection::Span { t_min, t_max } if t_min <= 1.0 && t_max >= 0.0 => {
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
        let axis_dir = self.axis_direction();

        let mut obb_proj_min = f32::INFINITY;
        let mut obb_proj_max = f32::NEG_INFINITY;
        for corner in obb.corners() {
            if self.contains_point(&corner) {
                return true;
            }
            let proj = (corner - self.center).dot(&axis_dir);
            obb_proj_min = Float::min(obb_proj_min, proj);
            obb_proj_max = Float::max(obb_proj_max, proj);
        }

        if obb_proj_min > self.half_height || obb_proj_max < -self.half_height {
            return false;
        }

        if obb.contains_point(&self.top_center()) || obb.contains_point(&self.bottom_center()) {
            return true;
        }

        // Axis segment in the box's local frame
        let rotation = obb.get_orientation();
        let local_start = rotation.inverse_transform_vector(&(self.bottom_center() - obb.get_center()));
        let local_end = rotation.inverse_transform_vector(&(self.top_center() - obb.get_center()));
        let local_axis = LineSegment3::new(
            &(Point3f::origin() + local_start),
            &(Point3f::origin() + local_end),
        );
        let local_box = Box3::from_center_extent(&Point3f::origin(), obb.get_half_extents());

        // Restrict the search to the part of the axis whose height range can
        // overlap the box at all
        let mut segment_t_min = 0.0;
        let mut segment_t_max = 1.0;
        if self.half_height > PARALLEL_EPSILON {
            let overlap_start = Float::max(-self.half_height, obb_proj_min);
            let overlap_end = Float::min(self.half_height, obb_proj_max);
            let inv_height = 1.0 / (2.0 * self.half_height);
            segment_t_min = (overlap_start + self.half_height) * inv_height;
            segment_t_max = (overlap_end + self.half_height) * inv_height;
        }

        let closest = closest_point_segment_box3(&local_axis, &local_box, segment_t_min, segment_t_max);
        if closest.distance_sq <= 0.0 {
            return true;
        }

        let axis_point_world = obb.get_center() + rotation * closest.point_on_segment.coords;
        let box_point_world = obb.get_center() + rotation * closest.point_on_box.coords;
        let delta = axis_point_world - box_point_world;
        let axial = delta.dot(&axis_dir);
        let radial_sq = (delta - axis_dir * axial).norm_squared();

        return radial_sq <= self.radius * self.radius;
    }

    pub fn intersects_plane3(&self, plane: &Plane3) -> bool {
        let d_top = plane.signed_distance(&self.top_center());
        let d_bottom = plane.signed_distance(&self.bottom_center());

        // Caps on opposite sides
        if d_top * d_bottom <= 0.0 {
            return true;
        }

        let min_dist = Float::min(Float::abs(d_top), Float::abs(d_bottom));
        return min_dist <= self.radius;
    }

    /// Separation along and perpendicular to the axis against the sphere radius
    pub fn intersects_sphere3(&self, sphere: &Sphere3) -> bool {
        let axis_dir = self.axis_direction();
        let delta = sphere.get_center() - self.center;

        let axial = delta.dot(&axis_dir);
        let abs_axial = Float::abs(axial);
        let axial_excess = if abs_axial <= self.half_height {
            0.0
        } else {
            abs_axial - self.half_height
        };

        let radial_sq = (delta - axis_dir * axial).norm_squared();
        let mut radial_excess = 0.0;
        if radial_sq > self.radius * self.radius {
            radial_excess = radial_sq.sqrt() - self.radius;
        }

        let separation_sq = radial_excess * radial_excess + axial_excess * axial_excess;
        let radius = sphere.get_radius();
        return separation_sq <= radius * radius;
    }

    pub fn intersects_triangle3(&self, triangle: &Triangle3) -> bool {
        if self.contains_point(triangle.a())
            || self.contains_point(triangle.b())
            || self.contains_point(triangle.c())
        {
            return true;
        }

        let axis_seg = self.axis_segment();
        if triangle.intersects_line_segment3(&axis_seg) {
            return true;
        }

        let edges = [
            LineSegment3::new(triangle.a(), triangle.b()),
            LineSegment3::new(triangle.b(), triangle.c()),
            LineSegment3::new(triangle.c(), triangle.a()),
        ];
        for edge in &edges {
            if self.intersects_line_segment3(edge) {
                return true;
            }
        }

        let closest_on_tri = triangle.closest_point(&self.center);
        return axis_seg.squared_distance(&closest_on_tri) <= self.radius * self.radius;
    }
}

impl ClosestPoint3 for Cylinder3 {
    fn closest_point(&self, point: &Point3f) -> Point3f {
        let axis_dir = self.axis_direction();
        let delta = point - self.center;

        let axial = delta.dot(&axis_dir);
        let radial = delta - axis_dir * axial;
        let radial_sq = radial.norm_squared();

        let inside_height = Float::abs(axial) <= self.half_height;
        let inside_radius = radial_sq <= self.radius * self.radius;
        if inside_height && inside_radius {
            return *point;
        }

        let clamped_axial = axial.clamp(-self.half_height, self.half_height);
        let clamped_radial = if inside_radius {
            radial
        } else {
            radial * (self.radius / radial_sq.sqrt())
        };

        return self.center + axis_dir * clamped_axial + clamped_radial;
    }
}

struct SegmentBoxClosest {
    distance_sq: f32,
    point_on_segment: Point3f,
    point_on_box: Point3f,
}

/// Closest pair between a parameter-restricted segment and a box, found at
/// either an overlap point, a range endpoint or a slab-plane crossing
fn closest_point_segment_box3(
    segment: &LineSegment3,
    bbox: &Box3,
    allowed_t_min: f32,
    allowed_t_max: f32,
) -> SegmentBoxClosest {
    let mut t_min = allowed_t_min.clamp(0.0, 1.0);
    let mut t_max = allowed_t_max.clamp(0.0, 1.0);
    if t_max < t_min {
        core::mem::swap(&mut t_min, &mut t_max);
    }

    if let Intersection::Span { t_min: entry, t_max: exit } = bbox.intersects_line_segment3_at(segment) {
        let entry = Float::max(entry, t_min);
        let exit = Float::min(exit, t_max);
        if exit >= entry {
            let point = segment.point_at(entry.clamp(t_min, t_max));
            return SegmentBoxClosest {
                distance_sq: 0.0,
                point_on_segment: point,
                point_on_box: point,
            };
        }
    }

    let mut best = SegmentBoxClosest {
        distance_sq: f32::INFINITY,
        point_on_segment: Point3f::origin(),
        point_on_box: Point3f::origin(),
    };

    let mut evaluate = |t: f32| {
        if t < t_min || t > t_max {
            return;
        }

        let point = segment.point_at(t);
        let box_point = bbox.closest_point(&point);
        let dist_sq = (point - box_point).norm_squared();
        if dist_sq < best.distance_sq {
            best = SegmentBoxClosest {
                distance_sq: dist_sq,
                point_on_segment: point,
                point_on_box: box_point,
            };
        }
    };

    evaluate(t_min);
    evaluate(t_max);

    let dir = segment.direction();
    for i in 0..3 {
        let d = dir[i];
        if d.abs() <= PARALLEL_EPSILON {
            continue;
        }

        let inv_d = 1.0 / d;
        evaluate((bbox.get_min()[i] - segment.get_start()[i]) * inv_d);
        evaluate((bbox.get_max()[i] - segment.get_start()[i]) * inv_d);
    }

    if !best.distance_sq.is_finite() {
        let mid = 0.5 * (t_min + t_max);
        let point = segment.point_at(mid);
        let box_point = bbox.closest_point(&point);
        best = SegmentBoxClosest {
            distance_sq: (point - box_point).norm_squared(),
            point_on_segment: point,
            point_on_box: box_point,
        };
    }

    return best;
}
