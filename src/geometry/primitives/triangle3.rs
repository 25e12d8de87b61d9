use nalgebra::Vector2;
use nalgebra_glm::{max2, min2};
use num_traits::Float;

use crate::geometry::traits::{ClosestPoint3, HasBBox3};
use crate::geometry::{BARYCENTRIC_EPSILON, INTERSECTION_EPSILON, SEPARATION_EPSILON};
use crate::helpers::aliases::{Point3f, Vec3f};

use super::{
    box3::Box3, cylinder3::Cylinder3, ellipsoid3::Ellipsoid3, line3::Line3,
    line_segment3::LineSegment3, obb3::Obb3, plane3::Plane3, ray3::Ray3, sphere3::Sphere3,
    Intersection,
};

pub type BarycentricCoordinates = Vec3f;

/// 3D triangle
#[derive(Debug, Clone, Copy)]
pub struct Triangle3 {
    a: Point3f,
    b: Point3f,
    c: Point3f,
}

impl Triangle3 {
    pub fn new(a: Point3f, b: Point3f, c: Point3f) -> Self {
        return Self { a, b, c };
    }

    #[inline]
    pub fn a(&self) -> &Point3f {
        return &self.a;
    }

    #[inline]
    pub fn b(&self) -> &Point3f {
        return &self.b;
    }

    #[inline]
    pub fn c(&self) -> &Point3f {
        return &self.c;
    }

    /// Unnormalized normal, zero for degenerate triangles
    #[inline]
    pub fn normal(&self) -> Vec3f {
        return (self.b - self.a).cross(&(self.c - self.a));
    }

    #[inline]
    pub fn unit_normal(&self) -> Option<Vec3f> {
        let normal = self.normal();
        if normal.norm_squared() <= INTERSECTION_EPSILON {
            return None;
        }

        return Some(normal.normalize());
    }

    #[inline]
    pub fn area(&self) -> f32 {
        return self.normal().norm() * 0.5;
    }

    #[inline]
    pub fn centroid(&self) -> Point3f {
        return Point3f::from((self.a.coords + self.b.coords + self.c.coords) / 3.0);
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        return self.normal().norm_squared() <= INTERSECTION_EPSILON;
    }

    #[inline]
    pub fn plane(&self) -> Plane3 {
        return Plane3::from_points(&self.a, &self.b, &self.c);
    }

    /// Barycentric coordinates of a point with respect to the triangle
    pub fn to_barycentric(&self, point: &Point3f) -> BarycentricCoordinates {
        let v0 = self.b - self.a;
        let v1 = self.c - self.a;
        let v2 = point - self.a;

        let d00 = v0.norm_squared();
        let d01 = v0.dot(&v1);
        let d11 = v1.norm_squared();
        let d20 = v2.dot(&v0);
        let d21 = v2.dot(&v1);

        let denom = d00 * d11 - d01 * d01;
        if Float::abs(denom) <= INTERSECTION_EPSILON {
            return BarycentricCoordinates::new(1.0, 0.0, 0.0);
        }

        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        return BarycentricCoordinates::new(1.0 - v - w, v, w);
    }

    #[inline]
    pub fn from_barycentric(&self, barycoords: &BarycentricCoordinates) -> Point3f {
        return Point3f::from(
            self.a.coords * barycoords.x + self.b.coords * barycoords.y + self.c.coords * barycoords.z,
        );
    }

    // Containment

    pub fn contains_point(&self, point: &Point3f) -> bool {
        let v0 = self.b - self.a;
        let v1 = self.c - self.a;
        let v2 = point - self.a;

        let d00 = v0.norm_squared();
        let d01 = v0.dot(&v1);
        let d11 = v1.norm_squared();
        let d20 = v2.dot(&v0);
        let d21 = v2.dot(&v1);

        let denom = d00 * d11 - d01 * d01;
        if Float::abs(denom) <= INTERSECTION_EPSILON {
            return false;
        }

        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        let u = 1.0 - v - w;

        return u >= -INTERSECTION_EPSILON && v >= -INTERSECTION_EPSILON && w >= -INTERSECTION_EPSILON;
    }

    #[inline]
    pub fn contains_triangle3(&self, inner: &Triangle3) -> bool {
        return self.contains_point(&inner.a)
            && self.contains_point(&inner.b)
            && self.contains_point(&inner.c);
    }

    #[inline]
    pub fn contains_line_segment3(&self, inner: &LineSegment3) -> bool {
        return self.contains_point(inner.get_start()) && self.contains_point(inner.get_end());
    }

    // Intersection

    pub fn intersects_line3_at(&self, line: &Line3) -> Intersection {
        match internal::line_triangle_intersection_moller(self, line.get_point(), line.get_direction()) {
            Some((_, t)) => return Intersection::Hit(t),
            None => return Intersection::Miss,
        }
    }

    #[inline]
    pub fn intersects_line3(&self, line: &Line3) -> bool {
        return self.intersects_line3_at(line).is_hit();
    }

    pub fn intersects_ray3_at(&self, ray: &Ray3) -> Intersection {
        match internal::line_triangle_intersection_moller(self, ray.get_origin(), ray.get_direction()) {
            Some((_, t)) if t >= 0.0 => return Intersection::Hit(t),
            _ => return Intersection::Miss,
        }
    }

    #[inline]
    pub fn intersects_ray3(&self, ray: &Ray3) -> bool {
        return self.intersects_ray3_at(ray).is_hit();
    }

    pub fn intersects_line_segment3_at(&self, segment: &LineSegment3) -> Intersection {
        let direction = segment.direction();
        match internal::line_triangle_intersection_moller(self, segment.get_start(), &direction) {
            Some((_, t)) if (0.0..=1.0).contains(&t) => return Intersection::Hit(t),
            _ => return Intersection::Miss,
        }
    }

    #[inline]
    pub fn intersects_line_segment3(&self, segment: &LineSegment3) -> bool {
        return self.intersects_line_segment3_at(segment).is_hit();
    }

    /// Separating-axis test over the 13 candidate axes
    pub fn intersects_box3(&self, bbox: &Box3) -> bool {
        let center = bbox.get_center();
        let extent = bbox.extent();

        let verts = [self.a - center, self.b - center, self.c - center];
        let edges = [verts[1] - verts[0], verts[2] - verts[1], verts[0] - verts[2]];

        // Nine cross-product axes e_axis x edge
        for axis in 0..3 {
            let u1 = (axis + 1) % 3;
            let u2 = (axis + 2) % 3;

            for edge in &edges {
                let p0 = verts[0][u2] * edge[u1] - verts[0][u1] * edge[u2];
                let p1 = verts[1][u2] * edge[u1] - verts[1][u1] * edge[u2];
                let p2 = verts[2][u2] * edge[u1] - verts[2][u1] * edge[u2];

                let p_min = Float::min(p0, Float::min(p1, p2));
                let p_max = Float::max(p0, Float::max(p1, p2));
                let r = extent[u1] * Float::abs(edge[u2]) + extent[u2] * Float::abs(edge[u1]);

                if p_min > r || p_max < -r {
                    return false;
                }
            }
        }

        // Box face normals
        for i in 0..3 {
            let v_min = Float::min(verts[0][i], Float::min(verts[1][i], verts[2][i]));
            let v_max = Float::max(verts[0][i], Float::max(verts[1][i], verts[2][i]));
            if v_min > extent[i] || v_max < -extent[i] {
                return false;
            }
        }

        // Triangle plane
        let normal = edges[0].cross(&edges[1]);
        let d = normal.dot(&verts[0]);
        let r = extent.x * Float::abs(normal.x)
            + extent.y * Float::abs(normal.y)
            + extent.z * Float::abs(normal.z);

        return d <= r && d >= -r;
    }

    /// Plane-side rejection with a projected 2D fallback for coplanar pairs
    pub fn intersects_triangle3(&self, other: &Triangle3) -> bool {
        let n1 = self.normal();
        let n2 = other.normal();

        // Degenerate triangles do not intersect anything
        if n1.norm_squared() <= INTERSECTION_EPSILON || n2.norm_squared() <= INTERSECTION_EPSILON {
            return false;
        }

        let d1_a = n1.dot(&(other.a - self.a));
        let d1_b = n1.dot(&(other.b - self.a));
        let d1_c = n1.dot(&(other.c - self.a));

        let d1_min = Float::min(d1_a, Float::min(d1_b, d1_c));
        let d1_max = Float::max(d1_a, Float::max(d1_b, d1_c));

        if d1_min > INTERSECTION_EPSILON || d1_max < -INTERSECTION_EPSILON {
            return false;
        }

        let d2_a = n2.dot(&(self.a - other.a));
        let d2_b = n2.dot(&(self.b - other.a));
        let d2_c = n2.dot(&(self.c - other.a));

        let d2_min = Float::min(d2_a, Float::min(d2_b, d2_c));
        let d2_max = Float::max(d2_a, Float::max(d2_b, d2_c));

        if d2_min > INTERSECTION_EPSILON || d2_max < -INTERSECTION_EPSILON {
            return false;
        }

        let coplanar =
            Float::abs(d1_min) < INTERSECTION_EPSILON && Float::abs(d1_max) < INTERSECTION_EPSILON;

        if coplanar {
            return internal::coplanar_triangles_intersect(self, other, &n1);
        }

        // Non-coplanar; some edge must cross the other triangle
        let edges_self = [
            LineSegment3::new(&self.a, &self.b),
            LineSegment3::new(&self.b, &self.c),
            LineSegment3::new(&self.c, &self.a),
        ];
        for edge in &edges_self {
            if other.intersects_line_segment3(edge) {
                return true;
            }
        }

        let edges_other = [
            LineSegment3::new(&other.a, &other.b),
            LineSegment3::new(&other.b, &other.c),
            LineSegment3::new(&other.c, &other.a),
        ];
        for edge in &edges_other {
            if self.intersects_line_segment3(edge) {
                return true;
            }
        }

        return false;
    }

    // Shape forwards

    #[inline]
    pub fn intersects_plane3(&self, plane: &Plane3) -> bool {
        return plane.intersects_triangle3(self);
    }

    #[inline]
    pub fn intersects_sphere3(&self, sphere: &Sphere3) -> bool {
        return sphere.intersects_triangle3(self);
    }

    #[inline]
    pub fn intersects_obb3(&self, obb: &Obb3) -> bool {
        return obb.intersects_triangle3(self);
    }

    #[inline]
    pub fn intersects_cylinder3(&self, cylinder: &Cylinder3) -> bool {
        return cylinder.intersects_triangle3(self);
    }

    #[inline]
    pub fn intersects_ellipsoid3(&self, ellipsoid: &Ellipsoid3) -> bool {
        return ellipsoid.intersects_triangle3(self);
    }
}

impl HasBBox3 for Triangle3 {
    #[inline]
    fn bbox(&self) -> Box3 {
        return Box3::new(
            min2(&self.c.coords, &min2(&self.a.coords, &self.b.coords)).into(),
            max2(&self.c.coords, &max2(&self.a.coords, &self.b.coords)).into(),
        );
    }
}

impl ClosestPoint3 for Triangle3 {
    /// Returns closest point on triangle to given point
    fn closest_point(&self, point: &Point3f) -> Point3f {
        if self.is_degenerate() {
            // Fall back to the nearest edge
            let edges = [
                LineSegment3::new(&self.a, &self.b),
                LineSegment3::new(&self.a, &self.c),
                LineSegment3::new(&self.b, &self.c),
            ];

            let mut best = edges[0].closest_point(point);
            let mut best_dist = (point - best).norm_squared();
            for edge in &edges[1..] {
                let candidate = edge.closest_point(point);
                let dist = (point - candidate).norm_squared();
                if dist < best_dist {
                    best_dist = dist;
                    best = candidate;
                }
            }

            return best;
        }

        // Check if P in vertex region outside A
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        let ap = point - self.a;
        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);

        // barycentric coordinates (1,0,0)
        if d1 <= 0.0 && d2 <= 0.0 {
            return self.a;
        }

        // Check if P in vertex region outside B
        let bp = point - self.b;
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);

        // barycentric coordinates (0,1,0)
        if d3 >= 0.0 && d4 <= d3 {
            return self.b;
        }

        // Check if P in edge region of AB, if so return projection of P onto AB
        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return self.a + ab * v; // barycentric coordinates (1-v,v,0)
        }

        // Check if P in vertex region outside C
        let cp = point - self.c;
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);

        // barycentric coordinates (0,0,1)
        if d6 >= 0.0 && d5 <= d6 {
            return self.c;
        }

        // Check if P in edge region of AC, if so return projection of P onto AC
        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return self.a + ac * w; // barycentric coordinates (1-w,0,w)
        }

        // Check if P in edge region of BC, if so return projection of P onto BC
        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return self.b + (self.c - self.b) * w; // barycentric coordinates (0,1-w,w)
        }

        // P inside face region. Compute Q through its barycentric coordinates (u,v,w)
        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;

        return self.a + ab * v + ac * w;
    }
}

pub(super) mod internal {
    use super::*;

    /// Based on: https://cadxfem.org/inf/Fast%20MinimumStorage%20RayTriangle%20Intersection.pdf
    pub fn line_triangle_intersection_moller(
        triangle: &Triangle3,
        origin: &Point3f,
        direction: &Vec3f,
    ) -> Option<(BarycentricCoordinates, f32)> {
        if direction.norm_squared() <= SEPARATION_EPSILON {
            return None;
        }

        let edge1 = triangle.b - triangle.a;
        let edge2 = triangle.c - triangle.a;

        let pvec = direction.cross(&edge2);
        let det = edge1.dot(&pvec);

        if Float::abs(det) <= SEPARATION_EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let tvec = origin - triangle.a;
        let u = tvec.dot(&pvec) * inv_det;

        if u < -BARYCENTRIC_EPSILON || u > 1.0 + BARYCENTRIC_EPSILON {
            return None;
        }

        let qvec = tvec.cross(&edge1);
        let v = direction.dot(&qvec) * inv_det;

        if v < -BARYCENTRIC_EPSILON || u + v > 1.0 + BARYCENTRIC_EPSILON {
            return None;
        }

        let t = edge2.dot(&qvec) * inv_det;
        let w = 1.0 - u - v;

        if w < -BARYCENTRIC_EPSILON || w > 1.0 + BARYCENTRIC_EPSILON {
            return None;
        }

        return Some((BarycentricCoordinates::new(w, u, v), t));
    }

    fn project_to_axis(point: &Vec3f, dominant_axis: usize) -> Vector2<f32> {
        match dominant_axis {
            0 => return Vector2::new(point.y, point.z),
            1 => return Vector2::new(point.x, point.z),
            _ => return Vector2::new(point.x, point.y),
        }
    }

    fn cross_2d(a: &Vector2<f32>, b: &Vector2<f32>) -> f32 {
        return a.x * b.y - a.y * b.x;
    }

    fn segments_intersect_2d(
        p0: &Vector2<f32>,
        p1: &Vector2<f32>,
        q0: &Vector2<f32>,
        q1: &Vector2<f32>,
    ) -> bool {
        let r = p1 - p0;
        let s = q1 - q0;
        let rxs = cross_2d(&r, &s);
        let qp = q0 - p0;
        let qpxr = cross_2d(&qp, &r);

        if Float::abs(rxs) <= INTERSECTION_EPSILON {
            // Parallel; collinear segments count as intersecting
            return Float::abs(qpxr) <= INTERSECTION_EPSILON;
        }

        let t = cross_2d(&qp, &s) / rxs;
        let u = qpxr / rxs;

        return (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u);
    }

    fn point_in_triangle_2d(triangle: &[Vector2<f32>; 3], point: &Vector2<f32>) -> bool {
        let sign = |p1: &Vector2<f32>, p2: &Vector2<f32>, p3: &Vector2<f32>| {
            return (p1.x - p3.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p3.y);
        };

        let d1 = sign(point, &triangle[0], &triangle[1]);
        let d2 = sign(point, &triangle[1], &triangle[2]);
        let d3 = sign(point, &triangle[2], &triangle[0]);

        let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
        let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;

        return !(has_neg && has_pos);
    }

    pub fn coplanar_triangles_intersect(lhs: &Triangle3, rhs: &Triangle3, normal: &Vec3f) -> bool {
        let abs_normal = Vec3f::new(
            Float::abs(normal.x),
            Float::abs(normal.y),
            Float::abs(normal.z),
        );

        let mut dominant_axis = 2;
        if abs_normal.x > abs_normal.y && abs_normal.x > abs_normal.z {
            dominant_axis = 0;
        } else if abs_normal.y > abs_normal.z {
            dominant_axis = 1;
        }

        let lhs_proj = [
            project_to_axis(&lhs.a.coords, dominant_axis),
            project_to_axis(&lhs.b.coords, dominant_axis),
            project_to_axis(&lhs.c.coords, dominant_axis),
        ];
        let rhs_proj = [
            project_to_axis(&rhs.a.coords, dominant_axis),
            project_to_axis(&rhs.b.coords, dominant_axis),
            project_to_axis(&rhs.c.coords, dominant_axis),
        ];

        for i in 0..3 {
            for j in 0..3 {
                if segments_intersect_2d(
                    &lhs_proj[i],
                    &lhs_proj[(i + 1) % 3],
                    &rhs_proj[j],
                    &rhs_proj[(j + 1) % 3],
                ) {
                    return true;
                }
            }
        }

        for vertex in &lhs_proj {
            if point_in_triangle_2d(&rhs_proj, vertex) {
                return true;
            }
        }
        for vertex in &rhs_proj {
            if point_in_triangle_2d(&lhs_proj, vertex) {
                return true;
            }
        }

        return false;
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::*;

    fn xy_triangle() -> Triangle3 {
        return Triangle3::new(
            Point3f::new(0.0, 5.0, 0.0),
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(5.0, 0.0, 0.0),
        );
    }

    #[test]
    fn segment_triangle_intersection() {
        let triangle = xy_triangle();

        let crossing = LineSegment3::new(&Point3f::new(2.5, 2.4, -1.0), &Point3f::new(2.5, 2.4, 1.0));
        assert_eq!(
            triangle.intersects_line_segment3_at(&crossing),
            Intersection::Hit(0.5)
        );

        let short = LineSegment3::new(&Point3f::new(2.5, 2.4, -2.0), &Point3f::new(2.5, 2.4, -1.0));
        assert!(!triangle.intersects_line_segment3(&short));
    }

    #[test]
    fn line_ignores_parameter_sign() {
        let triangle = xy_triangle();
        let line = Line3::from_points(&Point3f::new(2.5, 2.4, -2.0), &Point3f::new(2.5, 2.4, -1.0));

        // The segment above missed, but its carrier line hits
        assert!(triangle.intersects_line3(&line));
    }

    #[test]
    fn ray_triangle_intersection() {
        let triangle = xy_triangle();

        let towards = Ray3::new(Point3f::new(1.0, 1.0, 1.0), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(triangle.intersects_ray3_at(&towards), Intersection::Hit(1.0));

        let away = Ray3::new(Point3f::new(1.0, 1.0, 1.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(!triangle.intersects_ray3(&away));

        let off_to_side = Ray3::new(Point3f::new(4.0, 4.0, 1.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(!triangle.intersects_ray3(&off_to_side));
    }

    #[test]
    fn closest_point_regions() {
        let triangle = xy_triangle();

        // Face region
        let above_face = Point3f::new(1.0, 1.0, 2.0);
        assert!((triangle.closest_point(&above_face) - Point3f::new(1.0, 1.0, 0.0)).norm() < 1e-5);

        // Vertex region
        let beyond_corner = Point3f::new(7.0, -1.0, 0.0);
        assert_eq!(triangle.closest_point(&beyond_corner), Point3f::new(5.0, 0.0, 0.0));

        // Edge region
        let below_edge = Point3f::new(2.0, -3.0, 0.0);
        assert!((triangle.closest_point(&below_edge) - Point3f::new(2.0, 0.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn degenerate_triangle_uses_edges() {
        let degenerate = Triangle3::new(
            Point3f::origin(),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(2.0, 0.0, 0.0),
        );

        let closest = degenerate.closest_point(&Point3f::new(1.5, 2.0, 0.0));
        assert_eq!(closest, Point3f::new(1.5, 0.0, 0.0));
        assert!((degenerate.squared_distance(&Point3f::new(1.5, 2.0, 0.0)) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn triangle_box_intersection() {
        let bbox = Box3::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 1.0, 1.0));

        let piercing = Triangle3::new(
            Point3f::new(0.0, 0.0, -2.0),
            Point3f::new(0.0, 0.0, 2.0),
            Point3f::new(2.0, 2.0, 0.0),
        );
        assert!(piercing.intersects_box3(&bbox));

        let outside = Triangle3::new(
            Point3f::new(2.0, 2.0, 2.0),
            Point3f::new(3.0, 2.0, 2.0),
            Point3f::new(2.0, 3.0, 2.0),
        );
        assert!(!outside.intersects_box3(&bbox));

        // Plane of the triangle separates it from the box
        let slanted = Triangle3::new(
            Point3f::new(3.5, 0.0, 0.0),
            Point3f::new(0.0, 3.5, 0.0),
            Point3f::new(0.0, 0.0, 3.5),
        );
        assert!(!slanted.intersects_box3(&bbox));

        // The same plane through the corner touches
        let touching = Triangle3::new(
            Point3f::new(3.0, 0.0, 0.0),
            Point3f::new(0.0, 3.0, 0.0),
            Point3f::new(0.0, 0.0, 3.0),
        );
        assert!(touching.intersects_box3(&bbox));
    }

    #[test]
    fn triangle_triangle_piercing() {
        let base = xy_triangle();

        let piercing = Triangle3::new(
            Point3f::new(1.0, 1.0, -1.0),
            Point3f::new(1.0, 2.0, 1.0),
            Point3f::new(2.0, 1.0, 1.0),
        );
        assert!(base.intersects_triangle3(&piercing));
        assert!(piercing.intersects_triangle3(&base));

        let floating = Triangle3::new(
            Point3f::new(1.0, 1.0, 1.0),
            Point3f::new(1.0, 2.0, 2.0),
            Point3f::new(2.0, 1.0, 2.0),
        );
        assert!(!base.intersects_triangle3(&floating));
    }

    #[test]
    fn coplanar_triangles() {
        let base = xy_triangle();

        let overlapping = Triangle3::new(
            Point3f::new(1.0, 1.0, 0.0),
            Point3f::new(3.0, 1.0, 0.0),
            Point3f::new(1.0, 3.0, 0.0),
        );
        assert!(base.intersects_triangle3(&overlapping));

        let apart = Triangle3::new(
            Point3f::new(10.0, 10.0, 0.0),
            Point3f::new(12.0, 10.0, 0.0),
            Point3f::new(10.0, 12.0, 0.0),
        );
        assert!(!base.intersects_triangle3(&apart));
    }

    #[test]
    fn barycentric_round_trip() {
        let triangle = xy_triangle();
        let point = Point3f::new(1.0, 1.5, 0.0);

        let barycoords = triangle.to_barycentric(&point);
        assert!((barycoords.sum() - 1.0).abs() < 1e-6);
        assert!((triangle.from_barycentric(&barycoords) - point).norm() < 1e-5);
    }

    #[test]
    fn contains_point_on_face() {
        let triangle = xy_triangle();

        assert!(triangle.contains_point(&Point3f::new(1.0, 1.0, 0.0)));
        assert!(triangle.contains_point(&Point3f::new(0.0, 0.0, 0.0)));
        assert!(!triangle.contains_point(&Point3f::new(4.0, 4.0, 0.0)));
    }
}
