pub mod box3;
pub mod cylinder3;
pub mod ellipsoid3;
pub mod line3;
pub mod line_segment3;
pub mod obb3;
pub mod plane3;
pub mod ray3;
pub mod sphere3;
pub mod triangle3;

pub use box3::Box3;
pub use cylinder3::Cylinder3;
pub use ellipsoid3::Ellipsoid3;
pub use line3::Line3;
pub use line_segment3::LineSegment3;
pub use obb3::Obb3;
pub use plane3::Plane3;
pub use ray3::Ray3;
pub use sphere3::Sphere3;
pub use triangle3::Triangle3;

/// Parametric intersection result for line/ray/segment tests.
///
/// Routines that can produce an entry/exit pair report [`Intersection::Span`],
/// single-solution routines report [`Intersection::Hit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    Miss,
    Hit(f32),
    Span { t_min: f32, t_max: f32 },
}

impl Intersection {
    #[inline]
    pub fn is_hit(&self) -> bool {
        return !matches!(self, Intersection::Miss);
    }

    /// Smallest intersection parameter, if any
    #[inline]
    pub fn entry(&self) -> Option<f32> {
        match self {
            Intersection::Miss => None,
            Intersection::Hit(t) => Some(*t),
            Intersection::Span { t_min, .. } => Some(*t_min),
        }
    }
}
