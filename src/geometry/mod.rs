pub mod primitives;
pub mod traits;

/// Threshold for cross-product magnitudes and quadratic discriminants.
pub const INTERSECTION_EPSILON: f32 = 1e-8;

/// Axis-test fudge used by the separating-axis box tests.
pub const SEPARATION_EPSILON: f32 = 1e-6;

/// Parallelism threshold for line/ray/segment pairings.
pub const PARALLEL_EPSILON: f32 = 1e-8;

/// Slack on barycentric bounds in ray/line/segment vs triangle tests.
pub const BARYCENTRIC_EPSILON: f32 = 1e-4;
