use nalgebra::{Point3, Vector3};

pub type Vec3f = Vector3<f32>;
pub type Point3f = Point3<f32>;
