//! Ivar math - vectors, rays, intervals and bounding boxes for the CPU tracer.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
pub mod random;
mod ray;
mod vector;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use vector::{Color, Point3, Vec3Ext};
