//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{
    hittable::{HitRecord, Hittable},
    Material, Ray,
};
use ivar_math::{Aabb, Interval, Vec3};
use std::sync::Arc;

/// Determinant magnitude below which the ray counts as parallel to the triangle.
const PARALLEL_EPSILON: f32 = 1e-7;

/// A triangle primitive.
#[derive(Clone)]
pub struct Triangle {
    v0: Vec3,
    /// Edges from v0, cached for the intersection test
    edge1: Vec3,
    edge2: Vec3,
    /// Pre-computed face normal (unit length, counter-clockwise winding)
    normal: Vec3,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<Material>) -> Self {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let normal = edge1.cross(edge2).normalize_or_zero();

        // Aabb pads the flat axis of axis-aligned triangles
        let bbox = Aabb::from_points(v0.min(v1).min(v2), v0.max(v1).max(v2));

        Self {
            v0,
            edge1,
            edge2,
            normal,
            material,
            bbox,
        }
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v0 + self.edge1, self.v0 + self.edge2]
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }
}

impl Hittable for Triangle {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let h = ray.direction().cross(self.edge2);
        let det = self.edge1.dot(h);

        if det.abs() < PARALLEL_EPSILON {
            return false;
        }

        let f = 1.0 / det;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return false;
        }

        let q = s.cross(self.edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return false;
        }

        let t = f * self.edge2.dot(q);
        if !ray_t.contains(t) {
            return false;
        }

        rec.t = t;
        rec.p = ray.at(t);
        rec.set_face_normal(ray, self.normal);
        rec.u = u;
        rec.v = v;
        rec.material = Some(self.material.as_ref());

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;

    fn xy_triangle(z: f32) -> Triangle {
        Triangle::new(
            Vec3::new(-1.0, -1.0, z),
            Vec3::new(1.0, -1.0, z),
            Vec3::new(0.0, 1.0, z),
            Arc::new(Lambertian::new(Vec3::new(0.5, 0.5, 0.5)).into()),
        )
    }

    #[test]
    fn test_triangle_hit() {
        let tri = xy_triangle(-1.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let mut rec = HitRecord::default();
        assert!(tri.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
        assert!((rec.t - 1.0).abs() < 0.001);
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);
    }

    #[test]
    fn test_triangle_barycentric_uv() {
        let tri = xy_triangle(-1.0);

        // Straight at v1: u = 1, v = 0
        let ray = Ray::new(Vec3::new(1.0, -1.0, 0.0), -Vec3::Z);
        let mut rec = HitRecord::default();
        assert!(tri.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
        assert!((rec.u - 1.0).abs() < 1e-5);
        assert!(rec.v.abs() < 1e-5);
    }

    #[test]
    fn test_triangle_miss() {
        let tri = xy_triangle(-1.0);
        let mut rec = HitRecord::default();

        // Pointing away
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(!tri.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));

        // Outside the edges
        let ray = Ray::new(Vec3::new(0.9, 0.9, 0.0), -Vec3::Z);
        assert!(!tri.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
    }

    #[test]
    fn test_triangle_parallel_ray_misses() {
        let tri = xy_triangle(-1.0);
        let ray = Ray::new(Vec3::new(-5.0, 0.0, -1.0), Vec3::X);

        let mut rec = HitRecord::default();
        assert!(!tri.hit(&ray, Interval::UNIVERSE, &mut rec));
    }

    #[test]
    fn test_back_face_hit_flips_normal() {
        let tri = xy_triangle(-1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::Z);

        let mut rec = HitRecord::default();
        assert!(tri.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
        assert!(!rec.front_face);
        assert_eq!(rec.normal, -Vec3::Z);
    }

    #[test]
    fn test_flat_triangle_has_padded_box() {
        let bbox = xy_triangle(3.0).bounding_box();
        assert!(bbox.z.size() > 0.0);
        assert!(bbox.z.contains(3.0));
    }
}
