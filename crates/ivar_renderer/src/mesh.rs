//! Triangle mesh surface with its own BVH.
//!
//! All triangles share one material. The internal BVH is built explicitly
//! once the last triangle has been added; a mesh without a built BVH is not
//! ready and never reports a hit.

use crate::{BuildError, Bvh, HitRecord, Hittable, Material, Ray, Triangle};
use ivar_math::{Aabb, Interval, Vec3};
use std::sync::Arc;

pub struct Mesh {
    material: Arc<Material>,
    /// Triangles waiting for `build_bvh`
    pending: Vec<Triangle>,
    bvh: Option<Bvh<Triangle>>,
    bbox: Aabb,
}

impl Mesh {
    pub fn new(material: Arc<Material>) -> Self {
        Self {
            material,
            pending: Vec::new(),
            bvh: None,
            bbox: Aabb::EMPTY,
        }
    }

    /// Add a triangle. Adding after `build_bvh` makes the mesh not ready again.
    pub fn add_triangle(&mut self, v0: Vec3, v1: Vec3, v2: Vec3) {
        if let Some(bvh) = self.bvh.take() {
            self.pending = bvh.into_objects();
        }

        let triangle = Triangle::new(v0, v1, v2, self.material.clone());
        self.bbox = Aabb::surrounding(&self.bbox, &triangle.bounding_box());
        self.pending.push(triangle);
    }

    /// Build the internal BVH over every triangle added so far.
    pub fn build_bvh(&mut self) -> Result<(), BuildError> {
        if self.bvh.is_some() {
            return Ok(());
        }

        let triangles = std::mem::take(&mut self.pending);
        log::debug!("Building mesh BVH over {} triangles", triangles.len());
        self.bvh = Some(Bvh::new(triangles)?);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.bvh.is_some()
    }

    pub fn triangle_count(&self) -> usize {
        self.bvh.as_ref().map_or(self.pending.len(), |bvh| bvh.len())
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }
}

impl Hittable for Mesh {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        match &self.bvh {
            Some(bvh) => bvh.hit(ray, ray_t, rec),
            None => false,
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
