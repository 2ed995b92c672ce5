//! Closed set of traceable surfaces.
//!
//! The world is a BVH over `Surface` values, so lists, meshes and nested
//! BVHs can sit next to plain spheres and triangles without boxing.

use crate::{Bvh, HitRecord, Hittable, HittableList, Mesh, Ray, Sphere, Triangle};
use ivar_math::{Aabb, Interval};

pub enum Surface {
    Sphere(Sphere),
    Triangle(Triangle),
    List(HittableList),
    Mesh(Mesh),
    Bvh(Bvh<Surface>),
}

impl Hittable for Surface {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        match self {
            Surface::Sphere(s) => s.hit(ray, ray_t, rec),
            Surface::Triangle(t) => t.hit(ray, ray_t, rec),
            Surface::List(l) => l.hit(ray, ray_t, rec),
            Surface::Mesh(m) => m.hit(ray, ray_t, rec),
            Surface::Bvh(b) => b.hit(ray, ray_t, rec),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            Surface::Sphere(s) => s.bounding_box(),
            Surface::Triangle(t) => t.bounding_box(),
            Surface::List(l) => l.bounding_box(),
            Surface::Mesh(m) => m.bounding_box(),
            Surface::Bvh(b) => b.bounding_box(),
        }
    }
}

impl From<Sphere> for Surface {
    fn from(s: Sphere) -> Self {
        Surface::Sphere(s)
    }
}

impl From<Triangle> for Surface {
    fn from(t: Triangle) -> Self {
        Surface::Triangle(t)
    }
}

impl From<HittableList> for Surface {
    fn from(l: HittableList) -> Self {
        Surface::List(l)
    }
}

impl From<Mesh> for Surface {
    fn from(m: Mesh) -> Self {
        Surface::Mesh(m)
    }
}

impl From<Bvh<Surface>> for Surface {
    fn from(b: Bvh<Surface>) -> Self {
        Surface::Bvh(b)
    }
}
