//! Ivar - CPU ray tracing backend for the scene editor.
//!
//! A recursive path tracer with analytic lights, used as an offline
//! alternative to the rasterized viewport. A render rebuilds its world from
//! the editor's [`ivar_core::Scene`], traces it in parallel row bands and
//! writes RGB8 into a caller-owned buffer.
//!
//! # Example
//!
//! ```ignore
//! let world = ivar_renderer::build_world(&scene)?;
//! let mut camera = Camera::new().with_resolution(400, 16.0 / 9.0);
//! let pixels = render_to_vec(&mut camera, &world.context(), &RenderSettings::default())?;
//! ```

mod bands;
mod bvh;
mod camera;
mod error;
mod hittable;
mod light;
mod material;
mod mesh;
mod renderer;
mod scene;
mod skybox;
mod sphere;
mod surface;
mod triangle;

pub use bands::{split_rows, RowBand};
pub use bvh::Bvh;
pub use camera::Camera;
pub use error::{BuildError, InvalidSceneError, RenderError};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use light::{RtLight, SceneLights, SHADOW_EPSILON, SHININESS};
pub use material::{Dielectric, DiffuseLight, Lambertian, Material, Metal, ScatterResult};
pub use mesh::Mesh;
pub use renderer::{
    color_to_rgb, linear_to_gamma, ray_color, render, render_pixel, render_to_vec, sample_seed,
    RenderContext, RenderSettings, DEFAULT_INDIRECT_WEIGHT, FALLBACK_THREAD_COUNT,
};
pub use scene::{build_world, build_world_with_textures, convert_material, World};
pub use skybox::{CubeFace, Skybox};
pub use sphere::Sphere;
pub use surface::Surface;
pub use triangle::Triangle;

/// Re-export Vec3 and common math types from ivar_math
pub use ivar_math::{Aabb, Color, Interval, Point3, Ray, Vec3};
