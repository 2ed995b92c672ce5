//! Ivar Core - the scene-side inputs of a CPU render.
//!
//! This crate provides:
//!
//! - **Scene description**: `Scene`, `SceneObject`, `Shape`, `Material`,
//!   `LightComponent`, `Transform`
//! - **Geometry**: `Mesh` with validation and world-space triangle extraction
//! - **Textures**: decoded once into linear RGB for CPU sampling
//!
//! # Example
//!
//! ```ignore
//! use ivar_core::{Scene, Shape, Transform, Material};
//!
//! let mut scene = Scene::new("demo");
//! scene.add_object("ball", Shape::Sphere { radius: 1.0 }, Transform::default(),
//!     Arc::new(Material::default()));
//! ```

pub mod mesh;
pub mod scene;
pub mod texture;

// Re-export commonly used types
pub use mesh::{Mesh, MeshError};
pub use scene::{
    LightComponent, LightKind, Material, MaterialModel, Scene, SceneLight, SceneObject, Shape,
    SkyboxSource, Transform,
};
pub use texture::{Texture, TextureCache, TextureError, TextureResult};
