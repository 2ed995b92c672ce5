//! Scene description handed to the ray tracer.
//!
//! This is the editor-facing side of a render request: shapes with
//! transforms and materials, light components, and an optional skybox
//! folder. It carries no rendering state; the renderer rebuilds its own
//! world from it on every render.

use std::path::PathBuf;
use std::sync::Arc;

use ivar_math::{Mat4, Quat, Vec3};

use crate::mesh::Mesh;

/// Surface material as authored in the editor.
///
/// Loosely follows UsdPreviewSurface. The renderer maps it onto one of its
/// four scattering models, see [`Material::model`].
#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,

    /// Diffuse/albedo color (RGB, 0-1)
    pub diffuse_color: Vec3,

    /// Metallic factor (0=dielectric, 1=metal)
    pub metallic: f32,

    /// Roughness factor, doubles as metal fuzz
    pub roughness: f32,

    /// Emissive color; any non-black value makes the surface a light
    pub emissive_color: Vec3,

    /// Opacity (0=transparent, 1=opaque)
    pub opacity: f32,

    /// Index of refraction for transparent materials
    pub ior: f32,

    /// Path to diffuse/albedo texture
    pub diffuse_texture: Option<String>,
}

/// Which scattering model a [`Material`] resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialModel {
    Lambertian,
    Metal,
    Dielectric,
    DiffuseLight,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            diffuse_color: Vec3::new(0.5, 0.5, 0.5),
            metallic: 0.0,
            roughness: 0.5,
            emissive_color: Vec3::ZERO,
            opacity: 1.0,
            ior: 1.5,
            diffuse_texture: None,
        }
    }
}

impl Material {
    pub fn new(name: impl Into<String>, diffuse_color: Vec3) -> Self {
        Self {
            name: name.into(),
            diffuse_color,
            ..Default::default()
        }
    }

    pub fn is_emissive(&self) -> bool {
        self.emissive_color.length_squared() > 0.0
    }

    /// Emission wins, then transparency, then metalness.
    pub fn model(&self) -> MaterialModel {
        if self.is_emissive() {
            MaterialModel::DiffuseLight
        } else if self.opacity < 1.0 {
            MaterialModel::Dielectric
        } else if self.metallic >= 0.5 {
            MaterialModel::Metal
        } else {
            MaterialModel::Lambertian
        }
    }
}

/// Transform components that compose into a matrix.
#[derive(Clone, Debug)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Order: Scale -> Rotate -> Translate (SRT)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Geometry of a scene object, in the object's local space.
#[derive(Clone, Debug)]
pub enum Shape {
    /// Sphere centered at the local origin
    Sphere { radius: f32 },
    Triangle { vertices: [Vec3; 3] },
    Mesh(Arc<Mesh>),
}

#[derive(Clone, Debug)]
pub struct SceneObject {
    pub name: String,
    pub shape: Shape,
    pub transform: Transform,
    pub material: Arc<Material>,
}

/// Kind of a light component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Ambient,
    Directional,
    Point,
    Spot,
}

/// Light as stored on an editor entity, in the entity's local frame.
///
/// Directional and spot lights shine along the local -Z axis.
#[derive(Clone, Debug)]
pub struct LightComponent {
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
    /// Spot cone half-angle in degrees
    pub spot_angle: f32,
    /// Distance attenuation coefficient `k` in `1 / (1 + k d²)`
    pub attenuation: f32,
}

impl LightComponent {
    pub fn new(kind: LightKind, color: Vec3, intensity: f32) -> Self {
        Self {
            kind,
            color,
            intensity,
            spot_angle: 30.0,
            attenuation: 0.1,
        }
    }

    pub fn with_spot_angle(mut self, degrees: f32) -> Self {
        self.spot_angle = degrees;
        self
    }

    pub fn with_attenuation(mut self, k: f32) -> Self {
        self.attenuation = k;
        self
    }
}

#[derive(Clone, Debug)]
pub struct SceneLight {
    pub name: String,
    pub light: LightComponent,
    pub transform: Transform,
}

/// Folder with `right/left/top/bottom/front/back` face images.
#[derive(Clone, Debug)]
pub struct SkyboxSource {
    pub folder: PathBuf,
    /// Preferred image extension, without the dot
    pub extension: String,
}

impl SkyboxSource {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            extension: "jpg".to_string(),
        }
    }
}

/// Everything the ray tracer needs from the editor for one render.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub name: String,
    pub objects: Vec<SceneObject>,
    pub lights: Vec<SceneLight>,
    pub skybox: Option<SkyboxSource>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_object(
        &mut self,
        name: impl Into<String>,
        shape: Shape,
        transform: Transform,
        material: Arc<Material>,
    ) {
        self.objects.push(SceneObject {
            name: name.into(),
            shape,
            transform,
            material,
        });
    }

    pub fn add_light(&mut self, name: impl Into<String>, light: LightComponent, transform: Transform) {
        self.lights.push(SceneLight {
            name: name.into(),
            light,
            transform,
        });
    }

    pub fn triangle_count(&self) -> usize {
        self.objects
            .iter()
            .map(|o| match &o.shape {
                Shape::Sphere { .. } => 0,
                Shape::Triangle { .. } => 1,
                Shape::Mesh(mesh) => mesh.triangle_count(),
            })
            .sum()
    }
}
