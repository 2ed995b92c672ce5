//! Turn an editor [`Scene`] into a traceable [`World`].
//!
//! Runs once per render, before any ray is cast. All validation happens here
//! so that tracing itself cannot fail.

use crate::{
    Bvh, Dielectric, DiffuseLight, InvalidSceneError, Lambertian, Material, Mesh, Metal,
    RenderContext, RtLight, SceneLights, Skybox, Sphere, Surface, Triangle,
};
use ivar_core::{MaterialModel, Scene, SceneObject, Shape, TextureCache};
use ivar_math::{Mat4, Vec3};
use std::collections::HashMap;
use std::sync::Arc;

/// Everything one render reads: geometry, lights and environment.
pub struct World {
    pub bvh: Bvh<Surface>,
    pub lights: SceneLights,
    pub skybox: Option<Skybox>,
}

impl World {
    /// Borrow the world for a render call.
    pub fn context(&self) -> RenderContext<'_> {
        let mut ctx = RenderContext::new(&self.bvh).with_lights(&self.lights);
        if let Some(skybox) = &self.skybox {
            ctx = ctx.with_skybox(skybox);
        }
        ctx
    }
}

/// Build a world, loading textures relative to the working directory.
pub fn build_world(scene: &Scene) -> Result<World, InvalidSceneError> {
    build_world_with_textures(scene, &mut TextureCache::new())
}

/// Build a world, loading every texture through `textures`.
pub fn build_world_with_textures(
    scene: &Scene,
    textures: &mut TextureCache,
) -> Result<World, InvalidSceneError> {
    log::debug!(
        "Building world '{}': {} objects, {} lights",
        scene.name,
        scene.objects.len(),
        scene.lights.len()
    );

    let mut materials = MaterialTable::default();
    let mut surfaces = Vec::with_capacity(scene.objects.len());
    for object in &scene.objects {
        let material = materials.resolve(&object.material, textures)?;
        surfaces.push(build_surface(object, material)?);
    }

    let lights = scene
        .lights
        .iter()
        .map(|l| RtLight::from_component(&l.light, &l.transform.to_matrix(), &l.name))
        .collect::<Result<SceneLights, _>>()?;

    let skybox = scene
        .skybox
        .as_ref()
        .map(|source| Skybox::load(&source.folder, &source.extension))
        .transpose()?;

    let bvh = Bvh::new(surfaces)?;
    log::info!(
        "World ready: {} surfaces, {} triangles, {} lights, {} textures",
        bvh.len(),
        scene.triangle_count(),
        lights.len(),
        textures.len()
    );

    Ok(World {
        bvh,
        lights,
        skybox,
    })
}

/// Converts each editor material once, so objects sharing one share the result.
#[derive(Default)]
struct MaterialTable {
    converted: HashMap<*const ivar_core::Material, Arc<Material>>,
}

impl MaterialTable {
    fn resolve(
        &mut self,
        source: &Arc<ivar_core::Material>,
        textures: &mut TextureCache,
    ) -> Result<Arc<Material>, InvalidSceneError> {
        let key = Arc::as_ptr(source);
        if let Some(material) = self.converted.get(&key) {
            return Ok(material.clone());
        }

        let material = Arc::new(convert_material(source, textures)?);
        self.converted.insert(key, material.clone());
        Ok(material)
    }
}

/// Map an editor material onto a scattering model.
pub fn convert_material(
    source: &ivar_core::Material,
    textures: &mut TextureCache,
) -> Result<Material, InvalidSceneError> {
    let texture = source
        .diffuse_texture
        .as_ref()
        .map(|path| textures.load(path))
        .transpose()?;

    let material: Material = match source.model() {
        MaterialModel::DiffuseLight => DiffuseLight::new(source.emissive_color).into(),
        MaterialModel::Dielectric => Dielectric::new(source.ior).into(),
        MaterialModel::Metal => {
            let metal = Metal::new(source.diffuse_color, source.roughness);
            match texture {
                Some(texture) => metal.with_texture(texture).into(),
                None => metal.into(),
            }
        }
        MaterialModel::Lambertian => {
            let lambertian = Lambertian::new(source.diffuse_color);
            match texture {
                Some(texture) => lambertian.with_texture(texture).into(),
                None => lambertian.into(),
            }
        }
    };
    Ok(material)
}

fn build_surface(
    object: &SceneObject,
    material: Arc<Material>,
) -> Result<Surface, InvalidSceneError> {
    let world = object.transform.to_matrix();
    let non_finite = || InvalidSceneError::NonFiniteGeometry {
        object: object.name.clone(),
    };

    match &object.shape {
        Shape::Sphere { radius } => {
            // Non-uniform scale is approximated by the largest axis
            let scale = object.transform.scale.abs().max_element();
            let radius = radius * scale;
            if !(radius.is_finite() && radius > 0.0) {
                return Err(InvalidSceneError::InvalidRadius {
                    object: object.name.clone(),
                    radius,
                });
            }

            let center = world.transform_point3(Vec3::ZERO);
            if !center.is_finite() {
                return Err(non_finite());
            }
            Ok(Sphere::new(center, radius, material).into())
        }
        Shape::Triangle { vertices } => {
            let [v0, v1, v2] = transform_all(&world, vertices);
            if ![v0, v1, v2].iter().all(|v| v.is_finite()) {
                return Err(non_finite());
            }
            Ok(Triangle::new(v0, v1, v2, material).into())
        }
        Shape::Mesh(source) => {
            let triangles =
                source
                    .world_triangles(&world)
                    .map_err(|source| InvalidSceneError::Mesh {
                        object: object.name.clone(),
                        source,
                    })?;
            if triangles.is_empty() {
                return Err(InvalidSceneError::EmptyMesh {
                    object: object.name.clone(),
                });
            }

            let mut mesh = Mesh::new(material);
            for [v0, v1, v2] in triangles {
                if ![v0, v1, v2].iter().all(|v| v.is_finite()) {
                    return Err(non_finite());
                }
                mesh.add_triangle(v0, v1, v2);
            }
            mesh.build_bvh()?;
            Ok(mesh.into())
        }
    }
}

fn transform_all(world: &Mat4, vertices: &[Vec3; 3]) -> [Vec3; 3] {
    vertices.map(|v| world.transform_point3(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HitRecord, Hittable, Ray};
    use ivar_core::{LightComponent, LightKind, SkyboxSource, Transform};
    use ivar_math::{Interval, Quat};

    fn grey() -> Arc<ivar_core::Material> {
        Arc::new(ivar_core::Material::new("grey", Vec3::splat(0.5)))
    }

    fn hit(world: &World, ray: Ray) -> Option<f32> {
        let mut rec = HitRecord::default();
        world
            .bvh
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec)
            .then_some(rec.t)
    }

    #[test]
    fn test_build_world_places_shapes() {
        let mut scene = Scene::new("test");
        scene.add_object(
            "ball",
            Shape::Sphere { radius: 0.5 },
            Transform::from_translation(Vec3::new(0.0, 0.0, -3.0)).with_scale(Vec3::splat(2.0)),
            grey(),
        );
        scene.add_object(
            "box",
            Shape::Mesh(Arc::new(ivar_core::Mesh::cube(1.0))),
            Transform::from_translation(Vec3::new(5.0, 0.0, 0.0)),
            grey(),
        );
        scene.add_light(
            "sun",
            LightComponent::new(LightKind::Directional, Vec3::ONE, 1.0),
            Transform::from_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
        );

        let world = build_world(&scene).unwrap();
        assert_eq!(world.bvh.len(), 2);
        assert_eq!(world.lights.len(), 1);
        assert!(world.skybox.is_none());

        // Scaled sphere: radius 1 at z = -3
        let t = hit(&world, Ray::new(Vec3::ZERO, -Vec3::Z)).unwrap();
        assert!((t - 2.0).abs() < 1e-4);

        // Cube spans x in [4, 6]
        let t = hit(&world, Ray::new(Vec3::new(0.0, 0.0, 0.0), Vec3::X)).unwrap();
        assert!((t - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_shared_material_converted_once() {
        let shared = grey();
        let mut scene = Scene::new("shared");
        for x in [-2.0, 2.0] {
            scene.add_object(
                "ball",
                Shape::Sphere { radius: 1.0 },
                Transform::from_translation(Vec3::new(x, 0.0, -5.0)),
                shared.clone(),
            );
        }
        let world = build_world(&scene).unwrap();

        let material_at = |x: f32| {
            let mut rec = HitRecord::default();
            assert!(world.bvh.hit(
                &Ray::new(Vec3::new(x, 0.0, 0.0), -Vec3::Z),
                Interval::new(0.001, f32::INFINITY),
                &mut rec
            ));
            rec.material.map(|m| m as *const Material)
        };
        assert_eq!(material_at(-2.0), material_at(2.0));
    }

    #[test]
    fn test_material_models() {
        let mut textures = TextureCache::new();

        let mut source = ivar_core::Material::new("m", Vec3::splat(0.8));
        assert!(matches!(
            convert_material(&source, &mut textures).unwrap(),
            Material::Lambertian(_)
        ));

        source.metallic = 1.0;
        source.roughness = 0.2;
        match convert_material(&source, &mut textures).unwrap() {
            Material::Metal(metal) => assert!((metal.fuzz() - 0.2).abs() < 1e-6),
            _ => panic!("expected metal"),
        }

        source.opacity = 0.5;
        source.ior = 1.33;
        match convert_material(&source, &mut textures).unwrap() {
            Material::Dielectric(glass) => assert!((glass.ior() - 1.33).abs() < 1e-6),
            _ => panic!("expected dielectric"),
        }

        source.emissive_color = Vec3::splat(5.0);
        assert!(matches!(
            convert_material(&source, &mut textures).unwrap(),
            Material::DiffuseLight(_)
        ));
    }

    #[test]
    fn test_rejects_bad_radius() {
        for radius in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let mut scene = Scene::new("bad");
            scene.add_object("ball", Shape::Sphere { radius }, Transform::default(), grey());
            assert!(matches!(
                build_world(&scene),
                Err(InvalidSceneError::InvalidRadius { .. })
            ));
        }
    }

    #[test]
    fn test_rejects_non_finite_triangle() {
        let mut scene = Scene::new("bad");
        scene.add_object(
            "tri",
            Shape::Triangle {
                vertices: [Vec3::ZERO, Vec3::X, Vec3::new(0.0, f32::NAN, 0.0)],
            },
            Transform::default(),
            grey(),
        );
        assert!(matches!(
            build_world(&scene),
            Err(InvalidSceneError::NonFiniteGeometry { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_meshes() {
        let out_of_range = ivar_core::Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 7]);
        let mut scene = Scene::new("bad");
        scene.add_object(
            "mesh",
            Shape::Mesh(Arc::new(out_of_range)),
            Transform::default(),
            grey(),
        );
        assert!(matches!(
            build_world(&scene),
            Err(InvalidSceneError::Mesh {
                source: ivar_core::MeshError::IndexOutOfRange { index: 7, .. },
                ..
            })
        ));

        let empty = ivar_core::Mesh::new(vec![Vec3::ZERO], vec![]);
        let mut scene = Scene::new("empty");
        scene.add_object("mesh", Shape::Mesh(Arc::new(empty)), Transform::default(), grey());
        assert!(matches!(
            build_world(&scene),
            Err(InvalidSceneError::EmptyMesh { .. })
        ));
    }

    #[test]
    fn test_rejects_degenerate_light() {
        let mut scene = Scene::new("bad");
        scene.add_object("ball", Shape::Sphere { radius: 1.0 }, Transform::default(), grey());
        scene.add_light(
            "spot",
            LightComponent::new(LightKind::Spot, Vec3::ONE, 1.0),
            Transform::default().with_scale(Vec3::ZERO),
        );
        assert!(matches!(
            build_world(&scene),
            Err(InvalidSceneError::DegenerateLightDirection { .. })
        ));
    }

    #[test]
    fn test_missing_texture_and_skybox_fail() {
        let mut material = ivar_core::Material::new("tex", Vec3::ONE);
        material.diffuse_texture = Some("/nonexistent/ivar/albedo.png".to_string());
        let mut scene = Scene::new("bad");
        scene.add_object(
            "ball",
            Shape::Sphere { radius: 1.0 },
            Transform::default(),
            Arc::new(material),
        );
        assert!(matches!(
            build_world(&scene),
            Err(InvalidSceneError::Texture(_))
        ));

        let mut scene = Scene::new("sky");
        scene.add_object("ball", Shape::Sphere { radius: 1.0 }, Transform::default(), grey());
        scene.skybox = Some(SkyboxSource::new("/nonexistent/ivar/sky"));
        assert!(matches!(
            build_world(&scene),
            Err(InvalidSceneError::Texture(_))
        ));
    }

    #[test]
    fn test_empty_scene_is_a_build_error() {
        let scene = Scene::new("empty");
        assert!(matches!(
            build_world(&scene),
            Err(InvalidSceneError::Build(crate::BuildError::Empty))
        ));
    }
}
