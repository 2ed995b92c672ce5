//! Simple ray tracer example.
//!
//! Builds a small editor scene, renders it in parallel and saves a PNG.
//!
//! ```text
//! RUST_LOG=info cargo run --release --example simple_render -- output.png
//! ```

use anyhow::{Context, Result};
use ivar_core::{LightComponent, LightKind, Material, Mesh, Scene, Shape, Transform};
use ivar_renderer::{build_world, render_to_vec, Camera, RenderSettings, Vec3};
use std::sync::Arc;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "output.png".to_string());

    let scene = build_scene();
    let world = build_world(&scene).context("scene could not be turned into a world")?;

    let mut camera = Camera::new()
        .with_resolution(800, 16.0 / 9.0)
        .with_quality(32, 8)
        .with_position(
            Vec3::new(6.0, 2.5, 6.0), // look_from
            Vec3::new(0.0, 0.5, 0.0), // look_at
            Vec3::Y,                  // vup
        )
        .with_vfov(35.0);

    let settings = RenderSettings::default().with_seed(42);
    let pixels = render_to_vec(&mut camera, &world.context(), &settings)?;

    let width = camera.image_width;
    let height = camera.image_height();
    let image = image::RgbImage::from_raw(width, height, flip_rows(&pixels, width))
        .context("render buffer does not match the image size")?;
    image
        .save(&output)
        .with_context(|| format!("failed to write {output}"))?;

    log::info!("Saved {}x{} image to {}", width, height, output);
    Ok(())
}

fn build_scene() -> Scene {
    let mut scene = Scene::new("simple_render");

    let ground = Arc::new(Material::new("ground", Vec3::new(0.5, 0.5, 0.5)));
    scene.add_object(
        "ground",
        Shape::Sphere { radius: 1000.0 },
        Transform::from_translation(Vec3::new(0.0, -1000.0, 0.0)),
        ground,
    );

    let glass = Arc::new(Material {
        opacity: 0.0,
        ior: 1.5,
        ..Material::new("glass", Vec3::ONE)
    });
    scene.add_object(
        "glass_ball",
        Shape::Sphere { radius: 1.0 },
        Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
        glass,
    );

    let clay = Arc::new(Material::new("clay", Vec3::new(0.4, 0.2, 0.1)));
    scene.add_object(
        "clay_ball",
        Shape::Sphere { radius: 1.0 },
        Transform::from_translation(Vec3::new(-2.5, 1.0, 0.0)),
        clay,
    );

    let chrome = Arc::new(Material {
        metallic: 1.0,
        roughness: 0.05,
        ..Material::new("chrome", Vec3::new(0.7, 0.6, 0.5))
    });
    scene.add_object(
        "chrome_cube",
        Shape::Mesh(Arc::new(Mesh::cube(0.75))),
        Transform::from_translation(Vec3::new(2.5, 0.75, 0.0)),
        chrome,
    );

    scene.add_light(
        "key",
        LightComponent::new(LightKind::Point, Vec3::new(1.0, 0.95, 0.9), 12.0)
            .with_attenuation(0.05),
        Transform::from_translation(Vec3::new(3.0, 5.0, 4.0)),
    );
    scene.add_light(
        "fill",
        LightComponent::new(LightKind::Ambient, Vec3::new(0.6, 0.7, 1.0), 0.15),
        Transform::default(),
    );

    scene
}

/// The render buffer is bottom-up; image files are top-down.
fn flip_rows(pixels: &[u8], width: u32) -> Vec<u8> {
    let row_bytes = width as usize * 3;
    pixels
        .chunks_exact(row_bytes)
        .rev()
        .flatten()
        .copied()
        .collect()
}
