//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing bounded by the camera's max depth
//! - Direct analytic lighting with shadow rays
//! - Anti-aliasing via jittered multi-sampling
//! - Gamma correction into a caller-owned RGB8 buffer
//!
//! Every sample draws from its own generator seeded from the render seed
//! and the sample's pixel and index, so the output does not depend on how
//! rows are distributed over threads.

use crate::bands::{split_rows, RowBand};
use crate::{skybox, Camera, HitRecord, Hittable, Ray, RenderError, SceneLights, Skybox};
use ivar_math::{Color, Interval};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;

/// Weight of the bounced light when analytic lights are present.
pub const DEFAULT_INDIRECT_WEIGHT: f32 = 0.3;

/// Worker count when the hardware concurrency cannot be detected.
pub const FALLBACK_THREAD_COUNT: usize = 4;

/// Closest distance accepted for a secondary hit (avoids shadow acne).
const RAY_T_MIN: f32 = 0.001;

/// Bytes per output pixel (RGB8).
const CHANNELS: usize = 3;

/// Render configuration beyond the camera.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Base seed for every per-sample generator
    pub seed: u64,
    /// Worker threads; `None` uses the detected hardware concurrency
    pub threads: Option<usize>,
    /// Scale on indirect light when analytic lights are present
    pub indirect_weight: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            threads: None,
            indirect_weight: DEFAULT_INDIRECT_WEIGHT,
        }
    }
}

impl RenderSettings {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_indirect_weight(mut self, weight: f32) -> Self {
        self.indirect_weight = weight;
        self
    }

    /// Worker count actually used: configured, else detected, else 4.
    pub fn thread_count(&self) -> usize {
        self.threads
            .filter(|&n| n > 0)
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(FALLBACK_THREAD_COUNT)
    }
}

/// Read-only scene data shared by all workers during one render.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub world: &'a dyn Hittable,
    pub lights: Option<&'a SceneLights>,
    pub skybox: Option<&'a Skybox>,
}

impl<'a> RenderContext<'a> {
    pub fn new(world: &'a dyn Hittable) -> Self {
        Self {
            world,
            lights: None,
            skybox: None,
        }
    }

    pub fn with_lights(mut self, lights: &'a SceneLights) -> Self {
        self.lights = Some(lights);
        self
    }

    pub fn with_skybox(mut self, skybox: &'a Skybox) -> Self {
        self.skybox = Some(skybox);
        self
    }

    /// Lights to shade with; an empty collection counts as none.
    fn active_lights(&self) -> Option<&'a SceneLights> {
        self.lights.filter(|lights| !lights.is_empty())
    }

    fn background(&self, ray: &Ray) -> Color {
        match self.skybox {
            Some(sky) => sky.sample(ray.direction()),
            None => skybox::gradient(ray.direction().normalize_or_zero()),
        }
    }
}

/// Compute the color seen by a ray.
pub fn ray_color(
    ray: &Ray,
    ctx: &RenderContext,
    depth: u32,
    settings: &RenderSettings,
    rng: &mut dyn RngCore,
) -> Color {
    if depth == 0 {
        return Color::ZERO;
    }

    let mut rec = HitRecord::default();
    if !ctx
        .world
        .hit(ray, Interval::new(RAY_T_MIN, f32::INFINITY), &mut rec)
    {
        return ctx.background(ray);
    }

    // No material: emits black and never scatters
    let Some(material) = rec.material else {
        return Color::ZERO;
    };

    let emitted = material.emitted(rec.u, rec.v, rec.p);

    let Some(scatter) = material.scatter(ray, &rec, rng) else {
        return emitted;
    };

    let indirect =
        scatter.attenuation * ray_color(&scatter.scattered, ctx, depth - 1, settings, rng);

    match ctx.active_lights() {
        Some(lights) => {
            let view_dir = -ray.direction().normalize();
            let direct = lights.compute_total_lighting(
                rec.p,
                rec.normal,
                view_dir,
                scatter.attenuation,
                ctx.world,
            );
            emitted + direct + indirect * settings.indirect_weight
        }
        None => emitted + indirect,
    }
}

/// Average of `samples_per_pixel` samples for pixel (x, y), y = 0 at the top.
///
/// The camera must already be initialized.
pub fn render_pixel(
    camera: &Camera,
    ctx: &RenderContext,
    settings: &RenderSettings,
    x: u32,
    y: u32,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for sample in 0..camera.samples_per_pixel {
        let mut rng = SmallRng::seed_from_u64(sample_seed(settings.seed, x, y, sample));
        let ray = camera.get_ray(x, y, &mut rng);
        pixel_color += ray_color(&ray, ctx, camera.max_depth, settings, &mut rng);
    }

    pixel_color / camera.samples_per_pixel.max(1) as f32
}

/// Render into `buffer`: `width * height * 3` bytes, RGB8.
///
/// Buffer row 0 is the bottom row of the image. Blocks until every band is
/// done.
pub fn render(
    camera: &mut Camera,
    ctx: &RenderContext,
    settings: &RenderSettings,
    buffer: &mut [u8],
) -> Result<(), RenderError> {
    camera.validate()?;
    camera.initialize();
    let camera: &Camera = camera;

    let width = camera.image_width;
    let height = camera.image_height();
    let row_bytes = width as usize * CHANNELS;

    let expected = row_bytes * height as usize;
    if buffer.len() != expected {
        return Err(RenderError::BufferSize {
            expected,
            actual: buffer.len(),
        });
    }

    let threads = settings.thread_count();
    let bands = split_rows(height, threads);
    log::info!(
        "Rendering {}x{} @ {} spp, depth {}, {} threads",
        width,
        height,
        camera.samples_per_pixel,
        camera.max_depth,
        threads
    );
    let start = Instant::now();

    // Hand each band its own disjoint slice of the buffer
    let mut work: Vec<(RowBand, &mut [u8])> = Vec::with_capacity(bands.len());
    let mut rest = buffer;
    for band in bands {
        let (slice, tail) = rest.split_at_mut(band.rows() as usize * row_bytes);
        work.push((band, slice));
        rest = tail;
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()?;

    pool.install(|| {
        work.into_par_iter().for_each(|(band, slice)| {
            render_band(camera, ctx, settings, band, slice, height);
        });
    });

    let elapsed = start.elapsed();
    log::info!(
        "Render complete in {:.2}s ({:.0} px/s)",
        elapsed.as_secs_f32(),
        (width * height) as f32 / elapsed.as_secs_f32().max(1e-6)
    );

    Ok(())
}

/// Allocate a buffer of the right size and render into it.
pub fn render_to_vec(
    camera: &mut Camera,
    ctx: &RenderContext,
    settings: &RenderSettings,
) -> Result<Vec<u8>, RenderError> {
    camera.validate()?;
    let len = camera.image_width as usize * camera.image_height() as usize * CHANNELS;
    let mut buffer = vec![0; len];
    render(camera, ctx, settings, &mut buffer)?;
    Ok(buffer)
}

fn render_band(
    camera: &Camera,
    ctx: &RenderContext,
    settings: &RenderSettings,
    band: RowBand,
    slice: &mut [u8],
    height: u32,
) {
    let row_bytes = camera.image_width as usize * CHANNELS;

    for (row, bytes) in (band.start..band.end).zip(slice.chunks_exact_mut(row_bytes)) {
        // Buffer is bottom-up
        let y = height - 1 - row;
        for (x, pixel) in (0..camera.image_width).zip(bytes.chunks_exact_mut(CHANNELS)) {
            let color = render_pixel(camera, ctx, settings, x, y);
            pixel.copy_from_slice(&color_to_rgb(color));
        }
    }
}

/// Apply gamma correction (gamma = 2.0). Negative input maps to 0.
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Gamma-correct, clamp to [0, 0.999] and quantize a linear color.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let intensity = Interval::new(0.0, 0.999);
    let quantize = |c: f32| (256.0 * intensity.clamp(linear_to_gamma(c))) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Seed for one sample's generator (splitmix64 over the packed inputs).
pub fn sample_seed(seed: u64, x: u32, y: u32, sample: u32) -> u64 {
    let mut h = seed;
    for word in [x as u64, y as u64, sample as u64] {
        h = splitmix64(h ^ word.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    }
    h
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bvh, DiffuseLight, Lambertian, Material, RtLight, Sphere, Surface};
    use ivar_math::Vec3;
    use std::sync::Arc;

    fn grey_sphere_world() -> Bvh<Surface> {
        let grey: Arc<Material> = Arc::new(Lambertian::new(Color::splat(0.5)).into());
        Bvh::new(vec![Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, grey).into()]).unwrap()
    }

    fn small_camera() -> Camera {
        Camera::new()
            .with_resolution(16, 2.0)
            .with_quality(2, 3)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-0.5), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgb_clamps() {
        assert_eq!(color_to_rgb(Color::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb(Color::splat(4.0)), [255, 255, 255]);
        assert_eq!(color_to_rgb(Color::new(0.25, -1.0, 1.0)), [128, 0, 255]);
    }

    #[test]
    fn test_zero_depth_is_black() {
        let world = grey_sphere_world();
        let ctx = RenderContext::new(&world);
        let mut rng = SmallRng::seed_from_u64(1);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);

        let color = ray_color(&ray, &ctx, 0, &RenderSettings::default(), &mut rng);
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_miss_samples_gradient() {
        let world = grey_sphere_world();
        let ctx = RenderContext::new(&world);
        let mut rng = SmallRng::seed_from_u64(1);

        let up = ray_color(
            &Ray::new(Vec3::ZERO, Vec3::Y),
            &ctx,
            5,
            &RenderSettings::default(),
            &mut rng,
        );
        assert!((up - Color::new(0.5, 0.7, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_emitter_returns_emission() {
        let light: Arc<Material> = Arc::new(DiffuseLight::new(Color::splat(3.0)).into());
        let world = Bvh::new(vec![Surface::from(Sphere::new(
            Vec3::new(0.0, 0.0, -2.0),
            1.0,
            light,
        ))])
        .unwrap();
        let ctx = RenderContext::new(&world);
        let mut rng = SmallRng::seed_from_u64(1);

        let color = ray_color(
            &Ray::new(Vec3::ZERO, -Vec3::Z),
            &ctx,
            5,
            &RenderSettings::default(),
            &mut rng,
        );
        assert_eq!(color, Color::splat(3.0));
    }

    #[test]
    fn test_empty_lights_count_as_none() {
        let world = grey_sphere_world();
        let no_lights = SceneLights::new();
        let settings = RenderSettings::default();
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);

        let plain = RenderContext::new(&world);
        let with_empty = RenderContext::new(&world).with_lights(&no_lights);

        let a = ray_color(&ray, &plain, 4, &settings, &mut SmallRng::seed_from_u64(9));
        let b = ray_color(&ray, &with_empty, 4, &settings, &mut SmallRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_indirect_weight_scales_bounce() {
        let world = grey_sphere_world();
        // An ambient light leaves the direct term independent of geometry
        let lights: SceneLights = [RtLight::ambient(Color::ONE, 0.0)].into_iter().collect();
        let ctx = RenderContext::new(&world).with_lights(&lights);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);

        let full = RenderSettings::default().with_indirect_weight(1.0);
        let none = RenderSettings::default().with_indirect_weight(0.0);

        let lit = ray_color(&ray, &ctx, 4, &full, &mut SmallRng::seed_from_u64(2));
        let dark = ray_color(&ray, &ctx, 4, &none, &mut SmallRng::seed_from_u64(2));
        assert!(lit.length() > 0.0);
        assert_eq!(dark, Color::ZERO);
    }

    #[test]
    fn test_render_rejects_wrong_buffer() {
        let world = grey_sphere_world();
        let ctx = RenderContext::new(&world);
        let mut camera = small_camera();

        let mut buffer = vec![0u8; 10];
        let result = render(&mut camera, &ctx, &RenderSettings::default(), &mut buffer);
        assert!(matches!(
            result,
            Err(RenderError::BufferSize {
                expected: 192,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_render_rejects_invalid_camera() {
        let world = grey_sphere_world();
        let ctx = RenderContext::new(&world);
        let mut camera = small_camera().with_quality(0, 3);

        let result = render_to_vec(&mut camera, &ctx, &RenderSettings::default());
        assert!(matches!(result, Err(RenderError::InvalidCamera(_))));
    }

    #[test]
    fn test_render_is_thread_count_independent() {
        let world = grey_sphere_world();
        let ctx = RenderContext::new(&world);

        let one = render_to_vec(
            &mut small_camera(),
            &ctx,
            &RenderSettings::default().with_seed(5).with_threads(1),
        )
        .unwrap();
        let three = render_to_vec(
            &mut small_camera(),
            &ctx,
            &RenderSettings::default().with_seed(5).with_threads(3),
        )
        .unwrap();

        assert_eq!(one.len(), 16 * 8 * 3);
        assert_eq!(one, three);
    }

    #[test]
    fn test_buffer_is_bottom_up() {
        // Sky only: the top of the image is bluer (less red) than the bottom
        let world = Bvh::new(vec![Surface::from(Sphere::new(
            Vec3::new(0.0, 0.0, 50.0),
            0.5,
            Arc::new(Lambertian::new(Color::ONE).into()),
        ))])
        .unwrap();
        let ctx = RenderContext::new(&world);
        let mut camera = small_camera();

        let buffer = render_to_vec(&mut camera, &ctx, &RenderSettings::default()).unwrap();
        let row_bytes = 16 * 3;
        let first_row_red = buffer[0];
        let last_row_red = buffer[buffer.len() - row_bytes];
        assert!(first_row_red > last_row_red);
    }

    #[test]
    fn test_sample_seed_distinguishes_inputs() {
        let base = sample_seed(1, 2, 3, 4);
        assert_eq!(base, sample_seed(1, 2, 3, 4));
        assert_ne!(base, sample_seed(1, 3, 2, 4));
        assert_ne!(base, sample_seed(1, 2, 3, 5));
        assert_ne!(base, sample_seed(2, 2, 3, 4));
    }

    #[test]
    fn test_thread_count_resolution() {
        assert_eq!(RenderSettings::default().with_threads(3).thread_count(), 3);
        assert!(RenderSettings::default().thread_count() >= 1);
        assert!(RenderSettings::default().with_threads(0).thread_count() >= 1);
    }
}
