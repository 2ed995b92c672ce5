//! Analytic lights for direct illumination.
//!
//! Each light is evaluated with Blinn-Phong shading gated by a shadow ray
//! traced against the world. Lights have no area, so they never show up in
//! camera rays; only surfaces with an emissive material do.

use crate::{HitRecord, Hittable, InvalidSceneError, Ray};
use ivar_core::{LightComponent, LightKind};
use ivar_math::{Color, Interval, Mat4, Vec3};

/// Specular exponent for the Blinn-Phong highlight.
pub const SHININESS: f32 = 32.0;

/// Offset keeping shadow rays off the surface they start on.
pub const SHADOW_EPSILON: f32 = 0.001;

/// Width, in cosine, of the soft edge inside a spot cone.
const SPOT_EDGE_WIDTH: f32 = 0.1;

/// A light as seen by one render, already in world space.
#[derive(Debug, Clone)]
pub struct RtLight {
    pub kind: LightKind,
    pub position: Vec3,
    /// Unit vector the light travels along (directional and spot)
    pub direction: Vec3,
    pub color: Color,
    pub intensity: f32,
    /// Spot cone half-angle in radians
    pub spot_angle: f32,
    /// `k` in `1 / (1 + k d²)`
    pub attenuation: f32,
}

impl RtLight {
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            position: Vec3::ZERO,
            direction: -Vec3::Z,
            color,
            intensity,
            spot_angle: 0.0,
            attenuation: 0.0,
        }
    }

    pub fn directional(direction: Vec3, color: Color, intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional,
            direction: direction.normalize(),
            ..Self::ambient(color, intensity)
        }
    }

    pub fn point(position: Vec3, color: Color, intensity: f32, attenuation: f32) -> Self {
        Self {
            kind: LightKind::Point,
            position,
            attenuation,
            ..Self::ambient(color, intensity)
        }
    }

    pub fn spot(
        position: Vec3,
        direction: Vec3,
        spot_angle: f32,
        color: Color,
        intensity: f32,
        attenuation: f32,
    ) -> Self {
        Self {
            kind: LightKind::Spot,
            position,
            direction: direction.normalize(),
            spot_angle,
            attenuation,
            ..Self::ambient(color, intensity)
        }
    }

    /// Snapshot an editor light component placed by `world` (local -Z is forward).
    pub fn from_component(
        component: &LightComponent,
        world: &Mat4,
        name: &str,
    ) -> Result<Self, InvalidSceneError> {
        let position = world.transform_point3(Vec3::ZERO);
        let forward = world.transform_vector3(-Vec3::Z);

        let needs_direction = matches!(component.kind, LightKind::Directional | LightKind::Spot);
        if needs_direction && !(forward.is_finite() && forward.length_squared() > 1e-12) {
            return Err(InvalidSceneError::DegenerateLightDirection {
                light: name.to_string(),
            });
        }

        Ok(Self {
            kind: component.kind,
            position,
            direction: forward.try_normalize().unwrap_or(-Vec3::Z),
            color: component.color,
            intensity: component.intensity,
            spot_angle: component.spot_angle.to_radians(),
            attenuation: component.attenuation,
        })
    }

    /// Light reflected towards `view_dir` at `point`.
    ///
    /// `normal` and `view_dir` are unit vectors; `view_dir` points from the
    /// surface towards the viewer. `albedo` scales the diffuse term.
    pub fn contribution(
        &self,
        point: Vec3,
        normal: Vec3,
        view_dir: Vec3,
        albedo: Color,
        world: &dyn Hittable,
    ) -> Color {
        let radiance = self.color * self.intensity;

        let (to_light, falloff, shadow_t) = match self.kind {
            LightKind::Ambient => return radiance * albedo,
            LightKind::Directional => (
                -self.direction,
                1.0,
                Interval::new(SHADOW_EPSILON, f32::INFINITY),
            ),
            LightKind::Point | LightKind::Spot => {
                let offset = self.position - point;
                let distance = offset.length();
                if distance <= SHADOW_EPSILON {
                    return Color::ZERO;
                }
                let to_light = offset / distance;

                let mut falloff = 1.0 / (1.0 + self.attenuation * distance * distance);
                if self.kind == LightKind::Spot {
                    falloff *= self.spot_factor(to_light);
                }

                (
                    to_light,
                    falloff,
                    Interval::new(SHADOW_EPSILON, distance - SHADOW_EPSILON),
                )
            }
        };

        // A surface facing away from the light gets neither diffuse nor specular
        let n_dot_l = normal.dot(to_light);
        if falloff <= 0.0 || n_dot_l <= 0.0 || occluded(world, point, to_light, shadow_t) {
            return Color::ZERO;
        }

        let diffuse = albedo * n_dot_l;
        let half_dir = (to_light + view_dir).normalize_or_zero();
        let specular = normal.dot(half_dir).max(0.0).powf(SHININESS);

        (diffuse + Color::splat(specular)) * radiance * falloff
    }

    /// 1 well inside the cone, 0 outside, linear across the edge band.
    fn spot_factor(&self, to_light: Vec3) -> f32 {
        let cos_theta = (-to_light).dot(self.direction);
        let cutoff = self.spot_angle.cos();
        ((cos_theta - cutoff) / SPOT_EDGE_WIDTH).clamp(0.0, 1.0)
    }
}

fn occluded(world: &dyn Hittable, point: Vec3, to_light: Vec3, shadow_t: Interval) -> bool {
    if shadow_t.is_empty() {
        return false;
    }
    let shadow_ray = Ray::new(point, to_light);
    let mut rec = HitRecord::default();
    world.hit(&shadow_ray, shadow_t, &mut rec)
}

/// All lights of one render.
#[derive(Debug, Clone, Default)]
pub struct SceneLights {
    lights: Vec<RtLight>,
}

impl SceneLights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, light: RtLight) {
        self.lights.push(light);
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RtLight> {
        self.lights.iter()
    }

    /// Sum of every light's contribution at a surface point.
    pub fn compute_total_lighting(
        &self,
        point: Vec3,
        normal: Vec3,
        view_dir: Vec3,
        albedo: Color,
        world: &dyn Hittable,
    ) -> Color {
        self.lights
            .iter()
            .map(|light| light.contribution(point, normal, view_dir, albedo, world))
            .sum()
    }
}

impl FromIterator<RtLight> for SceneLights {
    fn from_iter<I: IntoIterator<Item = RtLight>>(iter: I) -> Self {
        Self {
            lights: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HittableList, Lambertian, Sphere};
    use ivar_core::Transform;
    use ivar_math::Quat;
    use std::sync::Arc;

    fn empty_world() -> HittableList {
        HittableList::new()
    }

    fn blocker_at(center: Vec3) -> HittableList {
        let mut world = HittableList::new();
        world.add(Sphere::new(
            center,
            0.5,
            Arc::new(Lambertian::new(Color::ONE).into()),
        ));
        world
    }

    #[test]
    fn test_ambient_ignores_geometry() {
        let light = RtLight::ambient(Color::new(1.0, 0.5, 0.0), 0.2);
        let lit = light.contribution(
            Vec3::ZERO,
            Vec3::Y,
            Vec3::Y,
            Color::splat(0.5),
            &blocker_at(Vec3::new(0.0, 1.0, 0.0)),
        );
        assert!((lit - Color::new(0.1, 0.05, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_directional_head_on() {
        let light = RtLight::directional(-Vec3::Y, Color::ONE, 2.0);
        let lit = light.contribution(
            Vec3::ZERO,
            Vec3::Y,
            Vec3::Y,
            Color::splat(0.5),
            &empty_world(),
        );
        // (0.5 diffuse + 1.0 specular) * 2
        assert!((lit - Color::splat(3.0)).length() < 1e-5);
    }

    #[test]
    fn test_directional_from_below_is_dark_diffuse() {
        let light = RtLight::directional(Vec3::Y, Color::ONE, 1.0);
        let lit = light.contribution(
            Vec3::ZERO,
            Vec3::Y,
            Vec3::Y,
            Color::splat(0.5),
            &empty_world(),
        );
        assert_eq!(lit, Color::ZERO);
    }

    #[test]
    fn test_no_highlight_when_lit_from_behind() {
        // Light just below the horizon, viewer placed so the half vector sits
        // close to the normal
        let to_light = Vec3::new(1.0, -0.2, 0.0).normalize();
        let view_dir = Vec3::new(-0.9, 0.436, 0.0).normalize();
        assert!(normal_dot_half(Vec3::Y, to_light, view_dir) > 0.9);

        let light = RtLight::directional(-to_light, Color::ONE, 1.0);
        let lit = light.contribution(Vec3::ZERO, Vec3::Y, view_dir, Color::ONE, &empty_world());
        assert_eq!(lit, Color::ZERO);
    }

    fn normal_dot_half(normal: Vec3, to_light: Vec3, view_dir: Vec3) -> f32 {
        normal.dot((to_light + view_dir).normalize())
    }

    #[test]
    fn test_directional_shadowed() {
        let light = RtLight::directional(-Vec3::Y, Color::ONE, 1.0);
        let world = blocker_at(Vec3::new(0.0, 10.0, 0.0));
        let lit = light.contribution(Vec3::ZERO, Vec3::Y, Vec3::Y, Color::ONE, &world);
        assert_eq!(lit, Color::ZERO);
    }

    #[test]
    fn test_point_attenuation() {
        let light = RtLight::point(Vec3::new(0.0, 2.0, 0.0), Color::ONE, 1.0, 0.1);
        let lit = light.contribution(
            Vec3::ZERO,
            Vec3::Y,
            Vec3::Y,
            Color::ONE,
            &empty_world(),
        );
        // (1 + 1) / (1 + 0.1 * 4)
        assert!((lit.x - 2.0 / 1.4).abs() < 1e-5);
    }

    #[test]
    fn test_point_shadow_stops_at_light() {
        let light = RtLight::point(Vec3::new(0.0, 2.0, 0.0), Color::ONE, 1.0, 0.0);

        // Beyond the light: no shadow
        let lit = light.contribution(
            Vec3::ZERO,
            Vec3::Y,
            Vec3::Y,
            Color::ONE,
            &blocker_at(Vec3::new(0.0, 5.0, 0.0)),
        );
        assert!(lit.x > 0.0);

        // Between surface and light: shadow
        let lit = light.contribution(
            Vec3::ZERO,
            Vec3::Y,
            Vec3::Y,
            Color::ONE,
            &blocker_at(Vec3::new(0.0, 1.0, 0.0)),
        );
        assert_eq!(lit, Color::ZERO);
    }

    #[test]
    fn test_spot_cone() {
        let light = RtLight::spot(
            Vec3::new(0.0, 5.0, 0.0),
            -Vec3::Y,
            30f32.to_radians(),
            Color::ONE,
            1.0,
            0.0,
        );
        let world = empty_world();
        let at = |x: f32| {
            light
                .contribution(Vec3::new(x, 0.0, 0.0), Vec3::Y, Vec3::Y, Color::ONE, &world)
                .x
        };

        assert!(at(0.0) > 0.0);
        assert_eq!(at(3.5), 0.0);

        // Monotone through the soft edge (roughly x in [1.34, 2.89])
        let samples: Vec<f32> = (0..=40).map(|i| at(i as f32 * 0.1)).collect();
        for pair in samples.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-6);
        }
        assert!(at(2.0) > 0.0 && at(2.0) < at(1.0));
    }

    #[test]
    fn test_from_component_uses_world_transform() {
        let component = LightComponent::new(LightKind::Spot, Color::ONE, 1.0).with_spot_angle(45.0);
        let transform = Transform::from_translation(Vec3::new(1.0, 4.0, 0.0))
            .with_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2));

        let light = RtLight::from_component(&component, &transform.to_matrix(), "key").unwrap();
        assert!((light.position - Vec3::new(1.0, 4.0, 0.0)).length() < 1e-5);
        assert!((light.direction - -Vec3::Y).length() < 1e-5);
        assert!((light.spot_angle - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
    }

    #[test]
    fn test_from_component_rejects_degenerate_direction() {
        let component = LightComponent::new(LightKind::Directional, Color::ONE, 1.0);
        let transform = Transform::default().with_scale(Vec3::ZERO);

        let result = RtLight::from_component(&component, &transform.to_matrix(), "sun");
        assert!(matches!(
            result,
            Err(InvalidSceneError::DegenerateLightDirection { .. })
        ));

        // Point lights have no direction to degenerate
        let point = LightComponent::new(LightKind::Point, Color::ONE, 1.0);
        assert!(RtLight::from_component(&point, &transform.to_matrix(), "bulb").is_ok());
    }

    #[test]
    fn test_total_lighting_sums_lights() {
        let lights: SceneLights = [
            RtLight::ambient(Color::ONE, 0.25),
            RtLight::ambient(Color::ONE, 0.5),
        ]
        .into_iter()
        .collect();

        let total =
            lights.compute_total_lighting(Vec3::ZERO, Vec3::Y, Vec3::Y, Color::ONE, &empty_world());
        assert!((total - Color::splat(0.75)).length() < 1e-6);
        assert_eq!(lights.len(), 2);
    }
}
