// Vector helpers for scattering.
//
// glam::Vec3 covers the arithmetic; these are the optics operations the
// materials need on top of it.

use glam::Vec3;

/// A position in space.
pub type Point3 = Vec3;

/// Linear RGB color, one channel per component.
pub type Color = Vec3;

/// Threshold below which every component counts as zero.
const NEAR_ZERO: f32 = 1e-8;

/// Extension trait for Vec3 with the reflection/refraction operations.
pub trait Vec3Ext {
    /// True if every component is within 1e-8 of zero.
    fn near_zero(&self) -> bool;

    /// Mirror reflection about the normal `n`: `v - 2 (v·n) n`.
    fn reflect(&self, n: Vec3) -> Vec3;

    /// Snell refraction of a unit vector through a surface with unit normal `n`.
    ///
    /// `eta_ratio` is η_incident / η_transmitted. The caller must rule out
    /// total internal reflection first; the result is meaningless otherwise.
    fn refract(&self, n: Vec3, eta_ratio: f32) -> Vec3;
}

impl Vec3Ext for Vec3 {
    fn near_zero(&self) -> bool {
        self.x.abs() < NEAR_ZERO && self.y.abs() < NEAR_ZERO && self.z.abs() < NEAR_ZERO
    }

    #[inline]
    fn reflect(&self, n: Vec3) -> Vec3 {
        *self - 2.0 * self.dot(n) * n
    }

    #[inline]
    fn refract(&self, n: Vec3, eta_ratio: f32) -> Vec3 {
        let cos_theta = (-*self).dot(n).min(1.0);
        let r_out_perp = eta_ratio * (*self + cos_theta * n);
        let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
        r_out_perp + r_out_parallel
    }
}
