//! Cube-map environment for rays that leave the scene.

use ivar_core::{Texture, TextureError, TextureResult};
use ivar_math::{Color, Vec3};
use std::path::Path;

/// Extension tried when the configured one is missing.
const FALLBACK_EXTENSION: &str = "png";

/// Zenith color of the fallback sky gradient.
const SKY_BLUE: Color = Color::new(0.5, 0.7, 1.0);

/// Cube faces, in file-name order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeFace {
    Right,
    Left,
    Top,
    Bottom,
    Front,
    Back,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::Right,
        CubeFace::Left,
        CubeFace::Top,
        CubeFace::Bottom,
        CubeFace::Front,
        CubeFace::Back,
    ];

    pub fn file_stem(self) -> &'static str {
        match self {
            CubeFace::Right => "right",
            CubeFace::Left => "left",
            CubeFace::Top => "top",
            CubeFace::Bottom => "bottom",
            CubeFace::Front => "front",
            CubeFace::Back => "back",
        }
    }

    /// Face hit by a unit direction, with face-local (u, v) in [0, 1].
    ///
    /// v = 0 is the top row of the face image.
    fn project(dir: Vec3) -> (CubeFace, f32, f32) {
        let abs = dir.abs();
        let (face, sc, tc, ma) = if abs.x >= abs.y && abs.x >= abs.z {
            if dir.x > 0.0 {
                (CubeFace::Right, -dir.z, -dir.y, abs.x)
            } else {
                (CubeFace::Left, dir.z, -dir.y, abs.x)
            }
        } else if abs.y >= abs.z {
            if dir.y > 0.0 {
                (CubeFace::Top, dir.x, dir.z, abs.y)
            } else {
                (CubeFace::Bottom, dir.x, -dir.z, abs.y)
            }
        } else if dir.z > 0.0 {
            (CubeFace::Front, dir.x, -dir.y, abs.z)
        } else {
            (CubeFace::Back, -dir.x, -dir.y, abs.z)
        };

        let u = 0.5 * (sc / ma + 1.0);
        let v = 0.5 * (tc / ma + 1.0);
        (face, u.clamp(0.0, 1.0), v.clamp(0.0, 1.0))
    }
}

/// Six-face environment map. Falls back to a sky gradient when not loaded.
#[derive(Debug, Clone, Default)]
pub struct Skybox {
    /// Indexed by `CubeFace as usize`; empty when not loaded
    faces: Vec<Texture>,
}

impl Skybox {
    /// A skybox with no faces; samples the gradient.
    pub fn gradient() -> Self {
        Self::default()
    }

    pub fn from_faces(faces: [Texture; 6]) -> Self {
        Self {
            faces: faces.into(),
        }
    }

    /// Load `right/left/top/bottom/front/back.<extension>` from `folder`.
    ///
    /// Each face that is missing with `extension` is retried as PNG.
    pub fn load(folder: impl AsRef<Path>, extension: &str) -> TextureResult<Self> {
        let folder = folder.as_ref();
        let faces = CubeFace::ALL
            .iter()
            .map(|&face| load_face(folder, face, extension))
            .collect::<TextureResult<Vec<_>>>()?;
        log::info!("Loaded skybox from {}", folder.display());

        Ok(Self { faces })
    }

    pub fn is_loaded(&self) -> bool {
        self.faces.len() == CubeFace::ALL.len()
    }

    /// Environment color seen along `direction` (need not be unit length).
    pub fn sample(&self, direction: Vec3) -> Color {
        let dir = direction.normalize_or_zero();

        if !self.is_loaded() || dir == Vec3::ZERO {
            return gradient(dir);
        }

        let (face, u, v) = CubeFace::project(dir);
        self.faces[face as usize].sample(u, v)
    }
}

/// White at and below the horizon blending to blue at the zenith.
pub fn gradient(unit_direction: Vec3) -> Color {
    let a = 0.5 * (unit_direction.y + 1.0);
    (1.0 - a) * Color::ONE + a * SKY_BLUE
}

fn load_face(folder: &Path, face: CubeFace, extension: &str) -> TextureResult<Texture> {
    let primary = folder.join(face.file_stem()).with_extension(extension);
    match Texture::load(&primary) {
        Err(TextureError::NotFound(_)) if extension != FALLBACK_EXTENSION => {
            let fallback = primary.with_extension(FALLBACK_EXTENSION);
            log::warn!(
                "Skybox face {} not found, trying {}",
                primary.display(),
                fallback.display()
            );
            Texture::load(fallback)
        }
        result => result,
    }
}
