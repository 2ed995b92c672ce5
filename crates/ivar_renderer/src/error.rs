//! Error kinds surfaced while building a world or starting a render.
//!
//! Tracing itself never fails: degenerate geometry is a miss and a missing
//! material is black. Everything that can go wrong is caught before the
//! first ray is cast.

use ivar_core::{MeshError, TextureError};
use thiserror::Error;

/// Failure to build an acceleration structure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("cannot build a BVH over an empty surface collection")]
    Empty,
}

/// The editor scene cannot be turned into a traceable world.
#[derive(Error, Debug)]
pub enum InvalidSceneError {
    #[error("object '{object}': sphere radius {radius} must be positive and finite")]
    InvalidRadius { object: String, radius: f32 },

    #[error("object '{object}' has non-finite geometry")]
    NonFiniteGeometry { object: String },

    #[error("object '{object}': {source}")]
    Mesh {
        object: String,
        #[source]
        source: MeshError,
    },

    #[error("object '{object}': mesh has no triangles")]
    EmptyMesh { object: String },

    #[error("light '{light}' has a degenerate direction")]
    DegenerateLightDirection { light: String },

    #[error("texture error: {0}")]
    Texture(#[from] TextureError),

    #[error(transparent)]
    Build(#[from] BuildError),
}

/// A render call was rejected before tracing started.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid camera: {0}")]
    InvalidCamera(&'static str),

    #[error("output buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("failed to start render workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
