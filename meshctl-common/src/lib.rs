//! Common types shared between the meshctl CLI and the mesh REST client

pub mod resource;

pub use resource::{
    HttpMatch, HttpRouteGroup, HttpRouteGroupSpec, MeshObject, MeshResource, ObjectMeta,
};

/// Mesh API version carried by resources users write in YAML files
pub const MESH_API_VERSION: &str = "mesh.megaease.com/v2alpha1";

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported kind: {0}")]
    UnsupportedKind(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
