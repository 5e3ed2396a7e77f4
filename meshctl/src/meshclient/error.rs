//! Typed errors of the mesh REST client

use crate::http::HttpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeshClientError {
    #[error("{kind} {name} not found")]
    NotFound { kind: &'static str, name: String },

    #[error("{kind} {name} already exists")]
    Conflict { kind: &'static str, name: String },

    #[error("call {method} {url} failed, return status code {status} text {body}")]
    UnexpectedStatus {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("invalid mesh API url {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("unmarshal data to {kind}: {source}")]
    Decode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl MeshClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, MeshClientError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, MeshClientError::Conflict { .. })
    }
}

pub type MeshClientResult<T> = std::result::Result<T, MeshClientError>;
