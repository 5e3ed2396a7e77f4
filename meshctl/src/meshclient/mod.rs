//! Client for the mesh control plane REST API
//!
//! Objects live under `http://<server>/apis/v2/mesh/<collection>`. One
//! generic [`ResourceClient`] serves every [`MeshObject`]; accessors such as
//! [`MeshClient::http_route_groups`] pin it to a concrete kind.

pub mod error;
pub mod resources;

pub use error::{MeshClientError, MeshClientResult};
pub use resources::ResourceClient;

use crate::http::HttpJson;
use meshctl_common::{HttpRouteGroup, MeshObject};

/// Path prefix of the mesh API
pub const API_URL: &str = "/apis/v2";

#[derive(Debug, Clone)]
pub struct MeshClient {
    base_url: String,
    http: HttpJson,
}

impl MeshClient {
    /// `server` is `host:port`; an explicit `http://` or `https://` scheme is kept
    pub fn new(server: &str) -> Self {
        let server = server.trim_end_matches('/');
        let base_url = if server.starts_with("http://") || server.starts_with("https://") {
            server.to_string()
        } else {
            format!("http://{}", server)
        };

        Self {
            base_url,
            http: HttpJson::new(),
        }
    }

    pub fn with_http(mut self, http: HttpJson) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &HttpJson {
        &self.http
    }

    /// URL of the collection a kind is served under
    pub(crate) fn collection_url<T: MeshObject>(&self) -> String {
        format!("{}{}/mesh/{}", self.base_url, API_URL, T::PATH)
    }

    pub fn resources<T: MeshObject>(&self) -> ResourceClient<'_, T> {
        ResourceClient::new(self)
    }

    pub fn http_route_groups(&self) -> ResourceClient<'_, HttpRouteGroup> {
        self.resources()
    }
}
