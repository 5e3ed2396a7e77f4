//! Mesh resource model
//!
//! Two shapes exist for every mesh object: the flat object the mesh REST API
//! stores (`HttpRouteGroup`) and the Kubernetes-style envelope users write
//! in manifests (`MeshResource`). Conversions live here so the CLI and the
//! client never build either shape by hand.

use crate::{Error, Result, MESH_API_VERSION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An object served by the mesh REST API under `/mesh/<PATH>`
pub trait MeshObject: Serialize + DeserializeOwned + Send + Sync {
    /// Kind name used in manifests and error messages
    const KIND: &'static str;
    /// URL collection segment
    const PATH: &'static str;

    fn name(&self) -> &str;
}

/// Manifest metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// Kubernetes-style envelope around a mesh object's spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshResource<S> {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: S,
}

impl<S> MeshResource<S> {
    pub fn new(kind: &str, name: &str, spec: S) -> Self {
        Self {
            api_version: MESH_API_VERSION.to_string(),
            kind: kind.to_string(),
            metadata: ObjectMeta {
                name: name.to_string(),
                labels: BTreeMap::new(),
            },
            spec,
        }
    }
}

/// Match rule of a route group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpMatch {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// Spec section of an `HTTPRouteGroup` manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRouteGroupSpec {
    #[serde(default)]
    pub matches: Vec<HttpMatch>,
}

/// `HTTPRouteGroup` as stored by the mesh API (v2alpha1)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRouteGroup {
    pub name: String,
    #[serde(default)]
    pub matches: Vec<HttpMatch>,
}

impl MeshObject for HttpRouteGroup {
    const KIND: &'static str = "HTTPRouteGroup";
    const PATH: &'static str = "httproutegroups";

    fn name(&self) -> &str {
        &self.name
    }
}

impl HttpRouteGroup {
    /// Build the manifest form of this route group
    pub fn to_resource(&self) -> MeshResource<HttpRouteGroupSpec> {
        MeshResource::new(
            Self::KIND,
            &self.name,
            HttpRouteGroupSpec {
                matches: self.matches.clone(),
            },
        )
    }

    /// Convert a typed manifest, rejecting a foreign kind or an empty name
    pub fn from_resource(resource: MeshResource<HttpRouteGroupSpec>) -> Result<Self> {
        if resource.kind != Self::KIND {
            return Err(Error::UnsupportedKind(resource.kind));
        }
        if resource.metadata.name.trim().is_empty() {
            return Err(Error::Validation(format!(
                "{} metadata.name must not be empty",
                Self::KIND
            )));
        }

        Ok(Self {
            name: resource.metadata.name,
            matches: resource.spec.matches,
        })
    }
}

impl TryFrom<MeshResource<serde_json::Value>> for HttpRouteGroup {
    type Error = Error;

    fn try_from(raw: MeshResource<serde_json::Value>) -> Result<Self> {
        let spec: HttpRouteGroupSpec = if raw.spec.is_null() {
            HttpRouteGroupSpec::default()
        } else {
            serde_json::from_value(raw.spec)?
        };

        Self::from_resource(MeshResource {
            api_version: raw.api_version,
            kind: raw.kind,
            metadata: raw.metadata,
            spec,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
apiVersion: mesh.megaease.com/v2alpha1
kind: HTTPRouteGroup
metadata:
  name: order-routes
spec:
  matches:
    - name: v1-orders
      pathRegex: "^/v1/orders/.*$"
      methods: [GET, POST]
      headers:
        X-Canary: "true"
    - name: health
      path: /healthz
"#;

    #[test]
    fn test_manifest_to_route_group() {
        let raw: MeshResource<serde_json::Value> = serde_yaml::from_str(MANIFEST).unwrap();
        let group = HttpRouteGroup::try_from(raw).unwrap();

        assert_eq!(group.name, "order-routes");
        assert_eq!(group.matches.len(), 2);
        assert_eq!(group.matches[0].path_regex.as_deref(), Some("^/v1/orders/.*$"));
        assert_eq!(group.matches[0].methods, vec!["GET", "POST"]);
        assert_eq!(group.matches[0].headers.get("X-Canary").map(String::as_str), Some("true"));
        assert_eq!(group.matches[1].path.as_deref(), Some("/healthz"));
    }

    #[test]
    fn test_wire_format_is_camel_case_and_sparse() {
        let group = HttpRouteGroup {
            name: "g".to_string(),
            matches: vec![HttpMatch {
                name: "m".to_string(),
                path_regex: Some("^/a".to_string()),
                ..Default::default()
            }],
        };

        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "g", "matches": [{"name": "m", "pathRegex": "^/a"}]})
        );
    }

    #[test]
    fn test_to_resource_uses_mesh_api_version() {
        let group = HttpRouteGroup {
            name: "g".to_string(),
            matches: vec![],
        };
        let resource = group.to_resource();

        assert_eq!(resource.api_version, MESH_API_VERSION);
        assert_eq!(resource.kind, "HTTPRouteGroup");
        assert_eq!(resource.metadata.name, "g");
        assert_eq!(HttpRouteGroup::from_resource(resource).unwrap(), group);
    }

    #[test]
    fn test_rejects_wrong_kind() {
        let resource = MeshResource::new("Service", "orders", HttpRouteGroupSpec::default());
        let err = HttpRouteGroup::from_resource(resource).unwrap_err();
        assert!(matches!(err, Error::UnsupportedKind(kind) if kind == "Service"));
    }

    #[test]
    fn test_rejects_empty_name() {
        let resource = MeshResource::new("HTTPRouteGroup", "  ", HttpRouteGroupSpec::default());
        let err = HttpRouteGroup::from_resource(resource).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_missing_spec_means_no_matches() {
        let raw: MeshResource<serde_json::Value> = serde_yaml::from_str(
            "apiVersion: mesh.megaease.com/v2alpha1\nkind: HTTPRouteGroup\n\
             metadata:\n  name: empty\nspec: null\n",
        )
        .unwrap();
        let group = HttpRouteGroup::try_from(raw).unwrap();
        assert!(group.matches.is_empty());
    }
}
