//! create / apply from YAML manifests

use crate::meshclient::MeshClient;
use crate::output;
use anyhow::{Context, Result};
use meshctl_common::{HttpRouteGroup, MeshObject, MeshResource};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestAction {
    Create,
    Apply,
}

/// Mesh objects a manifest can carry
#[derive(Debug, Clone, PartialEq)]
pub enum MeshManifest {
    HttpRouteGroup(HttpRouteGroup),
}

impl MeshManifest {
    fn kind(&self) -> &'static str {
        match self {
            MeshManifest::HttpRouteGroup(_) => HttpRouteGroup::KIND,
        }
    }

    fn name(&self) -> &str {
        match self {
            MeshManifest::HttpRouteGroup(group) => group.name(),
        }
    }
}

impl TryFrom<MeshResource<serde_json::Value>> for MeshManifest {
    type Error = meshctl_common::Error;

    fn try_from(raw: MeshResource<serde_json::Value>) -> meshctl_common::Result<Self> {
        match raw.kind.as_str() {
            HttpRouteGroup::KIND => {
                Ok(MeshManifest::HttpRouteGroup(HttpRouteGroup::try_from(raw)?))
            }
            other => Err(meshctl_common::Error::UnsupportedKind(other.to_string())),
        }
    }
}

/// Parse every non-empty YAML document in `contents`
pub fn parse_manifests(contents: &str) -> Result<Vec<MeshManifest>> {
    let mut manifests = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_str(contents).enumerate() {
        let value = serde_yaml::Value::deserialize(document)
            .with_context(|| format!("document {} is not valid YAML", index + 1))?;
        if value.is_null() {
            continue;
        }

        let raw: MeshResource<serde_json::Value> = serde_yaml::from_value(value)
            .with_context(|| format!("document {} is not a mesh resource", index + 1))?;
        let manifest =
            MeshManifest::try_from(raw).with_context(|| format!("document {}", index + 1))?;
        manifests.push(manifest);
    }

    Ok(manifests)
}

pub async fn handle_manifest_command(
    action: ManifestAction,
    file: &Path,
    mesh: &MeshClient,
) -> Result<()> {
    let contents =
        std::fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
    let manifests = parse_manifests(&contents)?;

    if manifests.is_empty() {
        output::print_warning(&format!("No resources found in {}", file.display()));
        return Ok(());
    }

    for manifest in &manifests {
        let verb = match (action, manifest) {
            (ManifestAction::Create, MeshManifest::HttpRouteGroup(group)) => {
                mesh.http_route_groups().create(group).await?;
                "created"
            }
            (ManifestAction::Apply, MeshManifest::HttpRouteGroup(group)) => {
                mesh.http_route_groups().apply(group).await?;
                "applied"
            }
        };

        output::print_success(&format!("{} {} {}", manifest.kind(), manifest.name(), verb));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_GROUPS: &str = r#"
apiVersion: mesh.megaease.com/v2alpha1
kind: HTTPRouteGroup
metadata:
  name: orders
spec:
  matches:
    - name: list
      pathRegex: "^/orders$"
      methods: [GET]
---
---
apiVersion: mesh.megaease.com/v2alpha1
kind: HTTPRouteGroup
metadata:
  name: health
"#;

    #[test]
    fn test_parses_multiple_documents_and_skips_empty_ones() {
        let manifests = parse_manifests(TWO_GROUPS).unwrap();

        assert_eq!(manifests.len(), 2);
        match &manifests[0] {
            MeshManifest::HttpRouteGroup(group) => {
                assert_eq!(group.name, "orders");
                assert_eq!(group.matches[0].path_regex.as_deref(), Some("^/orders$"));
                assert_eq!(group.matches[0].methods, vec!["GET"]);
            }
        }
        assert_eq!(manifests[1].name(), "health");
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = parse_manifests("apiVersion: v1\nkind: TrafficTarget\nmetadata:\n  name: t\n")
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Unsupported kind: TrafficTarget"));
    }

    #[test]
    fn test_invalid_document_reports_position() {
        let err = parse_manifests("kind: HTTPRouteGroup\n---\n- just\n- a list\n").unwrap_err();
        assert!(format!("{:#}", err).contains("document 1"));
    }

    #[test]
    fn test_empty_file_has_no_manifests() {
        assert!(parse_manifests("").unwrap().is_empty());
    }
}
