//! PersistentVolume availability for the control panel's claims

use crate::install::args::{InstallArgs, CONTROL_PLANE_NAME, DEFAULT_PV_CAPACITY};
use crate::kubernetes::quantity::{parse_quantity, QuantityError};
use k8s_openapi::api::core::v1::PersistentVolume;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VolumeCheckError {
    #[error(
        "easemesh control plane requires {required} available PersistentVolumes, \
         but only {available} found\n\
         Create {required} PersistentVolumes with storageClassName {storage_class}, \
         access mode ReadWriteOnce and capacity of at least {default_capacity}, \
         or pass --storage-class-name with a StorageClass that has enough free volumes.\n\
         Example: kubectl get pv -o \
         custom-columns=NAME:.metadata.name,CLASS:.spec.storageClassName,\
         STATUS:.status.phase | grep {storage_class}"
    )]
    NotEnoughVolumes {
        required: usize,
        available: usize,
        storage_class: String,
        default_capacity: &'static str,
    },

    #[error("invalid --persist-volume-capacity: {0}")]
    InvalidCapacity(#[from] QuantityError),
}

/// Volumes that can serve (or already serve) the control panel's claims
pub fn count_usable_volumes(
    volumes: &[PersistentVolume],
    args: &InstallArgs,
) -> Result<usize, VolumeCheckError> {
    let wanted = parse_quantity(&args.pv_capacity)?;
    let claim_suffixes: Vec<String> = (0..args.replicas)
        .map(|i| format!("{}-{}", CONTROL_PLANE_NAME, i))
        .collect();

    let count = volumes
        .iter()
        .filter(|pv| match phase(pv) {
            Some("Available") => is_free_candidate(pv, args, wanted),
            Some("Bound") => is_bound_to_control_plane(pv, args, &claim_suffixes),
            _ => false,
        })
        .count();

    Ok(count)
}

/// Fail unless every replica can get a volume
pub fn check_volumes(
    volumes: &[PersistentVolume],
    args: &InstallArgs,
) -> Result<usize, VolumeCheckError> {
    let available = count_usable_volumes(volumes, args)?;

    if available < args.replicas {
        return Err(VolumeCheckError::NotEnoughVolumes {
            required: args.replicas,
            available,
            storage_class: args.storage_class.clone(),
            default_capacity: DEFAULT_PV_CAPACITY,
        });
    }

    Ok(available)
}

fn phase(pv: &PersistentVolume) -> Option<&str> {
    pv.status.as_ref()?.phase.as_deref()
}

fn is_free_candidate(pv: &PersistentVolume, args: &InstallArgs, wanted: f64) -> bool {
    let Some(spec) = pv.spec.as_ref() else {
        return false;
    };

    let class_matches = spec.storage_class_name.as_deref() == Some(args.storage_class.as_str());

    // An unparseable capacity never satisfies the request.
    let large_enough = spec
        .capacity
        .as_ref()
        .and_then(|c| c.get("storage"))
        .and_then(|q| parse_quantity(&q.0).ok())
        .is_some_and(|size| size >= wanted);

    let read_write_once = spec
        .access_modes
        .as_ref()
        .is_some_and(|modes| modes.iter().any(|m| m == "ReadWriteOnce"));

    class_matches && large_enough && read_write_once
}

/// A volume left bound to one of our claims by an earlier install
fn is_bound_to_control_plane(
    pv: &PersistentVolume,
    args: &InstallArgs,
    claim_suffixes: &[String],
) -> bool {
    let Some(claim) = pv.spec.as_ref().and_then(|s| s.claim_ref.as_ref()) else {
        return false;
    };

    claim.kind.as_deref() == Some("PersistentVolumeClaim")
        && claim.namespace.as_deref() == Some(args.namespace.as_str())
        && claim
            .name
            .as_deref()
            .is_some_and(|name| {
                claim_suffixes
                    .iter()
                    .any(|suffix| name.ends_with(suffix.as_str()))
            })
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{ObjectReference, PersistentVolumeSpec, PersistentVolumeStatus};
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
    use std::collections::BTreeMap;

    fn volume(phase: &str, class: &str, capacity: &str, modes: &[&str]) -> PersistentVolume {
        PersistentVolume {
            spec: Some(PersistentVolumeSpec {
                storage_class_name: Some(class.to_string()),
                capacity: Some(BTreeMap::from([(
                    "storage".to_string(),
                    Quantity(capacity.to_string()),
                )])),
                access_modes: Some(modes.iter().map(|m| m.to_string()).collect()),
                ..Default::default()
            }),
            status: Some(PersistentVolumeStatus {
                phase: Some(phase.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn bound(kind: &str, namespace: &str, claim: &str) -> PersistentVolume {
        let mut pv = volume("Bound", "other", "1Gi", &["ReadWriteOnce"]);
        pv.spec.as_mut().unwrap().claim_ref = Some(ObjectReference {
            kind: Some(kind.to_string()),
            namespace: Some(namespace.to_string()),
            name: Some(claim.to_string()),
            ..Default::default()
        });
        pv
    }

    fn args() -> InstallArgs {
        InstallArgs {
            namespace: "easemesh".to_string(),
            replicas: 3,
            storage_class: "easemesh-storage".to_string(),
            pv_capacity: "3Gi".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_available_volume_must_match_class_size_and_mode() {
        let volumes = vec![
            volume("Available", "easemesh-storage", "3Gi", &["ReadWriteOnce"]),
            volume("Available", "easemesh-storage", "10Gi", &["ReadWriteMany", "ReadWriteOnce"]),
            volume("Available", "standard", "10Gi", &["ReadWriteOnce"]),
            volume("Available", "easemesh-storage", "2Gi", &["ReadWriteOnce"]),
            volume("Available", "easemesh-storage", "3G", &["ReadWriteOnce"]),
            volume("Available", "easemesh-storage", "5Gi", &["ReadOnlyMany"]),
            volume("Released", "easemesh-storage", "5Gi", &["ReadWriteOnce"]),
        ];

        assert_eq!(count_usable_volumes(&volumes, &args()).unwrap(), 2);
    }

    #[test]
    fn test_volumes_bound_to_previous_install_count() {
        let volumes = vec![
            bound(
                "PersistentVolumeClaim",
                "easemesh",
                "easegress-data-easemesh-control-plane-0",
            ),
            bound(
                "PersistentVolumeClaim",
                "easemesh",
                "easegress-data-easemesh-control-plane-2",
            ),
            // Ordinal beyond the replica count
            bound(
                "PersistentVolumeClaim",
                "easemesh",
                "easegress-data-easemesh-control-plane-3",
            ),
            bound(
                "PersistentVolumeClaim",
                "default",
                "easegress-data-easemesh-control-plane-1",
            ),
            bound("Pod", "easemesh", "easemesh-control-plane-1"),
        ];

        assert_eq!(count_usable_volumes(&volumes, &args()).unwrap(), 2);
    }

    #[test]
    fn test_check_fails_when_short_of_replicas() {
        let volumes = vec![
            volume("Available", "easemesh-storage", "3Gi", &["ReadWriteOnce"]),
            bound(
                "PersistentVolumeClaim",
                "easemesh",
                "easegress-data-easemesh-control-plane-1",
            ),
        ];

        let err = check_volumes(&volumes, &args()).unwrap_err();
        match &err {
            VolumeCheckError::NotEnoughVolumes {
                required,
                available,
                storage_class,
                ..
            } => {
                assert_eq!(*required, 3);
                assert_eq!(*available, 2);
                assert_eq!(storage_class, "easemesh-storage");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err
            .to_string()
            .contains("requires 3 available PersistentVolumes, but only 2 found"));
    }

    #[test]
    fn test_check_passes_with_enough_volumes() {
        let volumes: Vec<_> = (0..3)
            .map(|_| volume("Available", "easemesh-storage", "4Gi", &["ReadWriteOnce"]))
            .collect();

        assert_eq!(check_volumes(&volumes, &args()).unwrap(), 3);
    }

    #[test]
    fn test_invalid_requested_capacity_is_reported() {
        let args = InstallArgs {
            pv_capacity: "lots".to_string(),
            ..args()
        };

        let err = check_volumes(&[], &args).unwrap_err();
        assert!(matches!(err, VolumeCheckError::InvalidCapacity(_)));
    }
}
