//! Unit tests for MachineConfig and ControllerConfig deserialization
//!
//! Fixtures mirror what `kubectl get -o json` returns for MCO resources.

#[cfg(test)]
mod machine_config_deserialization {
    use serde_json::json;

    use crate::crd::MachineConfig;

    #[test]
    fn test_rendered_worker_with_ignition_config() {
        let mc: MachineConfig = serde_json::from_value(json!({
            "apiVersion": "machineconfiguration.openshift.io/v1",
            "kind": "MachineConfig",
            "metadata": {
                "name": "rendered-worker-5b1c2e",
                "creationTimestamp": "2024-03-01T10:00:00Z"
            },
            "spec": {
                "config": {
                    "ignition": { "version": "3.4.0" }
                },
                "osImageURL": "quay.io/openshift/rhcos@sha256:abc",
                "kernelArguments": ["systemd.unified_cgroup_hierarchy=1"],
                "fips": false
            }
        }))
        .unwrap();

        assert!(mc.has_config());
        assert_eq!(
            mc.spec.os_image_url.as_deref(),
            Some("quay.io/openshift/rhcos@sha256:abc")
        );
        assert_eq!(mc.spec.kernel_arguments.len(), 1);
        assert!(mc.metadata.creation_timestamp.is_some());
    }

    #[test]
    fn test_missing_or_null_config_is_empty() {
        let absent: MachineConfig = serde_json::from_value(json!({
            "apiVersion": "machineconfiguration.openshift.io/v1",
            "kind": "MachineConfig",
            "metadata": { "name": "rendered-worker-empty" },
            "spec": {}
        }))
        .unwrap();
        assert!(!absent.has_config());

        let null: MachineConfig = serde_json::from_value(json!({
            "apiVersion": "machineconfiguration.openshift.io/v1",
            "kind": "MachineConfig",
            "metadata": { "name": "rendered-worker-null" },
            "spec": { "config": null }
        }))
        .unwrap();
        assert!(!null.has_config());
    }
}

#[cfg(test)]
mod controller_config_deserialization {
    use serde_json::json;

    use crate::crd::ControllerConfig;

    #[test]
    fn test_serving_ca_is_base64_decoded() {
        // "ca-bundle" in base64
        let cc: ControllerConfig = serde_json::from_value(json!({
            "apiVersion": "machineconfiguration.openshift.io/v1",
            "kind": "ControllerConfig",
            "metadata": { "name": "machine-config-controller" },
            "spec": {
                "clusterDNSIP": "172.30.0.10",
                "kubeAPIServerServingCAData": "Y2EtYnVuZGxl"
            }
        }))
        .unwrap();

        assert_eq!(cc.kube_api_server_serving_ca(), Some(&b"ca-bundle"[..]));
        assert_eq!(cc.spec.cluster_dns_ip.as_deref(), Some("172.30.0.10"));
    }

    #[test]
    fn test_empty_serving_ca_is_treated_as_absent() {
        let cc: ControllerConfig = serde_json::from_value(json!({
            "apiVersion": "machineconfiguration.openshift.io/v1",
            "kind": "ControllerConfig",
            "metadata": { "name": "machine-config-controller" },
            "spec": { "kubeAPIServerServingCAData": "" }
        }))
        .unwrap();

        assert_eq!(cc.kube_api_server_serving_ca(), None);
    }
}

#[cfg(test)]
mod crd_generation {
    use kube::CustomResourceExt;

    use crate::crd::{ControllerConfig, MachineConfig, MACHINE_CONFIGURATION_GROUP};

    #[test]
    fn test_crds_are_cluster_scoped() {
        let mc = MachineConfig::crd();
        assert_eq!(mc.spec.group, MACHINE_CONFIGURATION_GROUP);
        assert_eq!(mc.spec.scope, "Cluster");

        let cc = ControllerConfig::crd();
        assert_eq!(cc.spec.group, MACHINE_CONFIGURATION_GROUP);
        assert_eq!(cc.spec.scope, "Cluster");
    }
}
