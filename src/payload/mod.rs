//! Payload delivered to Windows nodes
//!
//! The operator image mounts every Windows binary under [`PAYLOAD_DIRECTORY`].
//! This module names those files, generates the network configuration script
//! that ships alongside them, and fingerprints them for version tracking.

pub mod fingerprint;
pub mod network;

use std::path::Path;

use tracing::debug;

use crate::error::Result;

pub use fingerprint::{compute_sha256, FileInfo};
pub use network::{populate_network_conf_script, NetworkConfScript, NETWORK_CONF_TEMPLATE};

/// Directory in the operator image where all the binaries live
pub const PAYLOAD_DIRECTORY: &str = "/payload/";

/// Windows Instance Config Daemon
pub const WICD_PATH: &str = "/payload/windows-instance-config-daemon.exe";
pub const KUBELET_PATH: &str = "/payload/kube-node/kubelet.exe";
pub const KUBE_PROXY_PATH: &str = "/payload/kube-node/kube-proxy.exe";
pub const KUBE_LOG_RUNNER_PATH: &str = "/payload/kube-node/kube-log-runner.exe";
pub const CONTAINERD_PATH: &str = "/payload/containerd/containerd.exe";
pub const HCSSHIM_PATH: &str = "/payload/containerd/containerd-shim-runhcs-v1.exe";
pub const CONTAINERD_CONF_PATH: &str = "/payload/containerd/containerd_conf.toml";

/// Resolves a valid hostname on GCP instances
pub const GCP_GET_HOSTNAME_SCRIPT_PATH: &str = "/payload/powershell/gcp-get-hostname.ps1";
/// Adds a containerd exclusion when Windows Defender Antivirus is active
pub const WIN_DEFENDER_EXCLUSION_SCRIPT_PATH: &str =
    "/payload/powershell/windows-defender-exclusion.ps1";
/// PowerShell module with helpers for Windows HNS networks
pub const HNS_PS_MODULE_PATH: &str = "/payload/powershell/hns.psm1";

pub const HOST_LOCAL_CNI_PLUGIN_PATH: &str = "/payload/cni/host-local.exe";
pub const WIN_BRIDGE_CNI_PLUGIN_PATH: &str = "/payload/cni/win-bridge.exe";
pub const WIN_OVERLAY_CNI_PLUGIN_PATH: &str = "/payload/cni/win-overlay.exe";

/// Generated network configuration script
pub const NETWORK_CONF_SCRIPT_PATH: &str = "/payload/generated/network-conf.ps1";

pub const HYBRID_OVERLAY_PATH: &str = "/payload/hybrid-overlay-node.exe";
pub const CSI_PROXY_PATH: &str = "/payload/csi-proxy/csi-proxy.exe";
pub const WINDOWS_EXPORTER_PATH: &str = "/payload/windows-exporter/windows_exporter.exe";
/// TLS web config for windows_exporter
pub const TLS_CONF_PATH: &str = "/payload/windows-exporter/windows-exporter-webconfig.yaml";
pub const ECR_CREDENTIAL_PROVIDER_PATH: &str = "/payload/ecr-credential-provider.exe";
pub const AZURE_CLOUD_NODE_MANAGER_PATH: &str = "/payload/azure-cloud-node-manager.exe";

/// Every delivered file whose version is tracked by fingerprint
pub const TRACKED_FILES: &[&str] = &[
    WICD_PATH,
    KUBELET_PATH,
    KUBE_PROXY_PATH,
    KUBE_LOG_RUNNER_PATH,
    CONTAINERD_PATH,
    HCSSHIM_PATH,
    CONTAINERD_CONF_PATH,
    GCP_GET_HOSTNAME_SCRIPT_PATH,
    WIN_DEFENDER_EXCLUSION_SCRIPT_PATH,
    HNS_PS_MODULE_PATH,
    HOST_LOCAL_CNI_PLUGIN_PATH,
    WIN_BRIDGE_CNI_PLUGIN_PATH,
    WIN_OVERLAY_CNI_PLUGIN_PATH,
    HYBRID_OVERLAY_PATH,
    CSI_PROXY_PATH,
    WINDOWS_EXPORTER_PATH,
    TLS_CONF_PATH,
    ECR_CREDENTIAL_PROVIDER_PATH,
    AZURE_CLOUD_NODE_MANAGER_PATH,
];

/// Fingerprint every tracked payload file, resolving paths under `root`
///
/// Records keep the payload path, not the resolved one, so manifests built
/// from different mount points compare equal.
pub fn manifest(root: impl AsRef<Path>) -> Result<Vec<FileInfo>> {
    let root = root.as_ref();
    TRACKED_FILES
        .iter()
        .copied()
        .map(|payload_path| {
            let resolved = root.join(payload_path.trim_start_matches('/'));
            let info = FileInfo::new(&resolved)?;
            debug!(path = %payload_path, sha256 = %info.sha256, "fingerprinted payload file");
            Ok(FileInfo {
                path: payload_path.into(),
                sha256: info.sha256,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn populate(root: &Path) {
        for path in TRACKED_FILES {
            let resolved = root.join(path.trim_start_matches('/'));
            std::fs::create_dir_all(resolved.parent().unwrap()).unwrap();
            std::fs::write(&resolved, path.as_bytes()).unwrap();
        }
    }

    #[test]
    fn test_tracked_files_live_under_payload_directory() {
        for path in TRACKED_FILES {
            assert!(path.starts_with(PAYLOAD_DIRECTORY), "{path}");
            assert!(!path.contains("//"), "{path}");
        }
        assert!(NETWORK_CONF_SCRIPT_PATH.starts_with(PAYLOAD_DIRECTORY));
    }

    #[test]
    fn test_manifest_reports_payload_paths() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());

        let manifest = manifest(dir.path()).unwrap();

        assert_eq!(manifest.len(), TRACKED_FILES.len());
        assert_eq!(manifest[1].path, Path::new(KUBELET_PATH));
        assert_eq!(manifest[1].sha256, compute_sha256(KUBELET_PATH.as_bytes()));
    }

    #[test]
    fn test_manifest_is_stable_across_roots() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        populate(a.path());
        populate(b.path());

        assert_eq!(manifest(a.path()).unwrap(), manifest(b.path()).unwrap());
    }

    #[test]
    fn test_manifest_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        std::fs::remove_file(dir.path().join("payload/kube-node/kubelet.exe")).unwrap();

        assert!(matches!(
            manifest(dir.path()).unwrap_err(),
            Error::IoError { .. }
        ));
    }
}
