//! Ignition view of the rendered worker MachineConfig
//!
//! Windows nodes cannot consume Ignition directly. This module picks the
//! authoritative rendered worker config, decodes it, and exposes the pieces
//! Windows services need: kubelet arguments, embedded files and the kubelet CA.

pub mod config;
pub mod kubelet_args;
pub mod selector;
pub mod trust;

use kube::{
    api::{Api, ListParams},
    Client, ResourceExt,
};
use tracing::{debug, info};

use crate::crd::{ControllerConfig, MachineConfig};
use crate::error::{Error, Result};

pub use config::{File, Report, Severity};
pub use kubelet_args::{parse_kubelet_args, KubeletArg, KubeletArgs, KUBELET_UNIT_NAME};
pub use selector::{latest_rendered_worker, RENDERED_WORKER_PREFIX};
pub use trust::find_kubelet_ca;

/// Path of the cloud provider config as laid down by Ignition
pub const CLOUD_CONFIG_PATH: &str = "/etc/kubernetes/cloud.conf";

/// Path of the ECR credential provider config as laid down by Ignition
pub const ECR_CREDENTIAL_PROVIDER_CONFIG_PATH: &str =
    "/etc/kubernetes/credential-providers/ecr-credential-provider.yaml";

/// Decoded rendered worker Ignition config plus the kubelet CA
#[derive(Clone, Debug)]
pub struct Ignition {
    config: config::Config,
    kubelet_ca_data: Vec<u8>,
    rendered_worker: String,
}

impl Ignition {
    /// List MachineConfigs and ControllerConfigs from the cluster and build the view
    pub async fn from_cluster(client: &Client) -> Result<Self> {
        let machine_configs: Api<MachineConfig> = Api::all(client.clone());
        let machine_configs = machine_configs.list(&ListParams::default()).await?;

        let controller_configs: Api<ControllerConfig> = Api::all(client.clone());
        let controller_configs = controller_configs.list(&ListParams::default()).await?;

        Self::new(&machine_configs.items, &controller_configs.items)
    }

    /// Build the view from already-fetched resources
    pub fn new(
        machine_configs: &[MachineConfig],
        controller_configs: &[ControllerConfig],
    ) -> Result<Self> {
        let rendered_worker = latest_rendered_worker(machine_configs)?;
        Self::from_rendered_worker(rendered_worker, controller_configs)
    }

    /// Build the view from a specific MachineConfig
    pub fn from_rendered_worker(
        rendered_worker: &MachineConfig,
        controller_configs: &[ControllerConfig],
    ) -> Result<Self> {
        let name = rendered_worker.name_any();
        let raw = rendered_worker
            .spec
            .config
            .clone()
            .ok_or_else(|| Error::ParseError(format!("MachineConfig {name} has no config")))?;

        let (config, report) = config::parse_value(raw)?;
        if report.is_fatal() {
            return Err(Error::ParseError(format!(
                "failed to parse MachineConfig {name} ignition\nReport: {report}"
            )));
        }
        for entry in report.entries() {
            debug!(machineconfig = %name, path = %entry.path, "{}: {}", entry.severity, entry.message);
        }
        info!(
            machineconfig = %name,
            version = %config.ignition.version,
            "parsed rendered worker ignition"
        );

        let kubelet_ca_data = find_kubelet_ca(controller_configs)?;

        Ok(Self {
            config,
            kubelet_ca_data,
            rendered_worker: name,
        })
    }

    /// Name of the MachineConfig this view was built from
    pub fn rendered_worker(&self) -> &str {
        &self.rendered_worker
    }

    pub fn version(&self) -> &str {
        &self.config.ignition.version
    }

    pub fn kubelet_ca_data(&self) -> &[u8] {
        &self.kubelet_ca_data
    }

    /// Files embedded within the ignition spec
    pub fn files(&self) -> &[File] {
        &self.config.storage.files
    }

    pub fn file(&self, path: &str) -> Option<&File> {
        self.files().iter().find(|f| f.path == path)
    }

    /// Decoded contents of the cloud provider config, if the cluster has one
    pub fn cloud_config(&self) -> Result<Option<Vec<u8>>> {
        self.file(CLOUD_CONFIG_PATH)
            .map(File::decoded_contents)
            .transpose()
    }

    /// Allow-listed startup arguments of the named systemd unit
    pub fn unit_args(&self, unit_name: &str) -> Result<KubeletArgs> {
        let contents = self
            .config
            .systemd
            .units
            .iter()
            .find(|unit| unit.name == unit_name)
            .and_then(|unit| unit.contents.as_deref())
            .filter(|contents| !contents.is_empty())
            .ok_or_else(|| {
                Error::MissingField(format!("ignition missing {unit_name} systemd unit file"))
            })?;

        parse_kubelet_args(contents)
    }

    /// Arguments for kubelet.exe, as specified in the ignition config
    pub fn kubelet_args(&self) -> Result<KubeletArgs> {
        self.unit_args(KUBELET_UNIT_NAME)
    }
}
