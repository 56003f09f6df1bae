//! MachineConfig Custom Resource Definition
//!
//! A MachineConfig carries a full Ignition config in `spec.config`. The MCO
//! merges every worker MachineConfig into a single `rendered-worker-<hash>`
//! object, which is the one Windows nodes derive their settings from.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "machineconfiguration.openshift.io",
    version = "v1",
    kind = "MachineConfig",
    shortname = "mc",
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct MachineConfigSpec {
    /// Raw Ignition config, kept opaque until the ignition decoder runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "osImageURL")]
    pub os_image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kernel_arguments: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub fips: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel_type: Option<String>,
}

impl MachineConfig {
    /// Whether the object carries an Ignition payload at all
    pub fn has_config(&self) -> bool {
        !matches!(self.spec.config, None | Some(serde_json::Value::Null))
    }
}
