//! ControllerConfig Custom Resource Definition
//!
//! The MCO publishes cluster-wide trust material here, including the CA
//! bundle kubelets use to validate the API server.

use k8s_openapi::ByteString;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "machineconfiguration.openshift.io",
    version = "v1",
    kind = "ControllerConfig"
)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfigSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "clusterDNSIP")]
    pub cluster_dns_ip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "rootCAData")]
    #[schemars(with = "Option<String>")]
    pub root_ca_data: Option<ByteString>,

    /// CA bundle serving the kube-apiserver, base64 encoded on the wire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "kubeAPIServerServingCAData")]
    #[schemars(with = "Option<String>")]
    pub kube_api_server_serving_ca_data: Option<ByteString>,
}

impl ControllerConfig {
    /// The kube-apiserver serving CA, if present and non-empty
    pub fn kube_api_server_serving_ca(&self) -> Option<&[u8]> {
        self.spec
            .kube_api_server_serving_ca_data
            .as_ref()
            .map(|ca| ca.0.as_slice())
            .filter(|ca| !ca.is_empty())
    }
}
