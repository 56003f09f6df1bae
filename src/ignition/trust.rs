//! Kubelet CA discovery from ControllerConfigs

use kube::ResourceExt;
use tracing::{debug, warn};

use crate::crd::ControllerConfig;
use crate::error::{Error, Result};

/// Return the kube-apiserver serving CA from the first ControllerConfig carrying one
///
/// A cluster normally has exactly one ControllerConfig. If several carry a
/// CA the first is used and the rest are reported, since that usually
/// points at a stale or misapplied object.
pub fn find_kubelet_ca(controller_configs: &[ControllerConfig]) -> Result<Vec<u8>> {
    let mut sources = controller_configs
        .iter()
        .filter_map(|cc| cc.kube_api_server_serving_ca().map(|ca| (cc, ca)));

    let (source, ca) = sources
        .next()
        .ok_or_else(|| Error::NotFound("cannot find kubelet-ca".to_string()))?;

    let ignored: Vec<String> = sources.map(|(cc, _)| cc.name_any()).collect();
    if !ignored.is_empty() {
        warn!(
            used = %source.name_any(),
            ignored = ?ignored,
            "multiple ControllerConfigs carry a kube-apiserver serving CA"
        );
    }

    debug!(controller_config = %source.name_any(), "processing kubelet-ca");
    Ok(ca.to_vec())
}
