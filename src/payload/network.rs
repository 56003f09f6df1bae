//! Network configuration script generation
//!
//! Renders the PowerShell script that keeps the CNI config and kube-proxy
//! config of a Windows node in sync with its HNS network. The script itself
//! is idempotent; rendering always rewrites the target file.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::info;

use crate::error::{Error, Result};

use super::NETWORK_CONF_SCRIPT_PATH;

/// Script body with placeholders, embedded at build time
pub const NETWORK_CONF_TEMPLATE: &str = include_str!("templates/network-conf.ps1");

/// HNS network name placeholder
pub const HNS_NETWORK_PLACEHOLDER: &str = "HNS_NETWORK";
/// Cluster service CIDR placeholder
pub const SERVICE_NETWORK_CIDR_PLACEHOLDER: &str = "SERVICE_NETWORK_CIDR";
/// HNS PowerShell module path placeholder
pub const HNS_MODULE_PATH_PLACEHOLDER: &str = "HNS_MODULE_PATH";
/// CNI config file path placeholder
pub const CNI_CONFIG_PATH_PLACEHOLDER: &str = "CNI_CONFIG_PATH";

pub const PLACEHOLDERS: [&str; 4] = [
    HNS_NETWORK_PLACEHOLDER,
    SERVICE_NETWORK_CIDR_PLACEHOLDER,
    HNS_MODULE_PATH_PLACEHOLDER,
    CNI_CONFIG_PATH_PLACEHOLDER,
];

static PLACEHOLDER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternatives: Vec<String> = PLACEHOLDERS.iter().map(|p| regex::escape(p)).collect();
    Regex::new(&alternatives.join("|")).expect("placeholder alternation is a valid regex")
});

/// Cluster network parameters substituted into the script
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkConfScript {
    pub cluster_cidr: String,
    pub hns_network_name: String,
    pub hns_module_path: String,
    pub cni_config_path: String,
}

impl NetworkConfScript {
    pub fn new(
        cluster_cidr: impl Into<String>,
        hns_network_name: impl Into<String>,
        hns_module_path: impl Into<String>,
        cni_config_path: impl Into<String>,
    ) -> Self {
        Self {
            cluster_cidr: cluster_cidr.into(),
            hns_network_name: hns_network_name.into(),
            hns_module_path: hns_module_path.into(),
            cni_config_path: cni_config_path.into(),
        }
    }

    fn value_for<'a>(&'a self, placeholder: &'a str) -> &'a str {
        match placeholder {
            HNS_NETWORK_PLACEHOLDER => &self.hns_network_name,
            SERVICE_NETWORK_CIDR_PLACEHOLDER => &self.cluster_cidr,
            HNS_MODULE_PATH_PLACEHOLDER => &self.hns_module_path,
            CNI_CONFIG_PATH_PLACEHOLDER => &self.cni_config_path,
            other => other,
        }
    }

    /// Render the script contents
    ///
    /// Substitution is a single pass over the template, so a value that
    /// happens to contain a placeholder token is inserted verbatim.
    pub fn render(&self) -> String {
        PLACEHOLDER_PATTERN
            .replace_all(NETWORK_CONF_TEMPLATE, |caps: &Captures| {
                self.value_for(&caps[0]).to_string()
            })
            .into_owned()
    }

    /// Render and write the script to `path` with unrestricted permissions
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.render()).map_err(|e| Error::io(path, e))?;
        set_unrestricted_permissions(path)?;
        info!(path = %path.display(), network = %self.hns_network_name, "wrote network configuration script");
        Ok(())
    }
}

#[cfg(unix)]
fn set_unrestricted_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o777))
        .map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
fn set_unrestricted_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// Create the network configuration script at its well-known payload location
///
/// This is the library entry point used by callers that deliver the
/// generated payload; [`NetworkConfScript::write_to`] targets any path.
pub fn populate_network_conf_script(
    cluster_cidr: &str,
    hns_network_name: &str,
    hns_module_path: &str,
    cni_config_path: &str,
) -> Result<()> {
    NetworkConfScript::new(cluster_cidr, hns_network_name, hns_module_path, cni_config_path)
        .write_to(NETWORK_CONF_SCRIPT_PATH)
}
