//! Kubelet argument extraction from a systemd unit
//!
//! The rendered worker config starts kubelet through a systemd unit whose
//! `ExecStart=` section is a single command split over escaped newlines.
//! Only a handful of those flags matter for Windows kubelets; see
//! [`KubeletArg`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// Name of the systemd unit kubelet runs under
pub const KUBELET_UNIT_NAME: &str = "kubelet.service";

const EXEC_START: &str = "ExecStart=";
const COMMAND_END: &str = "\n\n";
const LINE_CONTINUATION: &str = "\\\n";
const FLAG_PREFIX: &str = "--";

/// Kubelet flags carried over from the Linux unit to Windows kubelets
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum KubeletArg {
    CloudProvider,
    CloudConfig,
}

impl KubeletArg {
    pub const ALL: &'static [KubeletArg] = &[KubeletArg::CloudProvider, KubeletArg::CloudConfig];

    /// The flag name without its `--` prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            KubeletArg::CloudProvider => "cloud-provider",
            KubeletArg::CloudConfig => "cloud-config",
        }
    }

    pub fn from_flag(flag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|arg| arg.as_str() == flag)
    }
}

impl fmt::Display for KubeletArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type KubeletArgs = BTreeMap<KubeletArg, String>;

/// Parse a systemd unit file, returning the allow-listed kubelet args
///
/// Bare flags such as `--windows-service` are skipped; they carry no value
/// we would forward. When a flag repeats, the last occurrence wins.
pub fn parse_kubelet_args(unit_contents: &str) -> Result<KubeletArgs> {
    let (_, exec_start) = unit_contents
        .split_once(EXEC_START)
        .ok_or_else(|| Error::MissingField("unit missing ExecStart".to_string()))?;

    // A blank line terminates the ExecStart continuation block
    let command = exec_start
        .split_once(COMMAND_END)
        .map_or(exec_start, |(command, _)| command);

    let mut args = KubeletArgs::new();
    // First segment is the kubelet binary itself
    for segment in command.split(LINE_CONTINUATION).skip(1) {
        let segment = segment.trim();
        let segment = segment.strip_prefix(FLAG_PREFIX).unwrap_or(segment);
        let Some((key, value)) = segment.split_once('=') else {
            continue;
        };
        if let Some(arg) = KubeletArg::from_flag(key) {
            args.insert(arg, value.to_string());
        }
    }

    Ok(args)
}
