//! Versioned Ignition config decoding
//!
//! Only the parts of the Ignition 3.x schema that Windows nodes consume are
//! modelled: storage files and systemd units. Unknown fields are ignored.
//! Decoding never fails on semantic problems; those are collected in a
//! [`Report`] and the caller decides whether the report is fatal.

use std::collections::HashSet;
use std::fmt;
use std::io::Read;

use base64::Engine;
use flate2::read::GzDecoder;
use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Released Ignition spec versions that translate into the 3.x types
pub const SUPPORTED_VERSIONS: [Version; 6] = [
    Version::new(3, 0, 0),
    Version::new(3, 1, 0),
    Version::new(3, 2, 0),
    Version::new(3, 3, 0),
    Version::new(3, 4, 0),
    Version::new(3, 5, 0),
];

/// Spec version the decoded types correspond to
pub const CURRENT_VERSION: Version = Version::new(3, 5, 0);

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Config {
    pub ignition: IgnitionMeta,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub systemd: Systemd,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct IgnitionMeta {
    #[serde(default)]
    pub version: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Storage {
    #[serde(default)]
    pub files: Vec<File>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct File {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overwrite: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Resource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Systemd {
    #[serde(default)]
    pub units: Vec<Unit>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Unit {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropins: Vec<Dropin>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Dropin {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
}

impl File {
    /// Decode the file's `contents.source` data URL into raw bytes
    ///
    /// Supports `data:,<percent-encoded>` and `data:<mime>;base64,<payload>`,
    /// optionally gzip compressed. A file without contents decodes to empty.
    pub fn decoded_contents(&self) -> Result<Vec<u8>> {
        let Some(resource) = &self.contents else {
            return Ok(Vec::new());
        };
        let Some(source) = resource.source.as_deref() else {
            return Ok(Vec::new());
        };

        let data = decode_data_url(source)
            .map_err(|e| Error::ParseError(format!("file {}: {e}", self.path)))?;

        match resource.compression.as_deref() {
            None | Some("") => Ok(data),
            Some("gzip") => {
                let mut out = Vec::new();
                GzDecoder::new(data.as_slice())
                    .read_to_end(&mut out)
                    .map_err(|e| {
                        Error::ParseError(format!("file {}: invalid gzip contents: {e}", self.path))
                    })?;
                Ok(out)
            }
            Some(other) => Err(Error::ParseError(format!(
                "file {}: unsupported compression '{other}'",
                self.path
            ))),
        }
    }
}

fn decode_data_url(source: &str) -> std::result::Result<Vec<u8>, String> {
    let rest = source
        .strip_prefix("data:")
        .ok_or_else(|| format!("unsupported contents source '{source}', expected a data URL"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| "data URL is missing ','".to_string())?;

    if header.split(';').any(|param| param == "base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| format!("invalid base64 payload: {e}"))
    } else {
        Ok(urlencoding::decode_binary(payload.as_bytes()).into_owned())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportEntry {
    pub severity: Severity,
    /// JSON path of the offending field, e.g. `$.systemd.units.3`
    pub path: String,
    pub message: String,
}

/// Diagnostics collected while decoding an Ignition config
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    pub fn push(&mut self, severity: Severity, path: impl Into<String>, message: impl Into<String>) {
        self.entries.push(ReportEntry {
            severity,
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// A report is fatal once it holds any error-severity entry
    pub fn is_fatal(&self) -> bool {
        self.entries.iter().any(|e| e.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, entry) in self.entries.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{} at {}: {}", entry.severity, entry.path, entry.message)?;
        }
        Ok(())
    }
}

/// Parse a raw Ignition payload of any translation-compatible 3.x version
///
/// Returns `Err` only when the payload is not structurally valid JSON for
/// the modelled schema. Version and validation problems land in the report.
pub fn parse_compatible_version(raw: &[u8]) -> Result<(Config, Report)> {
    let value: Value = serde_json::from_slice(raw)
        .map_err(|e| Error::ParseError(format!("invalid ignition JSON: {e}")))?;
    parse_value(value)
}

/// Same as [`parse_compatible_version`] for an already-deserialized payload
pub fn parse_value(value: Value) -> Result<(Config, Report)> {
    let mut report = Report::default();

    let version = match value.pointer("/ignition/version").and_then(Value::as_str) {
        Some(v) => v.to_string(),
        None => {
            report.push(
                Severity::Error,
                "$.ignition.version",
                "ignition version is missing",
            );
            return Ok((Config::default(), report));
        }
    };

    match Version::parse(&version) {
        Ok(parsed) if !SUPPORTED_VERSIONS.contains(&parsed) => {
            report.push(
                Severity::Error,
                "$.ignition.version",
                format!("unsupported config version {parsed}"),
            );
            return Ok((Config::default(), report));
        }
        Ok(parsed) if parsed < CURRENT_VERSION => {
            report.push(
                Severity::Info,
                "$.ignition.version",
                format!("translated config version {parsed} to {CURRENT_VERSION}"),
            );
        }
        Ok(_) => {}
        Err(e) => {
            report.push(
                Severity::Error,
                "$.ignition.version",
                format!("invalid config version '{version}': {e}"),
            );
            return Ok((Config::default(), report));
        }
    }

    let config: Config = serde_json::from_value(value)
        .map_err(|e| Error::ParseError(format!("ignition {version}: {e}")))?;
    validate(&config, &mut report);

    Ok((config, report))
}

fn validate(config: &Config, report: &mut Report) {
    let mut unit_names = HashSet::new();
    for (idx, unit) in config.systemd.units.iter().enumerate() {
        let path = format!("$.systemd.units.{idx}");
        if !unit_names.insert(unit.name.as_str()) {
            report.push(
                Severity::Error,
                &path,
                format!("duplicate unit name '{}'", unit.name),
            );
        }
        if unit.contents.is_none()
            && unit.dropins.is_empty()
            && unit.enabled.is_none()
            && unit.mask.is_none()
        {
            report.push(
                Severity::Warning,
                &path,
                format!("unit '{}' has no effect", unit.name),
            );
        }
    }

    let mut file_paths = HashSet::new();
    for (idx, file) in config.storage.files.iter().enumerate() {
        let path = format!("$.storage.files.{idx}");
        if !file.path.starts_with('/') {
            report.push(
                Severity::Error,
                &path,
                format!("file path '{}' is not absolute", file.path),
            );
        }
        if !file_paths.insert(file.path.as_str()) {
            report.push(
                Severity::Error,
                &path,
                format!("duplicate file path '{}'", file.path),
            );
        }
    }
}
