//! Rendered worker MachineConfig selection

use chrono::{DateTime, Utc};
use kube::ResourceExt;

use crate::crd::MachineConfig;
use crate::error::{Error, Result};

/// Name prefix of the MachineConfig that merges every worker MachineConfig
pub const RENDERED_WORKER_PREFIX: &str = "rendered-worker-";

/// Return the most recently created rendered worker MachineConfig
///
/// Candidates without an Ignition payload are ignored. Objects sharing a
/// creation timestamp keep their input order, so the first one listed wins.
pub fn latest_rendered_worker(machine_configs: &[MachineConfig]) -> Result<&MachineConfig> {
    let mut candidates: Vec<&MachineConfig> = machine_configs
        .iter()
        .filter(|mc| mc.name_any().starts_with(RENDERED_WORKER_PREFIX) && mc.has_config())
        .collect();

    // Stable sort, newest first; a missing timestamp sorts as oldest
    candidates.sort_by(|a, b| created_at(b).cmp(&created_at(a)));

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::NotFound("rendered worker MachineConfig not found".to_string()))
}

fn created_at(mc: &MachineConfig) -> Option<DateTime<Utc>> {
    mc.metadata.creation_timestamp.as_ref().map(|ts| ts.0)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
    use serde_json::json;

    use super::*;
    use crate::crd::MachineConfigSpec;

    fn machine_config(name: &str, created_hour: Option<u32>, with_config: bool) -> MachineConfig {
        MachineConfig {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                creation_timestamp: created_hour
                    .map(|h| Time(Utc.with_ymd_and_hms(2024, 3, 1, h, 0, 0).unwrap())),
                ..Default::default()
            },
            spec: MachineConfigSpec {
                config: with_config.then(|| json!({ "ignition": { "version": "3.4.0" } })),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_latest_rendered_worker_wins() {
        let mcs = vec![
            machine_config("rendered-worker-a", Some(1), true),
            machine_config("rendered-worker-b", Some(2), true),
            machine_config("other", Some(3), true),
        ];
        let selected = latest_rendered_worker(&mcs).unwrap();
        assert_eq!(selected.name_any(), "rendered-worker-b");
    }

    #[test]
    fn test_selection_ignores_input_order() {
        let mut mcs = vec![
            machine_config("rendered-worker-old", Some(1), true),
            machine_config("rendered-worker-new", Some(9), true),
            machine_config("rendered-worker-mid", Some(5), true),
            machine_config("rendered-master-newest", Some(12), true),
        ];
        for _ in 0..mcs.len() {
            mcs.rotate_left(1);
            let selected = latest_rendered_worker(&mcs).unwrap();
            assert_eq!(selected.name_any(), "rendered-worker-new");
        }
    }

    #[test]
    fn test_selection_is_idempotent() {
        let mcs = vec![
            machine_config("rendered-worker-a", Some(4), true),
            machine_config("rendered-worker-b", Some(4), true),
        ];
        let first = latest_rendered_worker(&mcs).unwrap().name_any();
        let second = latest_rendered_worker(&mcs).unwrap().name_any();
        assert_eq!(first, second);
        assert_eq!(first, "rendered-worker-a");
    }

    #[test]
    fn test_empty_payload_is_skipped() {
        let mcs = vec![
            machine_config("rendered-worker-good", Some(1), true),
            machine_config("rendered-worker-empty", Some(8), false),
        ];
        let selected = latest_rendered_worker(&mcs).unwrap();
        assert_eq!(selected.name_any(), "rendered-worker-good");
    }

    #[test]
    fn test_missing_timestamp_sorts_oldest() {
        let mcs = vec![
            machine_config("rendered-worker-unknown", None, true),
            machine_config("rendered-worker-dated", Some(0), true),
        ];
        let selected = latest_rendered_worker(&mcs).unwrap();
        assert_eq!(selected.name_any(), "rendered-worker-dated");
    }

    #[test]
    fn test_no_prefix_match_is_not_found() {
        let mcs = vec![
            machine_config("00-worker", Some(1), true),
            machine_config("rendered-master-abc", Some(2), true),
        ];
        assert!(matches!(
            latest_rendered_worker(&mcs).unwrap_err(),
            Error::NotFound(_)
        ));
        assert!(matches!(
            latest_rendered_worker(&[]).unwrap_err(),
            Error::NotFound(_)
        ));
    }
}
