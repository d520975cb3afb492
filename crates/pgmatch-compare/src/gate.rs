use pgmatch_core::{CapabilityProbe, RoutineMode};

use crate::errors::CompareError;

/// Oldest server (`server_version_num`) whose catalogs carry every field read.
pub const MIN_SERVER_VERSION_NUM: i32 = 100_000;

/// Decide whether two catalogs can be compared and how routines are classified.
pub fn check_compatibility(
    source: &CapabilityProbe,
    target: &CapabilityProbe,
) -> Result<RoutineMode, CompareError> {
    for (side, probe) in [("Source", source), ("Target", target)] {
        if probe.server_version_num < MIN_SERVER_VERSION_NUM {
            return Err(CompareError::Incompatible(format!(
                "{side} server version {} is older than the minimum supported {}",
                probe.server_version_num, MIN_SERVER_VERSION_NUM
            )));
        }
    }

    match (source.has_routine_kind, target.has_routine_kind) {
        (true, true) => Ok(RoutineMode::Modern),
        (false, false) => Ok(RoutineMode::Legacy),
        (source_kind, _) => Err(CompareError::Incompatible(format!(
            "Source and Target catalogs disagree on routine kinds (source prokind: {source_kind}, target prokind: {})",
            !source_kind
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(has_routine_kind: bool, server_version_num: i32) -> CapabilityProbe {
        CapabilityProbe {
            has_routine_kind,
            server_version_num,
        }
    }

    #[test]
    fn matching_modern_servers_pass() {
        let mode = check_compatibility(&probe(true, 150_004), &probe(true, 110_000)).unwrap();
        assert_eq!(mode, RoutineMode::Modern);
    }

    #[test]
    fn matching_legacy_servers_pass() {
        let mode = check_compatibility(&probe(false, 100_012), &probe(false, 100_023)).unwrap();
        assert_eq!(mode, RoutineMode::Legacy);
    }

    #[test]
    fn mixed_routine_kinds_are_rejected() {
        let err = check_compatibility(&probe(true, 120_000), &probe(false, 100_000)).unwrap_err();
        assert!(matches!(err, CompareError::Incompatible(_)));
    }

    #[test]
    fn old_servers_are_rejected() {
        let err = check_compatibility(&probe(false, 90_600), &probe(false, 100_000)).unwrap_err();
        assert!(err.to_string().contains("Source server version 90600"));
    }
}
