//! RAPL energy-counter probe.
//!
//! The host exposes cumulative energy counters through the powercap sysfs
//! hierarchy: one microjoule counter per domain (package, core) plus a
//! maximum-range file giving the value at which a counter wraps to zero.
//! The probe reads them; it never calibrates or drives them.
//!
//! Counters wrap within minutes under load, so deltas must be corrected:
//! a post-run reading numerically below the pre-run reading means the
//! counter wrapped exactly once during the run, and the maximum range is
//! added before taking the difference. Runs longer than one wraparound
//! period are indistinguishable from short ones; the sweep's sequential,
//! per-repetition snapshots keep periods short enough in practice.

use std::fs;
use std::path::{Path, PathBuf};

use powersweep_schemas::EnergySample;

use crate::error::{SamplerError, SamplerErrorKind};

/// Package-level energy counter, powercap default location.
pub const DEFAULT_PACKAGE_PATH: &str =
    "/sys/devices/virtual/powercap/intel-rapl/intel-rapl:0/energy_uj";

/// Core-level energy counter, powercap default location.
pub const DEFAULT_CORE_PATH: &str =
    "/sys/devices/virtual/powercap/intel-rapl/intel-rapl:0/intel-rapl:0:0/energy_uj";

/// Counter wraparound range, powercap default location.
pub const DEFAULT_MAX_RANGE_PATH: &str =
    "/sys/devices/virtual/powercap/intel-rapl/intel-rapl:0/max_energy_range_uj";

/// Raw counter readings taken at one instant.
#[derive(Debug, Clone, Copy)]
pub struct EnergySnapshot {
    pub package_uj: u64,
    pub core_uj: u64,
}

/// Read-only handle on the host's energy-accounting interface.
///
/// Opening the probe is the fatal precondition check from the error table:
/// all three files are read once up front, so a machine without a readable
/// RAPL interface fails before any measurement starts rather than on the
/// first repetition.
#[derive(Debug)]
pub struct EnergyProbe {
    package: PathBuf,
    core: PathBuf,
    max_range_uj: u64,
}

impl EnergyProbe {
    /// Opens the probe at the standard powercap paths.
    pub fn open_default() -> Result<Self, SamplerError> {
        Self::open(
            Path::new(DEFAULT_PACKAGE_PATH),
            Path::new(DEFAULT_CORE_PATH),
            Path::new(DEFAULT_MAX_RANGE_PATH),
        )
    }

    /// Opens the probe at explicit paths, verifying all three files are
    /// readable and integer-valued.
    pub fn open(
        package: &Path,
        core: &Path,
        max_range: &Path,
    ) -> Result<Self, SamplerError> {
        // Probe both counters once; failures here are configuration
        // errors, not per-run retry targets.
        read_counter(package)?;
        read_counter(core)?;
        let max_range_uj = read_counter(max_range)?;
        if max_range_uj == 0 {
            return Err(SamplerError::new(SamplerErrorKind::EnergyFormat {
                path: max_range.to_path_buf(),
                content: "0".into(),
            }));
        }
        Ok(Self {
            package: package.to_path_buf(),
            core: core.to_path_buf(),
            max_range_uj,
        })
    }

    /// Reads both counters at this instant.
    pub fn snapshot(&self) -> Result<EnergySnapshot, SamplerError> {
        Ok(EnergySnapshot {
            package_uj: read_counter(&self.package)?,
            core_uj: read_counter(&self.core)?,
        })
    }

    /// Wraparound-corrected energy consumed between two snapshots.
    pub fn delta(
        &self,
        before: EnergySnapshot,
        after: EnergySnapshot,
    ) -> EnergySample {
        EnergySample {
            package_uj: wrapped_delta(
                before.package_uj,
                after.package_uj,
                self.max_range_uj,
            ),
            core_uj: wrapped_delta(
                before.core_uj,
                after.core_uj,
                self.max_range_uj,
            ),
        }
    }

    /// The counter range read at open time.
    pub fn max_range_uj(&self) -> u64 {
        self.max_range_uj
    }
}

/// Difference of two cumulative counter readings modulo the counter range.
///
/// A post reading below the pre reading means the counter wrapped; the
/// range is added so the delta is always a non-negative quantity within
/// one wraparound period.
fn wrapped_delta(before: u64, after: u64, max_range: u64) -> u64 {
    if after >= before {
        after - before
    } else {
        after + max_range - before
    }
}

fn read_counter(path: &Path) -> Result<u64, SamplerError> {
    let content = fs::read_to_string(path).map_err(|source| {
        SamplerError::new(SamplerErrorKind::EnergyInterface {
            path: path.to_path_buf(),
            source,
        })
    })?;
    content.trim().parse::<u64>().map_err(|_| {
        SamplerError::new(SamplerErrorKind::EnergyFormat {
            path: path.to_path_buf(),
            content: content.trim().to_owned(),
        })
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn fixture_probe(
        dir: &tempfile::TempDir,
        package: &str,
        core: &str,
        max_range: &str,
    ) -> (PathBuf, PathBuf, PathBuf) {
        let package_path = dir.path().join("energy_uj");
        let core_path = dir.path().join("core_energy_uj");
        let range_path = dir.path().join("max_energy_range_uj");
        fs::write(&package_path, package).unwrap();
        fs::write(&core_path, core).unwrap();
        fs::write(&range_path, max_range).unwrap();
        (package_path, core_path, range_path)
    }

    #[test]
    fn wraparound_delta_is_non_negative() {
        // counter_max=1000, pre=900, post=50 -> (50 - 900 + 1000) = 150.
        assert_eq!(wrapped_delta(900, 50, 1000), 150);
        assert_eq!(wrapped_delta(100, 400, 1000), 300);
        assert_eq!(wrapped_delta(0, 0, 1000), 0);
    }

    #[test]
    fn open_reads_all_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let (p, c, m) = fixture_probe(&dir, "12345\n", "678\n", "262143328850\n");
        let probe = EnergyProbe::open(&p, &c, &m).unwrap();
        assert_eq!(probe.max_range_uj(), 262_143_328_850);
        let snap = probe.snapshot().unwrap();
        assert_eq!(snap.package_uj, 12_345);
        assert_eq!(snap.core_uj, 678);
    }

    #[test]
    fn missing_counter_is_a_precondition_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (p, c, _) = fixture_probe(&dir, "1", "2", "3");
        let missing = dir.path().join("nonexistent");
        let err = EnergyProbe::open(&p, &c, &missing).unwrap_err();
        assert!(err.is_energy_interface());
    }

    #[test]
    fn garbage_counter_is_a_precondition_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (p, c, m) = fixture_probe(&dir, "not-a-number", "2", "3");
        let err = EnergyProbe::open(&p, &c, &m).unwrap_err();
        assert!(err.is_energy_interface());
    }

    #[test]
    fn delta_applies_range_to_both_domains() {
        let dir = tempfile::tempdir().unwrap();
        let (p, c, m) = fixture_probe(&dir, "900", "990", "1000");
        let probe = EnergyProbe::open(&p, &c, &m).unwrap();
        let before = EnergySnapshot {
            package_uj: 900,
            core_uj: 990,
        };
        let after = EnergySnapshot {
            package_uj: 50,
            core_uj: 40,
        };
        let delta = probe.delta(before, after);
        assert_eq!(delta.package_uj, 150);
        assert_eq!(delta.core_uj, 50);
    }
}
