// ─────────────────────────────────────────────────────────────────────
// SCPN Wake Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{WakeError, WakeResult};
use crate::grid::SliceGrid;
use serde::{Deserialize, Serialize};

/// Top-level wake-profile configuration.
/// Maps 1:1 to the wake_config.json schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WakeConfig {
    pub machine_name: String,
    pub ring: RingParams,
    pub profile: ProfileParams,
    /// Source moment names; the result moment is appended by the profile
    /// container and must not appear here.
    pub moments: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingParams {
    pub circumference: f64,
    /// Longitudinal distance between consecutive bunch slots.
    pub bunch_spacing_zeta: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileParams {
    /// Longitudinal window of one bunch, `[zeta_min, zeta_max)`.
    pub zeta_range: [f64; 2],
    pub num_slices: usize,
    /// Slices of the target window (default: same as `num_slices`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_target_slices: Option<usize>,
    /// Retained history depth in turns (default: 1).
    #[serde(default = "default_num_turns")]
    pub num_turns: usize,
    /// Stored source bunch slots. May be omitted when a filling scheme is
    /// given instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_slots: Option<usize>,
    /// Target bunch slots (default: same as the resolved source slots).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_target_slots: Option<usize>,
    /// 0/1 occupancy of the ring's bunch slots, slot 0 first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filling_scheme: Option<Vec<u8>>,
}

fn default_num_turns() -> usize {
    1
}

impl WakeConfig {
    /// Load from a JSON file.
    pub fn from_file(path: &str) -> WakeResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Reject configurations the profile container cannot realize.
    pub fn validate(&self) -> WakeResult<()> {
        let ring = &self.ring;
        if !ring.circumference.is_finite() || ring.circumference <= 0.0 {
            return Err(WakeError::ConfigError(format!(
                "circumference must be positive, got {}",
                ring.circumference
            )));
        }
        if !ring.bunch_spacing_zeta.is_finite() || ring.bunch_spacing_zeta <= 0.0 {
            return Err(WakeError::ConfigError(format!(
                "bunch_spacing_zeta must be positive, got {}",
                ring.bunch_spacing_zeta
            )));
        }

        let p = &self.profile;
        let [z_a, z_b] = p.zeta_range;
        if !z_a.is_finite() || !z_b.is_finite() || z_b <= z_a {
            return Err(WakeError::ConfigError(format!(
                "invalid zeta_range ({z_a}, {z_b})"
            )));
        }
        if p.num_slices == 0 || p.num_turns == 0 {
            return Err(WakeError::ConfigError(format!(
                "num_slices={} and num_turns={} must be nonzero",
                p.num_slices, p.num_turns
            )));
        }
        if p.num_target_slices == Some(0) || p.num_target_slots == Some(0) {
            return Err(WakeError::ConfigError(
                "target slice/slot counts must be nonzero when given".to_string(),
            ));
        }
        self.resolved_num_slots()?;

        if self.moments.is_empty() {
            return Err(WakeError::ConfigError(
                "at least one source moment is required".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for name in &self.moments {
            if name.is_empty() {
                return Err(WakeError::ConfigError("empty moment name".to_string()));
            }
            if name == "result" {
                return Err(WakeError::ConfigError(
                    "'result' is reserved for the reconstructed wake moment".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(WakeError::ConfigError(format!("duplicate moment '{name}'")));
            }
        }
        Ok(())
    }

    /// Stored source bunch slots: an explicit count wins, otherwise the
    /// filling scheme spans the slots up to its last filled entry.
    pub fn resolved_num_slots(&self) -> WakeResult<usize> {
        if let Some(n) = self.profile.num_slots {
            if n == 0 {
                return Err(WakeError::ConfigError(
                    "num_slots must be nonzero".to_string(),
                ));
            }
            return Ok(n);
        }
        if let Some(scheme) = &self.profile.filling_scheme {
            return match scheme.iter().rposition(|&slot| slot != 0) {
                Some(last_filled) => Ok(last_filled + 1),
                None => Err(WakeError::ConfigError(
                    "filling_scheme has no filled slot".to_string(),
                )),
            };
        }
        Err(WakeError::ConfigError(
            "either num_slots or filling_scheme is required".to_string(),
        ))
    }

    /// Target window width, defaulting to the source width.
    pub fn target_slices(&self) -> usize {
        self.profile
            .num_target_slices
            .unwrap_or(self.profile.num_slices)
    }

    /// Target slot count, defaulting to the resolved source slot count.
    pub fn target_slots(&self) -> WakeResult<usize> {
        match self.profile.num_target_slots {
            Some(n) => Ok(n),
            None => self.resolved_num_slots(),
        }
    }

    /// Slice-center grid of the bunch window described by this config.
    pub fn slice_grid(&self) -> WakeResult<SliceGrid> {
        SliceGrid::from_range(
            self.profile.zeta_range[0],
            self.profile.zeta_range[1],
            self.profile.num_slices,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// CARGO_MANIFEST_DIR points to crates/wake-types/ at compile time,
    /// so the repo root with wake_config.json is two levels up.
    fn project_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
    }

    fn config_path(relative: &str) -> String {
        project_root().join(relative).to_string_lossy().to_string()
    }

    fn minimal_config() -> WakeConfig {
        serde_json::from_str(
            r#"{
                "machine_name": "test-ring",
                "ring": { "circumference": 1000.0, "bunch_spacing_zeta": 10.0 },
                "profile": {
                    "zeta_range": [-1.0, 1.0],
                    "num_slices": 4,
                    "num_slots": 2
                },
                "moments": ["num_particles"]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_load_wake_config() {
        let cfg = WakeConfig::from_file(&config_path("wake_config.json")).unwrap();
        assert_eq!(cfg.machine_name, "LHC-25ns-Demo");
        assert!((cfg.ring.circumference - 26658.883).abs() < 1e-6);
        assert!((cfg.ring.bunch_spacing_zeta - 7.495).abs() < 1e-12);
        assert_eq!(cfg.profile.num_slices, 100);
        assert_eq!(cfg.profile.num_turns, 32);
        assert_eq!(cfg.resolved_num_slots().unwrap(), 12);
        assert_eq!(cfg.moments, vec!["num_particles", "x", "y"]);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_defaults_for_omitted_fields() {
        let cfg = minimal_config();
        assert_eq!(cfg.profile.num_turns, 1, "history depth defaults to one turn");
        assert_eq!(cfg.target_slices(), 4);
        assert_eq!(cfg.target_slots().unwrap(), 2);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_filling_scheme_resolution() {
        let mut cfg = minimal_config();
        cfg.profile.num_slots = None;
        cfg.profile.filling_scheme = Some(vec![1, 1, 0, 1, 0, 0]);
        assert_eq!(
            cfg.resolved_num_slots().unwrap(),
            4,
            "slots span up to the last filled entry"
        );

        // An explicit count wins over the scheme.
        cfg.profile.num_slots = Some(9);
        assert_eq!(cfg.resolved_num_slots().unwrap(), 9);
    }

    #[test]
    fn test_slot_resolution_failures() {
        let mut cfg = minimal_config();
        cfg.profile.num_slots = None;
        assert!(cfg.resolved_num_slots().is_err(), "no slot information");

        cfg.profile.filling_scheme = Some(vec![0, 0, 0]);
        assert!(cfg.resolved_num_slots().is_err(), "empty filling scheme");
    }

    #[test]
    fn test_validate_rejects_bad_configs() {
        let mut cfg = minimal_config();
        cfg.profile.zeta_range = [1.0, -1.0];
        assert!(cfg.validate().is_err());

        let mut cfg = minimal_config();
        cfg.moments.clear();
        assert!(cfg.validate().is_err());

        let mut cfg = minimal_config();
        cfg.moments.push("num_particles".to_string());
        assert!(cfg.validate().is_err(), "duplicate moment name");

        let mut cfg = minimal_config();
        cfg.moments.push("result".to_string());
        assert!(cfg.validate().is_err(), "'result' is reserved");

        let mut cfg = minimal_config();
        cfg.ring.bunch_spacing_zeta = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_slice_grid_helper() {
        let cfg = WakeConfig::from_file(&config_path("wake_config.json")).unwrap();
        let grid = cfg.slice_grid().unwrap();
        assert_eq!(grid.num_slices(), 100);
        assert!((grid.dz - 0.075 / 100.0).abs() < 1e-15);
    }

    #[test]
    fn test_roundtrip_serialization() {
        let cfg = WakeConfig::from_file(&config_path("wake_config.json")).unwrap();
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        let cfg2: WakeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.machine_name, cfg2.machine_name);
        assert_eq!(cfg.profile.num_slices, cfg2.profile.num_slices);
        assert_eq!(cfg.profile.num_turns, cfg2.profile.num_turns);
        assert_eq!(cfg.moments, cfg2.moments);
    }
}
