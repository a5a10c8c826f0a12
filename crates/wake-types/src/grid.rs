// ─────────────────────────────────────────────────────────────────────
// SCPN Wake Core — Slice Grid
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Uniform longitudinal slice-center grid.
//!
//! The interpolating extractor derives its spacing from the first two
//! centers and assumes it constant across the window. Construction through
//! this type enforces that precondition instead of trusting it.

use crate::error::{WakeError, WakeResult};
use ndarray::Array1;

/// Maximum relative deviation between consecutive center spacings before a
/// grid is rejected as non-uniform.
pub const UNIFORM_SPACING_TOL: f64 = 1e-9;

/// Slice centers of one bunch window, uniformly spaced by `dz`.
#[derive(Debug, Clone)]
pub struct SliceGrid {
    pub centers: Array1<f64>, // strictly increasing, uniform spacing
    pub dz: f64,
}

impl SliceGrid {
    /// Grid covering `(z_a, z_b)` with `num_slices` bins; centers sit at
    /// `z_a + dz/2 + k*dz`.
    pub fn from_range(z_a: f64, z_b: f64, num_slices: usize) -> WakeResult<Self> {
        if !z_a.is_finite() || !z_b.is_finite() || z_b <= z_a {
            return Err(WakeError::ConfigError(format!(
                "invalid zeta range ({z_a}, {z_b})"
            )));
        }
        if num_slices == 0 {
            return Err(WakeError::ConfigError(
                "num_slices must be nonzero".to_string(),
            ));
        }
        let dz = (z_b - z_a) / num_slices as f64;
        let centers = Array1::from_shape_fn(num_slices, |k| z_a + 0.5 * dz + k as f64 * dz);
        Ok(SliceGrid { centers, dz })
    }

    /// Grid from raw centers. Rejects sequences that are too short, not
    /// strictly increasing, or not uniformly spaced within
    /// `UNIFORM_SPACING_TOL`.
    pub fn from_centers(centers: &[f64]) -> WakeResult<Self> {
        if centers.len() < 2 {
            return Err(WakeError::ConfigError(format!(
                "need at least 2 slice centers, got {}",
                centers.len()
            )));
        }
        if centers.iter().any(|z| !z.is_finite()) {
            return Err(WakeError::PhysicsViolation(
                "slice centers must be finite".to_string(),
            ));
        }
        let dz = centers[1] - centers[0];
        if dz <= 0.0 {
            return Err(WakeError::PhysicsViolation(format!(
                "slice centers must be strictly increasing, first step is {dz}"
            )));
        }
        for (k, pair) in centers.windows(2).enumerate() {
            let step = pair[1] - pair[0];
            if (step - dz).abs() > UNIFORM_SPACING_TOL * dz {
                return Err(WakeError::PhysicsViolation(format!(
                    "non-uniform slice spacing at index {k}: step={step}, expected {dz}"
                )));
            }
        }
        Ok(SliceGrid {
            centers: Array1::from_vec(centers.to_vec()),
            dz,
        })
    }

    pub fn num_slices(&self) -> usize {
        self.centers.len()
    }

    /// Same grid translated by `offset` (window of a later bunch slot sits
    /// at a negative multiple of the bunch spacing).
    pub fn shifted(&self, offset: f64) -> SliceGrid {
        SliceGrid {
            centers: self.centers.mapv(|z| z + offset),
            dz: self.dz,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_range_centers_bins() {
        let grid = SliceGrid::from_range(-1.5, 1.5, 3).unwrap();
        assert_eq!(grid.num_slices(), 3);
        assert!((grid.dz - 1.0).abs() < 1e-12);
        for (k, expected) in [-1.0, 0.0, 1.0].iter().enumerate() {
            assert!(
                (grid.centers[k] - expected).abs() < 1e-12,
                "center {k} should sit mid-bin at {expected}"
            );
        }
    }

    #[test]
    fn test_from_range_rejects_bad_inputs() {
        assert!(SliceGrid::from_range(1.0, 1.0, 4).is_err());
        assert!(SliceGrid::from_range(2.0, -2.0, 4).is_err());
        assert!(SliceGrid::from_range(f64::NAN, 1.0, 4).is_err());
        assert!(SliceGrid::from_range(-1.0, 1.0, 0).is_err());
    }

    #[test]
    fn test_from_centers_accepts_uniform() {
        let grid = SliceGrid::from_centers(&[-0.03, -0.01, 0.01, 0.03]).unwrap();
        assert!((grid.dz - 0.02).abs() < 1e-12);
        assert_eq!(grid.num_slices(), 4);
    }

    #[test]
    fn test_from_centers_rejects_non_uniform() {
        let err = SliceGrid::from_centers(&[0.0, 1.0, 2.5]);
        assert!(err.is_err(), "uneven spacing must be rejected");
        assert!(SliceGrid::from_centers(&[0.0, -1.0, -2.0]).is_err());
        assert!(SliceGrid::from_centers(&[0.0]).is_err());
        assert!(SliceGrid::from_centers(&[0.0, f64::INFINITY, 2.0]).is_err());
    }

    #[test]
    fn test_range_and_centers_agree() {
        let a = SliceGrid::from_range(-0.0375, 0.0375, 100).unwrap();
        let raw: Vec<f64> = a.centers.to_vec();
        let b = SliceGrid::from_centers(&raw).unwrap();
        assert!((a.dz - b.dz).abs() < 1e-15);
    }

    #[test]
    fn test_shifted_translates_without_respacing() {
        let grid = SliceGrid::from_range(-1.0, 1.0, 4).unwrap();
        let moved = grid.shifted(-7.5);
        assert!((moved.dz - grid.dz).abs() < 1e-15);
        for k in 0..4 {
            assert!((moved.centers[k] - (grid.centers[k] - 7.5)).abs() < 1e-12);
        }
    }
}
