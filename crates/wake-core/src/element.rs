//! Per-turn element contract of the surrounding tracking framework.
//!
//! The profile is a passive lattice element: it never moves particles.
//! Wake values are queried through the result extraction entry points,
//! and the history itself is refreshed between turns by the external
//! accumulation step.

use wake_types::error::{WakeError, WakeResult};

use crate::profile::CompressedProfile;

/// Already-resolved per-particle coordinates handed in by the upstream
/// slicer: longitudinal position plus bunch, slice and edge indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleBatch {
    pub zeta: Vec<f64>,
    pub i_bunch: Vec<usize>,
    pub i_slice: Vec<usize>,
    pub i_edge: Vec<usize>,
}

impl ParticleBatch {
    /// Validated constructor: all arrays share one length, zeta is finite.
    pub fn new(
        zeta: Vec<f64>,
        i_bunch: Vec<usize>,
        i_slice: Vec<usize>,
        i_edge: Vec<usize>,
    ) -> WakeResult<Self> {
        let n = zeta.len();
        if i_bunch.len() != n || i_slice.len() != n || i_edge.len() != n {
            return Err(WakeError::LayoutViolation(format!(
                "particle arrays disagree: zeta={n}, bunch={}, slice={}, edge={}",
                i_bunch.len(),
                i_slice.len(),
                i_edge.len()
            )));
        }
        if zeta.iter().any(|z| !z.is_finite()) {
            return Err(WakeError::PhysicsViolation(
                "particle zeta must be finite".to_string(),
            ));
        }
        Ok(ParticleBatch {
            zeta,
            i_bunch,
            i_slice,
            i_edge,
        })
    }

    pub fn len(&self) -> usize {
        self.zeta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zeta.is_empty()
    }
}

/// Per-turn update applied by every element of the tracking lattice.
pub trait BeamElement {
    fn track(&self, particles: &mut ParticleBatch);
}

impl BeamElement for CompressedProfile {
    /// No kick during tracking; the element only serves lookups.
    fn track(&self, _particles: &mut ParticleBatch) {}
}
