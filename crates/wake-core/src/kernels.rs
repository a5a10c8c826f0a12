// ─────────────────────────────────────────────────────────────────────
// SCPN Wake Core — Result Extraction Kernels
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-particle extraction of the reconstructed wake from the moments
//! history.
//!
//! Two operations over the same buffer layout:
//! * `nearest_result` — most-recent-turn value at the particle's exact
//!   slice, a pure lookup.
//! * `interp_result` — sum over retained turns of a linear interpolation
//!   between the two slice centers straddling the particle, with
//!   antisymmetric extrapolation one spacing step outside the window
//!   edges (the wake flips sign across the beam boundary).
//!
//! Both are trusted-index fast paths: index and shape preconditions are
//! stated in the docs and asserted only in debug builds. The `_checked`
//! companions validate everything up front and then delegate, for tests
//! and diagnostics.

use wake_types::error::{WakeError, WakeResult};
use wake_types::grid::SliceGrid;
use wake_types::layout::MomentsLayout;

/// Most-recent-turn result moment at each particle's slice.
///
/// Preconditions (unchecked in release builds): `data.len()` equals
/// `layout.len()`; the three per-particle slices share one length; every
/// `i_bunch < layout.num_slots` and every `i_slice < layout.aux_per_slot`.
pub fn nearest_result(
    layout: &MomentsLayout,
    data: &[f64],
    i_bunch_particles: &[usize],
    i_slice_particles: &[usize],
    out: &mut [f64],
) {
    debug_assert_eq!(data.len(), layout.len());
    debug_assert_eq!(i_bunch_particles.len(), out.len());
    debug_assert_eq!(i_slice_particles.len(), out.len());

    use rayon::prelude::*;
    out.par_iter_mut().enumerate().for_each(|(ip, res)| {
        *res = data[layout.latest_result_offset(i_bunch_particles[ip], i_slice_particles[ip])];
    });
}

/// Multi-turn edge-interpolated result moment at each particle's
/// longitudinal position.
///
/// `i_edge` ranges over `0..=zeta_centers.len()` and addresses slice
/// *boundaries*; the two window edges extrapolate antisymmetrically one
/// `dzeta` outside the first and last centers. `num_turns` is the
/// summation depth and must not exceed the layout's stored turn capacity.
/// `dzeta` is taken from the first two centers; spacing uniformity is the
/// caller's precondition (validated by the `_checked` companion).
///
/// Further preconditions as for [`nearest_result`]; additionally
/// `zeta_centers.len() >= 2` and `zeta_centers.len() <= layout.aux_per_slot`.
#[allow(clippy::too_many_arguments)]
pub fn interp_result(
    layout: &MomentsLayout,
    num_turns: usize,
    data: &[f64],
    zeta_centers: &[f64],
    zeta_particles: &[f64],
    i_bunch_particles: &[usize],
    i_edge_particles: &[usize],
    out: &mut [f64],
) {
    debug_assert_eq!(data.len(), layout.len());
    debug_assert_eq!(zeta_particles.len(), out.len());
    debug_assert_eq!(i_bunch_particles.len(), out.len());
    debug_assert_eq!(i_edge_particles.len(), out.len());
    debug_assert!(num_turns <= layout.num_turns);
    debug_assert!(zeta_centers.len() >= 2);
    debug_assert!(zeta_centers.len() <= layout.aux_per_slot);

    let dzeta = zeta_centers[1] - zeta_centers[0];

    use rayon::prelude::*;
    out.par_iter_mut().enumerate().for_each(|(ip, res)| {
        *res = interp_one(
            layout,
            num_turns,
            data,
            zeta_centers,
            dzeta,
            zeta_particles[ip],
            i_bunch_particles[ip],
            i_edge_particles[ip],
        );
    });
}

/// One particle's turn-summed contribution.
#[inline]
#[allow(clippy::too_many_arguments)]
fn interp_one(
    layout: &MomentsLayout,
    num_turns: usize,
    data: &[f64],
    zeta_centers: &[f64],
    dzeta: f64,
    zeta: f64,
    i_bunch: usize,
    i_edge: usize,
) -> f64 {
    let num_slices = zeta_centers.len();
    let slot = layout.slot_start(i_bunch);
    let mut rr = 0.0;
    for i_turn in 0..num_turns {
        let turn_offset = layout.result_turn_offset(i_turn);
        let (val_left, val_right, zeta_left, zeta_right) = if i_edge == 0 {
            // Leading window edge: mirror the first slice with flipped
            // sign one spacing step outside.
            let val_right = data[turn_offset + slot];
            (
                -val_right,
                val_right,
                zeta_centers[0] - dzeta,
                zeta_centers[0],
            )
        } else if i_edge == num_slices {
            // Trailing window edge, the symmetric mirror.
            let val_left = data[turn_offset + slot + i_edge - 1];
            (
                val_left,
                -val_left,
                zeta_centers[i_edge - 1],
                zeta_centers[num_slices - 1] + dzeta,
            )
        } else {
            (
                data[turn_offset + slot + i_edge - 1],
                data[turn_offset + slot + i_edge],
                zeta_centers[i_edge - 1],
                zeta_centers[i_edge],
            )
        };
        rr += val_left * (zeta_right - zeta) / dzeta + val_right * (zeta - zeta_left) / dzeta;
    }
    rr
}

/// Validated companion of [`nearest_result`].
pub fn nearest_result_checked(
    layout: &MomentsLayout,
    data: &[f64],
    i_bunch_particles: &[usize],
    i_slice_particles: &[usize],
    out: &mut [f64],
) -> WakeResult<()> {
    check_buffer(layout, data)?;
    check_particle_len("i_bunch_particles", i_bunch_particles.len(), out.len())?;
    check_particle_len("i_slice_particles", i_slice_particles.len(), out.len())?;
    for ip in 0..out.len() {
        layout.checked_result_offset(0, i_bunch_particles[ip], i_slice_particles[ip])?;
    }
    nearest_result(layout, data, i_bunch_particles, i_slice_particles, out);
    Ok(())
}

/// Validated companion of [`interp_result`]. Re-derives the grid from the
/// raw centers, so non-uniform or non-increasing spacing is rejected.
#[allow(clippy::too_many_arguments)]
pub fn interp_result_checked(
    layout: &MomentsLayout,
    num_turns: usize,
    data: &[f64],
    zeta_centers: &[f64],
    zeta_particles: &[f64],
    i_bunch_particles: &[usize],
    i_edge_particles: &[usize],
    out: &mut [f64],
) -> WakeResult<()> {
    check_buffer(layout, data)?;
    check_particle_len("zeta_particles", zeta_particles.len(), out.len())?;
    check_particle_len("i_bunch_particles", i_bunch_particles.len(), out.len())?;
    check_particle_len("i_edge_particles", i_edge_particles.len(), out.len())?;

    let grid = SliceGrid::from_centers(zeta_centers)?;
    let num_slices = grid.num_slices();
    if num_slices > layout.aux_per_slot {
        return Err(WakeError::LayoutViolation(format!(
            "{num_slices} slice centers exceed the {} bins of a slot window",
            layout.aux_per_slot
        )));
    }
    if num_turns > layout.num_turns {
        return Err(WakeError::LayoutViolation(format!(
            "summation depth {num_turns} exceeds stored turn capacity {}",
            layout.num_turns
        )));
    }

    for ip in 0..out.len() {
        layout.checked_result_offset(0, i_bunch_particles[ip], 0)?;
        let i_edge = i_edge_particles[ip];
        if i_edge > num_slices {
            return Err(WakeError::IndexOutOfRange {
                axis: "edge",
                index: i_edge,
                limit: num_slices + 1,
            });
        }
        if !zeta_particles[ip].is_finite() {
            return Err(WakeError::PhysicsViolation(format!(
                "zeta of particle {ip} is not finite"
            )));
        }
    }

    interp_result(
        layout,
        num_turns,
        data,
        zeta_centers,
        zeta_particles,
        i_bunch_particles,
        i_edge_particles,
        out,
    );
    Ok(())
}

fn check_buffer(layout: &MomentsLayout, data: &[f64]) -> WakeResult<()> {
    if data.len() != layout.len() {
        return Err(WakeError::LayoutViolation(format!(
            "buffer holds {} scalars, layout expects {}",
            data.len(),
            layout.len()
        )));
    }
    Ok(())
}

fn check_particle_len(name: &'static str, len: usize, out_len: usize) -> WakeResult<()> {
    if len != out_len {
        return Err(WakeError::LayoutViolation(format!(
            "{name} has {len} entries for {out_len} output slots"
        )));
    }
    Ok(())
}
