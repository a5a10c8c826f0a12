// ─────────────────────────────────────────────────────────────────────
// SCPN Wake Core — Compressed Profile
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Owner of the compressed moments history.
//!
//! One buffer holds every configured source moment plus the reconstructed
//! wake, per stored turn, per bunch slot. The external accumulation step
//! writes windows through `set_moments` and rolls the history once per
//! revolution with `advance_turn`; the extraction kernels read the flat
//! buffer through the layout. Turn rows carry convolution headroom beyond
//! the slot windows, sized like the window concatenation of sources and
//! targets.

use ndarray::Array1;
use wake_types::config::WakeConfig;
use wake_types::error::{WakeError, WakeResult};
use wake_types::grid::SliceGrid;
use wake_types::layout::MomentsLayout;

use crate::kernels;

/// Name of the reconstructed wake moment, pinned to the trailing
/// component of the buffer.
pub const RESULT_MOMENT: &str = "result";

#[derive(Debug, Clone)]
pub struct CompressedProfile {
    layout: MomentsLayout,
    moment_names: Vec<String>,
    data: Vec<f64>,
    window: SliceGrid, // source window of bunch slot 0
    bunch_spacing_zeta: f64,
    num_slices: usize,        // bins written per window
    num_target_slices: usize, // target window width, sizes the headroom
}

impl CompressedProfile {
    /// Build an empty history from a validated configuration. The result
    /// moment is appended after the configured source moments.
    pub fn new(config: &WakeConfig) -> WakeResult<Self> {
        config.validate()?;
        let num_slots = config.resolved_num_slots()?;
        let target_slots = config.target_slots()?;
        let num_slices = config.profile.num_slices;
        let num_target_slices = config.target_slices();

        let aux_per_slot = num_slices + num_target_slices;
        let turn_stride = (num_slots + target_slots - 1) * aux_per_slot;

        let mut moment_names = config.moments.clone();
        moment_names.push(RESULT_MOMENT.to_string());

        let layout = MomentsLayout::new(
            moment_names.len(),
            config.profile.num_turns,
            num_slots,
            aux_per_slot,
            turn_stride,
        )?;
        let data = vec![0.0; layout.len()];
        let window = config.slice_grid()?;

        Ok(CompressedProfile {
            layout,
            moment_names,
            data,
            window,
            bunch_spacing_zeta: config.ring.bunch_spacing_zeta,
            num_slices,
            num_target_slices,
        })
    }

    pub fn layout(&self) -> &MomentsLayout {
        &self.layout
    }

    /// Flat read-only view for the extraction kernels.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn moment_names(&self) -> &[String] {
        &self.moment_names
    }

    pub fn num_slices(&self) -> usize {
        self.num_slices
    }

    pub fn num_target_slices(&self) -> usize {
        self.num_target_slices
    }

    pub fn num_slots(&self) -> usize {
        self.layout.num_slots
    }

    pub fn num_turns(&self) -> usize {
        self.layout.num_turns
    }

    /// Source window grid of bunch slot 0.
    pub fn window_grid(&self) -> &SliceGrid {
        &self.window
    }

    /// Component index of a stored moment.
    pub fn moment_index(&self, name: &str) -> WakeResult<usize> {
        self.moment_names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| WakeError::UnknownMoment(name.to_string()))
    }

    /// Window centers of source slot `i_source` (slot windows of later
    /// bunches sit at negative multiples of the bunch spacing).
    pub fn slice_centers(&self, i_source: usize) -> WakeResult<SliceGrid> {
        if i_source >= self.layout.num_slots {
            return Err(WakeError::IndexOutOfRange {
                axis: "bunch",
                index: i_source,
                limit: self.layout.num_slots,
            });
        }
        Ok(self
            .window
            .shifted(-(i_source as f64) * self.bunch_spacing_zeta))
    }

    /// Write one turn of aggregated moments for source slot `i_source`.
    /// Each value slice fills the `num_slices` leading bins of the slot's
    /// window; the headroom bins stay untouched.
    pub fn set_moments(
        &mut self,
        i_source: usize,
        i_turn: usize,
        moments: &[(&str, &[f64])],
    ) -> WakeResult<()> {
        if i_source >= self.layout.num_slots {
            return Err(WakeError::IndexOutOfRange {
                axis: "bunch",
                index: i_source,
                limit: self.layout.num_slots,
            });
        }
        if i_turn >= self.layout.num_turns {
            return Err(WakeError::IndexOutOfRange {
                axis: "turn",
                index: i_turn,
                limit: self.layout.num_turns,
            });
        }
        let start = self.layout.slot_start(i_source);
        for (name, values) in moments {
            let i_moment = self.moment_index(name)?;
            if values.len() != self.num_slices {
                return Err(WakeError::LayoutViolation(format!(
                    "moment '{name}' carries {} values for a {}-slice window",
                    values.len(),
                    self.num_slices
                )));
            }
            for (k, &value) in values.iter().enumerate() {
                let offset = self.layout.moment_offset(i_moment, i_turn, start + k);
                self.data[offset] = value;
            }
        }
        Ok(())
    }

    /// Assemble one moment's profile over every source slot at turn
    /// `i_turn`, in beam order: the window of slot 0 (leading bunch) ends
    /// up at the top of a globally increasing `z`.
    pub fn get_moment_profile(
        &self,
        name: &str,
        i_turn: usize,
    ) -> WakeResult<(Array1<f64>, Array1<f64>)> {
        let i_moment = self.moment_index(name)?;
        if i_turn >= self.layout.num_turns {
            return Err(WakeError::IndexOutOfRange {
                axis: "turn",
                index: i_turn,
                limit: self.layout.num_turns,
            });
        }

        let num_slots = self.layout.num_slots;
        let mut z_out = Array1::zeros(num_slots * self.num_slices);
        let mut moment_out = Array1::zeros(num_slots * self.num_slices);
        for i_source in 0..num_slots {
            let out_start = (num_slots - (i_source + 1)) * self.num_slices;
            let in_start = self.layout.slot_start(i_source);
            let shift = -(i_source as f64) * self.bunch_spacing_zeta;
            for k in 0..self.num_slices {
                z_out[out_start + k] = self.window.centers[k] + shift;
                moment_out[out_start + k] =
                    self.data[self.layout.moment_offset(i_moment, i_turn, in_start + k)];
            }
        }
        Ok((z_out, moment_out))
    }

    /// Roll the history one revolution: turn `t` becomes turn `t + 1`,
    /// the oldest turn falls off, turn 0 is zeroed for the accumulation
    /// of the new revolution. A single-turn history is simply zeroed.
    pub fn advance_turn(&mut self) {
        let stride = self.layout.turn_stride;
        for i_moment in 0..self.layout.num_moments {
            for i_turn in (1..self.layout.num_turns).rev() {
                let src = self.layout.moment_offset(i_moment, i_turn - 1, 0);
                let dst = self.layout.moment_offset(i_moment, i_turn, 0);
                self.data.copy_within(src..src + stride, dst);
            }
            let head = self.layout.moment_offset(i_moment, 0, 0);
            self.data[head..head + stride].fill(0.0);
        }
    }

    /// Bound form of [`kernels::nearest_result`] over this history.
    pub fn nearest_result(
        &self,
        i_bunch_particles: &[usize],
        i_slice_particles: &[usize],
        out: &mut [f64],
    ) {
        kernels::nearest_result(
            &self.layout,
            &self.data,
            i_bunch_particles,
            i_slice_particles,
            out,
        );
    }

    /// Bound form of [`kernels::interp_result`] summing the full stored
    /// history.
    pub fn interp_result(
        &self,
        zeta_centers: &[f64],
        zeta_particles: &[f64],
        i_bunch_particles: &[usize],
        i_edge_particles: &[usize],
        out: &mut [f64],
    ) {
        kernels::interp_result(
            &self.layout,
            self.layout.num_turns,
            &self.data,
            zeta_centers,
            zeta_particles,
            i_bunch_particles,
            i_edge_particles,
            out,
        );
    }
}
