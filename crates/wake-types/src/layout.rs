// ─────────────────────────────────────────────────────────────────────
// SCPN Wake Core — Moments Layout
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Flat addressing of the compressed moments history buffer.
//!
//! The buffer is one contiguous `f64` row-major block with three logical
//! axes: moment (which stored quantity), turn (0 = most recent completed
//! turn), and position within a turn row. A turn row concatenates one
//! window of `aux_per_slot` longitudinal bins per bunch slot, in
//! *reversed* slot order: bunch 0, the leading bunch, occupies the
//! highest-index window. The last moment axis entry holds the
//! reconstructed wake ("result") read by the extraction kernels.
//!
//! Both conventions are binary-layout invariants shared with the external
//! accumulation step that fills the buffer. They are expressed once, here,
//! and every consumer goes through this type.

use crate::error::{WakeError, WakeResult};

/// Shape and addressing rules of one moments history buffer.
///
/// `turn_stride` is the length of one turn row. The container sizes it
/// with convolution headroom, so it can exceed `num_slots * aux_per_slot`;
/// it never shrinks below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MomentsLayout {
    pub num_moments: usize,  // stored quantities, result last
    pub num_turns: usize,    // retained history depth
    pub turn_stride: usize,  // length of one turn row
    pub num_slots: usize,    // stored bunch slots
    pub aux_per_slot: usize, // longitudinal bins per slot window
}

impl MomentsLayout {
    /// Validated constructor. All axis sizes must be nonzero and the turn
    /// row must hold every slot window.
    pub fn new(
        num_moments: usize,
        num_turns: usize,
        num_slots: usize,
        aux_per_slot: usize,
        turn_stride: usize,
    ) -> WakeResult<Self> {
        if num_moments == 0 || num_turns == 0 || num_slots == 0 || aux_per_slot == 0 {
            return Err(WakeError::LayoutViolation(format!(
                "all axis sizes must be nonzero: moments={num_moments}, turns={num_turns}, \
                 slots={num_slots}, aux={aux_per_slot}"
            )));
        }
        if turn_stride < num_slots * aux_per_slot {
            return Err(WakeError::LayoutViolation(format!(
                "turn_stride={turn_stride} cannot hold {num_slots} slots of {aux_per_slot} bins"
            )));
        }
        Ok(MomentsLayout {
            num_moments,
            num_turns,
            turn_stride,
            num_slots,
            aux_per_slot,
        })
    }

    /// Layout with no headroom: the turn row is exactly the slot windows.
    pub fn packed(
        num_moments: usize,
        num_turns: usize,
        num_slots: usize,
        aux_per_slot: usize,
    ) -> WakeResult<Self> {
        Self::new(
            num_moments,
            num_turns,
            num_slots,
            aux_per_slot,
            num_slots * aux_per_slot,
        )
    }

    /// Total number of scalars in the buffer.
    pub fn len(&self) -> usize {
        self.num_moments * self.num_turns * self.turn_stride
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the result moment (pinned to the trailing axis entry).
    pub fn result_moment(&self) -> usize {
        self.num_moments - 1
    }

    /// First bin of slot `i_bunch`'s window within a turn row.
    ///
    /// Slot order is reversed: bunch 0 starts at the highest offset and
    /// bunch `num_slots - 1` at zero.
    #[inline]
    pub fn slot_start(&self, i_bunch: usize) -> usize {
        debug_assert!(i_bunch < self.num_slots, "bunch index out of range");
        (self.num_slots - i_bunch - 1) * self.aux_per_slot
    }

    /// Offset of the result-moment row for turn `i_turn`.
    #[inline]
    pub fn result_turn_offset(&self, i_turn: usize) -> usize {
        debug_assert!(i_turn < self.num_turns, "turn index out of range");
        self.turn_stride * (i_turn + self.num_turns * (self.num_moments - 1))
    }

    /// Flat offset of the result moment at (turn, bunch, bin).
    ///
    /// Trusted-index fast path: out-of-range inputs are a caller bug and
    /// are only caught by `debug_assert!` or the slice bounds check of the
    /// eventual read.
    #[inline]
    pub fn result_offset(&self, i_turn: usize, i_bunch: usize, i_slice: usize) -> usize {
        debug_assert!(i_slice < self.aux_per_slot, "bin index out of range");
        self.result_turn_offset(i_turn) + self.slot_start(i_bunch) + i_slice
    }

    /// Pre-simplified `result_offset` for the most recent turn.
    #[inline]
    pub fn latest_result_offset(&self, i_bunch: usize, i_slice: usize) -> usize {
        self.result_offset(0, i_bunch, i_slice)
    }

    /// Flat offset of any moment at (moment, turn, position in row).
    #[inline]
    pub fn moment_offset(&self, i_moment: usize, i_turn: usize, pos: usize) -> usize {
        debug_assert!(i_moment < self.num_moments, "moment index out of range");
        debug_assert!(i_turn < self.num_turns, "turn index out of range");
        debug_assert!(pos < self.turn_stride, "row position out of range");
        self.turn_stride * (i_turn + self.num_turns * i_moment) + pos
    }

    /// Range-checked companion of `result_offset` for tests and
    /// diagnostics.
    pub fn checked_result_offset(
        &self,
        i_turn: usize,
        i_bunch: usize,
        i_slice: usize,
    ) -> WakeResult<usize> {
        self.check_axis("turn", i_turn, self.num_turns)?;
        self.check_axis("bunch", i_bunch, self.num_slots)?;
        self.check_axis("slice", i_slice, self.aux_per_slot)?;
        Ok(self.result_offset(i_turn, i_bunch, i_slice))
    }

    /// Range-checked companion of `moment_offset`.
    pub fn checked_moment_offset(
        &self,
        i_moment: usize,
        i_turn: usize,
        pos: usize,
    ) -> WakeResult<usize> {
        self.check_axis("moment", i_moment, self.num_moments)?;
        self.check_axis("turn", i_turn, self.num_turns)?;
        self.check_axis("position", pos, self.turn_stride)?;
        Ok(self.moment_offset(i_moment, i_turn, pos))
    }

    fn check_axis(&self, axis: &'static str, index: usize, limit: usize) -> WakeResult<()> {
        if index >= limit {
            return Err(WakeError::IndexOutOfRange { axis, index, limit });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_slot_layout_is_identity() {
        // One moment, one turn, one slot: the buffer is the slot window.
        let layout = MomentsLayout::packed(1, 1, 1, 3).unwrap();
        assert_eq!(layout.len(), 3);
        for i_slice in 0..3 {
            assert_eq!(layout.latest_result_offset(0, i_slice), i_slice);
        }
    }

    #[test]
    fn test_slot_order_is_reversed() {
        let layout = MomentsLayout::packed(1, 1, 4, 5).unwrap();
        assert_eq!(layout.slot_start(0), 15, "leading bunch takes the top window");
        assert_eq!(layout.slot_start(1), 10);
        assert_eq!(layout.slot_start(3), 0, "trailing bunch takes the bottom window");
    }

    #[test]
    fn test_result_moment_is_pinned_to_trailing_axis() {
        // 3 moments, 2 turns, 2 slots of 4 bins, packed row of 8.
        let layout = MomentsLayout::packed(3, 2, 2, 4).unwrap();
        // Result rows start after the first two moments: 8 * 2 turns * 2.
        assert_eq!(layout.result_turn_offset(0), 32);
        assert_eq!(layout.result_turn_offset(1), 40);
        assert_eq!(layout.result_offset(1, 0, 2), 40 + 4 + 2);
        assert_eq!(layout.latest_result_offset(1, 3), 32 + 0 + 3);
    }

    #[test]
    fn test_moment_offset_covers_all_rows() {
        let layout = MomentsLayout::packed(2, 3, 1, 4).unwrap();
        assert_eq!(layout.moment_offset(0, 0, 0), 0);
        assert_eq!(layout.moment_offset(0, 2, 3), 2 * 4 + 3);
        assert_eq!(layout.moment_offset(1, 0, 0), 3 * 4);
        assert_eq!(
            layout.moment_offset(layout.result_moment(), 1, 2),
            layout.result_turn_offset(1) + 2
        );
    }

    #[test]
    fn test_headroom_stride_shifts_turn_rows() {
        // Stride larger than the slot windows (convolution headroom).
        let layout = MomentsLayout::new(2, 2, 2, 3, 9).unwrap();
        assert_eq!(layout.len(), 2 * 2 * 9);
        assert_eq!(layout.result_turn_offset(1), 9 * (1 + 2));
        // Slot windows still sit at the row start.
        assert_eq!(layout.slot_start(1), 0);
        assert_eq!(layout.slot_start(0), 3);
    }

    #[test]
    fn test_constructor_rejects_degenerate_shapes() {
        assert!(MomentsLayout::new(0, 1, 1, 1, 1).is_err());
        assert!(MomentsLayout::new(1, 0, 1, 1, 1).is_err());
        assert!(MomentsLayout::new(1, 1, 0, 1, 0).is_err());
        assert!(MomentsLayout::new(1, 1, 1, 0, 1).is_err());
        // Row too short for the slot windows.
        assert!(MomentsLayout::new(1, 1, 2, 4, 7).is_err());
        assert!(MomentsLayout::new(1, 1, 2, 4, 8).is_ok());
    }

    #[test]
    fn test_checked_offsets_match_unchecked() {
        let layout = MomentsLayout::new(3, 4, 2, 5, 12).unwrap();
        for i_turn in 0..4 {
            for i_bunch in 0..2 {
                for i_slice in 0..5 {
                    let checked = layout
                        .checked_result_offset(i_turn, i_bunch, i_slice)
                        .unwrap();
                    assert_eq!(checked, layout.result_offset(i_turn, i_bunch, i_slice));
                    assert!(checked < layout.len(), "offset must stay in the buffer");
                }
            }
        }
    }

    #[test]
    fn test_checked_offsets_reject_out_of_range() {
        let layout = MomentsLayout::packed(2, 2, 2, 3).unwrap();
        assert!(matches!(
            layout.checked_result_offset(2, 0, 0),
            Err(WakeError::IndexOutOfRange { axis: "turn", .. })
        ));
        assert!(matches!(
            layout.checked_result_offset(0, 2, 0),
            Err(WakeError::IndexOutOfRange { axis: "bunch", .. })
        ));
        assert!(matches!(
            layout.checked_result_offset(0, 0, 3),
            Err(WakeError::IndexOutOfRange { axis: "slice", .. })
        ));
        assert!(matches!(
            layout.checked_moment_offset(2, 0, 0),
            Err(WakeError::IndexOutOfRange { axis: "moment", .. })
        ));
    }
}
