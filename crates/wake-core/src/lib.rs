//! Compressed multi-turn wake-source profile.
//!
//! A compact history of per-bunch, per-slice source moments over past
//! revolutions, plus the per-particle kernels that reconstruct the wake
//! contribution from that history.

pub mod element;
pub mod kernels;
pub mod profile;
