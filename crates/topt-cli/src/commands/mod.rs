//! CLI command implementations.

pub mod check;
pub mod common;
pub mod gadgetise;
pub mod resynth;
pub mod version;
