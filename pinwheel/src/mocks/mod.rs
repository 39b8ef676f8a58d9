//! Mocked collaborators (pulse sink, camera stack) used to exercise the crate without hardware.

pub mod camera;
pub mod pulse_sink;
