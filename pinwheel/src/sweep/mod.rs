//! Defines the servo sweep: a triangular angle waveform turned into pulse-width commands.

mod config;
mod controller;
mod state;

pub use config::{SweepConfig, MAX_ANGLE};
pub use controller::{SweepController, SweepReport};
pub use state::{Direction, PulseCommand, Steps, SweepState};
