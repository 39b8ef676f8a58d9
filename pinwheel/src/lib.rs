#![doc(html_root_url = "https://docs.rs/pinwheel/0.1.0")]

//! <h1 align="center">PINWHEEL - Servo sweep & camera preview for the Raspberry Pi</h1>
//!
//! # Features
//!
//! **Pinwheel** drives small pieces of hardware wired to a Raspberry Pi header:
//!
//! - Sweep a servo back and forth with a [`SweepController`](sweep::SweepController), feeding
//!   pulse widths into any [`PulseSink`](hardware::PulseSink) (GPIO through `rppal` by default)
//! - Model the physical 40-pin header with [`Board`](hardware::Board): pin validation, BCM mapping,
//!   CPU temperature
//! - Preview a camera feed with [`Preview`](camera::Preview), generic over the camera stack
//!
//! # Getting Started
//!
//! The following code sweeps a servo wired to GPIO18 until Ctrl-C is pressed.
//! ```ignore
//! use pinwheel::hardware::{Board, GpioSink, PulseSink};
//! use pinwheel::sweep::{SweepConfig, SweepController};
//! use pinwheel::utils::CancellationToken;
//!
//! #[pinwheel::runtime]
//! async fn main() -> Result<(), pinwheel::errors::Error> {
//!     let mut sink = GpioSink::new(Board::default());
//!     sink.initialize()?;
//!
//!     let mut sweep = SweepController::new(sink, SweepConfig::default())?;
//!     sweep.attach()?;
//!     sweep.run(&CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Feature flags
//!
//! - **cli** -- (enabled by default) Builds the `pinwheel-sweep` binary (activates **rppal** and **serde**).
//! - **rppal** -- Provides the [`GpioSink`](hardware::GpioSink) driving real GPIO channels.
//! - **serde** -- Enables serialize/deserialize capabilities and TOML configuration files.
//! - **mocks** -- Provides mocked collaborators of all kinds (useful for tests mostly).

pub mod camera;
pub mod errors;
pub mod hardware;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
pub mod sweep;
pub mod utils;

pub use pinwheel_macros::runtime;
