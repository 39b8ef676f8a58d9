//! Defines the pieces of hardware a sweep (or any pulse-driven device) can be wired to.

mod board;
#[cfg(feature = "rppal")]
mod gpio;

use std::any::type_name;
use std::fmt::{Debug, Display, Formatter};

use dyn_clone::DynClone;

use crate::errors::Error;
pub use board::{Board, Pin, HEADER_PINS, THERMAL_ZONE};
#[cfg(feature = "rppal")]
pub use gpio::{GpioSink, SERVO_PERIOD};

/// Direction a channel is configured for.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChannelMode {
    #[default]
    Input,
    Output,
}

impl Display for ChannelMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelMode::Input => write!(f, "INPUT"),
            ChannelMode::Output => write!(f, "OUTPUT"),
        }
    }
}

// Makes a Box<dyn PulseSink> clone (used for SweepController cloning).
dyn_clone::clone_trait_object!(PulseSink);

/// Defines the capability of anything able to receive pulse-width commands: most likely a GPIO
/// channel driving a servo.
///
/// Channels are addressed by their BCM GPIO number.
pub trait PulseSink: DynClone + Send + Sync + Debug {
    /// Returns the sink name (used for logs only).
    fn get_name(&self) -> &'static str {
        type_name::<Self>().split("::").last().unwrap_or("PulseSink")
    }

    /// Initializes the underlying GPIO subsystem.
    /// Must succeed before any other command is issued.
    fn initialize(&mut self) -> Result<(), Error>;

    /// Configures the `mode` of a `channel`.
    fn set_channel_mode(&mut self, channel: u8, mode: ChannelMode) -> Result<(), Error>;

    /// Commands a pulse of `width` microseconds on the given `channel`.
    /// A `width` of 0 stops the pulse train.
    fn set_pulse_width(&mut self, channel: u8, width: u32) -> Result<(), Error>;

    /// Drives an output `channel` HIGH (`true`) or LOW (`false`).
    fn digital_write(&mut self, channel: u8, level: bool) -> Result<(), Error>;

    /// Reads the level of an input `channel`.
    fn digital_read(&self, channel: u8) -> Result<bool, Error>;

    /// Drives every output LOW then releases every channel and the GPIO subsystem.
    fn terminate(&mut self) -> Result<(), Error>;
}
