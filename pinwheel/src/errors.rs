use log::error;
use snafu::Snafu;

pub use crate::errors::Error::*;
use crate::errors::HardwareError::GpioFailure;
use crate::hardware::ChannelMode;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Runtime error: Are you sure your code runs inside #[pinwheel::runtime]?
    RuntimeError,
    /// Hardware error: {source}.
    HardwareError { source: HardwareError },
    /// Camera error: {source}.
    CameraError { source: CameraError },
    /// Configuration error: {source}.
    ConfigError { source: ConfigError },
    /// Unknown error: {info}.
    Unknown { info: String },
}

impl Error {
    /// Returns the process exit status matching this error.
    ///
    /// Every failure ending the process maps to `1`: startup failures (GPIO initialization,
    /// camera lookup, acquisition or capture opening) are not told apart by their status. A new
    /// variant must be listed here explicitly.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::RuntimeError
            | Self::HardwareError { .. }
            | Self::CameraError { .. }
            | Self::ConfigError { .. }
            | Self::Unknown { .. } => 1,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        error!("std::io error {:?}", error);
        let info = match error.kind() {
            std::io::ErrorKind::NotFound => String::from("Device not found or already in use"),
            std::io::ErrorKind::PermissionDenied => {
                String::from("Permission denied while accessing the device")
            }
            _ => error.to_string(),
        };
        Self::HardwareError {
            source: GpioFailure { info },
        }
    }
}

#[cfg(feature = "rppal")]
impl From<rppal::gpio::Error> for Error {
    fn from(error: rppal::gpio::Error) -> Self {
        error!("gpio error {:?}", error);
        Self::HardwareError {
            source: GpioFailure {
                info: error.to_string(),
            },
        }
    }
}

impl From<HardwareError> for Error {
    fn from(value: HardwareError) -> Self {
        Self::HardwareError { source: value }
    }
}

impl From<CameraError> for Error {
    fn from(value: CameraError) -> Self {
        Self::CameraError { source: value }
    }
}

impl From<ConfigError> for Error {
    fn from(value: ConfigError) -> Self {
        Self::ConfigError { source: value }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum HardwareError {
    /// GPIO initialization failed - {info}
    InitializationFailed { info: String },
    /// GPIO has not been initialized
    NotInitialized,
    /// {info}
    GpioFailure { info: String },
    /// Unknown pin {pin}
    UnknownPin { pin: u8 },
    /// Pin ({pin}) is reserved for {reason}
    RestrictedPin { pin: u8, reason: &'static str },
    /// Pin ({pin}) is not setup
    PinNotSetup { pin: u8 },
    /// Channel ({channel}) not configured for mode ({mode})
    IncompatibleMode { channel: u8, mode: ChannelMode },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CameraError {
    /// No cameras found
    NoCamera,
    /// Failed to acquire the camera '{name}'
    AcquireFailed { name: String },
    /// Failed to open camera '{name}'
    OpenFailed { name: String },
    /// Capture device is not opened
    NotOpened,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Sweep step must be greater than zero
    NullStep,
    /// Sweep step ({step}°) larger than the sweep range ({span}°)
    StepTooLarge { step: u16, span: u16 },
    /// Invalid sweep range [{start}, {end}]: start must be lower than end
    InvalidRange { start: u16, end: u16 },
    /// Neutral position ({neutral}°) outside the sweep range [{start}, {end}]
    NeutralOutOfRange { neutral: u16, start: u16, end: u16 },
    /// Sweep range ends at {end}°: servos only travel up to {max}°
    AngleOutOfBounds { end: u16, max: u16 },
    /// Pulse width for {angle}° overflows ({baseline_pulse}us + {pulse_per_degree}us/°)
    PulseOverflow {
        angle: u16,
        baseline_pulse: u32,
        pulse_per_degree: u32,
    },
    /// Unable to parse configuration - {info}
    ParseFailure { info: String },
}

#[cfg(test)]
mod tests {
    use std::io;

    use crate::errors::CameraError::{AcquireFailed, NoCamera, OpenFailed};
    use crate::errors::ConfigError::StepTooLarge;
    use crate::errors::HardwareError::{IncompatibleMode, RestrictedPin, UnknownPin};

    use super::*;

    #[test]
    fn test_error_display() {
        let runtime_error = RuntimeError;
        assert_eq!(
            format!("{}", runtime_error),
            "Runtime error: Are you sure your code runs inside #[pinwheel::runtime]?"
        );

        let hardware_error = Error::from(IncompatibleMode {
            channel: 18,
            mode: ChannelMode::Output,
        });
        assert_eq!(
            format!("{}", hardware_error),
            "Hardware error: Channel (18) not configured for mode (OUTPUT)."
        );

        let restricted = Error::from(RestrictedPin {
            pin: 6,
            reason: "Ground",
        });
        assert_eq!(
            format!("{}", restricted),
            "Hardware error: Pin (6) is reserved for Ground."
        );

        let camera_error = Error::from(AcquireFailed {
            name: String::from("imx219"),
        });
        assert_eq!(
            format!("{}", camera_error),
            "Camera error: Failed to acquire the camera 'imx219'."
        );

        let config_error = Error::from(StepTooLarge { step: 200, span: 180 });
        assert_eq!(
            format!("{}", config_error),
            "Configuration error: Sweep step (200°) larger than the sweep range (180°)."
        );

        let unknown_error = Unknown {
            info: "Some unknown error".to_string(),
        };
        assert_eq!(
            format!("{}", unknown_error),
            "Unknown error: Some unknown error."
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: Error = io_error.into();
        assert_eq!(
            format!("{}", error),
            "Hardware error: Device not found or already in use."
        );

        let io_error = io::Error::new(io::ErrorKind::Other, "boom");
        let error: Error = io_error.into();
        assert_eq!(format!("{}", error), "Hardware error: boom.");
    }

    #[test]
    fn test_from_hardware_error() {
        let error: Error = UnknownPin { pin: 42 }.into();
        assert_eq!(format!("{}", error), "Hardware error: Unknown pin 42.");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::from(NoCamera).exit_code(), 1);
        assert_eq!(
            Error::from(OpenFailed {
                name: String::from("/dev/video0")
            })
            .exit_code(),
            1
        );
        assert_eq!(
            Error::from(HardwareError::InitializationFailed {
                info: String::from("no /dev/gpiomem")
            })
            .exit_code(),
            1
        );
        assert_eq!(RuntimeError.exit_code(), 1);
        assert_eq!(Error::from(ConfigError::NullStep).exit_code(), 1);
        assert_eq!(
            Unknown {
                info: String::from("boom")
            }
            .exit_code(),
            1
        );
    }
}
