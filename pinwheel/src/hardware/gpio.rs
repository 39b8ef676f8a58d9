use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace};
use parking_lot::Mutex;
use rppal::gpio::{Gpio, InputPin, OutputPin};

use crate::errors::Error;
use crate::errors::HardwareError::{IncompatibleMode, InitializationFailed, NotInitialized};
use crate::hardware::{Board, ChannelMode, PulseSink};

/// Servo pulse period: 20ms (50Hz).
pub const SERVO_PERIOD: Duration = Duration::from_millis(20);

#[derive(Debug)]
enum Channel {
    Input(InputPin),
    Output(OutputPin),
}

/// [`PulseSink`] driving Raspberry Pi GPIO channels through `rppal` software PWM.
///
/// Channels are validated against the physical [`Board`] header before use.
#[derive(Clone, Debug, Default)]
pub struct GpioSink {
    gpio: Option<Gpio>,
    board: Board,
    channels: Arc<Mutex<HashMap<u8, Channel>>>,
}

impl GpioSink {
    pub fn new(board: Board) -> Self {
        Self {
            gpio: None,
            board,
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the board this sink validates its channels against.
    pub fn get_board(&self) -> &Board {
        &self.board
    }
}

impl Display for GpioSink {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [initialized={}, channels={}]",
            self.get_name(),
            self.gpio.is_some(),
            self.channels.lock().len()
        )
    }
}

impl PulseSink for GpioSink {
    fn initialize(&mut self) -> Result<(), Error> {
        let gpio = Gpio::new().map_err(|err| InitializationFailed {
            info: err.to_string(),
        })?;
        debug!("GPIO initialized");
        self.gpio = Some(gpio);
        Ok(())
    }

    fn set_channel_mode(&mut self, channel: u8, mode: ChannelMode) -> Result<(), Error> {
        let gpio = self.gpio.as_ref().ok_or(NotInitialized)?;
        let physical = self.board.physical(channel)?;
        self.board.setup_pin(physical, mode)?;

        let mut channels = self.channels.lock();
        // Release the previous configuration first: rppal refuses to hand out a pin twice.
        channels.remove(&channel);
        let pin = gpio.get(channel)?;
        let configured = match mode {
            ChannelMode::Input => Channel::Input(pin.into_input()),
            ChannelMode::Output => Channel::Output(pin.into_output()),
        };
        channels.insert(channel, configured);
        Ok(())
    }

    fn set_pulse_width(&mut self, channel: u8, width: u32) -> Result<(), Error> {
        let mut channels = self.channels.lock();
        let Some(Channel::Output(pin)) = channels.get_mut(&channel) else {
            return Err(IncompatibleMode {
                channel,
                mode: ChannelMode::Output,
            }
            .into());
        };

        trace!("GPIO{} pulse width: {}us", channel, width);
        match width {
            0 => pin.clear_pwm()?,
            _ => pin.set_pwm(SERVO_PERIOD, Duration::from_micros(u64::from(width)))?,
        }
        Ok(())
    }

    fn digital_write(&mut self, channel: u8, level: bool) -> Result<(), Error> {
        let mut channels = self.channels.lock();
        let Some(Channel::Output(pin)) = channels.get_mut(&channel) else {
            return Err(IncompatibleMode {
                channel,
                mode: ChannelMode::Output,
            }
            .into());
        };

        // A steady level replaces any running pulse train.
        pin.clear_pwm()?;
        match level {
            true => pin.set_high(),
            false => pin.set_low(),
        }
        self.board.set_level(self.board.physical(channel)?, level)?;
        trace!("GPIO{} level: {}", channel, level);
        Ok(())
    }

    fn digital_read(&self, channel: u8) -> Result<bool, Error> {
        match self.channels.lock().get(&channel) {
            Some(Channel::Input(pin)) => Ok(pin.is_high()),
            _ => Err(IncompatibleMode {
                channel,
                mode: ChannelMode::Input,
            }
            .into()),
        }
    }

    fn terminate(&mut self) -> Result<(), Error> {
        let mut channels = self.channels.lock();
        for channel in channels.values_mut() {
            if let Channel::Output(pin) = channel {
                pin.clear_pwm()?;
                pin.set_low();
            }
        }
        channels.clear();
        self.board.cleanup();
        self.gpio = None;
        debug!("GPIO terminated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_before_initialize() {
        let mut sink = GpioSink::new(Board::new());
        assert!(sink.set_channel_mode(18, ChannelMode::Output).is_err());
        assert_eq!(
            sink.set_pulse_width(18, 1500).unwrap_err().to_string(),
            "Hardware error: Channel (18) not configured for mode (OUTPUT)."
        );
        assert!(sink.digital_write(18, true).is_err());
        assert_eq!(
            sink.digital_read(17).unwrap_err().to_string(),
            "Hardware error: Channel (17) not configured for mode (INPUT)."
        );
        assert!(sink.terminate().is_ok());
    }

    #[test]
    fn test_display() {
        let sink = GpioSink::new(Board::new());
        assert_eq!(
            format!("{}", sink),
            "GpioSink [initialized=false, channels=0]"
        );
    }
}
