use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::time::Instant;

use crate::errors::Error;
use crate::errors::HardwareError::{
    GpioFailure, IncompatibleMode, InitializationFailed, NotInitialized,
};
use crate::hardware::{ChannelMode, PulseSink};

/// A pulse-width command received by the [`MockPulseSink`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RecordedPulse {
    pub channel: u8,
    pub width: u32,
    /// When the command was received (tokio clock: follows paused time in tests).
    pub at: Instant,
}

#[derive(Debug, Default)]
struct MockSinkData {
    initialized: bool,
    terminated: bool,
    modes: HashMap<u8, ChannelMode>,
    commands: Vec<RecordedPulse>,
    /// Levels written to outputs.
    levels: HashMap<u8, bool>,
    /// Levels read from inputs.
    inputs: HashMap<u8, bool>,
    fail_initialization: bool,
    fail_after: Option<usize>,
}

/// Mock implementation of [`PulseSink`] recording every command it receives.
///
/// Clones share the same record, so a clone can be handed to the code under test while the
/// original is used for assertions.
#[derive(Clone, Debug, Default)]
pub struct MockPulseSink {
    data: Arc<RwLock<MockSinkData>>,
}

impl MockPulseSink {
    /// A sink whose initialization always fails.
    pub fn failing_initialization() -> Self {
        let sink = Self::default();
        sink.data.write().fail_initialization = true;
        sink
    }

    /// Makes the sink fail every pulse command after `count` successful ones.
    pub fn fail_after(self, count: usize) -> Self {
        self.data.write().fail_after = Some(count);
        self
    }

    /// Makes an input channel read the given level.
    pub fn with_input(self, channel: u8, level: bool) -> Self {
        self.data.write().inputs.insert(channel, level);
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.data.read().initialized
    }

    pub fn is_terminated(&self) -> bool {
        self.data.read().terminated
    }

    /// Returns the mode a channel has been configured with.
    pub fn get_mode(&self, channel: u8) -> Option<ChannelMode> {
        self.data.read().modes.get(&channel).copied()
    }

    /// Returns the last level written to an output channel.
    pub fn get_level(&self, channel: u8) -> Option<bool> {
        self.data.read().levels.get(&channel).copied()
    }

    /// Returns all pulse commands received so far.
    pub fn get_commands(&self) -> Vec<RecordedPulse> {
        self.data.read().commands.clone()
    }

    /// Returns the widths of all pulse commands received so far.
    pub fn get_widths(&self) -> Vec<u32> {
        self.data.read().commands.iter().map(|c| c.width).collect()
    }
}

impl Display for MockPulseSink {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let data = self.data.read();
        write!(
            f,
            "{} [initialized={}, commands={}]",
            self.get_name(),
            data.initialized,
            data.commands.len()
        )
    }
}

impl PulseSink for MockPulseSink {
    fn initialize(&mut self) -> Result<(), Error> {
        let mut data = self.data.write();
        if data.fail_initialization {
            return Err(InitializationFailed {
                info: String::from("mocked failure"),
            }
            .into());
        }
        data.initialized = true;
        data.terminated = false;
        Ok(())
    }

    fn set_channel_mode(&mut self, channel: u8, mode: ChannelMode) -> Result<(), Error> {
        let mut data = self.data.write();
        if !data.initialized {
            return Err(NotInitialized.into());
        }
        data.modes.insert(channel, mode);
        Ok(())
    }

    fn set_pulse_width(&mut self, channel: u8, width: u32) -> Result<(), Error> {
        let mut data = self.data.write();
        if data.modes.get(&channel) != Some(&ChannelMode::Output) {
            return Err(IncompatibleMode {
                channel,
                mode: ChannelMode::Output,
            }
            .into());
        }
        if let Some(count) = data.fail_after {
            if data.commands.len() >= count {
                return Err(GpioFailure {
                    info: String::from("mocked pulse failure"),
                }
                .into());
            }
        }
        data.commands.push(RecordedPulse {
            channel,
            width,
            at: Instant::now(),
        });
        Ok(())
    }

    fn digital_write(&mut self, channel: u8, level: bool) -> Result<(), Error> {
        let mut data = self.data.write();
        if data.modes.get(&channel) != Some(&ChannelMode::Output) {
            return Err(IncompatibleMode {
                channel,
                mode: ChannelMode::Output,
            }
            .into());
        }
        data.levels.insert(channel, level);
        Ok(())
    }

    fn digital_read(&self, channel: u8) -> Result<bool, Error> {
        let data = self.data.read();
        if data.modes.get(&channel) != Some(&ChannelMode::Input) {
            return Err(IncompatibleMode {
                channel,
                mode: ChannelMode::Input,
            }
            .into());
        }
        Ok(data.inputs.get(&channel).copied().unwrap_or(false))
    }

    fn terminate(&mut self) -> Result<(), Error> {
        let mut data = self.data.write();
        let outputs: Vec<u8> = data
            .modes
            .iter()
            .filter(|(_, mode)| **mode == ChannelMode::Output)
            .map(|(channel, _)| *channel)
            .collect();
        for channel in outputs {
            data.levels.insert(channel, false);
        }
        data.initialized = false;
        data.terminated = true;
        data.modes.clear();
        Ok(())
    }
}
