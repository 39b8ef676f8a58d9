use std::fmt::{Display, Formatter};
use std::sync::Arc;

use log::{debug, info, trace};
use parking_lot::RwLock;

use crate::errors::Error;
use crate::hardware::{ChannelMode, PulseSink};
use crate::sweep::{PulseCommand, Steps, SweepConfig, SweepState};
use crate::utils::{sleep, CancellationToken};

/// Summary of a sweep run, returned once it has been cancelled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SweepReport {
    /// Number of commands emitted (neutral command included).
    pub emitted: usize,
    /// Last command sent to the sink.
    pub last: Option<PulseCommand>,
    /// Position the sweep would resume from.
    pub state: SweepState,
}

/// Drives a servo back and forth by feeding a [`PulseSink`] one pulse-width command per step.
///
/// Clones share the sweep position, which makes it possible to observe a running sweep from
/// another task.
#[derive(Clone, Debug)]
pub struct SweepController {
    config: SweepConfig,
    sink: Box<dyn PulseSink>,
    /// Position the next step will command.
    state: Arc<RwLock<SweepState>>,
    /// Last command sent to the sink.
    last: Arc<RwLock<Option<PulseCommand>>>,
}

impl SweepController {
    /// Creates a sweep controller feeding the given sink.
    ///
    /// The sink is expected to be initialized already (see [`PulseSink::initialize()`]).
    ///
    /// # Errors
    /// * `ConfigError`: the configuration does not describe a valid sweep.
    pub fn new<S: PulseSink + 'static>(sink: S, config: SweepConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            config,
            sink: Box::new(sink),
            state: Arc::new(RwLock::new(SweepState::new(config.range.start))),
            last: Arc::new(RwLock::new(None)),
        })
    }

    /// Configures the sweep channel as an output on the sink.
    pub fn attach(&mut self) -> Result<&Self, Error> {
        self.sink
            .set_channel_mode(self.config.channel, ChannelMode::Output)?;
        debug!(
            "Channel {} attached on {}",
            self.config.channel,
            self.sink.get_name()
        );
        Ok(self)
    }

    /// Runs the sweep until `cancellation` is triggered.
    ///
    /// Each iteration emits one command then holds for the configured duration. Cancellation is
    /// checked once per iteration and interrupts the hold: no command is emitted after it. If a
    /// neutral position is configured, it is commanded once before returning.
    ///
    /// # Errors
    /// Any sink failure stops the sweep and is returned as is.
    pub async fn run(&mut self, cancellation: &CancellationToken) -> Result<SweepReport, Error> {
        let channel = self.config.channel;
        let mut steps = Steps::resume(self.config, *self.state.read());
        let mut emitted = 0;
        info!("Sweep started: {}", self.config);

        while !cancellation.is_cancelled() {
            let command = steps.step();
            self.sink.set_pulse_width(channel, command.width)?;
            trace!("Sweep command: {}", command);
            emitted += 1;
            *self.last.write() = Some(command);
            *self.state.write() = steps.get_state();

            tokio::select! {
                _ = sleep(self.config.hold) => {}
                _ = cancellation.cancelled() => break,
            }
        }

        if let Some(neutral) = self.config.neutral {
            let command = PulseCommand::new(&self.config, neutral);
            self.sink.set_pulse_width(channel, command.width)?;
            debug!("Sweep back to neutral: {}", command);
            emitted += 1;
            *self.last.write() = Some(command);
        }

        info!("Sweep stopped after {} command(s)", emitted);
        Ok(SweepReport {
            emitted,
            last: *self.last.read(),
            state: *self.state.read(),
        })
    }

    /// Stops the pulse train and releases the sink.
    pub fn terminate(&mut self) -> Result<(), Error> {
        self.sink.terminate()
    }

    /// Returns the lazy sequence of commands this controller emits from its current position.
    pub fn steps(&self) -> Steps {
        Steps::resume(self.config, *self.state.read())
    }

    // ########################################
    // Setters and Getters.

    /// Returns the sweep configuration.
    pub fn get_config(&self) -> &SweepConfig {
        &self.config
    }

    /// Returns the position the next step will command.
    pub fn get_state(&self) -> SweepState {
        *self.state.read()
    }

    /// Returns the last command sent to the sink, if any.
    pub fn get_last_command(&self) -> Option<PulseCommand> {
        *self.last.read()
    }
}

impl Display for SweepController {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        write!(
            f,
            "{} [next={}°, direction={:?}]",
            self.config, state.angle, state.direction
        )
    }
}
