use std::fmt::{Display, Formatter};
use std::time::Duration;

use crate::errors::ConfigError::{
    AngleOutOfBounds, InvalidRange, NeutralOutOfRange, NullStep, PulseOverflow, StepTooLarge,
};
use crate::errors::Error;
use crate::utils::Range;

/// Largest angle a servo can be commanded to (degrees).
pub const MAX_ANGLE: u16 = 180;

/// Settings of a servo sweep.
///
/// Defaults reproduce a standard hobby sweep on GPIO18: 0° to 180° by 10° steps, holding each
/// position for 500ms, with a 2000us pulse at 0° and 10us more per degree.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SweepConfig {
    /// The BCM GPIO channel the servo is wired to (default: 18).
    pub channel: u8,
    /// Degrees travelled per step (default: 10).
    pub step: u16,
    /// Time each position is held before the next step (default: 500ms).
    #[cfg_attr(feature = "serde", serde(rename = "hold_ms", with = "duration_ms"))]
    pub hold: Duration,
    /// Pulse width in microseconds for 0° (default: 2000).
    pub baseline_pulse: u32,
    /// Pulse width increment in microseconds per degree (default: 10).
    pub pulse_per_degree: u32,
    /// Angles the sweep travels between, bounds included (default: [0, 180]).
    pub range: Range<u16>,
    /// Angle commanded once when the sweep is cancelled (default: none, the servo stays where it
    /// was last commanded).
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub neutral: Option<u16>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            channel: 18,
            step: 10,
            hold: Duration::from_millis(500),
            baseline_pulse: 2000,
            pulse_per_degree: 10,
            range: Range::from([0, 180]),
            neutral: None,
        }
    }
}

impl SweepConfig {
    /// Sets the BCM GPIO channel.
    pub fn set_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    /// Sets the step in degrees.
    pub fn set_step(mut self, step: u16) -> Self {
        self.step = step;
        self
    }

    /// Sets the hold duration in milliseconds.
    pub fn set_hold(mut self, ms: u64) -> Self {
        self.hold = Duration::from_millis(ms);
        self
    }

    /// Sets the pulse width (us) matching 0°.
    pub fn set_baseline_pulse(mut self, baseline_pulse: u32) -> Self {
        self.baseline_pulse = baseline_pulse;
        self
    }

    /// Sets the pulse width increment (us) per degree.
    pub fn set_pulse_per_degree(mut self, pulse_per_degree: u32) -> Self {
        self.pulse_per_degree = pulse_per_degree;
        self
    }

    /// Sets the sweep range in degrees.
    ///
    /// No matter the order given, the range will always have min <= max.
    pub fn set_range<R: Into<Range<u16>>>(mut self, range: R) -> Self {
        self.range = range.into().ordered();
        self
    }

    /// Sets the neutral position commanded on cancellation.
    pub fn set_neutral(mut self, neutral: Option<u16>) -> Self {
        self.neutral = neutral;
        self
    }

    /// Pulse width (us) encoding `angle`.
    ///
    /// Exact for every angle of a validated configuration (see [`Self::validate()`]).
    pub fn pulse_width(&self, angle: u16) -> u32 {
        self.baseline_pulse + u32::from(angle) * self.pulse_per_degree
    }

    /// Number of commands in a full ascend-then-descend cycle.
    pub fn period(&self) -> usize {
        let span = usize::from(self.range.span());
        let step = usize::from(self.step.max(1));
        2 * span.div_ceil(step)
    }

    /// Checks the settings describe a sweep that can actually run.
    ///
    /// # Errors
    /// * `NullStep`: the step is 0.
    /// * `InvalidRange`: the range is empty.
    /// * `AngleOutOfBounds`: the range goes past [`MAX_ANGLE`].
    /// * `StepTooLarge`: the step exceeds the range.
    /// * `NeutralOutOfRange`: the neutral position is outside the range.
    /// * `PulseOverflow`: the widest pulse does not fit in a `u32`.
    pub fn validate(&self) -> Result<(), Error> {
        let Range { start, end } = self.range;
        if start >= end {
            return Err(InvalidRange { start, end }.into());
        }
        if end > MAX_ANGLE {
            return Err(AngleOutOfBounds {
                end,
                max: MAX_ANGLE,
            }
            .into());
        }
        if self.step == 0 {
            return Err(NullStep.into());
        }
        if self.step > self.range.span() {
            return Err(StepTooLarge {
                step: self.step,
                span: self.range.span(),
            }
            .into());
        }
        if let Some(neutral) = self.neutral {
            if !self.range.contains(neutral) {
                return Err(NeutralOutOfRange {
                    neutral,
                    start,
                    end,
                }
                .into());
            }
        }
        // Widths grow with the angle: the upper bound is the widest pulse ever computed.
        let widest = self
            .pulse_per_degree
            .checked_mul(u32::from(end))
            .and_then(|width| width.checked_add(self.baseline_pulse));
        if widest.is_none() {
            return Err(PulseOverflow {
                angle: end,
                baseline_pulse: self.baseline_pulse,
                pulse_per_degree: self.pulse_per_degree,
            }
            .into());
        }
        Ok(())
    }

    /// Parses a (validated) configuration from TOML. Missing keys keep their default value.
    ///
    /// ```
    /// use pinwheel::sweep::SweepConfig;
    ///
    /// let config = SweepConfig::from_toml("step = 20\nhold_ms = 250").unwrap();
    /// assert_eq!(config.step, 20);
    /// assert_eq!(config.channel, 18);
    /// ```
    #[cfg(feature = "serde")]
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(text).map_err(|err| {
            crate::errors::ConfigError::ParseFailure {
                info: err.message().to_string(),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a (validated) configuration from a TOML file.
    #[cfg(feature = "serde")]
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }
}

impl Display for SweepConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SWEEP (channel={}) [range={}-{}, step={}, hold={}ms, pulse={}+{}/°]",
            self.channel,
            self.range.start,
            self.range.end,
            self.step,
            self.hold.as_millis(),
            self.baseline_pulse,
            self.pulse_per_degree
        )
    }
}

#[cfg(feature = "serde")]
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
