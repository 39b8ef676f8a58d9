use std::fmt::{Display, Formatter};

use crate::sweep::SweepConfig;

/// Direction the sweep is currently moving in.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// Position of a sweep within its angle cycle.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepState {
    /// Current angle in degrees: always within the sweep range.
    pub angle: u16,
    /// Direction of the next step.
    pub direction: Direction,
}

impl SweepState {
    /// The initial state of a sweep over the given range: lower bound, ascending.
    pub fn new(start: u16) -> Self {
        Self {
            angle: start,
            direction: Direction::Ascending,
        }
    }

    /// Moves one step further.
    ///
    /// The last step of a pass is clamped to the bound so both extremes are always reached. The
    /// direction flips exactly when a bound is reached.
    pub fn advance(&mut self, config: &SweepConfig) {
        let range = config.range;
        match self.direction {
            Direction::Ascending => {
                self.angle = self.angle.saturating_add(config.step).min(range.end);
                if self.angle == range.end {
                    self.direction = Direction::Descending;
                }
            }
            Direction::Descending => {
                self.angle = self.angle.saturating_sub(config.step).max(range.start);
                if self.angle == range.start {
                    self.direction = Direction::Ascending;
                }
            }
        }
    }
}

/// A single actuation command: the angle and the pulse width that encodes it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PulseCommand {
    /// Commanded angle (degrees).
    pub angle: u16,
    /// Pulse width (microseconds).
    pub width: u32,
}

impl PulseCommand {
    /// Builds the command for `angle`: `baseline_pulse + angle * pulse_per_degree`.
    pub fn new(config: &SweepConfig, angle: u16) -> Self {
        Self {
            angle,
            width: config.pulse_width(angle),
        }
    }
}

impl Display for PulseCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}° ({}us)", self.angle, self.width)
    }
}

/// Lazy, infinite sequence of the commands a sweep emits.
///
/// Each call to `next()` yields the command for the current state, then advances the state.
#[derive(Clone, Debug)]
pub struct Steps {
    config: SweepConfig,
    state: SweepState,
}

impl Steps {
    pub fn new(config: SweepConfig) -> Self {
        Self::resume(config, SweepState::new(config.range.start))
    }

    /// Continues a sweep from a given state.
    ///
    /// An angle outside the configured range is brought back to the closest bound, heading
    /// back inside.
    pub fn resume(config: SweepConfig, mut state: SweepState) -> Self {
        let range = config.range;
        if state.angle >= range.end {
            state = SweepState {
                angle: range.end,
                direction: Direction::Descending,
            };
        } else if state.angle <= range.start {
            state = SweepState::new(range.start);
        }
        Self { config, state }
    }

    /// Yields the command for the current state, then advances the state.
    ///
    /// Same as `next()`, without the `Option`: the sequence never ends.
    pub fn step(&mut self) -> PulseCommand {
        let command = PulseCommand::new(&self.config, self.state.angle);
        self.state.advance(&self.config);
        command
    }

    /// Returns the state the next command will be computed from.
    pub fn get_state(&self) -> SweepState {
        self.state
    }
}

impl Iterator for Steps {
    type Item = PulseCommand;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.step())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angles(config: SweepConfig, count: usize) -> Vec<u16> {
        Steps::new(config).take(count).map(|c| c.angle).collect()
    }

    #[test]
    fn test_initial_state() {
        let state = SweepState::default();
        assert_eq!(state.angle, 0);
        assert_eq!(state.direction, Direction::Ascending);
    }

    #[test]
    fn test_advance_flips_at_bounds() {
        let config = SweepConfig::default();
        let mut state = SweepState {
            angle: 170,
            direction: Direction::Ascending,
        };
        state.advance(&config);
        assert_eq!(state.angle, 180);
        assert_eq!(state.direction, Direction::Descending);
        state.advance(&config);
        assert_eq!(state.angle, 170);
        assert_eq!(state.direction, Direction::Descending);

        let mut state = SweepState {
            angle: 10,
            direction: Direction::Descending,
        };
        state.advance(&config);
        assert_eq!(state.angle, 0);
        assert_eq!(state.direction, Direction::Ascending);
        state.advance(&config);
        assert_eq!(state.angle, 10);
    }

    #[test]
    fn test_monotonic_passes() {
        let config = SweepConfig::default();
        let mut steps = Steps::new(config);
        let mut previous = steps.next().unwrap().angle;
        let mut direction = Direction::Ascending;
        for command in steps.take(200) {
            match direction {
                Direction::Ascending => {
                    assert_eq!(command.angle, previous + 10);
                    assert!(command.angle <= 180);
                    if command.angle == 180 {
                        direction = Direction::Descending;
                    }
                }
                Direction::Descending => {
                    assert_eq!(command.angle + 10, previous);
                    if command.angle == 0 {
                        direction = Direction::Ascending;
                    }
                }
            }
            previous = command.angle;
        }
    }

    #[test]
    fn test_boundary_reversal() {
        let sequence = angles(SweepConfig::default(), 150);
        for window in sequence.windows(2) {
            if window[0] == 180 {
                assert_eq!(window[1], 170);
            }
            if window[0] == 0 {
                assert_eq!(window[1], 10);
            }
        }
        // Endpoints are never emitted twice in a row.
        assert!(sequence.windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn test_periodicity() {
        let config = SweepConfig::default();
        let period = 2 * (180 / 10) as usize;
        let sequence = angles(config, period * 4);
        for cycle in sequence.chunks(period).skip(1) {
            assert_eq!(cycle, &sequence[..period]);
        }
    }

    #[test]
    fn test_step_not_dividing_range() {
        let config = SweepConfig::default().set_step(25);
        assert_eq!(
            angles(config, 17),
            vec![0, 25, 50, 75, 100, 125, 150, 175, 180, 155, 130, 105, 80, 55, 30, 5, 0]
        );
    }

    #[test]
    fn test_custom_range() {
        let config = SweepConfig::default().set_range([40, 60]);
        assert_eq!(angles(config, 6), vec![40, 50, 60, 50, 40, 50]);
    }

    #[test]
    fn test_resume() {
        let config = SweepConfig::default();
        let mut steps = Steps::new(config);
        steps.by_ref().take(20).for_each(drop);
        let state = steps.get_state();
        assert_eq!(state.angle, 160);
        assert_eq!(state.direction, Direction::Descending);

        let resumed: Vec<u16> = Steps::resume(config, state).take(3).map(|c| c.angle).collect();
        assert_eq!(resumed, vec![160, 150, 140]);
    }

    #[test]
    fn test_resume_outside_range() {
        let config = SweepConfig::default().set_range([30, 150]);
        let above = SweepState {
            angle: 175,
            direction: Direction::Ascending,
        };
        let resumed: Vec<u16> = Steps::resume(config, above).take(3).map(|c| c.angle).collect();
        assert_eq!(resumed, vec![150, 140, 130]);

        let below = SweepState::new(0);
        let mut steps = Steps::resume(config, below);
        assert_eq!(steps.get_state().angle, 30);
        assert_eq!(steps.step().angle, 30);
        assert_eq!(steps.step().angle, 40);
    }

    #[test]
    fn test_command_display() {
        let command = PulseCommand::new(&SweepConfig::default(), 90);
        assert_eq!(command.width, 2900);
        assert_eq!(format!("{}", command), "90° (2900us)");
    }
}
