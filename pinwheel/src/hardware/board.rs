use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, trace};
use parking_lot::RwLock;

use crate::errors::HardwareError::{IncompatibleMode, PinNotSetup, RestrictedPin, UnknownPin};
use crate::errors::{Error, Unknown};
use crate::hardware::ChannelMode;

/// Number of pins on the physical header.
pub const HEADER_PINS: u8 = 40;

/// Default kernel file exposing the CPU temperature (in millidegrees Celsius).
pub const THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

/// BCM GPIO number wired to each physical pin (index 0 is physical pin 1).
const LAYOUT: [Option<u8>; HEADER_PINS as usize] = [
    None,     // 1: 3.3V
    None,     // 2: 5V
    Some(2),  // 3
    None,     // 4: 5V
    Some(3),  // 5
    None,     // 6: Ground
    Some(4),  // 7
    Some(14), // 8
    None,     // 9: Ground
    Some(15), // 10
    Some(17), // 11
    Some(18), // 12
    Some(27), // 13
    None,     // 14: Ground
    Some(22), // 15
    Some(23), // 16
    None,     // 17: 3.3V
    Some(24), // 18
    Some(10), // 19
    None,     // 20: Ground
    Some(9),  // 21
    Some(25), // 22
    Some(11), // 23
    Some(8),  // 24
    None,     // 25: Ground
    Some(7),  // 26
    Some(0),  // 27: ID_SD
    Some(1),  // 28: ID_SC
    Some(5),  // 29
    None,     // 30: Ground
    Some(6),  // 31
    Some(12), // 32
    Some(13), // 33
    None,     // 34: Ground
    Some(19), // 35
    Some(16), // 36
    Some(26), // 37
    Some(20), // 38
    None,     // 39: Ground
    Some(21), // 40
];

/// Physical pins that can never be setup, and why.
const RESTRICTED: [(u8, &str); 14] = [
    (1, "3.3V"),
    (2, "5V"),
    (4, "5V"),
    (6, "Ground"),
    (9, "Ground"),
    (14, "Ground"),
    (17, "3.3V"),
    (20, "Ground"),
    (25, "Ground"),
    (27, "EEPROM"),
    (28, "EEPROM"),
    (30, "Ground"),
    (34, "Ground"),
    (39, "Ground"),
];

/// Represents the current configuration of an active pin.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pin {
    /// The physical position on the header (1-40).
    pub physical: u8,
    /// The BCM GPIO number.
    pub gpio: u8,
    /// Currently configured mode.
    pub mode: ChannelMode,
    /// Last level written to an output pin (HIGH when `true`). Always LOW for inputs.
    pub level: bool,
}

impl Pin {
    /// Checks if the pin is an output driven HIGH.
    pub fn is_on(&self) -> bool {
        self.mode == ChannelMode::Output && self.level
    }
}

/// Represents the 40-pin header of a Raspberry Pi.
///
/// Keeps track of which pins have been setup (and how) and refuses to touch power, ground and
/// EEPROM pins. Clones share the same pin bookkeeping.
#[derive(Clone, Debug)]
pub struct Board {
    /// Pins setup so far, indexed by physical position.
    pins: Arc<RwLock<HashMap<u8, Pin>>>,
    /// File read by [`Self::cpu_temperature()`].
    thermal_zone: PathBuf,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            pins: Arc::new(RwLock::new(HashMap::new())),
            thermal_zone: PathBuf::from(THERMAL_ZONE),
        }
    }
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the CPU temperature from another file than [`THERMAL_ZONE`].
    pub fn with_thermal_zone<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.thermal_zone = path.as_ref().to_path_buf();
        self
    }

    /// Sets up a pin for use.
    ///
    /// Setting up an already active pin simply changes its mode.
    ///
    /// # Errors
    /// * `UnknownPin`: the pin is outside the header.
    /// * `RestrictedPin`: the pin is a power, ground or EEPROM pin.
    pub fn setup_pin(&self, physical: u8, mode: ChannelMode) -> Result<Pin, Error> {
        let gpio = self.gpio(physical)?;
        if let Some(reason) = self.restriction(physical) {
            return Err(RestrictedPin {
                pin: physical,
                reason,
            }
            .into());
        }

        let pin = Pin {
            physical,
            gpio,
            mode,
            level: false,
        };
        if let Some(previous) = self.pins.write().insert(physical, pin) {
            debug!(
                "Pin {} switched from {} to {}",
                physical, previous.mode, mode
            );
        }
        trace!("Pin {} (GPIO{}) setup as {}", physical, gpio, mode);
        Ok(pin)
    }

    /// Returns the active pin at the given physical position.
    ///
    /// # Errors
    /// * `UnknownPin`: the pin is outside the header.
    /// * `PinNotSetup`: the pin has not been setup with [`Self::setup_pin()`].
    pub fn pin(&self, physical: u8) -> Result<Pin, Error> {
        Self::check_index(physical)?;
        self.pins
            .read()
            .get(&physical)
            .copied()
            .ok_or(Error::from(PinNotSetup { pin: physical }))
    }

    /// Records the level written to an output pin.
    ///
    /// # Errors
    /// * `UnknownPin`: the pin is outside the header.
    /// * `PinNotSetup`: the pin has not been setup with [`Self::setup_pin()`].
    /// * `IncompatibleMode`: the pin is not an output.
    pub fn set_level(&self, physical: u8, level: bool) -> Result<Pin, Error> {
        Self::check_index(physical)?;
        let mut pins = self.pins.write();
        let pin = pins
            .get_mut(&physical)
            .ok_or(Error::from(PinNotSetup { pin: physical }))?;
        if pin.mode != ChannelMode::Output {
            return Err(IncompatibleMode {
                channel: pin.gpio,
                mode: ChannelMode::Output,
            }
            .into());
        }
        pin.level = level;
        Ok(*pin)
    }

    /// Lists the physical positions of all active pins, in ascending order.
    pub fn active_pins(&self) -> Vec<u8> {
        let mut pins: Vec<u8> = self.pins.read().keys().copied().collect();
        pins.sort_unstable();
        pins
    }

    /// Releases a single pin.
    pub fn release_pin(&self, physical: u8) -> Option<Pin> {
        self.pins.write().remove(&physical)
    }

    /// Releases all active pins.
    pub fn cleanup(&self) {
        let mut pins = self.pins.write();
        debug!("Releasing {} active pin(s)", pins.len());
        pins.clear();
    }

    /// Lists the restricted physical pins.
    pub fn restricted_pins(&self) -> Vec<u8> {
        RESTRICTED.iter().map(|(pin, _)| *pin).collect()
    }

    /// Returns why a pin is restricted, if it is.
    pub fn restriction(&self, physical: u8) -> Option<&'static str> {
        RESTRICTED
            .iter()
            .find(|(pin, _)| *pin == physical)
            .map(|(_, reason)| *reason)
    }

    /// Returns the BCM GPIO number wired to a physical pin.
    ///
    /// # Errors
    /// * `UnknownPin`: the pin is outside the header or not a GPIO (power, ground).
    pub fn gpio(&self, physical: u8) -> Result<u8, Error> {
        Self::check_index(physical)?;
        LAYOUT[physical as usize - 1].ok_or(Error::from(UnknownPin { pin: physical }))
    }

    /// Returns the physical pin wired to a BCM GPIO number.
    ///
    /// # Errors
    /// * `UnknownPin`: no header pin exposes that GPIO.
    pub fn physical(&self, gpio: u8) -> Result<u8, Error> {
        LAYOUT
            .iter()
            .position(|bcm| *bcm == Some(gpio))
            .map(|index| index as u8 + 1)
            .ok_or(Error::from(UnknownPin { pin: gpio }))
    }

    /// Returns the CPU temperature in °C (one decimal).
    ///
    /// # Errors
    /// Fails if the thermal zone file cannot be read or does not hold an integer.
    pub fn cpu_temperature(&self) -> Result<f32, Error> {
        let raw = std::fs::read_to_string(&self.thermal_zone)?;
        let millidegrees: i32 = raw.trim().parse().map_err(|_| Unknown {
            info: format!("unexpected temperature value '{}'", raw.trim()),
        })?;
        Ok((millidegrees as f32 / 100.0).round() / 10.0)
    }

    fn check_index(physical: u8) -> Result<(), Error> {
        match (1..=HEADER_PINS).contains(&physical) {
            true => Ok(()),
            false => Err(UnknownPin { pin: physical }.into()),
        }
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let active: Vec<String> = self
            .active_pins()
            .iter()
            .map(|pin| pin.to_string())
            .collect();
        write!(
            f,
            "BOARD [pins={}, active=[{}]]",
            HEADER_PINS,
            active.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::errors::HardwareError;

    #[test]
    fn test_setup_pin() {
        let board = Board::new();
        let pin = board.setup_pin(12, ChannelMode::Output).unwrap();
        assert_eq!(pin.gpio, 18);
        assert_eq!(pin.mode, ChannelMode::Output);
        assert_eq!(board.pin(12).unwrap(), pin);
        assert_eq!(board.active_pins(), vec![12]);

        // Setting up again switches the mode.
        board.setup_pin(12, ChannelMode::Input).unwrap();
        assert_eq!(board.pin(12).unwrap().mode, ChannelMode::Input);
        assert_eq!(board.active_pins(), vec![12]);
    }

    #[test]
    fn test_set_level() {
        let board = Board::new();
        board.setup_pin(3, ChannelMode::Output).unwrap();
        assert!(!board.pin(3).unwrap().is_on());

        let pin = board.set_level(3, true).unwrap();
        assert!(pin.level);
        assert!(pin.is_on());
        assert!(board.pin(3).unwrap().is_on());

        board.set_level(3, false).unwrap();
        assert!(!board.pin(3).unwrap().is_on());

        // Switching mode drops the level.
        board.set_level(3, true).unwrap();
        board.setup_pin(3, ChannelMode::Input).unwrap();
        assert!(!board.pin(3).unwrap().level);
        assert_eq!(
            board.set_level(3, true).unwrap_err().to_string(),
            "Hardware error: Channel (2) not configured for mode (OUTPUT)."
        );
        assert!(board.set_level(5, true).is_err());
        assert!(board.set_level(41, true).is_err());
    }

    #[test]
    fn test_setup_restricted_pin() {
        let board = Board::new();
        for pin in board.restricted_pins() {
            let result = board.setup_pin(pin, ChannelMode::Output);
            assert!(result.is_err(), "pin {} should be refused", pin);
        }
        assert!(matches!(
            board.setup_pin(27, ChannelMode::Output),
            Err(Error::HardwareError {
                source: HardwareError::RestrictedPin {
                    pin: 27,
                    reason: "EEPROM"
                }
            })
        ));
        assert!(board.active_pins().is_empty());
    }

    #[test]
    fn test_unknown_pins() {
        let board = Board::new();
        assert!(board.setup_pin(0, ChannelMode::Output).is_err());
        assert!(board.setup_pin(41, ChannelMode::Output).is_err());
        assert!(board.pin(41).is_err());
        assert_eq!(
            board.pin(11).unwrap_err().to_string(),
            "Hardware error: Pin (11) is not setup."
        );
        assert_eq!(
            board.gpio(6).unwrap_err().to_string(),
            "Hardware error: Unknown pin 6."
        );
        assert!(board.physical(28).is_err());
    }

    #[test]
    fn test_gpio_mapping() {
        let board = Board::new();
        assert_eq!(board.gpio(12).unwrap(), 18);
        assert_eq!(board.physical(18).unwrap(), 12);
        assert_eq!(board.gpio(40).unwrap(), 21);
        assert_eq!(board.physical(2).unwrap(), 3);

        // Every GPIO maps back to its physical pin.
        for physical in 1..=HEADER_PINS {
            if let Ok(gpio) = board.gpio(physical) {
                assert_eq!(board.physical(gpio).unwrap(), physical);
            }
        }
    }

    #[test]
    fn test_restrictions() {
        let board = Board::new();
        assert_eq!(board.restricted_pins().len(), 14);
        assert_eq!(board.restriction(1), Some("3.3V"));
        assert_eq!(board.restriction(39), Some("Ground"));
        assert_eq!(board.restriction(12), None);
    }

    #[test]
    fn test_release_and_cleanup() {
        let board = Board::new();
        let shared = board.clone();
        board.setup_pin(12, ChannelMode::Output).unwrap();
        board.setup_pin(11, ChannelMode::Input).unwrap();
        assert_eq!(shared.active_pins(), vec![11, 12]);
        assert_eq!(format!("{}", board), "BOARD [pins=40, active=[11, 12]]");

        assert!(shared.release_pin(11).is_some());
        assert!(shared.release_pin(11).is_none());
        assert_eq!(board.active_pins(), vec![12]);

        board.cleanup();
        assert!(shared.active_pins().is_empty());
    }

    #[test]
    fn test_cpu_temperature() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "48312").unwrap();
        let board = Board::new().with_thermal_zone(file.path());
        assert_eq!(board.cpu_temperature().unwrap(), 48.3);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not a number").unwrap();
        let board = Board::new().with_thermal_zone(file.path());
        assert!(board.cpu_temperature().is_err());

        let board = Board::new().with_thermal_zone("/this/file/does/not/exist");
        assert!(board.cpu_temperature().is_err());
    }
}
