/*!
Packed configuration register.

The counter keeps its active measurement mode, input range and display
precision in a single byte so that it can be handed to hardware unchanged:

```text
bit 0     reserved
bit 1     precision   0 = 6 digits, 1 = 7 digits
bits 2..4 mode        0 = frequency, 1 = period, 2 = pulse high, 3 = pulse low, 4 = event
bits 5..6 input       0 = 100 MHz analog, 1 = 1.2 GHz prescaled, 2 = digital
bit 7     reserved
```

Internal code works with the typed [`Settings`] view and converts with
[`Settings::encode`] / [`Settings::decode`].
*/

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::MIN_GATE_COUNTS;
use crate::error::{CounterError, Result};

/// One of the three disjoint bit regions of the configuration word.
///
/// Only the canonical masks can be constructed, so updates never touch
/// overlapping regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldMask(u8);

impl FieldMask {
    /// Display precision, 1 bit
    pub const PRECISION: FieldMask = FieldMask(0x02);
    /// Measurement mode, 3 bits
    pub const MODE: FieldMask = FieldMask(0x1C);
    /// Input range, 2 bits
    pub const INPUT: FieldMask = FieldMask(0x60);

    /// Raw mask bits
    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// Display precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Precision {
    #[default]
    Six = 0x00,
    Seven = 0x02,
}

impl Precision {
    /// Parse precision from the (masked) field bits
    pub fn from_bits(bits: u8) -> Self {
        if bits & FieldMask::PRECISION.bits() == 0 {
            Self::Six
        } else {
            Self::Seven
        }
    }

    /// Number of significant digits shown on the display
    pub fn digits(self) -> u32 {
        match self {
            Self::Six => 6,
            Self::Seven => 7,
        }
    }

    /// Timebase pulses a gate must accumulate for this many digits.
    ///
    /// Each extra digit needs a ten times longer gate.
    pub fn min_gate_counts(self) -> u64 {
        match self {
            Self::Six => MIN_GATE_COUNTS,
            Self::Seven => MIN_GATE_COUNTS * 10,
        }
    }

    /// Truncate a display value to this many significant digits.
    ///
    /// Lower digits are zeroed, the magnitude is kept.
    pub fn truncate(self, value: u64) -> u64 {
        let digits = value.checked_ilog10().map_or(1, |d| d + 1);
        if digits <= self.digits() {
            return value;
        }
        let scale = 10u64.pow(digits - self.digits());
        value / scale * scale
    }
}

/// Measurement mode, in bit-encoding order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Mode {
    #[default]
    Frequency = 0x00,
    Period = 0x04,
    PulseHigh = 0x08,
    PulseLow = 0x0C,
    Event = 0x10,
}

impl Mode {
    /// All modes in encoding order
    pub const ALL: [Mode; 5] = [
        Mode::Frequency,
        Mode::Period,
        Mode::PulseHigh,
        Mode::PulseLow,
        Mode::Event,
    ];

    /// Parse a mode from the (masked) field bits
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits & FieldMask::MODE.bits() {
            0x00 => Some(Self::Frequency),
            0x04 => Some(Self::Period),
            0x08 => Some(Self::PulseHigh),
            0x0C => Some(Self::PulseLow),
            0x10 => Some(Self::Event),
            _ => None,
        }
    }

    /// Position of the mode in the encoding order
    pub fn index(self) -> usize {
        (self as u8 >> 2) as usize
    }
}

/// Input range selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum InputRange {
    /// Analog input below 100 MHz
    #[default]
    MHz = 0x00,
    /// Prescaled analog input up to 1.2 GHz
    GHz = 0x20,
    /// Digital input
    Digital = 0x40,
}

impl InputRange {
    /// All input ranges in encoding order
    pub const ALL: [InputRange; 3] = [InputRange::MHz, InputRange::GHz, InputRange::Digital];

    /// Parse an input range from the (masked) field bits
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits & FieldMask::INPUT.bits() {
            0x00 => Some(Self::MHz),
            0x20 => Some(Self::GHz),
            0x40 => Some(Self::Digital),
            _ => None,
        }
    }
}

/// A single field update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    Precision(Precision),
    Mode(Mode),
    Input(InputRange),
}

impl Setting {
    /// Canonical mask/value pair for this update
    pub fn mask_value(self) -> (FieldMask, u8) {
        match self {
            Self::Precision(p) => (FieldMask::PRECISION, p as u8),
            Self::Mode(m) => (FieldMask::MODE, m as u8),
            Self::Input(i) => (FieldMask::INPUT, i as u8),
        }
    }
}

/// Typed view of the configuration word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    pub precision: Precision,
    pub mode: Mode,
    pub input: InputRange,
}

impl Settings {
    /// Pack into the configuration word
    pub fn encode(&self) -> u8 {
        self.precision as u8 | self.mode as u8 | self.input as u8
    }

    /// Unpack a configuration word
    pub fn decode(word: u8) -> Result<Self> {
        let mode_bits = word & FieldMask::MODE.bits();
        let input_bits = word & FieldMask::INPUT.bits();
        Ok(Self {
            precision: Precision::from_bits(word),
            mode: Mode::from_bits(mode_bits).ok_or(CounterError::InvalidMode(mode_bits))?,
            input: InputRange::from_bits(input_bits).ok_or(CounterError::InvalidInput(input_bits))?,
        })
    }
}

/// The configuration register with its change flag
#[derive(Debug, Clone)]
pub struct ConfigRegister {
    word: u8,
    changed: bool,
}

impl ConfigRegister {
    /// Register holding the default settings.
    ///
    /// Starts out marked as changed so the first scheduler pass draws the screen.
    pub fn new() -> Self {
        Self::from_settings(Settings::default())
    }

    /// Register holding the given settings, marked as changed
    pub fn from_settings(settings: Settings) -> Self {
        Self {
            word: settings.encode(),
            changed: true,
        }
    }

    /// Replace the bits selected by `mask` with `value`.
    ///
    /// `value` must already be shifted into the mask's bit positions; bits
    /// outside the mask are dropped.
    pub fn set_field(&mut self, mask: FieldMask, value: u8) {
        self.word = (self.word & !mask.bits()) | (value & mask.bits());
        self.changed = true;
        debug!("Register update mask={:#04x} value={:#04x} word={:#04x}", mask.bits(), value, self.word);
    }

    /// Read the bits selected by `mask`
    pub fn get_field(&self, mask: FieldMask) -> u8 {
        self.word & mask.bits()
    }

    /// Apply a typed field update
    pub fn apply(&mut self, setting: Setting) {
        let (mask, value) = setting.mask_value();
        self.set_field(mask, value);
    }

    /// Decode the current word
    pub fn settings(&self) -> Result<Settings> {
        Settings::decode(self.word)
    }

    /// The packed configuration word
    pub fn word(&self) -> u8 {
        self.word
    }

    /// Whether the register changed since the flag was last taken
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Read and clear the change flag
    pub fn take_changed(&mut self) -> bool {
        std::mem::replace(&mut self.changed, false)
    }
}

impl Default for ConfigRegister {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_settings() -> Vec<Setting> {
        let mut all = vec![
            Setting::Precision(Precision::Six),
            Setting::Precision(Precision::Seven),
        ];
        all.extend(Mode::ALL.into_iter().map(Setting::Mode));
        all.extend(InputRange::ALL.into_iter().map(Setting::Input));
        all
    }

    #[test]
    fn test_defaults() {
        let register = ConfigRegister::new();
        assert_eq!(register.word(), 0x00);
        assert!(register.is_changed());
        assert_eq!(
            register.settings().unwrap(),
            Settings { precision: Precision::Six, mode: Mode::Frequency, input: InputRange::MHz }
        );
    }

    #[test]
    fn test_set_get_roundtrip_and_isolation() {
        let masks = [FieldMask::PRECISION, FieldMask::MODE, FieldMask::INPUT];
        for start in all_settings() {
            for update in all_settings() {
                let mut register = ConfigRegister::new();
                register.apply(start);
                let before: Vec<u8> = masks.iter().map(|m| register.get_field(*m)).collect();

                let (mask, value) = update.mask_value();
                register.set_field(mask, value);

                assert_eq!(register.get_field(mask), value);
                for (i, other) in masks.iter().enumerate() {
                    if *other != mask {
                        assert_eq!(register.get_field(*other), before[i], "{update:?} disturbed {other:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_set_field_marks_changed() {
        let mut register = ConfigRegister::new();
        assert!(register.take_changed());
        assert!(!register.take_changed());

        register.apply(Setting::Mode(Mode::Period));
        assert!(register.is_changed());
        assert!(register.take_changed());
        assert!(!register.is_changed());
    }

    #[test]
    fn test_value_outside_mask_is_dropped() {
        let mut register = ConfigRegister::new();
        register.set_field(FieldMask::PRECISION, 0xFF);
        assert_eq!(register.word(), 0x02);
    }

    #[test]
    fn test_encode_decode() {
        let settings = Settings { precision: Precision::Seven, mode: Mode::PulseLow, input: InputRange::Digital };
        assert_eq!(settings.encode(), 0x02 | 0x0C | 0x40);
        assert_eq!(Settings::decode(settings.encode()).unwrap(), settings);
        // Reserved bits are ignored
        assert_eq!(Settings::decode(settings.encode() | 0x81).unwrap(), settings);
    }

    #[test]
    fn test_decode_rejects_unknown_patterns() {
        assert_eq!(Settings::decode(0x14), Err(CounterError::InvalidMode(0x14)));
        assert_eq!(Settings::decode(0x1C), Err(CounterError::InvalidMode(0x1C)));
        assert_eq!(Settings::decode(0x60), Err(CounterError::InvalidInput(0x60)));

        let mut register = ConfigRegister::new();
        register.set_field(FieldMask::MODE, 0x18);
        assert!(register.settings().is_err());
    }

    #[test]
    fn test_mode_index_follows_encoding() {
        for (i, mode) in Mode::ALL.into_iter().enumerate() {
            assert_eq!(mode.index(), i);
            assert_eq!(Mode::from_bits(mode as u8), Some(mode));
        }
    }

    #[test]
    fn test_precision_truncate() {
        assert_eq!(Precision::Six.truncate(48_000), 48_000);
        assert_eq!(Precision::Six.truncate(12_345_678), 12_345_600);
        assert_eq!(Precision::Seven.truncate(12_345_678), 12_345_670);
        assert_eq!(Precision::Six.truncate(0), 0);
        assert_eq!(Precision::Seven.truncate(u64::MAX), 18_446_740_000_000_000_000);
    }

    #[test]
    fn test_precision_gate_counts() {
        assert_eq!(Precision::Six.min_gate_counts(), 1_000_000);
        assert_eq!(Precision::Seven.min_gate_counts(), 10_000_000);
    }
}
