/*!
Auto-ranging divider selection.

Slow input signals produce few timebase pulses per gate. The divider search
picks the binary prescale shift that stretches the gate until at least
[`MIN_GATE_COUNTS`] timebase pulses are accumulated.
*/

use serde::Serialize;

use crate::constants::{MAX_DIVIDER_SETTING, MIN_GATE_COUNTS};

/// Binary prescaler shift (prescale factor = 2^setting)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub struct DividerSetting(u8);

impl DividerSetting {
    /// Create a setting, clamped to the supported range
    pub fn new(shift: u8) -> Self {
        Self(shift.min(MAX_DIVIDER_SETTING))
    }

    /// The shift amount
    pub fn shift(self) -> u8 {
        self.0
    }

    /// Prescale factor 2^shift
    pub fn prescaler(self) -> u64 {
        1u64 << self.0
    }

    /// Whether the search stopped at the cap
    pub fn is_saturated(self) -> bool {
        self.0 == MAX_DIVIDER_SETTING
    }
}

/// Choose the divider setting for a first-pass pulse estimate.
///
/// The candidate starts at 1 and is incremented before each test; the first
/// candidate whose shifted count reaches [`MIN_GATE_COUNTS`] is returned, and
/// the search stops at [`MAX_DIVIDER_SETTING`] regardless.
pub fn choose_divider(pulses: u64) -> DividerSetting {
    choose_divider_for(pulses, MIN_GATE_COUNTS)
}

/// Same search as [`choose_divider`] with an explicit gate count target
pub fn choose_divider_for(pulses: u64, min_counts: u64) -> DividerSetting {
    let mut n = 0u8;
    loop {
        n += 1;
        let shifted = u128::from(pulses) << n;
        if shifted >= u128::from(min_counts) || n >= MAX_DIVIDER_SETTING {
            return DividerSetting(n);
        }
    }
}
