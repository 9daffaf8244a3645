/*!
Mode, unit and input labels shown on the display.
*/

use serde::Serialize;

use crate::register::{InputRange, Mode, Precision};

/// Display units, in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Unit {
    MilliHertz,
    Hertz,
    KiloHertz,
    MegaHertz,
    GigaHertz,
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Count,
}

impl Unit {
    /// All units in table order
    pub const ALL: [Unit; 10] = [
        Unit::MilliHertz,
        Unit::Hertz,
        Unit::KiloHertz,
        Unit::MegaHertz,
        Unit::GigaHertz,
        Unit::Nanoseconds,
        Unit::Microseconds,
        Unit::Milliseconds,
        Unit::Seconds,
        Unit::Count,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::MilliHertz => "mHz",
            Self::Hertz => "Hz",
            Self::KiloHertz => "kHz",
            Self::MegaHertz => "MHz",
            Self::GigaHertz => "GHz",
            Self::Nanoseconds => "ns",
            Self::Microseconds => "us",
            Self::Milliseconds => "ms",
            Self::Seconds => "sec",
            Self::Count => "cnt",
        }
    }

    /// Position in the unit table
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Label for a measurement mode
pub fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Frequency => "Freq",
        Mode::Period => "Period",
        Mode::PulseHigh => "Pos Pulse",
        Mode::PulseLow => "Neg Pulse",
        Mode::Event => "Events",
    }
}

/// Unit a measurement mode is displayed in
pub fn unit_for(mode: Mode) -> Unit {
    match mode {
        Mode::Frequency => Unit::MegaHertz,
        Mode::Period | Mode::PulseHigh | Mode::PulseLow => Unit::Milliseconds,
        Mode::Event => Unit::Count,
    }
}

/// Unit label for a measurement mode
pub fn unit_label(mode: Mode) -> &'static str {
    unit_for(mode).label()
}

pub fn input_label(input: InputRange) -> &'static str {
    match input {
        InputRange::MHz => "100 MHz",
        InputRange::GHz => "1.2 GHz",
        InputRange::Digital => "Digital",
    }
}

pub fn precision_label(precision: Precision) -> &'static str {
    match precision {
        Precision::Six => "6 digits",
        Precision::Seven => "7 digits",
    }
}
