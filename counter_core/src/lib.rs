/*!
# Reciprocal Counter Core

This crate contains the measurement-control core of a reciprocal frequency
counter: the packed configuration register, the auto-ranging divider search,
the five-stage measurement pipeline and the cooperative scheduler that drives
them.

## Core Types

- [`ConfigRegister`] - Packed configuration word with a change flag
- [`Settings`] - Typed view of the configuration word
- [`DividerSetting`] - Binary prescaler shift chosen by auto-ranging
- [`MeasurementPipeline`] - Sample / Final / Latch / Convert / Render stages
- [`AppScheduler`] - Polling loop tying input, clock, pipeline and display together

## Modules

- [`register`] - Configuration register and its bit layout
- [`divider`] - Auto-ranging divider selection
- [`labels`] - Mode, unit and input labels
- [`command`] - Single-character command parsing
- [`device`] - Display, clock/counter and command source traits
- [`layout`] - Screen layout drawn through a [`Display`]
- [`pipeline`] - Measurement pipeline
- [`scheduler`] - Application scheduler
- [`error`] - Common error types
*/

pub mod command;
pub mod device;
pub mod divider;
pub mod error;
pub mod labels;
pub mod layout;
pub mod pipeline;
pub mod register;
pub mod scheduler;

// Re-export commonly used types
pub use command::{parse_command, Command};
pub use device::{format_fixed, ClockCounter, Color, CommandSource, Display};
pub use divider::{choose_divider, choose_divider_for, DividerSetting};
pub use error::{CounterError, Result};
pub use labels::{input_label, mode_label, precision_label, unit_for, unit_label, Unit};
pub use pipeline::{MeasurementPipeline, MeasurementResult, PipelineSnapshot, Stage};
pub use register::{ConfigRegister, FieldMask, InputRange, Mode, Precision, Setting, Settings};
pub use scheduler::{AppScheduler, SchedulerConfig, StepOutcome};

/// Version information for the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Measurement constants
pub mod constants {
    /// Frequency of the reference timebase in Hz
    pub const TIMEBASE_FREQUENCY: u64 = 10_000_000;

    /// Gate count the auto-ranging search must reach
    pub const MIN_GATE_COUNTS: u64 = 1_000_000;

    /// Largest divider setting the search will return
    pub const MAX_DIVIDER_SETTING: u8 = 31;

    /// Prescaler used for the first (estimating) sample
    pub const SAMPLE_PRESCALER: u64 = 2;

    /// Number of fractional digits carried by display values
    pub const DISPLAY_DECIMALS: u8 = 3;

    /// Fixed-point scale matching [`DISPLAY_DECIMALS`]
    pub const DISPLAY_SCALE: u64 = 1_000;
}
