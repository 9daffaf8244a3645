/*!
Five-stage reciprocal measurement pipeline.

Each pass runs `Sample -> Final -> Latch -> Convert -> Render` and then idles
until the scheduler triggers the next pass:

1. **Sample** gates the input with a fixed prescaler of 2 and estimates the
   number of timebase pulses per gate.
2. **Final** sizes the prescaler from that estimate with
   [`choose_divider_for`] and recomputes the gate count. Seven-digit
   precision asks for a ten times longer gate than six-digit precision.
3. **Latch** copies the final count into the result.
4. **Convert** turns the latched count back into the quantity of the active
   mode.
5. **Render** writes the value to the display.

The gate spans half an input period of the prescaled signal, so the count is
`timebase * prescaler / (signal * 2)`.
*/

use std::num::NonZeroU64;

use serde::Serialize;
use tracing::{debug, warn};

use crate::constants::{DISPLAY_DECIMALS, DISPLAY_SCALE, SAMPLE_PRESCALER};
use crate::device::Display;
use crate::divider::{choose_divider_for, DividerSetting};
use crate::layout;
use crate::register::{Mode, Precision, Settings};

/// Pipeline stage, updated as each stage completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    Sample,
    Final,
    Latch,
    Convert,
    Render,
}

/// Outcome of one measurement pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MeasurementResult {
    /// Timebase pulses counted over the final gate
    pub counter_value: u64,
    /// Prescaler used for the final gate
    pub prescaler: u64,
    /// Fixed-point display value (three fractional digits)
    pub display_value: u64,
}

/// Internal state exposed for the diagnostics panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PipelineSnapshot {
    pub signal: u64,
    pub prescaler: u64,
    pub divider: DividerSetting,
    pub test_count: u64,
    pub final_count: u64,
    pub counter_value: u64,
    pub display_value: u64,
    pub timebase_product: u64,
}

/// The measurement pipeline and the values it carries between stages
#[derive(Debug, Clone)]
pub struct MeasurementPipeline {
    timebase: u64,
    stage: Stage,
    signal: u64,
    prescaler: u64,
    divider: DividerSetting,
    test_count: u64,
    final_count: u64,
    result: MeasurementResult,
    previous_display: u64,
}

impl MeasurementPipeline {
    /// Create a pipeline for a timebase of `timebase_hz`
    pub fn new(timebase_hz: u64) -> Self {
        Self {
            timebase: timebase_hz,
            stage: Stage::Idle,
            signal: 0,
            prescaler: 0,
            divider: DividerSetting::default(),
            test_count: 0,
            final_count: 0,
            result: MeasurementResult::default(),
            previous_display: 0,
        }
    }

    /// Sample stage: estimate the gate count with the first-guess prescaler
    /// and pick the divider that reaches the gate target for `precision`
    pub fn sample(&mut self, signal: NonZeroU64, precision: Precision) {
        self.signal = signal.get();
        self.prescaler = SAMPLE_PRESCALER;
        self.test_count = gate_count(self.timebase, self.prescaler, self.signal);
        self.divider = choose_divider_for(self.test_count, precision.min_gate_counts());
        self.stage = Stage::Sample;
        debug!(
            "Sample: signal={} estimate={} divider={}",
            self.signal,
            self.test_count,
            self.divider.shift()
        );
    }

    /// Final stage: gate again with the auto-ranged prescaler
    pub fn finalize(&mut self) {
        self.prescaler = self.divider.prescaler();
        self.final_count = gate_count(self.timebase, self.prescaler, self.signal);
        self.stage = Stage::Final;
        debug!("Final: prescaler={} count={}", self.prescaler, self.final_count);
    }

    /// Latch stage: commit the final count to the result
    pub fn latch(&mut self) {
        self.result.counter_value = self.final_count;
        self.result.prescaler = self.prescaler;
        self.stage = Stage::Latch;
    }

    /// Convert stage: derive the display value for the active mode
    pub fn convert(&mut self, settings: &Settings) {
        let count = u128::from(self.result.counter_value);
        let gate_product = u128::from(self.timebase) * u128::from(self.result.prescaler);
        let micro = 1_000_000u128;

        let value = match settings.mode {
            Mode::Event => u128::from(self.signal) * u128::from(DISPLAY_SCALE),
            _ if count == 0 || gate_product == 0 => {
                warn!("Gate count underflow for signal {}, showing zero", self.signal);
                0
            }
            // MHz with three decimals
            Mode::Frequency => gate_product / (2 * count * u128::from(DISPLAY_SCALE)),
            // ms with three decimals, full period
            Mode::Period => 2 * count * micro / gate_product,
            // ms with three decimals, the gate covers one half period
            Mode::PulseHigh | Mode::PulseLow => count * micro / gate_product,
        };

        self.result.display_value = settings.precision.truncate(saturate(value));
        self.stage = Stage::Convert;
    }

    /// Render stage: show the display value and remember it
    pub fn render<D: Display + ?Sized>(&mut self, display: &mut D) {
        layout::show_value(display, self.result.display_value, DISPLAY_DECIMALS);
        self.previous_display = self.result.display_value;
        self.stage = Stage::Render;
    }

    /// Run all five stages and return to idle.
    ///
    /// A zero signal reading skips the pass and leaves the previous result in
    /// place.
    pub fn run_pass<D: Display + ?Sized>(
        &mut self,
        signal: u64,
        settings: &Settings,
        display: &mut D,
    ) -> Option<MeasurementResult> {
        let Some(signal) = NonZeroU64::new(signal) else {
            debug!("No input signal, skipping measurement");
            return None;
        };

        self.sample(signal, settings.precision);
        self.finalize();
        self.latch();
        self.convert(settings);
        self.render(display);
        self.stage = Stage::Idle;
        Some(self.result)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn result(&self) -> MeasurementResult {
        self.result
    }

    pub fn divider(&self) -> DividerSetting {
        self.divider
    }

    pub fn prescaler(&self) -> u64 {
        self.prescaler
    }

    /// First-pass gate estimate
    pub fn test_count(&self) -> u64 {
        self.test_count
    }

    /// Display value of the last rendered pass
    pub fn previous_display(&self) -> u64 {
        self.previous_display
    }

    pub fn timebase(&self) -> u64 {
        self.timebase
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            signal: self.signal,
            prescaler: self.prescaler,
            divider: self.divider,
            test_count: self.test_count,
            final_count: self.final_count,
            counter_value: self.result.counter_value,
            display_value: self.result.display_value,
            timebase_product: saturate(u128::from(self.timebase) * u128::from(self.prescaler)),
        }
    }
}

/// Timebase pulses counted over half a period of the prescaled signal
fn gate_count(timebase: u64, prescaler: u64, signal: u64) -> u64 {
    let numerator = u128::from(timebase) * u128::from(prescaler);
    let denominator = u128::from(signal) * 2;
    saturate(numerator / denominator)
}

fn saturate(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
