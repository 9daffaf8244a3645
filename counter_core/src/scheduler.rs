/*!
Cooperative application scheduler.

One [`AppScheduler::step`] per polling tick: poll for a command, read the
clock, resynchronise after configuration changes and, once per measurement
interval, run a full pipeline pass. Input polling never blocks, so the
measurement cadence only depends on the clock.
*/

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::command::{parse_command, Command};
use crate::constants::TIMEBASE_FREQUENCY;
use crate::device::{ClockCounter, CommandSource, Display};
use crate::labels::{input_label, mode_label, precision_label};
use crate::layout;
use crate::pipeline::{MeasurementPipeline, MeasurementResult};
use crate::register::{ConfigRegister, Settings};

/// Scheduler parameters
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Title drawn on the background
    pub title: String,
    /// Reference timebase in Hz
    pub timebase_hz: u64,
    /// Clock ticks between measurement passes
    pub measurement_interval: u64,
    /// Sleep between polling ticks in [`AppScheduler::run`]
    pub poll_interval: Duration,
    /// Draw the diagnostics panel after every pass
    pub show_diagnostics: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            title: "Reciprocal Counter".to_string(),
            timebase_hz: TIMEBASE_FREQUENCY,
            measurement_interval: 1,
            poll_interval: Duration::from_millis(1),
            show_diagnostics: false,
        }
    }
}

/// What happened during one polling tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepOutcome {
    /// Result of the pipeline pass, if one ran and produced a value
    pub measurement: Option<MeasurementResult>,
    /// The exit flag is cleared
    pub exit_requested: bool,
}

/// Owns the counter state and drives it from its collaborators
pub struct AppScheduler<S, C, D> {
    config: SchedulerConfig,
    register: ConfigRegister,
    settings: Settings,
    pipeline: MeasurementPipeline,
    source: S,
    clock: C,
    display: D,
    ticks: u64,
    last_pass: u64,
    passes: u64,
    running: Arc<AtomicBool>,
}

impl<S, C, D> AppScheduler<S, C, D>
where
    S: CommandSource,
    C: ClockCounter,
    D: Display,
{
    /// Create a scheduler with the default register contents
    pub fn new(config: SchedulerConfig, source: S, clock: C, display: D) -> Self {
        let register = ConfigRegister::new();
        let settings = register.settings().unwrap_or_default();
        Self {
            pipeline: MeasurementPipeline::new(config.timebase_hz),
            config,
            register,
            settings,
            source,
            clock,
            display,
            ticks: 0,
            last_pass: 0,
            passes: 0,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Get a reference to the running flag for external control
    pub fn get_running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Run one polling tick
    pub fn step(&mut self) -> StepOutcome {
        let mut outcome = StepOutcome::default();

        if let Some(c) = self.source.poll() {
            self.handle_input(c);
        }

        self.ticks = self.clock.ticks();

        if self.register.take_changed() {
            self.apply_configuration();
            layout::draw_background(&mut self.display, &self.config.title, &self.settings);
        }

        if self.ticks.wrapping_sub(self.last_pass) >= self.config.measurement_interval {
            self.last_pass = self.ticks;
            let signal = self.clock.read_signal();
            outcome.measurement = self.pipeline.run_pass(signal, &self.settings, &mut self.display);
            if outcome.measurement.is_some() {
                self.passes += 1;
            }
            if self.config.show_diagnostics {
                layout::draw_diagnostics(
                    &mut self.display,
                    self.register.word(),
                    self.ticks,
                    &self.pipeline.snapshot(),
                );
            }
        }

        outcome.exit_requested = !self.running.load(Ordering::SeqCst);
        outcome
    }

    /// Step until the exit flag clears or `on_step` breaks.
    ///
    /// Returns the number of completed measurement passes.
    pub fn run<F>(&mut self, mut on_step: F) -> u64
    where
        F: FnMut(&mut Self, &StepOutcome) -> ControlFlow<()>,
    {
        info!("Scheduler started (interval {} ticks)", self.config.measurement_interval);
        while self.running.load(Ordering::SeqCst) {
            let outcome = self.step();
            if on_step(self, &outcome).is_break() || outcome.exit_requested {
                break;
            }
            thread::sleep(self.config.poll_interval);
        }
        info!("Scheduler stopped after {} measurement passes", self.passes);
        self.passes
    }

    fn handle_input(&mut self, c: char) {
        match parse_command(c) {
            Some(Command::Configure(setting)) => {
                debug!("Command {:?} -> {:?}", c, setting);
                self.register.apply(setting);
            }
            Some(Command::Setup) => debug!("Setup requested"),
            Some(Command::Hold) => debug!("Hold requested"),
            Some(Command::Quit) => {
                info!("Quit requested");
                self.running.store(false, Ordering::SeqCst);
            }
            None => debug!("Ignoring input {:?}", c),
        }
    }

    /// Bring the typed settings in line with the register.
    ///
    /// An undecodable register keeps the previous settings.
    fn apply_configuration(&mut self) {
        match self.register.settings() {
            Ok(settings) => {
                self.settings = settings;
                info!(
                    "Configuration: {} / {} / {}",
                    mode_label(settings.mode),
                    input_label(settings.input),
                    precision_label(settings.precision)
                );
            }
            Err(e) => warn!("Keeping previous configuration: {}", e),
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn register(&self) -> &ConfigRegister {
        &self.register
    }

    pub fn pipeline(&self) -> &MeasurementPipeline {
        &self.pipeline
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use crate::device::Color;
    use crate::labels::{mode_label, unit_for, unit_label, Unit};
    use crate::register::{FieldMask, InputRange, Mode, Precision};

    struct ManualClock {
        ticks: u64,
        signal: u64,
    }

    impl ClockCounter for ManualClock {
        fn ticks(&mut self) -> u64 {
            self.ticks
        }
        fn read_signal(&mut self) -> u64 {
            self.signal
        }
    }

    #[derive(Default)]
    struct CountingScreen {
        backgrounds: usize,
        values: Vec<String>,
    }

    impl Display for CountingScreen {
        fn clear(&mut self) {
            self.backgrounds += 1;
        }
        fn set_cursor(&mut self, _row: u16, _col: u16) {}
        fn set_color(&mut self, _fg: Color, _bg: Color) {}
        fn clear_color(&mut self) {}
        fn write_text(&mut self, _text: &str) {}
        fn write_value(&mut self, value: u64, decimal_position: u8) {
            self.values.push(crate::device::format_fixed(value, decimal_position));
        }
    }

    type TestScheduler = AppScheduler<VecDeque<char>, ManualClock, CountingScreen>;

    fn scheduler(input: &str, signal: u64) -> TestScheduler {
        let config = SchedulerConfig { measurement_interval: 100, ..SchedulerConfig::default() };
        AppScheduler::new(
            config,
            input.chars().collect(),
            ManualClock { ticks: 0, signal },
            CountingScreen::default(),
        )
    }

    fn push_input(scheduler: &mut TestScheduler, c: char) {
        scheduler.source_mut().push_back(c);
    }

    #[test]
    fn test_defaults() {
        let mut scheduler = scheduler("", 48_000);
        let outcome = scheduler.step();

        assert_eq!(outcome.measurement, None);
        assert_eq!(scheduler.display().backgrounds, 1);
        let settings = scheduler.settings();
        assert_eq!(settings, Settings { precision: Precision::Six, mode: Mode::Frequency, input: InputRange::MHz });
        assert_eq!(mode_label(settings.mode), "Freq");
        assert_eq!(unit_for(settings.mode), Unit::MegaHertz);
    }

    #[test]
    fn test_precision_command_changes_only_precision() {
        let mut scheduler = scheduler("", 48_000);
        scheduler.step();
        let before = scheduler.settings();

        push_input(&mut scheduler, '7');
        scheduler.step();
        let after = scheduler.settings();

        assert_eq!(after.precision, Precision::Seven);
        assert_eq!(after.mode, before.mode);
        assert_eq!(after.input, before.input);
        assert_eq!(mode_label(after.mode), mode_label(before.mode));
        assert_eq!(unit_label(after.mode), unit_label(before.mode));
        assert_eq!(scheduler.display().backgrounds, 2);
    }

    #[test]
    fn test_reference_measurement() {
        let mut scheduler = scheduler("", 48_000);
        scheduler.clock_mut().ticks = 100;
        let outcome = scheduler.step();

        let result = outcome.measurement.unwrap();
        assert_eq!(scheduler.pipeline().test_count(), 208);
        assert_eq!(scheduler.pipeline().divider().shift(), 13);
        assert_eq!(result.prescaler, 8192);
        assert_eq!(result.counter_value, 853_333);
        assert_eq!(scheduler.display().values, vec!["   0.048".to_string()]);
    }

    #[test]
    fn test_seven_digit_measurement() {
        let mut scheduler = scheduler("7", 48_000);
        scheduler.clock_mut().ticks = 100;
        let result = scheduler.step().measurement.unwrap();

        assert_eq!(scheduler.settings().precision, Precision::Seven);
        assert_eq!(scheduler.pipeline().divider().shift(), 16);
        assert_eq!(result.counter_value, 6_826_666);
        assert_eq!(scheduler.display().values, vec!["   0.048".to_string()]);
    }

    #[test]
    fn test_mode_switch_waits_for_next_pass() {
        let mut scheduler = scheduler("", 48_000);
        scheduler.clock_mut().ticks = 100;
        scheduler.step();
        let divider = scheduler.pipeline().divider();
        let counter = scheduler.pipeline().result().counter_value;

        scheduler.clock_mut().signal = 1_000;
        for c in ['p', 'f'] {
            push_input(&mut scheduler, c);
            let outcome = scheduler.step();
            assert_eq!(outcome.measurement, None);
            assert_eq!(scheduler.pipeline().divider(), divider);
            assert_eq!(scheduler.pipeline().result().counter_value, counter);
        }
        assert_eq!(scheduler.settings().mode, Mode::Frequency);

        scheduler.clock_mut().ticks = 200;
        assert!(scheduler.step().measurement.is_some());
        assert_ne!(scheduler.pipeline().divider(), divider);
    }

    #[test]
    fn test_measurement_rate_limited() {
        let mut scheduler = scheduler("", 48_000);
        for ticks in [0, 50, 99] {
            scheduler.clock_mut().ticks = ticks;
            assert_eq!(scheduler.step().measurement, None);
        }
        scheduler.clock_mut().ticks = 100;
        assert!(scheduler.step().measurement.is_some());
        scheduler.clock_mut().ticks = 150;
        assert_eq!(scheduler.step().measurement, None);
        assert_eq!(scheduler.passes(), 1);
    }

    #[test]
    fn test_zero_signal_produces_no_measurement() {
        let mut scheduler = scheduler("", 0);
        scheduler.clock_mut().ticks = 100;
        assert_eq!(scheduler.step().measurement, None);
        assert_eq!(scheduler.passes(), 0);
        assert!(scheduler.display().values.is_empty());
    }

    #[test]
    fn test_unknown_and_button_input_ignored() {
        let mut scheduler = scheduler("", 48_000);
        scheduler.step();
        for c in ['x', 'b', 'c'] {
            push_input(&mut scheduler, c);
            scheduler.step();
            assert!(!scheduler.register().is_changed());
        }
        assert_eq!(scheduler.display().backgrounds, 1);
        assert_eq!(scheduler.settings(), Settings::default());
    }

    #[test]
    fn test_quit_sets_exit() {
        let mut scheduler = scheduler("q", 48_000);
        let running = scheduler.get_running_flag();
        let outcome = scheduler.step();
        assert!(outcome.exit_requested);
        assert!(!running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_run_stops_on_quit() {
        let mut scheduler = scheduler("7q", 48_000);
        let mut steps = 0;
        scheduler.run(|_, _| {
            steps += 1;
            ControlFlow::Continue(())
        });
        assert_eq!(steps, 2);
        assert_eq!(scheduler.settings().precision, Precision::Seven);
    }

    #[test]
    fn test_run_stops_on_break() {
        let mut scheduler = scheduler("", 48_000);
        let passes = scheduler.run(|s, outcome| {
            let next = s.ticks() + 100;
            s.clock_mut().ticks = next;
            if outcome.measurement.is_some() && s.passes() == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(passes, 3);
    }

    #[test]
    fn test_undecodable_register_keeps_settings() {
        let mut scheduler = scheduler("e", 48_000);
        scheduler.step();
        assert_eq!(scheduler.settings().mode, Mode::Event);

        scheduler.register.set_field(FieldMask::MODE, 0x1C);
        scheduler.step();
        assert_eq!(scheduler.settings().mode, Mode::Event);
    }
}
