/*!
Software clock and counter standing in for the timer peripheral.
*/

use std::time::Instant;

use counter_core::ClockCounter;

/// Millisecond clock with a constant injected input signal
pub struct SimulatedCounter {
    start: Instant,
    signal: u64,
}

impl SimulatedCounter {
    pub fn new(signal: u64) -> Self {
        Self {
            start: Instant::now(),
            signal,
        }
    }

    pub fn set_signal(&mut self, signal: u64) {
        self.signal = signal;
    }
}

impl ClockCounter for SimulatedCounter {
    fn ticks(&mut self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn read_signal(&mut self) -> u64 {
        self.signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_ticks_advance() {
        let mut counter = SimulatedCounter::new(48_000);
        let first = counter.ticks();
        thread::sleep(Duration::from_millis(5));
        assert!(counter.ticks() >= first + 5);
    }

    #[test]
    fn test_signal_injection() {
        let mut counter = SimulatedCounter::new(48_000);
        assert_eq!(counter.read_signal(), 48_000);
        counter.set_signal(0);
        assert_eq!(counter.read_signal(), 0);
    }
}
