/*!
Collaborator interfaces: the display, the clock/counter and the command source.

All three are driven from the scheduler thread only. Display writes are
fire-and-forget; the clock and command source must return immediately.
*/

use std::collections::VecDeque;

use crossbeam_channel::{Receiver, TryRecvError};

/// Display colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    White,
    BrightWhite,
}

/// Character display with cursor addressing
pub trait Display {
    /// Clear the whole screen
    fn clear(&mut self);

    /// Move the cursor to `row`, `col` (zero based)
    fn set_cursor(&mut self, row: u16, col: u16);

    /// Set foreground and background color
    fn set_color(&mut self, fg: Color, bg: Color);

    /// Return to the default colors
    fn clear_color(&mut self);

    /// Write text at the cursor
    fn write_text(&mut self, text: &str);

    /// Write a fixed-point value at the cursor, see [`format_fixed`]
    fn write_value(&mut self, value: u64, decimal_position: u8) {
        self.write_text(&format_fixed(value, decimal_position));
    }

    /// Push buffered output to the device
    fn flush(&mut self) {}
}

/// Time and pulse source
pub trait ClockCounter {
    /// Coarse ticks since start
    fn ticks(&mut self) -> u64;

    /// Raw input signal reading; zero when no signal is present
    fn read_signal(&mut self) -> u64;
}

/// Non-blocking source of command characters
pub trait CommandSource {
    /// Next pending character, or `None` without waiting
    fn poll(&mut self) -> Option<char>;
}

impl CommandSource for Receiver<char> {
    fn poll(&mut self) -> Option<char> {
        match self.try_recv() {
            Ok(c) => Some(c),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl CommandSource for VecDeque<char> {
    fn poll(&mut self) -> Option<char> {
        self.pop_front()
    }
}

/// Format `value` with `decimal_position` fractional digits.
///
/// The integer part is right aligned to four columns: `48000` with three
/// decimals renders as `"  48.000"`.
pub fn format_fixed(value: u64, decimal_position: u8) -> String {
    if decimal_position == 0 {
        return format!("{value:4}");
    }
    let scale = 10u64.saturating_pow(u32::from(decimal_position));
    let width = usize::from(decimal_position);
    format!("{:4}.{:0width$}", value / scale, value % scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(48_000, 3), "  48.000");
        assert_eq!(format_fixed(48, 3), "   0.048");
        assert_eq!(format_fixed(10_000_123, 3), "10000.123");
        assert_eq!(format_fixed(7, 0), "   7");
        assert_eq!(format_fixed(1_050, 2), "  10.50");
    }

    #[test]
    fn test_channel_source_never_blocks() {
        let (tx, mut rx) = bounded::<char>(4);
        assert_eq!(rx.poll(), None);
        tx.send('f').unwrap();
        assert_eq!(rx.poll(), Some('f'));
        drop(tx);
        assert_eq!(rx.poll(), None);
    }

    #[test]
    fn test_queue_source() {
        let mut queue: VecDeque<char> = "7q".chars().collect();
        assert_eq!(queue.poll(), Some('7'));
        assert_eq!(queue.poll(), Some('q'));
        assert_eq!(queue.poll(), None);
    }
}
