/*!
Single-character command parsing.
*/

use crate::register::{InputRange, Mode, Precision, Setting};

/// Ctrl+C as delivered by a raw terminal
pub const CTRL_C: char = '\u{3}';
/// Escape key
pub const ESCAPE: char = '\u{1b}';

/// A recognised user command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Update one configuration field
    Configure(Setting),
    /// Setup button, accepted without effect
    Setup,
    /// Hold/continue button, accepted without effect
    Hold,
    /// Leave the main loop
    Quit,
}

/// Parse a command character (case-insensitive). Unknown characters yield `None`.
pub fn parse_command(c: char) -> Option<Command> {
    let command = match c.to_ascii_lowercase() {
        'f' => Command::Configure(Setting::Mode(Mode::Frequency)),
        'p' => Command::Configure(Setting::Mode(Mode::Period)),
        'h' => Command::Configure(Setting::Mode(Mode::PulseHigh)),
        'l' => Command::Configure(Setting::Mode(Mode::PulseLow)),
        'e' => Command::Configure(Setting::Mode(Mode::Event)),
        'm' => Command::Configure(Setting::Input(InputRange::MHz)),
        'g' => Command::Configure(Setting::Input(InputRange::GHz)),
        'd' => Command::Configure(Setting::Input(InputRange::Digital)),
        '6' => Command::Configure(Setting::Precision(Precision::Six)),
        '7' => Command::Configure(Setting::Precision(Precision::Seven)),
        'b' => Command::Setup,
        'c' => Command::Hold,
        'q' | CTRL_C | ESCAPE => Command::Quit,
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_commands() {
        assert_eq!(parse_command('f'), Some(Command::Configure(Setting::Mode(Mode::Frequency))));
        assert_eq!(parse_command('P'), Some(Command::Configure(Setting::Mode(Mode::Period))));
        assert_eq!(parse_command('h'), Some(Command::Configure(Setting::Mode(Mode::PulseHigh))));
        assert_eq!(parse_command('l'), Some(Command::Configure(Setting::Mode(Mode::PulseLow))));
        assert_eq!(parse_command('E'), Some(Command::Configure(Setting::Mode(Mode::Event))));
    }

    #[test]
    fn test_input_and_precision_commands() {
        assert_eq!(parse_command('g'), Some(Command::Configure(Setting::Input(InputRange::GHz))));
        assert_eq!(parse_command('M'), Some(Command::Configure(Setting::Input(InputRange::MHz))));
        assert_eq!(parse_command('d'), Some(Command::Configure(Setting::Input(InputRange::Digital))));
        assert_eq!(parse_command('7'), Some(Command::Configure(Setting::Precision(Precision::Seven))));
        assert_eq!(parse_command('6'), Some(Command::Configure(Setting::Precision(Precision::Six))));
    }

    #[test]
    fn test_buttons_and_quit() {
        assert_eq!(parse_command('b'), Some(Command::Setup));
        assert_eq!(parse_command('c'), Some(Command::Hold));
        assert_eq!(parse_command('q'), Some(Command::Quit));
        assert_eq!(parse_command(CTRL_C), Some(Command::Quit));
        assert_eq!(parse_command(ESCAPE), Some(Command::Quit));
    }

    #[test]
    fn test_unknown_ignored() {
        for c in ['x', 'z', ' ', '1', '\n'] {
            assert_eq!(parse_command(c), None);
        }
    }
}
