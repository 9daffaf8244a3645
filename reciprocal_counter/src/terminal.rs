/*!
Display implementations: an ANSI terminal front panel and a log-only display
for headless runs.
*/

use std::io::{self, Stdout, Write};

use counter_core::{format_fixed, Color, Display};
use crossterm::style::{self, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::{cursor, execute, queue, terminal};
use tracing::{debug, info};

/// Puts the terminal into raw mode on an alternate screen and restores it on drop
pub struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(Self { stdout })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, ResetColor, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn to_terminal_color(color: Color) -> style::Color {
    match color {
        Color::Default => style::Color::Reset,
        Color::Black => style::Color::Black,
        Color::Red => style::Color::DarkRed,
        Color::Green => style::Color::DarkGreen,
        Color::Yellow => style::Color::DarkYellow,
        Color::Blue => style::Color::DarkBlue,
        Color::White => style::Color::Grey,
        Color::BrightWhite => style::Color::White,
    }
}

/// Front panel drawn with crossterm commands.
///
/// Writes are queued and only sent on [`Display::flush`]. The first I/O
/// error is kept until [`TerminalDisplay::take_error`] collects it.
pub struct TerminalDisplay<W: Write> {
    out: W,
    use_color: bool,
    error: Option<io::Error>,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            error: None,
        }
    }

    /// Take the first write error since the last call
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            debug!("Terminal write failed: {}", e);
            self.error.get_or_insert(e);
        }
    }
}

impl<W: Write> Display for TerminalDisplay<W> {
    fn clear(&mut self) {
        let result = queue!(self.out, ResetColor, terminal::Clear(terminal::ClearType::All));
        self.record(result);
    }

    fn set_cursor(&mut self, row: u16, col: u16) {
        let result = queue!(self.out, cursor::MoveTo(col, row));
        self.record(result);
    }

    fn set_color(&mut self, fg: Color, bg: Color) {
        if !self.use_color {
            return;
        }
        let result = queue!(
            self.out,
            SetForegroundColor(to_terminal_color(fg)),
            SetBackgroundColor(to_terminal_color(bg))
        );
        self.record(result);
    }

    fn clear_color(&mut self) {
        if !self.use_color {
            return;
        }
        let result = queue!(self.out, ResetColor);
        self.record(result);
    }

    fn write_text(&mut self, text: &str) {
        let result = queue!(self.out, Print(text));
        self.record(result);
    }

    fn flush(&mut self) {
        let result = self.out.flush();
        self.record(result);
    }
}

/// Headless display: layout calls are dropped, values go to the log
#[derive(Debug, Default)]
pub struct LogDisplay {
    last_value: Option<String>,
}

impl LogDisplay {
    pub fn last_value(&self) -> Option<&str> {
        self.last_value.as_deref()
    }
}

impl Display for LogDisplay {
    fn clear(&mut self) {
        debug!("Display background redrawn");
    }

    fn set_cursor(&mut self, _row: u16, _col: u16) {}

    fn set_color(&mut self, _fg: Color, _bg: Color) {}

    fn clear_color(&mut self) {}

    fn write_text(&mut self, _text: &str) {}

    fn write_value(&mut self, value: u64, decimal_position: u8) {
        let text = format_fixed(value, decimal_position);
        info!("📟 Display: {}", text.trim());
        self.last_value = Some(text);
    }
}
