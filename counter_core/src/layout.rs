/*!
Screen layout of the counter front panel.

Everything here only positions and writes text through a [`Display`]; what
ends up on the screen is decided by the display implementation.
*/

use crate::device::{Color, Display};
use crate::labels::{input_label, mode_label, precision_label, unit_label};
use crate::pipeline::PipelineSnapshot;
use crate::register::{InputRange, Mode, Settings};

/// Row holding the measured value, mode and unit
pub const VALUE_ROW: u16 = 6;
/// Column of the measured value
pub const VALUE_COL: u16 = 30;
const MODE_COL: u16 = 18;
const UNIT_COL: u16 = 40;
const PRECISION_ROW: u16 = VALUE_ROW + 2;

const MENU_ROW: u16 = 3;
const MODE_MENU_COL: u16 = 1;
const INPUT_MENU_COL: u16 = 50;
const BUTTON_ROW: u16 = 16;
const DIAGNOSTICS_ROW: u16 = 20;

const MENU_BLANK: &str = "|         |";

const HEADER_COLORS: (Color, Color) = (Color::BrightWhite, Color::Blue);
const ACTIVE_COLORS: (Color, Color) = (Color::Black, Color::Green);

fn menu_entry(label: &str) -> String {
    format!("| {label:<7} |")
}

fn mode_menu_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Frequency => "Freq",
        Mode::Period => "Per",
        Mode::PulseHigh => "pHi",
        Mode::PulseLow => "pLo",
        Mode::Event => "Evt",
    }
}

fn write_at<D: Display + ?Sized>(display: &mut D, row: u16, col: u16, text: &str) {
    display.set_cursor(row, col);
    display.write_text(text);
}

fn write_highlighted<D: Display + ?Sized>(display: &mut D, row: u16, col: u16, text: &str, colors: (Color, Color)) {
    display.set_color(colors.0, colors.1);
    write_at(display, row, col, text);
    display.clear_color();
}

/// Redraw the full background for the given settings
pub fn draw_background<D: Display + ?Sized>(display: &mut D, title: &str, settings: &Settings) {
    display.clear();
    write_at(display, 1, 1, title);
    draw_mode_menu(display, settings.mode);
    draw_input_menu(display, settings.input);
    draw_buttons(display);

    write_at(display, VALUE_ROW, MODE_COL, &format!(" {:<9}", mode_label(settings.mode)));
    write_at(display, VALUE_ROW, UNIT_COL, &format!(" {:<5}", unit_label(settings.mode)));
    write_at(display, PRECISION_ROW, VALUE_COL, precision_label(settings.precision));
    display.flush();
}

fn draw_mode_menu<D: Display + ?Sized>(display: &mut D, active: Mode) {
    let mut row = MENU_ROW;
    write_highlighted(display, row, MODE_MENU_COL, &menu_entry("Measure"), HEADER_COLORS);
    for mode in Mode::ALL {
        row += 1;
        write_at(display, row, MODE_MENU_COL, MENU_BLANK);
        row += 1;
        let entry = menu_entry(mode_menu_label(mode));
        if mode == active {
            write_highlighted(display, row, MODE_MENU_COL, &entry, ACTIVE_COLORS);
        } else {
            write_at(display, row, MODE_MENU_COL, &entry);
        }
    }
}

fn draw_input_menu<D: Display + ?Sized>(display: &mut D, active: InputRange) {
    let mut row = MENU_ROW;
    write_highlighted(display, row, INPUT_MENU_COL, &menu_entry("Input"), HEADER_COLORS);
    row += 1;
    write_at(display, row, INPUT_MENU_COL, MENU_BLANK);
    for input in InputRange::ALL {
        row += 1;
        let entry = menu_entry(input_label(input));
        if input == active {
            write_highlighted(display, row, INPUT_MENU_COL, &entry, ACTIVE_COLORS);
        } else {
            write_at(display, row, INPUT_MENU_COL, &entry);
        }
        for _ in 0..2 {
            row += 1;
            write_at(display, row, INPUT_MENU_COL, MENU_BLANK);
        }
    }
}

fn draw_buttons<D: Display + ?Sized>(display: &mut D) {
    write_at(display, BUTTON_ROW, 3, "Setup");
    write_at(display, BUTTON_ROW, 25, "6/7 digits");
    write_at(display, BUTTON_ROW, 51, "hold/Cont");
}

/// Write a measured value on the value row
pub fn show_value<D: Display + ?Sized>(display: &mut D, value: u64, decimal_position: u8) {
    display.set_cursor(VALUE_ROW, VALUE_COL);
    display.write_value(value, decimal_position);
    display.write_text(" ");
    display.flush();
}

/// Register bits grouped by field, most significant first
pub fn format_register(word: u8) -> String {
    let bits = format!("{word:08b}");
    format!("{} {} {} {} {}", &bits[0..1], &bits[1..3], &bits[3..6], &bits[6..7], &bits[7..8])
}

/// Draw the diagnostics panel below the front panel
pub fn draw_diagnostics<D: Display + ?Sized>(display: &mut D, word: u8, ticks: u64, snapshot: &PipelineSnapshot) {
    let lines = [
        format!("CmdReg=${word:04X}"),
        format!("CmdReg={}", format_register(word)),
        format!("Ticks={ticks}"),
        format!("CounterValue={:>12}", snapshot.counter_value),
        format!("DisplayValue={:>12}", snapshot.display_value),
        format!("Prescaler={:>15}", snapshot.prescaler),
        format!("DividerSetting={:>10}", snapshot.divider.shift()),
        format!("InputSignal={:>13}", snapshot.signal),
        format!("GateCountTest={:>11}", snapshot.test_count),
        format!("GateCountFinal={:>10}", snapshot.final_count),
        format!("Intermediate={:>12}", snapshot.timebase_product),
    ];
    for (row, line) in (DIAGNOSTICS_ROW..).zip(lines.iter()) {
        write_at(display, row, 1, &format!("{line:<40}"));
    }
    display.flush();
}
