/*!
Keyboard command reader.

A background thread turns terminal key presses into command characters and
forwards them over a bounded channel. The scheduler polls the receiving end
without blocking.
*/

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use counter_core::command::{CTRL_C, ESCAPE};
use crossbeam_channel::{bounded, Receiver, Sender};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{error, info, warn};

/// Pending key presses before new ones are dropped
const KEY_BUFFER: usize = 64;

/// Map a key press to a command character
pub fn key_to_char(key: &KeyEvent) -> Option<char> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(CTRL_C),
        KeyCode::Char(c) => Some(c),
        KeyCode::Esc => Some(ESCAPE),
        _ => None,
    }
}

/// Start the keyboard reader thread.
///
/// The thread exits once `running` is cleared or the receiver is dropped.
pub fn spawn_keyboard_reader(running: Arc<AtomicBool>) -> (Receiver<char>, JoinHandle<()>) {
    let (key_tx, key_rx) = bounded::<char>(KEY_BUFFER);
    let handle = thread::spawn(move || {
        if let Err(e) = keyboard_reader_thread(key_tx, running) {
            error!("Keyboard reader failed: {}", e);
        }
    });
    (key_rx, handle)
}

fn keyboard_reader_thread(key_tx: Sender<char>, running: Arc<AtomicBool>) -> std::io::Result<()> {
    info!("⌨️ Keyboard reader started");
    while running.load(Ordering::SeqCst) {
        // Timeout so the running flag is checked periodically
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            let Some(c) = key_to_char(&key) else {
                continue;
            };
            if let Err(e) = key_tx.try_send(c) {
                if e.is_disconnected() {
                    break;
                }
                warn!("Key buffer full, dropping {:?}", c);
            }
        }
    }
    info!("⌨️ Keyboard reader stopped");
    Ok(())
}
