//! Input - crossterm events for terminal apps.
//!
//! Converts crossterm key events to the key names listeners receive, so a
//! driver loop can forward them with
//! [`TerminalHost::dispatch_all`](super::TerminalHost::dispatch_all).
//!
//! ```ignore
//! loop {
//!     match poll_event(Duration::from_millis(16))? {
//!         Some(TerminalEvent::Key(key)) => {
//!             session.host().dispatch_all("onKey", &Value::from(key));
//!         }
//!         Some(TerminalEvent::Resize(w, h)) => session.host_mut().resize(w, h)?,
//!         _ => {}
//!     }
//!     run_until_idle(&mut session, slice)?;
//! }
//! ```

use std::io;
use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll, read};

/// Event relevant to a terminal host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    /// Key press by name, e.g. `"a"`, `"Enter"`, `"Ctrl+c"`.
    Key(String),
    /// Terminal resize (new width, height).
    Resize(u16, u16),
    /// Anything else.
    Other,
}

/// Name of a pressed key. `None` for releases and keys without a name.
pub fn key_name(event: &KeyEvent) -> Option<String> {
    if event.kind == KeyEventKind::Release {
        return None;
    }

    let key = match event.code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => return None,
    };

    let mut name = String::new();
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        name.push_str("Ctrl+");
    }
    if event.modifiers.contains(KeyModifiers::ALT) {
        name.push_str("Alt+");
    }
    name.push_str(&key);
    Some(name)
}

fn convert(event: CrosstermEvent) -> TerminalEvent {
    match event {
        CrosstermEvent::Key(key) => key_name(&key).map(TerminalEvent::Key).unwrap_or(TerminalEvent::Other),
        CrosstermEvent::Resize(w, h) => TerminalEvent::Resize(w, h),
        _ => TerminalEvent::Other,
    }
}

/// Poll for an event with timeout.
/// Returns None if no event within timeout.
pub fn poll_event(timeout: Duration) -> io::Result<Option<TerminalEvent>> {
    if poll(timeout)? {
        Ok(Some(convert(read()?)))
    } else {
        Ok(None)
    }
}
