use crossterm::event::{Event, KeyCode, KeyEventKind};

/// The key code of a key press, ignoring releases and every other event
pub(super) fn pressed_key(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(key.code),
        _ => None,
    }
}
