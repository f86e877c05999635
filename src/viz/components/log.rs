use crossterm::event::{Event, KeyCode};
use log::LevelFilter;
use ratatui::{prelude::*, widgets::*};
use tui_logger::{TuiLoggerSmartWidget, TuiWidgetEvent, TuiWidgetState};

use crate::viz::util::pressed_key;

use super::Component;

/// Translate a key into a log widget command
///
/// `j`/`k` move between targets like they move between jobs on the jobs tab.
fn widget_event(key: KeyCode) -> Option<TuiWidgetEvent> {
    let event = match key {
        KeyCode::Up | KeyCode::Char('k') => TuiWidgetEvent::UpKey,
        KeyCode::Down | KeyCode::Char('j') => TuiWidgetEvent::DownKey,
        KeyCode::Left => TuiWidgetEvent::LeftKey,
        KeyCode::Right => TuiWidgetEvent::RightKey,
        KeyCode::Char('+' | '=') => TuiWidgetEvent::PlusKey,
        KeyCode::Char('-') => TuiWidgetEvent::MinusKey,
        KeyCode::PageUp => TuiWidgetEvent::PrevPageKey,
        KeyCode::PageDown => TuiWidgetEvent::NextPageKey,
        KeyCode::Esc => TuiWidgetEvent::EscapeKey,
        KeyCode::Char(' ') => TuiWidgetEvent::SpaceKey,
        KeyCode::Char('s') => TuiWidgetEvent::HideKey,
        KeyCode::Char('f') => TuiWidgetEvent::FocusKey,
        _ => return None,
    };
    Some(event)
}

/// Log stream of every job, one target per module, starting at `info`
pub struct Logs {
    state: TuiWidgetState,
    paged: bool,
}

impl Logs {
    pub fn new() -> Self {
        Self {
            state: TuiWidgetState::new().set_default_display_level(LevelFilter::Info),
            paged: false,
        }
    }

    fn title(&self) -> &'static str {
        if self.paged {
            "Logs (paused, Esc to follow)"
        } else {
            "Logs"
        }
    }
}

impl WidgetRef for Logs {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(self.title());
        let inner = block.inner(area);
        block.render(area, buf);

        TuiLoggerSmartWidget::default()
            .style(Style::default().white())
            .style_error(Style::default().light_red())
            .style_warn(Style::default().light_yellow())
            .style_info(Style::default().cyan())
            .style_debug(Style::default().dark_gray())
            .output_separator(' ')
            .state(&self.state)
            .render(inner, buf);
    }
}

impl Component for Logs {
    fn handle_ui_event(&mut self, event: &Event) -> bool {
        let Some(command) = pressed_key(event).and_then(widget_event) else {
            return false;
        };

        match command {
            TuiWidgetEvent::PrevPageKey | TuiWidgetEvent::NextPageKey => self.paged = true,
            TuiWidgetEvent::EscapeKey => self.paged = false,
            _ => {}
        }
        self.state.transition(command);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vim_keys_move_between_targets() {
        assert!(matches!(widget_event(KeyCode::Char('j')), Some(TuiWidgetEvent::DownKey)));
        assert!(matches!(widget_event(KeyCode::Char('k')), Some(TuiWidgetEvent::UpKey)));
        assert!(widget_event(KeyCode::Char('q')).is_none(), "quit stays with the app");
        assert!(widget_event(KeyCode::Tab).is_none(), "tab switching stays with the app");
    }
}
