use crossterm::event::Event;
use ratatui::widgets::WidgetRef;

pub use self::{help::render_help, jobs::JobGauges, log::Logs, plot::RewardPlot};

mod help;
mod jobs;
mod log;
mod plot;

/// A widget that reacts to terminal input
pub trait Component: WidgetRef {
    /// Returns `true` if the event was consumed
    fn handle_ui_event(&mut self, event: &Event) -> bool;
}
