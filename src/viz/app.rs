use std::{io, time::Duration};

use crossterm::event::{self, KeyCode};
use ratatui::{prelude::*, widgets::*};

use crate::job::{JobId, JobManager};

use super::{
    components::{render_help, Component, JobGauges, Logs, RewardPlot},
    tui,
    util::pressed_key,
};

const TABS: [&str; 2] = ["Jobs", "Logs"];
const FRAME: Duration = Duration::from_millis(33);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum State {
    #[default]
    Monitor,
    Quit,
}

/// The root TUI component, polling a [`JobManager`] once per frame
pub struct App {
    manager: JobManager,
    state: State,
    selected_tab: usize,
    show_help: bool,
    jobs: JobGauges,
    plot: RewardPlot,
    logs: Logs,
}

impl App {
    pub fn new(manager: JobManager, jobs: Vec<JobId>) -> Self {
        Self {
            manager,
            state: State::default(),
            selected_tab: 0,
            show_help: false,
            jobs: JobGauges::new(&jobs),
            plot: RewardPlot::new(),
            logs: Logs::new(),
        }
    }

    fn poll_jobs(&mut self) {
        let ids = self.jobs.ids().collect::<Vec<_>>();
        for id in ids {
            self.jobs.update(id, self.manager.status(id).ok());
        }
        if let Some((id, Some(job))) = self.jobs.selected() {
            self.plot.update(&format!("{id} {}", job.algorithm), job);
        }
    }

    fn handle_event(&mut self, event: &event::Event) {
        let consumed = match self.selected_tab {
            0 => self.jobs.handle_ui_event(event),
            1 => self.logs.handle_ui_event(event),
            _ => false,
        };
        if consumed {
            return;
        }

        match pressed_key(event) {
            Some(KeyCode::Tab) => self.selected_tab = (self.selected_tab + 1) % TABS.len(),
            Some(KeyCode::Char('h')) => self.show_help = !self.show_help,
            Some(KeyCode::Char('q')) => self.state = State::Quit,
            _ => {}
        }
    }

    /// Initialize the terminal and run the main loop until the user quits
    ///
    /// Restores the terminal on exit
    pub fn run(&mut self) -> io::Result<()> {
        let mut terminal = tui::init()?;
        let result = self.monitor(&mut terminal);
        tui::restore()?;
        result
    }

    fn monitor(&mut self, terminal: &mut tui::Tui) -> io::Result<()> {
        while self.state == State::Monitor {
            self.poll_jobs();
            terminal.draw(|frame| frame.render_widget(&*self, frame.size()))?;

            if event::poll(FRAME)? {
                let event = event::read()?;
                self.handle_event(&event);
            }
        }
        Ok(())
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [menu_area, main_area, status_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        Tabs::new(TABS)
            .block(Block::default().padding(Padding::uniform(1)))
            .white()
            .bold()
            .highlight_style(Style::default().light_green())
            .select(self.selected_tab)
            .render(menu_area, buf);

        match self.selected_tab {
            0 => {
                let [gauges_area, plot_area] =
                    Layout::horizontal([Constraint::Percentage(45), Constraint::Fill(1)])
                        .areas(main_area);
                self.jobs.render_ref(gauges_area, buf);
                self.plot.render_ref(plot_area, buf);
            }
            1 => self.logs.render_ref(main_area, buf),
            _ => {}
        }

        let status = if self.jobs.all_done() {
            "all jobs done, press q to exit"
        } else {
            "training, press h for help"
        };
        Line::from(status).dark_gray().render(status_area, buf);

        if self.show_help {
            render_help(area, buf, self.selected_tab);
        }
    }
}
