use crossterm::event::{Event, KeyCode};
use ratatui::{prelude::*, widgets::*};

use crate::{
    job::{Job, JobId, JobStatus},
    viz::util::pressed_key,
};

use super::Component;

const GAUGE_HEIGHT: u16 = 3;

/// Progress gauge for each monitored job, one of which is selected
pub struct JobGauges {
    rows: Vec<(JobId, Option<Job>)>,
    selected: usize,
}

impl JobGauges {
    pub fn new(ids: &[JobId]) -> Self {
        Self {
            rows: ids.iter().map(|&id| (id, None)).collect(),
            selected: 0,
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = JobId> + '_ {
        self.rows.iter().map(|(id, _)| *id)
    }

    /// Store the latest snapshot of a job, `None` once it has left the registry
    pub fn update(&mut self, id: JobId, job: Option<Job>) {
        if let Some(row) = self.rows.iter_mut().find(|(row_id, _)| *row_id == id) {
            row.1 = job;
        }
    }

    pub fn selected(&self) -> Option<(JobId, Option<&Job>)> {
        self.rows
            .get(self.selected)
            .map(|(id, job)| (*id, job.as_ref()))
    }

    /// Whether every monitored job has reached a terminal status
    pub fn all_done(&self) -> bool {
        self.rows
            .iter()
            .all(|(_, job)| job.as_ref().map_or(true, |j| j.status.is_terminal()))
    }

    pub fn select_next(&mut self) {
        if !self.rows.is_empty() {
            self.selected = (self.selected + 1) % self.rows.len();
        }
    }

    pub fn select_prev(&mut self) {
        let len = self.rows.len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    fn label(id: JobId, job: Option<&Job>) -> String {
        let Some(job) = job else {
            return format!("{id} (cleared)");
        };
        let status = match job.status {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Finished => "finished",
            JobStatus::Error => "error",
        };
        let mut label = format!(
            "{id} {} [{status}] {}/{}",
            job.algorithm, job.episode, job.episodes
        );
        if let (Some(reward), Some(rate)) = (job.avg_reward, job.success_rate) {
            label.push_str(&format!(
                "  avg reward {reward:.2}  success {:.1}%",
                rate * 100.0
            ));
        }
        label
    }
}

impl WidgetRef for JobGauges {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title("Jobs");
        let inner = block.inner(area);
        block.render(area, buf);

        let visible = (inner.height / GAUGE_HEIGHT).max(1) as usize;
        let skip = (self.selected + 1).saturating_sub(visible);
        let areas = Layout::vertical(
            self.rows
                .iter()
                .skip(skip)
                .take(visible)
                .map(|_| Constraint::Length(GAUGE_HEIGHT)),
        )
        .split(inner);

        for (i, ((id, job), area)) in self.rows.iter().skip(skip).zip(areas.iter()).enumerate() {
            let job = job.as_ref();
            let color = match job.map(|j| j.status) {
                Some(JobStatus::Finished) => Color::Green,
                Some(JobStatus::Error) | None => Color::Red,
                _ => Color::Cyan,
            };
            let border = if i + skip == self.selected {
                Style::default().light_green()
            } else {
                Style::default().dark_gray()
            };
            let progress = job.map_or(0, |j| j.progress).min(100);

            Gauge::default()
                .block(
                    Block::bordered()
                        .border_type(BorderType::Rounded)
                        .border_style(border)
                        .title(Self::label(*id, job)),
                )
                .gauge_style(color)
                .percent(progress.into())
                .render(*area, buf);
        }
    }
}

impl Component for JobGauges {
    fn handle_ui_event(&mut self, event: &Event) -> bool {
        match pressed_key(event) {
            Some(KeyCode::Down | KeyCode::Char('j')) => self.select_next(),
            Some(KeyCode::Up | KeyCode::Char('k')) => self.select_prev(),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_wraps() {
        let mut gauges = JobGauges::new(&[JobId(0), JobId(1), JobId(2)]);
        gauges.select_prev();
        assert_eq!(gauges.selected().map(|(id, _)| id), Some(JobId(2)));
        gauges.select_next();
        assert_eq!(gauges.selected().map(|(id, _)| id), Some(JobId(0)));

        let mut empty = JobGauges::new(&[]);
        empty.select_next();
        assert!(empty.selected().is_none());
    }

    #[test]
    fn done_once_every_job_is_terminal_or_cleared() {
        let mut gauges = JobGauges::new(&[JobId(0), JobId(1)]);
        let mut job = Job::queued("sarsa", 1);
        gauges.update(JobId(0), Some(job.clone()));
        assert!(!gauges.all_done());

        job.start();
        job.fail("boom".into());
        gauges.update(JobId(0), Some(job));
        gauges.update(JobId(1), None);
        assert!(gauges.all_done());
    }
}
