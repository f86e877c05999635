use ratatui::{prelude::*, style::Stylize, widgets::*};

use crate::job::Job;

/// Scatter plot of the most recent episode rewards of one job
pub struct RewardPlot {
    title: String,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    data: Vec<(f64, f64)>,
}

impl RewardPlot {
    pub fn new() -> Self {
        Self {
            title: String::from("Rewards"),
            x_bounds: [0.0, 1.0],
            y_bounds: [0.0, 1.0],
            data: Vec::new(),
        }
    }

    /// Replace the plotted points with the reward log of `job`
    ///
    /// The log ends at the job's last published episode.
    pub fn update(&mut self, label: &str, job: &Job) {
        self.title = format!("Rewards: {label}");
        let first = (job.episode + 1).saturating_sub(job.logs.len());
        self.data = job
            .logs
            .iter()
            .enumerate()
            .map(|(i, &reward)| ((first + i) as f64, reward))
            .collect();

        let Some(&(x_min, _)) = self.data.first() else {
            return;
        };
        let x_max = self.data.last().map_or(x_min, |&(x, _)| x);
        let (y_min, y_max) = self
            .data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| {
                (lo.min(y), hi.max(y))
            });
        self.x_bounds = [x_min, x_max.max(x_min + 1.0)];
        self.y_bounds = [y_min, y_max.max(y_min + 1.0)];
    }

    fn labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
        bounds.iter().map(|b| format!("{b:.1}").bold()).collect()
    }
}

impl WidgetRef for RewardPlot {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let dataset = Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Scatter)
            .cyan()
            .data(&self.data);

        let x_axis = Axis::default()
            .title("Episode")
            .dark_gray()
            .labels(Self::labels(self.x_bounds))
            .bounds(self.x_bounds);

        let y_axis = Axis::default()
            .title("Reward")
            .dark_gray()
            .labels(Self::labels(self.y_bounds))
            .bounds(self.y_bounds);

        Chart::new(vec![dataset])
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title(self.title.as_str())
                    .padding(Padding::uniform(1)),
            )
            .x_axis(x_axis)
            .y_axis(y_axis)
            .render(area, buf);
    }
}
