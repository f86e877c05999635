//! Per-agent training histories and their windowed summaries
//!
//! Every agent owns one [`MetricsRecorder`]. After each episode it appends the
//! episode length, total and discounted return, loss, and a snapshot of the
//! whole value table's statistics. The histories are append-only and are the
//! only input to [`MetricsRecorder::summary`].

use serde::Serialize;

use crate::{ds::RingBuffer, episode::EpisodeTally};

/// Default number of trailing episodes a summary covers
pub const DEFAULT_WINDOW: usize = 100;
/// Number of most recent per-step TD errors kept for the summary
pub const TD_ERROR_WINDOW: usize = 1000;

/// Statistics over every entry of a value table
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TableStats {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub std: f64,
}

impl TableStats {
    /// Compute statistics over a set of values, all zero if empty
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        Self {
            mean: mean(values),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            std: std_dev(values),
        }
    }
}

/// Value-table statistics over time, one entry per episode
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValueHistory {
    pub mean: Vec<f64>,
    pub max: Vec<f64>,
    pub min: Vec<f64>,
    pub std: Vec<f64>,
}

impl ValueHistory {
    fn push(&mut self, stats: TableStats) {
        self.mean.push(stats.mean);
        self.max.push(stats.max);
        self.min.push(stats.min);
        self.std.push(stats.std);
    }

    fn last(&self) -> TableStats {
        TableStats {
            mean: self.mean.last().copied().unwrap_or_default(),
            max: self.max.last().copied().unwrap_or_default(),
            min: self.min.last().copied().unwrap_or_default(),
            std: self.std.last().copied().unwrap_or_default(),
        }
    }
}

/// Recent performance statistics of an agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub avg_return: f64,
    pub std_return: f64,
    pub avg_discounted_return: f64,
    pub avg_episode_length: f64,
    pub min_episode_length: f64,
    /// Mean absolute TD error over the most recent per-step errors
    pub avg_td_error: f64,
    pub training_loss: f64,
    pub final_loss: f64,
    pub q_value_mean: f64,
    pub q_value_max: f64,
    pub q_value_min: f64,
    pub q_value_std: f64,
    pub return_p25: f64,
    pub return_p50: f64,
    pub return_p75: f64,
}

/// Append-only record of an agent's training run
#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    episode_lengths: Vec<usize>,
    episode_returns: Vec<f64>,
    discounted_returns: Vec<f64>,
    losses: Vec<f64>,
    value_history: ValueHistory,
    td_errors: RingBuffer<f64>,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            episode_lengths: Vec::new(),
            episode_returns: Vec::new(),
            discounted_returns: Vec::new(),
            losses: Vec::new(),
            value_history: ValueHistory::default(),
            td_errors: RingBuffer::new(TD_ERROR_WINDOW),
        }
    }

    /// Record the absolute value of a per-step TD error
    pub fn record_td_error(&mut self, td_error: f64) {
        self.td_errors.push(td_error.abs());
    }

    /// Close out an episode
    pub fn record_episode(&mut self, tally: &EpisodeTally, table: TableStats) {
        self.episode_lengths.push(tally.length);
        self.episode_returns.push(tally.total_reward);
        self.discounted_returns.push(tally.discounted_return);
        self.losses.push(tally.loss());
        self.value_history.push(table);
    }

    /// Number of recorded episodes
    pub fn episodes(&self) -> usize {
        self.episode_returns.len()
    }

    pub fn episode_lengths(&self) -> &[usize] {
        &self.episode_lengths
    }

    pub fn episode_returns(&self) -> &[f64] {
        &self.episode_returns
    }

    pub fn discounted_returns(&self) -> &[f64] {
        &self.discounted_returns
    }

    pub fn losses(&self) -> &[f64] {
        &self.losses
    }

    pub fn value_history(&self) -> &ValueHistory {
        &self.value_history
    }

    /// Summarize the last `window` episodes, or all of them if fewer were run
    ///
    /// **Returns** `None` before the first episode has finished
    pub fn summary(&self, window: usize) -> Option<MetricsSummary> {
        if self.episode_returns.is_empty() {
            return None;
        }

        let returns = tail(&self.episode_returns, window);
        let discounted = tail(&self.discounted_returns, window);
        let losses = tail(&self.losses, window);
        let lengths: Vec<f64> = tail(&self.episode_lengths, window)
            .iter()
            .map(|&l| l as f64)
            .collect();
        let td_errors = self.td_errors.to_vec();
        let table = self.value_history.last();

        let mut sorted = returns.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(MetricsSummary {
            avg_return: mean(returns),
            std_return: std_dev(returns),
            avg_discounted_return: mean(discounted),
            avg_episode_length: mean(&lengths),
            min_episode_length: lengths.iter().copied().fold(f64::INFINITY, f64::min),
            avg_td_error: mean(&td_errors),
            training_loss: mean(losses),
            final_loss: self.losses.last().copied().unwrap_or_default(),
            q_value_mean: table.mean,
            q_value_max: table.max,
            q_value_min: table.min,
            q_value_std: table.std,
            return_p25: percentile(&sorted, 25.0),
            return_p50: percentile(&sorted, 50.0),
            return_p75: percentile(&sorted, 75.0),
        })
    }
}

fn tail<T>(values: &[T], n: usize) -> &[T] {
    &values[values.len().saturating_sub(n)..]
}

/// Arithmetic mean, `0` for an empty slice
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Population standard deviation, `0` for an empty slice
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Percentile `p` (0-100) of ascending `sorted` values, linearly interpolated between ranks
pub(crate) fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (n - 1) as f64 * p / 100.0;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
        }
    }
}
