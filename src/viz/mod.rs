//! Terminal dashboard for monitoring training jobs
//!
//! ```no_run
//! use std::time::Duration;
//! use maze_rl::{job::{JobManager, TrainConfig}, viz};
//!
//! let manager = JobManager::new();
//! let id = manager.create_job(TrainConfig::default());
//! let handle = viz::init(manager.clone(), vec![id]);
//! let _ = handle.join();
//! ```

use std::{
    io,
    thread::{self, JoinHandle},
};

use log::{warn, LevelFilter};

use crate::job::{JobId, JobManager};

pub use self::app::App;

mod app;
mod components;
mod tui;
mod util;

/// Install the dashboard as the log sink and run it on its own thread
///
/// The dashboard polls `manager` for the given jobs until the user quits.
pub fn init(manager: JobManager, jobs: Vec<JobId>) -> JoinHandle<io::Result<()>> {
    match tui_logger::init_logger(LevelFilter::Trace) {
        Ok(()) => tui_logger::set_default_level(LevelFilter::Trace),
        Err(e) => warn!("dashboard logs unavailable: {e}"),
    }

    thread::spawn(move || App::new(manager, jobs).run())
}
