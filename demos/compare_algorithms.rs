use std::time::Duration;

use maze_rl::{
    job::{JobManager, TrainConfig},
    viz,
};

fn main() {
    let manager = JobManager::new();
    let config = TrainConfig {
        episodes: 2000,
        seed: Some(42),
        ..Default::default()
    };

    let comparison = manager.compare(&config);
    let handle = viz::init(manager.clone(), comparison.job_ids.values().copied().collect());
    let _ = handle.join();

    println!("{:<12} {:>8} {:>10} {:>10} {:>12}", "algorithm", "status", "success", "avg", "episodes/s");
    for (algorithm, id) in &comparison.job_ids {
        let Ok(job) = manager.wait_for(*id, Duration::from_secs(600)) else {
            continue;
        };
        let throughput = job
            .detailed_metrics
            .as_ref()
            .map_or(0.0, |m| m.episodes_per_sec);
        println!(
            "{:<12} {:>8} {:>9.1}% {:>10.2} {:>12.1}",
            algorithm.to_string(),
            format!("{:?}", job.status),
            job.success_rate.unwrap_or_default() * 100.0,
            job.avg_reward.unwrap_or_default(),
            throughput
        );
    }
}
