use std::time::Duration;

use maze_rl::{
    job::{JobManager, TrainConfig},
    viz,
};

const NUM_EPISODES: usize = 3000;

fn main() {
    let manager = JobManager::new();
    let config = TrainConfig {
        algorithm: "q_learning".into(),
        episodes: NUM_EPISODES,
        seed: Some(7),
        ..Default::default()
    };

    let id = manager.create_job(config);
    let handle = viz::init(manager.clone(), vec![id]);
    let _ = handle.join();

    let Ok(job) = manager.wait_for(id, Duration::from_secs(600)) else {
        return;
    };
    if let Some(metrics) = manager.metrics(id).ok().and_then(|m| m.detailed_metrics) {
        println!("{}", serde_json::to_string_pretty(&metrics).unwrap());
    }
    println!("job {id} {:?}, success rate {:?}", job.status, job.success_rate);
}
