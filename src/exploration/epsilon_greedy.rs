use rand::Rng;

use crate::decay::Decay;

use super::Choice;

/// Epsilon greedy exploration policy with time-decaying epsilon threshold
///
/// Training drivers evaluate the schedule once per episode and hand the
/// resulting rate to the agent.
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    pub fn new(decay: D) -> Self {
        Self { epsilon: decay }
    }

    /// Exploration rate for the given episode index
    pub fn epsilon(&self, episode: u32) -> f64 {
        self.epsilon.evaluate(episode as f64)
    }
}

/// Invoke the epsilon greedy policy at a fixed exploration rate
///
/// A rate of `0` always exploits and a rate of `1` always explores.
pub fn choose<R: Rng + ?Sized>(epsilon: f64, rng: &mut R) -> Choice {
    if rng.gen::<f64>() < epsilon {
        Choice::Explore
    } else {
        Choice::Exploit
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::decay::{Constant, Step};

    #[test]
    fn extreme_rates_are_deterministic() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert_eq!(choose(0.0, &mut rng), Choice::Exploit);
            assert_eq!(choose(1.0, &mut rng), Choice::Explore);
        }
    }

    #[test]
    fn schedule_is_evaluated_per_episode() {
        let constant = EpsilonGreedy::new(Constant::new(0.15));
        assert_eq!(constant.epsilon(0), 0.15);
        assert_eq!(constant.epsilon(999), 0.15);

        let decaying = EpsilonGreedy::new(Step::new(0.5, 0.8, 0.05, 1.0).unwrap());
        assert_eq!(decaying.epsilon(0), 0.8);
        assert_eq!(decaying.epsilon(2), 0.2);
        assert_eq!(decaying.epsilon(100), 0.05);
    }
}
