use crate::error::{Error, Result};

/// An implementation of a time-decaying value
pub trait Decay {
    /// Calculate value at time `t`
    fn evaluate(&self, t: f64) -> f64;
}

impl<D: Decay + ?Sized> Decay for Box<D> {
    fn evaluate(&self, t: f64) -> f64 {
        (**self).evaluate(t)
    }
}

fn validate(rate: f64, step: f64) -> Result<()> {
    if !rate.is_finite() {
        return Err(Error::InvalidSchedule {
            message: format!("decay rate must be finite, got {rate}"),
        });
    }
    if !(step > 0.0) {
        return Err(Error::InvalidSchedule {
            message: format!("step length must be positive, got {step}"),
        });
    }
    Ok(())
}

/// A constant value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constant {
    value: f64,
}

impl Constant {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Decay for Constant {
    fn evaluate(&self, _t: f64) -> f64 {
        self.value
    }
}

/// v(t) = max(v<sub>i</sub> * r<sup>floor(t/s)</sup>, v<sub>f</sub>)
///
/// With `s = 1` this is a per-episode multiplicative decay clamped at a floor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    rate: f64,
    vi: f64,
    vf: f64,
    step: f64,
}

impl Step {
    pub fn new(rate: f64, vi: f64, vf: f64, step: f64) -> Result<Self> {
        validate(rate, step)?;
        Ok(Self { rate, vi, vf, step })
    }
}

impl Decay for Step {
    fn evaluate(&self, t: f64) -> f64 {
        let &Self { rate, vi, vf, step } = self;
        (vi * rate.powf((t / step).floor())).max(vf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_functional() {
        assert!(validate(0.5, 1.0).is_ok());
        assert!(validate(1.0, 1.0).is_ok());
        assert!(validate(0.0, 1.0).is_ok());
        assert!(validate(1.5, 1.0).is_ok());
        assert!(validate(f64::NAN, 1.0).is_err());
        assert!(validate(f64::INFINITY, 1.0).is_err());
        assert!(validate(0.5, 0.0).is_err());
    }

    #[test]
    fn zero_rate_drops_to_floor_after_first_step() {
        let x = Step::new(0.0, 0.3, 0.05, 1.0).unwrap();
        assert_eq!(x.evaluate(0.0), 0.3);
        assert_eq!(x.evaluate(1.0), 0.05);
        assert_eq!(x.evaluate(7.0), 0.05);
    }

    #[test]
    fn constant_decay() {
        let x = Constant::new(1.0);
        assert_eq!(x.evaluate(0.0), 1.0);
        assert_eq!(x.evaluate(1.0), 1.0);
    }

    #[test]
    fn step_decay() {
        let x = Step::new(0.5, 2.0, 0.0, 0.5).unwrap();
        assert_eq!(x.evaluate(0.25), 2.0);
        assert_eq!(x.evaluate(0.75), 1.0);
        assert_eq!(x.evaluate(1.0), 0.5);
    }

    #[test]
    fn step_decay_respects_floor() {
        let x = Step::new(0.5, 0.4, 0.1, 1.0).unwrap();
        assert_eq!(x.evaluate(0.0), 0.4);
        assert_eq!(x.evaluate(1.0), 0.2);
        assert_eq!(x.evaluate(5.0), 0.1);

        // A floor above the initial value pins the schedule to the floor
        let pinned = Step::new(0.9, 0.2, 0.3, 1.0).unwrap();
        assert_eq!(pinned.evaluate(0.0), 0.3);
    }

    #[test]
    fn boxed_decay_delegates() {
        let x: Box<dyn Decay> = Box::new(Constant::new(0.25));
        assert_eq!(x.evaluate(10.0), 0.25);
    }
}
