//! Sampling schedule for flux measurement.
//!
//! The solver loop only assembles outlet fluxes (and so only runs the
//! controller) on sampled timesteps. Between samples each outlet keeps its
//! last pressure.

use crate::error::{ControlError, ControlResult};

/// Which timesteps trigger a flux measurement and controller update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FluxSampling {
    /// Timesteps up to and including this one are never sampled.
    pub start_after: u64,
    /// Sample every `interval`-th timestep.
    pub interval: u64,
}

impl Default for FluxSampling {
    fn default() -> Self {
        Self {
            start_after: 2,
            interval: 1,
        }
    }
}

impl FluxSampling {
    /// Create a sampling schedule.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `interval` is zero.
    pub fn new(start_after: u64, interval: u64) -> ControlResult<Self> {
        let sampling = Self {
            start_after,
            interval,
        };
        sampling.validate()?;
        Ok(sampling)
    }

    /// Check a schedule built without [`new`](Self::new).
    pub fn validate(&self) -> ControlResult<()> {
        if self.interval == 0 {
            return Err(ControlError::configuration(
                "sample interval must be at least one timestep",
            ));
        }
        Ok(())
    }

    /// Check if the controller should run at `timestep`.
    pub fn should_sample(&self, timestep: u64) -> bool {
        self.interval > 0 && timestep > self.start_after && timestep % self.interval == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_samples_every_step_after_two() {
        let s = FluxSampling::default();
        assert!(!s.should_sample(0));
        assert!(!s.should_sample(2));
        assert!(s.should_sample(3));
        assert!(s.should_sample(4));
    }

    #[test]
    fn interval_sampling() {
        let s = FluxSampling::new(2, 5).unwrap();
        assert!(!s.should_sample(3));
        assert!(s.should_sample(5));
        assert!(!s.should_sample(6));
        assert!(s.should_sample(10));
    }

    #[test]
    fn max_warmup_never_samples() {
        let s = FluxSampling::new(u64::MAX, 1).unwrap();
        assert!(!s.should_sample(0));
        assert!(!s.should_sample(u64::MAX));
    }

    #[test]
    fn struct_literal_zero_interval_never_samples() {
        let s = FluxSampling {
            start_after: 0,
            interval: 0,
        };
        assert!(!s.should_sample(1));
        assert!(s.validate().is_err());
    }

    #[test]
    fn zero_interval_rejected() {
        assert!(FluxSampling::new(2, 0).is_err());
    }
}
