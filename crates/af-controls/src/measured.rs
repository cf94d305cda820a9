//! Flux measurements supplied by the solver loop.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// Inflow and outflow magnitudes for one outlet at one timestep.
///
/// `q_in` is the same value for every outlet updated within a timestep. In a
/// distributed run both values must already be globally reduced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowMeasurement {
    /// Total inflow rate magnitude.
    pub q_in: f64,
    /// Outflow rate magnitude at this outlet.
    pub q_out: f64,
}

impl FlowMeasurement {
    pub fn new(q_in: f64, q_out: f64) -> Self {
        Self { q_in, q_out }
    }

    /// Build from signed surface-integral fluxes (`u · n` over the patch).
    ///
    /// The inlet flux is negative with an outward normal, so both values are
    /// taken as magnitudes.
    pub fn from_fluxes(inflow_flux: f64, outflow_flux: f64) -> Self {
        Self {
            q_in: inflow_flux.abs(),
            q_out: outflow_flux.abs(),
        }
    }

    /// Check the measurement is usable by the update law.
    pub fn validate(&self) -> ControlResult<()> {
        if !self.q_in.is_finite() || !self.q_out.is_finite() {
            return Err(ControlError::measurement(format!(
                "non-finite flux (q_in={}, q_out={})",
                self.q_in, self.q_out
            )));
        }
        if self.q_in <= 0.0 {
            return Err(ControlError::measurement(format!(
                "inflow must be positive (q_in={})",
                self.q_in
            )));
        }
        if self.q_out < 0.0 {
            return Err(ControlError::measurement(format!(
                "outflow must be non-negative (q_out={})",
                self.q_out
            )));
        }
        Ok(())
    }

    /// Measured flow split `q_out / q_in`.
    pub fn actual_ratio(&self) -> f64 {
        self.q_out / self.q_in
    }
}
