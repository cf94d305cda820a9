//! Lumped resistive outlet network.
//!
//! A zero-dimensional stand-in for the Navier-Stokes solver: a common inlet
//! node feeds every outlet through a linear resistance,
//! `q_i = (P_in - p_i) / R_i`, and `P_in` adjusts so that the outlet flows add
//! up to the prescribed inflow. Good enough to exercise the controller's
//! closed-loop behaviour without a mesh.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use af_core::OutletId;

use crate::error::{SimError, SimResult};
use crate::model::FlowModel;
use crate::provider::FluxProvider;

/// Prescribed total inflow over time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InflowWaveform {
    /// Cycle-averaged inflow.
    pub mean: f64,
    /// Relative pulsatile amplitude in `[0, 1)`.
    pub amplitude: f64,
    /// Cycle length in the same time unit as the timestep.
    pub period: f64,
}

impl InflowWaveform {
    pub fn steady(mean: f64) -> Self {
        Self {
            mean,
            amplitude: 0.0,
            period: 1.0,
        }
    }

    pub fn pulsatile(mean: f64, amplitude: f64, period: f64) -> Self {
        Self {
            mean,
            amplitude,
            period,
        }
    }

    pub fn at(&self, t: f64) -> f64 {
        self.mean * (1.0 + self.amplitude * (2.0 * PI * t / self.period).sin())
    }

    fn validate(&self) -> SimResult<()> {
        if !(self.mean.is_finite() && self.mean > 0.0) {
            return Err(SimError::InvalidArg {
                what: "mean inflow must be positive",
            });
        }
        if !(0.0..1.0).contains(&self.amplitude) {
            return Err(SimError::InvalidArg {
                what: "inflow amplitude must be in [0, 1)",
            });
        }
        if !(self.period.is_finite() && self.period > 0.0) {
            return Err(SimError::InvalidArg {
                what: "inflow period must be positive",
            });
        }
        Ok(())
    }
}

/// Synthetic flow model with one resistance per outlet.
#[derive(Debug, Clone)]
pub struct ResistiveNetwork {
    resistances: BTreeMap<OutletId, f64>,
    inflow: InflowWaveform,
    dt: f64,
    q_in: f64,
    inlet_pressure: f64,
    outflows: BTreeMap<OutletId, f64>,
}

impl ResistiveNetwork {
    pub fn new(
        resistances: impl IntoIterator<Item = (OutletId, f64)>,
        inflow: InflowWaveform,
        dt: f64,
    ) -> SimResult<Self> {
        let resistances: BTreeMap<OutletId, f64> = resistances.into_iter().collect();
        if resistances.is_empty() {
            return Err(SimError::InvalidArg {
                what: "network needs at least one outlet",
            });
        }
        if resistances.values().any(|r| !(r.is_finite() && *r > 0.0)) {
            return Err(SimError::InvalidArg {
                what: "outlet resistances must be positive",
            });
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        inflow.validate()?;
        Ok(Self {
            resistances,
            inflow,
            dt,
            q_in: 0.0,
            inlet_pressure: 0.0,
            outflows: BTreeMap::new(),
        })
    }

    /// Inlet node pressure of the last solve.
    pub fn inlet_pressure(&self) -> f64 {
        self.inlet_pressure
    }

    /// Split each outlet would carry with equal outlet pressures.
    pub fn passive_split(&self) -> BTreeMap<OutletId, f64> {
        let total: f64 = self.resistances.values().map(|r| 1.0 / r).sum();
        self.resistances
            .iter()
            .map(|(id, r)| (*id, (1.0 / r) / total))
            .collect()
    }
}

impl FluxProvider for ResistiveNetwork {
    /// Inlet flux with an outward normal, hence negative.
    fn inflow(&self) -> f64 {
        -self.q_in
    }

    fn outflow(&self, outlet: OutletId) -> Option<f64> {
        self.outflows.get(&outlet).copied()
    }
}

impl FlowModel for ResistiveNetwork {
    fn advance(&mut self, timestep: u64, pressures: &BTreeMap<OutletId, f64>) -> SimResult<()> {
        let q_in = self.inflow.at(timestep as f64 * self.dt);

        let mut conductance = 0.0;
        let mut weighted = 0.0;
        for (id, r) in &self.resistances {
            let p = pressures.get(id).copied().ok_or(SimError::NonPhysical {
                what: "missing outlet pressure",
            })?;
            conductance += 1.0 / r;
            weighted += p / r;
        }
        let inlet_pressure = (q_in + weighted) / conductance;
        if !inlet_pressure.is_finite() {
            return Err(SimError::NonPhysical {
                what: "non-finite inlet pressure",
            });
        }

        self.outflows = self
            .resistances
            .iter()
            .map(|(id, r)| (*id, (inlet_pressure - pressures[id]) / r))
            .collect();
        self.q_in = q_in;
        self.inlet_pressure = inlet_pressure;
        Ok(())
    }
}
