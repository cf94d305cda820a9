//! Flux measurement contract with the external flow solver.

use std::collections::BTreeMap;

use af_core::OutletId;

/// Source of boundary fluxes for the current timestep.
///
/// Values are signed surface integrals of `u · n`; the coupling takes their
/// magnitudes. Under distributed execution the provider must return globally
/// reduced sums, identical on every rank.
pub trait FluxProvider {
    /// Flux through the inlet patch.
    fn inflow(&self) -> f64;

    /// Flux through an outlet patch, or `None` if the outlet is unknown.
    fn outflow(&self, outlet: OutletId) -> Option<f64>;
}

/// Fluxes assembled by the caller and handed over as plain values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasuredFluxes {
    pub inflow: f64,
    pub outflows: BTreeMap<OutletId, f64>,
}

impl MeasuredFluxes {
    pub fn new(inflow: f64) -> Self {
        Self {
            inflow,
            outflows: BTreeMap::new(),
        }
    }

    pub fn with_outflow(mut self, outlet: impl Into<OutletId>, flux: f64) -> Self {
        self.outflows.insert(outlet.into(), flux);
        self
    }

    /// Sum of outlet flux magnitudes.
    pub fn total_outflow(&self) -> f64 {
        self.outflows.values().map(|q| q.abs()).sum()
    }
}

impl FluxProvider for MeasuredFluxes {
    fn inflow(&self) -> f64 {
        self.inflow
    }

    fn outflow(&self, outlet: OutletId) -> Option<f64> {
        self.outflows.get(&outlet).copied()
    }
}
