//! Flow-split diagnostics.

use std::fmt;

use af_controls::{ControlRegime, UpdateLaw};
use af_core::OutletId;

/// What happened to one outlet's pressure during a sampled timestep.
#[derive(Debug, Clone, PartialEq)]
pub enum OutletAction {
    /// The controller produced a new value with the given law.
    Updated(UpdateLaw),
    /// The measurement was unusable; the previous pressure was kept.
    Held(String),
}

/// Per-outlet line of a [`StepReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct OutletReport {
    pub id: OutletId,
    pub area_ratio: f64,
    /// `area_ratio * q_in`.
    pub ideal_flow: f64,
    /// Measured outflow magnitude, if the solver reported one.
    pub actual_flow: Option<f64>,
    pub previous_pressure: f64,
    pub pressure: f64,
    pub action: OutletAction,
}

impl OutletReport {
    /// Measured split minus target split.
    ///
    /// `None` when the outlet had no measurement or there was no inflow to
    /// split.
    pub fn split_error(&self, q_in: f64) -> Option<f64> {
        if !(q_in.is_finite() && q_in > 0.0) {
            return None;
        }
        self.actual_flow.map(|q| q / q_in - self.area_ratio)
    }
}

/// Summary of one sampled timestep across all outlets.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub timestep: u64,
    pub regime: ControlRegime,
    pub q_in: f64,
    pub outlets: Vec<OutletReport>,
}

impl StepReport {
    pub fn total_outflow(&self) -> f64 {
        self.outlets.iter().filter_map(|o| o.actual_flow).sum()
    }

    /// Largest absolute split error over outlets with a measurement.
    pub fn max_split_error(&self) -> f64 {
        self.outlets
            .iter()
            .filter_map(|o| o.split_error(self.q_in))
            .fold(0.0, |acc, e| acc.max(e.abs()))
    }

    pub fn held_count(&self) -> usize {
        self.outlets
            .iter()
            .filter(|o| matches!(o.action, OutletAction::Held(_)))
            .count()
    }

    pub fn outlet(&self, id: OutletId) -> Option<&OutletReport> {
        self.outlets.iter().find(|o| o.id == id)
    }
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "tstep {} ({}): Q_in = {:.6e}, sum Q_out = {:.6e}",
            self.timestep,
            self.regime.label(),
            self.q_in,
            self.total_outflow()
        )?;
        for o in &self.outlets {
            let actual = o
                .actual_flow
                .map(|q| format!("{q:.6e}"))
                .unwrap_or_else(|| "n/a".to_string());
            let action = match &o.action {
                OutletAction::Updated(law) => format!("{law:?}"),
                OutletAction::Held(reason) => format!("held ({reason})"),
            };
            writeln!(
                f,
                "  outlet {:>4} ratio {:.4}: ideal {:.6e} actual {} | p {:.6} -> {:.6} [{}]",
                o.id, o.area_ratio, o.ideal_flow, actual, o.previous_pressure, o.pressure, action
            )?;
        }
        Ok(())
    }
}
