//! Flow-solver abstraction and coupled run driver.

use std::collections::BTreeMap;

use af_core::OutletId;
use tracing::info;

use crate::bank::OutletBank;
use crate::coupling::DualPressureCoupling;
use crate::error::{SimError, SimResult};
use crate::provider::FluxProvider;
use crate::report::StepReport;

/// A flow solver that can be driven one timestep at a time.
///
/// After [`advance`](FlowModel::advance) returns, the [`FluxProvider`]
/// methods must report the fluxes of the step just solved.
pub trait FlowModel: FluxProvider {
    /// Solve timestep `timestep` with the given outlet pressure boundary values.
    fn advance(&mut self, timestep: u64, pressures: &BTreeMap<OutletId, f64>) -> SimResult<()>;
}

/// Record of a coupled run.
#[derive(Debug, Clone, Default)]
pub struct CoupledRecord {
    /// One report per sampled timestep.
    pub reports: Vec<StepReport>,
    /// Outlet pressures after the last step.
    pub final_pressures: BTreeMap<OutletId, f64>,
    /// Number of timesteps solved.
    pub steps: u64,
}

impl CoupledRecord {
    pub fn last(&self) -> Option<&StepReport> {
        self.reports.last()
    }

    /// `(timestep, max split error)` for every sampled step.
    pub fn split_error_history(&self) -> Vec<(u64, f64)> {
        self.reports
            .iter()
            .map(|r| (r.timestep, r.max_split_error()))
            .collect()
    }
}

/// Run `steps` timesteps (numbered from 1) of `model`, updating the outlet
/// pressures in `bank` after each solve.
pub fn run_coupled<M: FlowModel + ?Sized>(
    model: &mut M,
    bank: &mut OutletBank,
    coupling: &DualPressureCoupling,
    steps: u64,
) -> SimResult<CoupledRecord> {
    if bank.is_empty() {
        return Err(SimError::InvalidArg {
            what: "outlet bank is empty",
        });
    }

    let mut reports = Vec::new();
    for timestep in 1..=steps {
        model.advance(timestep, &bank.pressures())?;
        if let Some(report) = coupling.step(bank, timestep, &*model)?.into_report() {
            reports.push(report);
        }
    }

    let record = CoupledRecord {
        reports,
        final_pressures: bank.pressures(),
        steps,
    };
    if let Some(last) = record.last() {
        info!(
            steps,
            max_split_error = last.max_split_error(),
            "coupled run finished"
        );
    }
    Ok(record)
}
