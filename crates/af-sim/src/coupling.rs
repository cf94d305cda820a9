//! Per-timestep coupling of the outlet controller to the solver loop.
//!
//! On each sampled timestep the inflow is read once and shared by every
//! outlet, each outlet is updated independently, and the new pressures are
//! committed together. A step either updates the whole bank or fails without
//! touching it.

use af_controls::{ControlError, DualPressureController, FlowMeasurement, FluxSampling};
use tracing::{debug, info, warn};

use crate::bank::OutletBank;
use crate::error::{SimError, SimResult};
use crate::provider::FluxProvider;
use crate::report::{OutletAction, OutletReport, StepReport};

/// What to do when a timestep's measurement is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasurementPolicy {
    /// Keep the outlet's previous pressure, log a warning, and continue.
    #[default]
    Hold,
    /// Return the error to the solver loop.
    Abort,
}

/// Options for [`DualPressureCoupling`].
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingOptions {
    /// Timesteps on which fluxes are measured.
    pub sampling: FluxSampling,
    /// Log a flow-split summary every N timesteps (0 disables it).
    pub report_every: u64,
    pub on_measurement_error: MeasurementPolicy,
}

impl Default for CouplingOptions {
    fn default() -> Self {
        Self {
            sampling: FluxSampling::default(),
            report_every: 10,
            on_measurement_error: MeasurementPolicy::default(),
        }
    }
}

/// Result of [`DualPressureCoupling::step`].
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Not a sampled timestep; pressures unchanged.
    Skipped,
    Sampled(StepReport),
}

impl StepOutcome {
    pub fn report(&self) -> Option<&StepReport> {
        match self {
            Self::Skipped => None,
            Self::Sampled(report) => Some(report),
        }
    }

    pub fn into_report(self) -> Option<StepReport> {
        match self {
            Self::Skipped => None,
            Self::Sampled(report) => Some(report),
        }
    }
}

/// Controller plus the schedule and error policy used by the solver loop.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DualPressureCoupling {
    controller: DualPressureController,
    options: CouplingOptions,
}

impl DualPressureCoupling {
    /// # Errors
    ///
    /// Returns `InvalidSetup` if the controller or the sampling schedule is
    /// out of range, however it was constructed.
    pub fn new(controller: DualPressureController, options: CouplingOptions) -> SimResult<Self> {
        controller.validate().map_err(SimError::setup)?;
        options.sampling.validate().map_err(SimError::setup)?;
        Ok(Self {
            controller,
            options,
        })
    }

    pub fn controller(&self) -> &DualPressureController {
        &self.controller
    }

    pub fn options(&self) -> &CouplingOptions {
        &self.options
    }

    /// Run the controller for every outlet at `timestep`.
    ///
    /// # Errors
    ///
    /// Configuration errors always propagate. Measurement errors propagate
    /// only under [`MeasurementPolicy::Abort`]. In both cases `bank` is left
    /// unchanged.
    pub fn step<P: FluxProvider + ?Sized>(
        &self,
        bank: &mut OutletBank,
        timestep: u64,
        fluxes: &P,
    ) -> SimResult<StepOutcome> {
        if !self.options.sampling.should_sample(timestep) {
            return Ok(StepOutcome::Skipped);
        }

        let inflow = fluxes.inflow();
        let q_in = inflow.abs();
        let mut outlets = Vec::with_capacity(bank.len());

        for state in bank.outlets() {
            let outflow = fluxes.outflow(state.id);
            let result = match outflow {
                Some(q) => self.controller.update(
                    state,
                    &FlowMeasurement::from_fluxes(inflow, q),
                    timestep,
                ),
                None => Err(ControlError::Measurement {
                    what: format!("no flux reported for outlet {}", state.id),
                }),
            };

            let (pressure, action) = match result {
                Ok(update) => (update.pressure, OutletAction::Updated(update.law)),
                Err(e)
                    if e.is_transient()
                        && self.options.on_measurement_error == MeasurementPolicy::Hold =>
                {
                    warn!(timestep, outlet = %state.id, error = %e, "holding outlet pressure");
                    (state.pressure, OutletAction::Held(e.to_string()))
                }
                Err(e) => {
                    return Err(SimError::Control {
                        outlet: state.id,
                        source: e,
                    });
                }
            };

            outlets.push(OutletReport {
                id: state.id,
                area_ratio: state.area_ratio,
                ideal_flow: state.ideal_flow(q_in),
                actual_flow: outflow.map(f64::abs),
                previous_pressure: state.pressure,
                pressure,
                action,
            });
        }

        for outlet in &outlets {
            if let Some(state) = bank.get_mut(outlet.id) {
                state.pressure = outlet.pressure;
            }
            debug!(
                timestep,
                outlet = %outlet.id,
                p_old = outlet.previous_pressure,
                p_new = outlet.pressure,
                "outlet pressure"
            );
        }

        let report = StepReport {
            timestep,
            regime: self.controller.regime(timestep),
            q_in,
            outlets,
        };

        if self.options.report_every > 0 && timestep % self.options.report_every == 0 {
            log_summary(&report);
        }

        Ok(StepOutcome::Sampled(report))
    }
}

fn log_summary(report: &StepReport) {
    info!(
        timestep = report.timestep,
        regime = report.regime.label(),
        q_in = report.q_in,
        q_out = report.total_outflow(),
        "flow split"
    );
    for o in &report.outlets {
        info!(
            outlet = %o.id,
            area_ratio = o.area_ratio,
            ideal = o.ideal_flow,
            actual = ?o.actual_flow,
            p_old = o.previous_pressure,
            p_new = o.pressure,
            "outlet split"
        );
    }
}
