//! Turns a validated case file into runtime controller objects.

use af_controls::{DualPressureController, FluxSampling};
use af_core::{OutletId, mm2};
use af_project::{CaseDef, MeasurementPolicyDef};
use af_sim::{
    CouplingOptions, DualPressureCoupling, InflowWaveform, MeasurementPolicy, OutletBank,
    OutletSpec, ResistiveNetwork,
};

use crate::CliResult;
use crate::error::CliError;

pub fn outlet_bank(case: &CaseDef) -> CliResult<OutletBank> {
    let specs: Vec<OutletSpec> = case
        .outlets
        .iter()
        .map(|o| OutletSpec::new(o.id, o.area_ratio))
        .collect();
    let reference = case.control.reference_pressure;

    let areas: Option<Vec<(OutletId, af_core::Area)>> = case
        .outlets
        .iter()
        .map(|o| o.area_mm2.map(|a| (o.id, mm2(a))))
        .collect();

    let tolerance = case.control.ratio_sum_tolerance;
    let bank = match areas {
        Some(areas) => OutletBank::with_outlet_areas(&specs, &areas, reference, tolerance)?,
        None => OutletBank::with_tolerance(&specs, reference, tolerance)?,
    };
    Ok(bank)
}

pub fn coupling(case: &CaseDef) -> CliResult<DualPressureCoupling> {
    let c = &case.control;
    let controller = DualPressureController::new(c.relaxation_gain, c.transient_steps)?;
    let options = CouplingOptions {
        sampling: FluxSampling::new(c.start_after, c.sample_interval)?,
        report_every: c.report_every,
        on_measurement_error: match c.on_measurement_error {
            MeasurementPolicyDef::Hold => MeasurementPolicy::Hold,
            MeasurementPolicyDef::Abort => MeasurementPolicy::Abort,
        },
    };
    Ok(DualPressureCoupling::new(controller, options)?)
}

pub fn synthetic_network(case: &CaseDef) -> CliResult<ResistiveNetwork> {
    let net = case.synthetic.as_ref().ok_or_else(|| {
        CliError::Usage("case has no `synthetic` network to run against".to_string())
    })?;
    let inflow = InflowWaveform::pulsatile(net.mean_flow, net.amplitude, case.flow.period_ms);
    let resistances = net.resistances.iter().map(|r| (r.id, r.resistance));
    Ok(ResistiveNetwork::new(resistances, inflow, case.flow.dt_ms)?)
}
