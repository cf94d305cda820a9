//! Closed-loop convergence of the outlet controller on a resistive network.

use af_controls::{ControlRegime, UpdateLaw};
use af_sim::{
    DualPressureCoupling, InflowWaveform, OutletAction, OutletBank, OutletSpec, ResistiveNetwork,
    run_coupled,
};

fn three_outlet_case(inflow: InflowWaveform, dt: f64) -> (ResistiveNetwork, OutletBank) {
    let network = ResistiveNetwork::new(
        [(2.into(), 1.0), (3.into(), 1.5), (4.into(), 3.0)],
        inflow,
        dt,
    )
    .unwrap();
    let bank = OutletBank::new(
        &[
            OutletSpec::new(2, 0.5),
            OutletSpec::new(3, 0.3),
            OutletSpec::new(4, 0.2),
        ],
        1.0,
    )
    .unwrap();
    (network, bank)
}

#[test]
fn steady_inflow_split_converges_to_area_ratios() {
    let (mut network, mut bank) = three_outlet_case(InflowWaveform::steady(1.0), 0.1);
    let coupling = DualPressureCoupling::default();

    let record = run_coupled(&mut network, &mut bank, &coupling, 1000).unwrap();

    let first = record.reports.first().unwrap();
    assert_eq!(first.timestep, 3, "sampling starts after the warm-up steps");
    assert!(first.max_split_error() > 0.1, "passive split is far off target");

    let last = record.last().unwrap();
    assert_eq!(last.timestep, 1000);
    assert!(
        last.max_split_error() < 1e-6,
        "split error after 1000 steps: {}",
        last.max_split_error()
    );
    for outlet in &last.outlets {
        assert_eq!(outlet.action, OutletAction::Updated(UpdateLaw::DualPressure));
        let split = outlet.actual_flow.unwrap() / last.q_in;
        assert!((split - outlet.area_ratio).abs() < 1e-6);
    }
    assert_eq!(record.final_pressures, bank.pressures());
}

#[test]
fn linear_relaxation_does_most_of_the_work_before_switch() {
    let (mut network, mut bank) = three_outlet_case(InflowWaveform::steady(1.0), 0.1);
    let coupling = DualPressureCoupling::default();

    let record = run_coupled(&mut network, &mut bank, &coupling, 99).unwrap();
    let last = record.last().unwrap();
    assert_eq!(last.regime, ControlRegime::EarlyTransient);
    assert!(
        last.outlets
            .iter()
            .all(|o| o.action == OutletAction::Updated(UpdateLaw::Linear))
    );
    assert!(last.max_split_error() < 0.01);
}

#[test]
fn pulsatile_inflow_stays_close_to_target() {
    let (mut network, mut bank) =
        three_outlet_case(InflowWaveform::pulsatile(1.0, 0.3, 100.0), 1.0);
    let coupling = DualPressureCoupling::default();

    let record = run_coupled(&mut network, &mut bank, &coupling, 2000).unwrap();
    let worst_late = record
        .split_error_history()
        .into_iter()
        .filter(|(t, _)| *t > 1000)
        .map(|(_, e)| e)
        .fold(0.0, f64::max);
    assert!(worst_late < 0.01, "late split error {worst_late}");
}

#[test]
fn every_outlet_reported_each_sample() {
    let (mut network, mut bank) = three_outlet_case(InflowWaveform::steady(2.0), 0.1);
    let coupling = DualPressureCoupling::default();

    let record = run_coupled(&mut network, &mut bank, &coupling, 20).unwrap();
    assert_eq!(record.reports.len(), 18);
    for report in &record.reports {
        let ids: Vec<u32> = report.outlets.iter().map(|o| o.id.get()).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert!((report.total_outflow() - report.q_in).abs() < 1e-9);
    }
}
