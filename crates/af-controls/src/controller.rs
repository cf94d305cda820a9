//! Dual-pressure outlet controller.
//!
//! Every sampled timestep the solver loop measures the total inflow and the
//! flow through each outlet. The controller compares the measured split with
//! the outlet's area ratio and rescales the outlet pressure:
//!
//! - **Early transient** (`timestep < transient_steps`): proportional
//!   relaxation `p * (1 - delta * h)`
//! - **Steady state**: `p * beta(R_err, p) * M_err ^ E` (Gin & Steinman,
//!   "A Dual-Pressure Boundary Condition for use in Simulations of
//!   Bifurcating Conduits")
//!
//! Both regimes hold the pressure unchanged when it is already high and the
//! outlet is over-delivering, which keeps start-up overshoot in check.

use af_core::ensure_finite;
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};
use crate::measured::FlowMeasurement;
use crate::outlet::{OutletState, validate_area_ratio};
use crate::regime::{ControlRegime, DEFAULT_TRANSIENT_STEPS, ErrorBand, PressureSign, beta_for};

/// Controller configuration shared by all outlets of a case.
#[derive(Debug, Clone, PartialEq)]
pub struct DualPressureController {
    /// Gain `h` of the early-transient linear relaxation.
    pub relaxation_gain: f64,
    /// Timestep at which the dual-pressure law takes over.
    pub transient_steps: u64,
    /// Early-transient hold threshold on the old pressure.
    pub early_hold_above: f64,
    /// Steady-state hold threshold on the old pressure.
    pub steady_hold_above: f64,
}

impl Default for DualPressureController {
    fn default() -> Self {
        Self {
            relaxation_gain: 0.1,
            transient_steps: DEFAULT_TRANSIENT_STEPS,
            early_hold_above: 1.0,
            steady_hold_above: 2.0,
        }
    }
}

impl DualPressureController {
    /// Create a controller with default hold thresholds.
    ///
    /// # Arguments
    ///
    /// * `relaxation_gain` - Linear relaxation gain, in `(0, 1]`
    /// * `transient_steps` - Length of the early-transient regime in timesteps
    pub fn new(relaxation_gain: f64, transient_steps: u64) -> ControlResult<Self> {
        let controller = Self {
            relaxation_gain,
            transient_steps,
            ..Self::default()
        };
        controller.validate()?;
        Ok(controller)
    }

    /// Override the anti-overshoot hold thresholds.
    pub fn with_hold_thresholds(mut self, early: f64, steady: f64) -> ControlResult<Self> {
        self.early_hold_above = early;
        self.steady_hold_above = steady;
        self.validate()?;
        Ok(self)
    }

    /// Check a configuration that may have been assembled field by field.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the gain is outside `(0, 1]` or a
    /// hold threshold is not positive and finite.
    pub fn validate(&self) -> ControlResult<()> {
        let gain = self.relaxation_gain;
        if !(gain > 0.0 && gain <= 1.0) {
            return Err(ControlError::configuration(format!(
                "relaxation gain must be in (0, 1] (got {gain})"
            )));
        }
        let (early, steady) = (self.early_hold_above, self.steady_hold_above);
        if !(early.is_finite() && steady.is_finite()) || early <= 0.0 || steady <= 0.0 {
            return Err(ControlError::configuration(
                "hold thresholds must be positive and finite",
            ));
        }
        Ok(())
    }

    /// Regime in force at `timestep`.
    pub fn regime(&self, timestep: u64) -> ControlRegime {
        ControlRegime::at(timestep, self.transient_steps)
    }

    /// Compute the new pressure for one outlet.
    ///
    /// Does not modify `state`; see [`apply`](Self::apply).
    ///
    /// # Errors
    ///
    /// - `Configuration` if the outlet's area ratio is outside `(0, 1]`
    /// - `Measurement` if `q_in <= 0`, `q_out < 0` or a flux is not finite
    /// - `NonFinite` if the law overflows (e.g. zero outflow at negative pressure)
    pub fn update(
        &self,
        state: &OutletState,
        measurement: &FlowMeasurement,
        timestep: u64,
    ) -> ControlResult<PressureUpdate> {
        validate_area_ratio(state.area_ratio).map_err(|what| {
            ControlError::configuration(format!(
                "outlet {}: {what} (got {})",
                state.id, state.area_ratio
            ))
        })?;
        measurement.validate()?;

        let previous = state.pressure;
        let split = SplitError::compute(state.area_ratio, measurement, previous);
        let regime = self.regime(timestep);

        let (pressure, law) = match regime {
            ControlRegime::EarlyTransient => {
                if previous > self.early_hold_above && split.delta < 0.0 {
                    (previous, UpdateLaw::Held)
                } else {
                    let p = previous * (1.0 - split.delta * self.relaxation_gain);
                    (p, UpdateLaw::Linear)
                }
            }
            ControlRegime::SteadyState => {
                if previous > self.steady_hold_above && split.delta < 0.0 {
                    (previous, UpdateLaw::Held)
                } else {
                    let gain = beta_for(split.sign, split.band, split.r_err);
                    let p = previous * gain * split.m_err.powf(split.exponent);
                    (p, UpdateLaw::DualPressure)
                }
            }
        };

        let pressure = ensure_finite(pressure, "outlet pressure")?;

        Ok(PressureUpdate {
            previous,
            pressure,
            regime,
            law,
            split,
        })
    }

    /// Compute the new pressure and store it in `state`.
    ///
    /// On error `state` is left untouched.
    pub fn apply(
        &self,
        state: &mut OutletState,
        measurement: &FlowMeasurement,
        timestep: u64,
    ) -> ControlResult<PressureUpdate> {
        let update = self.update(state, measurement, timestep)?;
        state.pressure = update.pressure;
        Ok(update)
    }
}

/// Which branch of the update law produced the new pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateLaw {
    /// Anti-overshoot hold: pressure unchanged.
    Held,
    /// Early-transient proportional relaxation.
    Linear,
    /// Steady-state dual-pressure law.
    DualPressure,
}

/// Split mismatch quantities for one outlet at one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitError {
    /// Target split (the area ratio).
    pub r_optimal: f64,
    /// Measured split `q_out / q_in`.
    pub r_actual: f64,
    /// `|R_optimal - R_actual|`.
    pub r_err: f64,
    /// `|R_optimal / R_actual|`; infinite when the outlet carries no flow.
    pub m_err: f64,
    /// Signed relative error `(R_optimal - R_actual) / R_optimal`.
    pub delta: f64,
    /// Exponent `E` of the dual-pressure law.
    pub exponent: f64,
    pub sign: PressureSign,
    pub band: ErrorBand,
}

impl SplitError {
    fn compute(area_ratio: f64, measurement: &FlowMeasurement, pressure: f64) -> Self {
        let r_optimal = area_ratio;
        let r_actual = measurement.actual_ratio();
        let r_err = (r_optimal - r_actual).abs();
        let m_err = (r_optimal / r_actual).abs();
        let delta = (r_optimal - r_actual) / r_optimal;
        let sign = PressureSign::of(pressure);
        Self {
            r_optimal,
            r_actual,
            r_err,
            m_err,
            delta,
            exponent: sign.exponent(r_err / r_optimal),
            sign,
            band: ErrorBand::of(r_err),
        }
    }
}

/// Result of one controller evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressureUpdate {
    /// Pressure before the update.
    pub previous: f64,
    /// New pressure boundary value.
    pub pressure: f64,
    pub regime: ControlRegime,
    pub law: UpdateLaw,
    pub split: SplitError,
}

impl PressureUpdate {
    pub fn changed(&self) -> bool {
        self.law != UpdateLaw::Held
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outlet(area_ratio: f64, pressure: f64) -> OutletState {
        OutletState::new(2, area_ratio, pressure).unwrap()
    }

    #[test]
    fn controller_defaults() {
        let c = DualPressureController::default();
        assert_eq!(c.relaxation_gain, 0.1);
        assert_eq!(c.transient_steps, 100);
        assert_eq!(c.early_hold_above, 1.0);
        assert_eq!(c.steady_hold_above, 2.0);
    }

    #[test]
    fn invalid_controller_params() {
        assert!(DualPressureController::new(0.0, 100).is_err());
        assert!(DualPressureController::new(1.5, 100).is_err());
        assert!(DualPressureController::new(f64::NAN, 100).is_err());
        assert!(
            DualPressureController::default()
                .with_hold_thresholds(-1.0, 2.0)
                .is_err()
        );
    }

    #[test]
    fn validate_catches_field_assembled_config() {
        assert!(DualPressureController::default().validate().is_ok());
        let too_hot = DualPressureController {
            relaxation_gain: 5.0,
            ..DualPressureController::default()
        };
        assert!(matches!(
            too_hot.validate(),
            Err(ControlError::Configuration { .. })
        ));
        let no_hold = DualPressureController {
            steady_hold_above: f64::INFINITY,
            ..DualPressureController::default()
        };
        assert!(no_hold.validate().is_err());
    }

    #[test]
    fn regime_boundary_selects_law() {
        let c = DualPressureController::default();
        let state = outlet(0.5, 0.5);
        let m = FlowMeasurement::new(1.0, 0.45);

        let early = c.update(&state, &m, 99).unwrap();
        assert_eq!(early.regime, ControlRegime::EarlyTransient);
        assert_eq!(early.law, UpdateLaw::Linear);
        let delta = (0.5 - 0.45) / 0.5;
        assert!((early.pressure - 0.5 * (1.0 - delta * 0.1)).abs() < 1e-12);

        let steady = c.update(&state, &m, 100).unwrap();
        assert_eq!(steady.regime, ControlRegime::SteadyState);
        assert_eq!(steady.law, UpdateLaw::DualPressure);
        let err = 0.05_f64;
        let expected = 0.5 * (1.0 + 5.0 * err * err) * (0.5_f64 / 0.45).powf(-(1.0 + err / 0.5));
        assert!((steady.pressure - expected).abs() < 1e-9);
        assert!((steady.pressure - early.pressure).abs() > 1e-6);
    }

    #[test]
    fn early_hold_when_over_delivering_at_high_pressure() {
        let c = DualPressureController::default();
        let state = outlet(0.5, 1.5);
        // R_actual = 0.505 -> delta = -0.01
        let m = FlowMeasurement::new(1.0, 0.505);
        let update = c.update(&state, &m, 50).unwrap();
        assert!((update.split.delta + 0.01).abs() < 1e-9);
        assert_eq!(update.law, UpdateLaw::Held);
        assert_eq!(update.pressure, 1.5);
        assert!(!update.changed());
    }

    #[test]
    fn early_relaxation_below_hold_threshold() {
        let c = DualPressureController::default();
        let state = outlet(0.5, 0.8);
        let m = FlowMeasurement::new(1.0, 0.505);
        let update = c.update(&state, &m, 50).unwrap();
        assert_eq!(update.law, UpdateLaw::Linear);
        // over-delivering outlet gets a higher pressure
        assert!(update.pressure > 0.8);
    }

    #[test]
    fn steady_hold_uses_higher_threshold() {
        let c = DualPressureController::default();
        let m = FlowMeasurement::new(1.0, 0.6);

        let held = c.update(&outlet(0.5, 2.5), &m, 200).unwrap();
        assert_eq!(held.law, UpdateLaw::Held);
        assert_eq!(held.pressure, 2.5);

        let moved = c.update(&outlet(0.5, 1.5), &m, 200).unwrap();
        assert_eq!(moved.law, UpdateLaw::DualPressure);
        assert!(moved.pressure > 1.5);
    }

    #[test]
    fn steady_worked_example() {
        // 0.3 - 0.2 rounds to just below 0.1, so the quadratic band applies.
        let c = DualPressureController::default();
        let update = c
            .update(&outlet(0.3, 1.0), &FlowMeasurement::new(10.0, 2.0), 200)
            .unwrap();
        assert_eq!(update.law, UpdateLaw::DualPressure);
        assert!((update.split.r_actual - 0.2).abs() < 1e-12);
        assert!((update.split.r_err - 0.1).abs() < 1e-12);
        assert!((update.split.m_err - 1.5).abs() < 1e-12);
        assert!((update.split.exponent + 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(update.split.band, ErrorBand::Small);
        assert!((update.pressure - 0.611_506_325_3).abs() < 1e-6);
    }

    #[test]
    fn steady_large_error_band() {
        let c = DualPressureController::default();
        let update = c
            .update(&outlet(0.375, 1.0), &FlowMeasurement::new(8.0, 2.0), 200)
            .unwrap();
        assert_eq!(update.split.band, ErrorBand::Large);
        let expected = 1.5 * 1.5_f64.powf(-4.0 / 3.0);
        assert!((update.pressure - expected).abs() < 1e-12);
        assert!((update.pressure - 0.873_580_464_7).abs() < 1e-6);
    }

    #[test]
    fn steady_negative_pressure_flips_exponent() {
        let c = DualPressureController::default();
        let update = c
            .update(&outlet(0.375, -0.5), &FlowMeasurement::new(8.0, 2.0), 200)
            .unwrap();
        assert_eq!(update.split.sign, PressureSign::Negative);
        assert!(update.split.exponent > 0.0);
        let expected = -0.5 * 0.5 * 1.5_f64.powf(4.0 / 3.0);
        assert!((update.pressure - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_inflow_is_measurement_error() {
        let c = DualPressureController::default();
        let err = c
            .update(&outlet(0.5, 1.0), &FlowMeasurement::new(0.0, 1.0), 10)
            .unwrap_err();
        assert!(matches!(err, ControlError::Measurement { .. }));
        assert!(err.is_transient());
    }

    #[test]
    fn zero_area_ratio_is_configuration_error() {
        let c = DualPressureController::default();
        let state = OutletState {
            id: 2.into(),
            area_ratio: 0.0,
            pressure: 1.0,
        };
        let err = c
            .update(&state, &FlowMeasurement::new(1.0, 0.5), 10)
            .unwrap_err();
        assert!(matches!(err, ControlError::Configuration { .. }));
        assert!(!err.is_transient());
    }

    #[test]
    fn zero_outflow_at_negative_pressure_is_non_finite() {
        let c = DualPressureController::default();
        let err = c
            .update(&outlet(0.5, -0.2), &FlowMeasurement::new(1.0, 0.0), 200)
            .unwrap_err();
        assert!(matches!(err, ControlError::NonFinite { .. }));
    }

    #[test]
    fn apply_stores_pressure_and_leaves_state_on_error() {
        let c = DualPressureController::default();
        let mut state = outlet(0.5, 0.5);

        let update = c.apply(&mut state, &FlowMeasurement::new(1.0, 0.45), 10).unwrap();
        assert_eq!(state.pressure, update.pressure);

        let before = state.clone();
        assert!(c.apply(&mut state, &FlowMeasurement::new(0.0, 0.45), 11).is_err());
        assert_eq!(state, before);
    }
}
