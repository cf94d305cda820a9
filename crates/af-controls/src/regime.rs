//! Regime and branch selection for the outlet pressure law.
//!
//! The update law is a small state machine plus two tagged choices:
//! - [`ControlRegime`]: linear relaxation during start-up, dual-pressure after
//! - [`PressureSign`]: whether the outlet currently acts as a sink or a source
//! - [`ErrorBand`]: fixed strong gain for large split errors, quadratic near
//!   unity for small ones
//!
//! The band boundary at 0.1 is a deliberate discontinuity of the feedback law
//! and must stay a hard switch.

use serde::{Deserialize, Serialize};

/// Timestep at which the controller leaves the start-up regime.
pub const DEFAULT_TRANSIENT_STEPS: u64 = 100;

/// Split error at and above which `beta` uses its fixed gain.
pub const LARGE_ERROR_THRESHOLD: f64 = 0.1;

/// Controller regime. Starts in `EarlyTransient`, switches to `SteadyState`
/// at `transient_steps` and stays there for the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlRegime {
    /// Proportional relaxation with a fixed gain.
    EarlyTransient,
    /// Nonlinear dual-pressure update.
    SteadyState,
}

impl ControlRegime {
    /// Regime in force at `timestep`.
    pub fn at(timestep: u64, transient_steps: u64) -> Self {
        if timestep < transient_steps {
            Self::EarlyTransient
        } else {
            Self::SteadyState
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::EarlyTransient => "early-transient",
            Self::SteadyState => "steady-state",
        }
    }
}

/// Sign convention of the stored outlet pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PressureSign {
    /// `p < 0`: the patch is behaving like an inflow.
    Negative,
    /// `p >= 0`: ordinary outflow-resisting outlet.
    NonNegative,
}

impl PressureSign {
    pub fn of(pressure: f64) -> Self {
        if pressure < 0.0 {
            Self::Negative
        } else {
            Self::NonNegative
        }
    }

    /// Exponent applied to the ratio mismatch in the dual-pressure law.
    ///
    /// `relative_error` is `R_err / R_optimal`.
    pub fn exponent(self, relative_error: f64) -> f64 {
        let magnitude = 1.0 + relative_error;
        match self {
            Self::Negative => magnitude,
            Self::NonNegative => -magnitude,
        }
    }
}

/// Magnitude class of the split error `|R_optimal - R_actual|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorBand {
    Small,
    Large,
}

impl ErrorBand {
    pub fn of(err: f64) -> Self {
        if err >= LARGE_ERROR_THRESHOLD {
            Self::Large
        } else {
            Self::Small
        }
    }
}

/// Damping/gain factor of the dual-pressure law.
pub fn beta(err: f64, pressure: f64) -> f64 {
    beta_for(PressureSign::of(pressure), ErrorBand::of(err), err)
}

pub(crate) fn beta_for(sign: PressureSign, band: ErrorBand, err: f64) -> f64 {
    match (sign, band) {
        (PressureSign::Negative, ErrorBand::Large) => 0.5,
        (PressureSign::Negative, ErrorBand::Small) => 1.0 - 5.0 * err * err,
        (PressureSign::NonNegative, ErrorBand::Large) => 1.5,
        (PressureSign::NonNegative, ErrorBand::Small) => 1.0 + 5.0 * err * err,
    }
}
