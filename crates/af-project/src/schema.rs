//! Case schema definitions.
//!
//! Lengths are in millimetres and times in milliseconds, matching the mesh
//! units of the vascular models.

use af_core::{BoundaryTag, ms, step_count};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseDef {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub flow: FlowDef,
    pub inlet: InletDef,
    pub outlets: Vec<OutletDef>,
    #[serde(default)]
    pub control: ControlDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthetic: Option<SyntheticNetworkDef>,
}

impl CaseDef {
    /// Total number of solver timesteps, `cycles * period / dt`.
    pub fn total_steps(&self) -> u64 {
        step_count(
            ms(self.flow.period_ms * f64::from(self.flow.cycles)),
            ms(self.flow.dt_ms),
        )
    }

    /// Timesteps in one cardiac cycle.
    pub fn steps_per_cycle(&self) -> u64 {
        step_count(ms(self.flow.period_ms), ms(self.flow.dt_ms))
    }

    pub fn ratio_sum(&self) -> f64 {
        self.outlets.iter().map(|o| o.area_ratio).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowDef {
    /// Kinematic viscosity, mm^2/ms.
    #[serde(default = "default_nu")]
    pub nu: f64,
    /// Cardiac cycle length.
    #[serde(default = "default_period_ms")]
    pub period_ms: f64,
    #[serde(default = "default_dt_ms")]
    pub dt_ms: f64,
    #[serde(default = "default_cycles")]
    pub cycles: u32,
}

impl Default for FlowDef {
    fn default() -> Self {
        Self {
            nu: default_nu(),
            period_ms: default_period_ms(),
            dt_ms: default_dt_ms(),
            cycles: default_cycles(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InletDef {
    pub id: BoundaryTag,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutletDef {
    pub id: BoundaryTag,
    pub area_ratio: f64,
    /// Measured cross-section; when present it sets the initial pressure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_mm2: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementPolicyDef {
    #[default]
    Hold,
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControlDef {
    #[serde(default = "default_reference_pressure")]
    pub reference_pressure: f64,
    #[serde(default = "default_relaxation_gain")]
    pub relaxation_gain: f64,
    #[serde(default = "default_transient_steps")]
    pub transient_steps: u64,
    #[serde(default = "default_sample_interval")]
    pub sample_interval: u64,
    #[serde(default = "default_start_after")]
    pub start_after: u64,
    #[serde(default = "default_report_every")]
    pub report_every: u64,
    #[serde(default = "default_ratio_sum_tolerance")]
    pub ratio_sum_tolerance: f64,
    #[serde(default)]
    pub on_measurement_error: MeasurementPolicyDef,
}

impl Default for ControlDef {
    fn default() -> Self {
        Self {
            reference_pressure: default_reference_pressure(),
            relaxation_gain: default_relaxation_gain(),
            transient_steps: default_transient_steps(),
            sample_interval: default_sample_interval(),
            start_after: default_start_after(),
            report_every: default_report_every(),
            ratio_sum_tolerance: default_ratio_sum_tolerance(),
            on_measurement_error: MeasurementPolicyDef::default(),
        }
    }
}

/// Lumped stand-in for the flow solver, for dry runs of the controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyntheticNetworkDef {
    /// Cycle-averaged inflow, mm^3/ms.
    pub mean_flow: f64,
    #[serde(default)]
    pub amplitude: f64,
    pub resistances: Vec<ResistanceDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResistanceDef {
    pub id: BoundaryTag,
    pub resistance: f64,
}

fn default_nu() -> f64 {
    3.3018e-3
}

fn default_period_ms() -> f64 {
    951.0
}

fn default_dt_ms() -> f64 {
    0.0951
}

fn default_cycles() -> u32 {
    2
}

fn default_reference_pressure() -> f64 {
    1.0
}

fn default_relaxation_gain() -> f64 {
    0.1
}

fn default_transient_steps() -> u64 {
    100
}

fn default_sample_interval() -> u64 {
    1
}

fn default_start_after() -> u64 {
    2
}

fn default_report_every() -> u64 {
    10
}

fn default_ratio_sum_tolerance() -> f64 {
    1e-3
}
