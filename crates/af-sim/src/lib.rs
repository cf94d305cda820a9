//! Solver-loop coupling for dual-pressure outlet control.
//!
//! Provides:
//! - `OutletBank`: owned map from outlet tag to controller state
//! - `FluxProvider`: boundary contract for the external flow solver
//! - `DualPressureCoupling`: per-timestep update of every outlet
//! - `StepReport`: flow-split summary for diagnostics
//! - `FlowModel` + `run_coupled`: drive a solver stand-in and the controller together
//! - `ResistiveNetwork`: lumped synthetic flow model

pub mod bank;
pub mod coupling;
pub mod error;
pub mod model;
pub mod network;
pub mod provider;
pub mod report;

pub use bank::{OutletBank, OutletSpec, RATIO_SUM_TOLERANCE};
pub use coupling::{CouplingOptions, DualPressureCoupling, MeasurementPolicy, StepOutcome};
pub use error::{SimError, SimResult};
pub use model::{CoupledRecord, FlowModel, run_coupled};
pub use network::{InflowWaveform, ResistiveNetwork};
pub use provider::{FluxProvider, MeasuredFluxes};
pub use report::{OutletAction, OutletReport, StepReport};
