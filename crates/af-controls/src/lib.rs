//! Outlet pressure control for patient-specific vascular flow simulation.
//!
//! This crate holds the feedback law that keeps each outlet's share of the
//! inflow at its prescribed area ratio (the dual-pressure boundary condition
//! of Gin & Steinman). The solver loop measures fluxes, the controller turns
//! them into a new scalar pressure for each outlet boundary.
//!
//! # Architecture
//!
//! - [`OutletState`] is the per-outlet record (target split + current pressure)
//! - [`FlowMeasurement`] is the per-step flux pair for one outlet
//! - [`DualPressureController`] applies the update law; it is a pure function
//!   of its inputs plus the stored pressure
//! - [`ControlRegime`] switches from linear relaxation to the dual-pressure law
//!   once, at a fixed timestep
//! - [`FluxSampling`] decides on which timesteps the solver loop should measure

pub mod controller;
pub mod error;
pub mod measured;
pub mod outlet;
pub mod regime;
pub mod sampled;

pub use controller::{DualPressureController, PressureUpdate, SplitError, UpdateLaw};
pub use error::{ControlError, ControlResult};
pub use measured::FlowMeasurement;
pub use outlet::OutletState;
pub use regime::{ControlRegime, ErrorBand, PressureSign, beta};
pub use sampled::FluxSampling;
