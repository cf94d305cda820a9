//! Error types for solver-loop coupling.

use af_controls::ControlError;
use af_core::OutletId;
use thiserror::Error;

/// Errors encountered while coupling the controller to a flow solver.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid outlet setup: {what}")]
    InvalidSetup { what: String },

    #[error("Outlet {outlet}: {source}")]
    Control {
        outlet: OutletId,
        #[source]
        source: ControlError,
    },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    /// Setup-time failure of a controller-side constructor.
    ///
    /// Runtime control errors carry their outlet in [`SimError::Control`]
    /// instead.
    pub(crate) fn setup(e: ControlError) -> Self {
        let what = match e {
            ControlError::Configuration { what } => what,
            other => other.to_string(),
        };
        SimError::InvalidSetup { what }
    }
}

impl From<af_core::AfError> for SimError {
    fn from(e: af_core::AfError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}
