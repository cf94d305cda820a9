//! Error types for outlet pressure control.

use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur while updating an outlet pressure.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid static input (area ratios, gains, sampling setup).
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    /// Invalid per-step flux measurement.
    #[error("Measurement error: {what}")]
    Measurement { what: String },

    /// The update law produced a NaN or infinite pressure.
    #[error("Non-finite {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },
}

impl ControlError {
    pub(crate) fn configuration(what: impl Into<String>) -> Self {
        Self::Configuration { what: what.into() }
    }

    pub(crate) fn measurement(what: impl Into<String>) -> Self {
        Self::Measurement { what: what.into() }
    }

    /// True for failures tied to a single timestep's data.
    ///
    /// The caller may hold the previous pressure and continue on these;
    /// configuration errors are never recoverable mid-run.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Measurement { .. } | Self::NonFinite { .. })
    }
}

impl From<af_core::AfError> for ControlError {
    fn from(e: af_core::AfError) -> Self {
        match e {
            af_core::AfError::NonFinite { what, value } => Self::NonFinite { what, value },
            other => Self::Configuration {
                what: other.to_string(),
            },
        }
    }
}
