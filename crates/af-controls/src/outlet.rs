//! Per-outlet controller state.

use af_core::OutletId;
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// Target flow split and current pressure of one outlet boundary.
///
/// Created once at setup, mutated by every controller invocation, and kept
/// until the end of the run. Checkpointing it is the solver's business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutletState {
    /// Facet marker of the outlet patch.
    pub id: OutletId,
    /// Fraction of the total inflow this outlet should carry.
    pub area_ratio: f64,
    /// Current pressure boundary value. Negative values mean the patch is
    /// behaving like an inflow boundary.
    pub pressure: f64,
}

impl OutletState {
    /// Create an outlet state.
    ///
    /// # Errors
    ///
    /// `ControlError::Configuration` if `area_ratio` is outside `(0, 1]` or if
    /// either value is not finite.
    pub fn new(id: impl Into<OutletId>, area_ratio: f64, pressure: f64) -> ControlResult<Self> {
        let id = id.into();
        validate_area_ratio(area_ratio).map_err(|what| {
            ControlError::configuration(format!("outlet {id}: {what} (got {area_ratio})"))
        })?;
        if !pressure.is_finite() {
            return Err(ControlError::configuration(format!(
                "outlet {id}: initial pressure must be finite (got {pressure})"
            )));
        }
        Ok(Self {
            id,
            area_ratio,
            pressure,
        })
    }

    /// Flow this outlet should carry for a given total inflow.
    pub fn ideal_flow(&self, q_in: f64) -> f64 {
        self.area_ratio * q_in
    }
}

pub(crate) fn validate_area_ratio(area_ratio: f64) -> Result<(), &'static str> {
    if !area_ratio.is_finite() {
        return Err("area ratio must be finite");
    }
    if area_ratio <= 0.0 {
        return Err("area ratio must be positive");
    }
    if area_ratio > 1.0 {
        return Err("area ratio must not exceed one");
    }
    Ok(())
}
