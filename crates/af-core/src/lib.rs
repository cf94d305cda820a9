//! af-core: shared foundation for arteryflow.
//!
//! Contains:
//! - units (uom SI types + mm/ms constructors used by vascular cases)
//! - numeric (finiteness and unit-sum checks)
//! - ids (mesh boundary tags)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{AfError, AfResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
