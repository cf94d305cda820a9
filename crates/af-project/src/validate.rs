//! Case validation logic.

use std::collections::HashSet;

use crate::schema::{CaseDef, ControlDef, FlowDef, SyntheticNetworkDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Area ratios sum to {sum}, expected 1 within {tolerance}")]
    RatioSum { sum: f64, tolerance: f64 },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

pub fn validate_case(case: &CaseDef) -> Result<(), ValidationError> {
    if case.version == 0 || case.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: case.version,
        });
    }
    if case.name.trim().is_empty() {
        return Err(invalid("name", "\"\"", "must not be empty"));
    }

    validate_flow(&case.flow)?;
    validate_control(&case.control)?;

    if case.outlets.is_empty() {
        return Err(invalid("outlets", "[]", "at least one outlet is required"));
    }

    let mut ids = HashSet::new();
    ids.insert(case.inlet.id);
    for outlet in &case.outlets {
        if !ids.insert(outlet.id) {
            return Err(ValidationError::DuplicateId {
                id: outlet.id.to_string(),
                context: "boundary tags".to_string(),
            });
        }
        let field = format!("outlets[{}].area_ratio", outlet.id);
        if !(outlet.area_ratio.is_finite() && outlet.area_ratio > 0.0 && outlet.area_ratio <= 1.0)
        {
            return Err(invalid(field, outlet.area_ratio, "must be in (0, 1]"));
        }
        if let Some(area) = outlet.area_mm2 {
            positive(&format!("outlets[{}].area_mm2", outlet.id), area)?;
        }
    }

    let sum = case.ratio_sum();
    let tolerance = case.control.ratio_sum_tolerance;
    if (sum - 1.0).abs() > tolerance {
        return Err(ValidationError::RatioSum { sum, tolerance });
    }

    // Areas are all-or-nothing so initial pressures use one convention.
    let with_area = case.outlets.iter().filter(|o| o.area_mm2.is_some()).count();
    if with_area != 0 && with_area != case.outlets.len() {
        return Err(invalid(
            "outlets.area_mm2",
            with_area,
            "give an area for every outlet or for none",
        ));
    }

    if let Some(synthetic) = &case.synthetic {
        validate_synthetic(case, synthetic)?;
    }

    Ok(())
}

fn validate_flow(flow: &FlowDef) -> Result<(), ValidationError> {
    positive("flow.nu", flow.nu)?;
    positive("flow.period_ms", flow.period_ms)?;
    positive("flow.dt_ms", flow.dt_ms)?;
    if flow.dt_ms > flow.period_ms {
        return Err(invalid(
            "flow.dt_ms",
            flow.dt_ms,
            "must not exceed the cycle period",
        ));
    }
    if flow.cycles == 0 {
        return Err(invalid("flow.cycles", flow.cycles, "must be at least one"));
    }
    Ok(())
}

fn validate_control(control: &ControlDef) -> Result<(), ValidationError> {
    if !control.reference_pressure.is_finite() {
        return Err(invalid(
            "control.reference_pressure",
            control.reference_pressure,
            "must be finite",
        ));
    }
    let gain = control.relaxation_gain;
    if !(gain > 0.0 && gain <= 1.0) {
        return Err(invalid("control.relaxation_gain", gain, "must be in (0, 1]"));
    }
    if control.sample_interval == 0 {
        return Err(invalid(
            "control.sample_interval",
            control.sample_interval,
            "must be at least one timestep",
        ));
    }
    positive("control.ratio_sum_tolerance", control.ratio_sum_tolerance)?;
    Ok(())
}

fn validate_synthetic(case: &CaseDef, net: &SyntheticNetworkDef) -> Result<(), ValidationError> {
    positive("synthetic.mean_flow", net.mean_flow)?;
    if !(0.0..1.0).contains(&net.amplitude) {
        return Err(invalid("synthetic.amplitude", net.amplitude, "must be in [0, 1)"));
    }

    let mut seen = HashSet::new();
    for r in &net.resistances {
        if !seen.insert(r.id) {
            return Err(ValidationError::DuplicateId {
                id: r.id.to_string(),
                context: "synthetic.resistances".to_string(),
            });
        }
        if !case.outlets.iter().any(|o| o.id == r.id) {
            return Err(ValidationError::MissingReference {
                id: r.id.to_string(),
                context: "synthetic.resistances outlet".to_string(),
            });
        }
        positive(&format!("synthetic.resistances[{}]", r.id), r.resistance)?;
    }
    for outlet in &case.outlets {
        if !seen.contains(&outlet.id) {
            return Err(ValidationError::MissingReference {
                id: outlet.id.to_string(),
                context: "synthetic.resistances (no resistance for outlet)".to_string(),
            });
        }
    }
    Ok(())
}
