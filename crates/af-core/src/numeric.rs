use crate::{AfError, AfResult};

pub fn ensure_finite(v: f64, what: &'static str) -> AfResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(AfError::NonFinite { what, value: v })
    }
}

/// Sum of a set of fractions, checked against unity within `tol`.
///
/// Returns the sum on success so callers can report it.
pub fn ensure_unit_sum(fractions: &[f64], tol: f64) -> AfResult<f64> {
    let sum: f64 = fractions.iter().sum();
    ensure_finite(sum, "fraction sum")?;
    if (sum - 1.0).abs() > tol {
        return Err(AfError::Invariant {
            what: "fractions must sum to one",
        });
    }
    Ok(sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(f64::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn unit_sum_accepts_rounded_ratios() {
        let sum = ensure_unit_sum(&[0.333, 0.333, 0.3335], 1e-3).unwrap();
        assert!((sum - 0.9995).abs() < 1e-12);
        assert!(ensure_unit_sum(&[0.5, 0.4], 1e-3).is_err());
    }

    #[test]
    fn unit_sum_rejects_non_finite_fraction() {
        let err = ensure_unit_sum(&[0.5, f64::INFINITY], 1e-3).unwrap_err();
        assert!(matches!(err, AfError::NonFinite { what: "fraction sum", .. }));
    }
}
