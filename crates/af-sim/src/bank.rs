//! Outlet state registry.

use std::collections::{BTreeMap, HashSet};

use af_controls::OutletState;
use af_core::{Area, OutletId, as_mm2, ensure_unit_sum};

use crate::error::{SimError, SimResult};

/// Allowed deviation of the summed area ratios from one.
pub const RATIO_SUM_TOLERANCE: f64 = 1e-3;

/// Static description of one outlet: its tag and target flow split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutletSpec {
    pub id: OutletId,
    pub area_ratio: f64,
}

impl OutletSpec {
    pub fn new(id: impl Into<OutletId>, area_ratio: f64) -> Self {
        Self {
            id: id.into(),
            area_ratio,
        }
    }
}

/// All outlets of a case, keyed by boundary tag.
///
/// Iteration order is ascending tag order so reports are stable between runs.
#[derive(Debug, Clone, PartialEq)]
pub struct OutletBank {
    outlets: BTreeMap<OutletId, OutletState>,
}

impl OutletBank {
    /// Create a bank with each outlet's initial pressure set to
    /// `area_ratio * reference_pressure`.
    pub fn new(specs: &[OutletSpec], reference_pressure: f64) -> SimResult<Self> {
        Self::with_tolerance(specs, reference_pressure, RATIO_SUM_TOLERANCE)
    }

    /// Like [`new`](Self::new) with an explicit ratio-sum tolerance.
    pub fn with_tolerance(
        specs: &[OutletSpec],
        reference_pressure: f64,
        tolerance: f64,
    ) -> SimResult<Self> {
        check_reference(reference_pressure)?;
        check_specs(specs, tolerance)?;
        let states = specs
            .iter()
            .map(|s| OutletState::new(s.id, s.area_ratio, s.area_ratio * reference_pressure));
        Self::collect(states)
    }

    /// Create a bank whose initial pressures follow the measured outlet areas,
    /// `area_i / sum(area) * reference_pressure`.
    ///
    /// Target splits still come from `specs`; `areas` must name every outlet.
    pub fn with_outlet_areas(
        specs: &[OutletSpec],
        areas: &[(OutletId, Area)],
        reference_pressure: f64,
        tolerance: f64,
    ) -> SimResult<Self> {
        check_reference(reference_pressure)?;
        check_specs(specs, tolerance)?;

        let areas: BTreeMap<OutletId, f64> =
            areas.iter().map(|(id, a)| (*id, as_mm2(*a))).collect();
        let mut measured = Vec::with_capacity(specs.len());
        for spec in specs {
            let area = areas.get(&spec.id).copied().ok_or_else(|| SimError::InvalidSetup {
                what: format!("no area given for outlet {}", spec.id),
            })?;
            if !(area.is_finite() && area > 0.0) {
                return Err(SimError::InvalidSetup {
                    what: format!("outlet {} area must be positive (got {area} mm^2)", spec.id),
                });
            }
            measured.push(area);
        }
        let total: f64 = measured.iter().sum();

        let states = specs.iter().zip(&measured).map(|(s, area)| {
            OutletState::new(s.id, s.area_ratio, area / total * reference_pressure)
        });
        Self::collect(states)
    }

    /// Rebuild a bank from stored states, e.g. after a restart.
    ///
    /// `tolerance` should match the one the bank was first built with.
    pub fn from_states(
        states: impl IntoIterator<Item = OutletState>,
        tolerance: f64,
    ) -> SimResult<Self> {
        let states: Vec<OutletState> = states.into_iter().collect();
        let specs: Vec<OutletSpec> = states
            .iter()
            .map(|s| OutletSpec::new(s.id, s.area_ratio))
            .collect();
        check_specs(&specs, tolerance)?;
        Self::collect(
            states
                .into_iter()
                .map(|s| OutletState::new(s.id, s.area_ratio, s.pressure)),
        )
    }

    fn collect(
        states: impl Iterator<Item = af_controls::ControlResult<OutletState>>,
    ) -> SimResult<Self> {
        let mut outlets = BTreeMap::new();
        for state in states {
            let state = state.map_err(SimError::setup)?;
            outlets.insert(state.id, state);
        }
        Ok(Self { outlets })
    }

    pub fn len(&self) -> usize {
        self.outlets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outlets.is_empty()
    }

    pub fn get(&self, id: OutletId) -> Option<&OutletState> {
        self.outlets.get(&id)
    }

    /// Current pressure boundary value of an outlet.
    pub fn pressure(&self, id: OutletId) -> Option<f64> {
        self.outlets.get(&id).map(|s| s.pressure)
    }

    /// Snapshot of all pressures, for handing to the solver's boundary conditions.
    pub fn pressures(&self) -> BTreeMap<OutletId, f64> {
        self.outlets.iter().map(|(id, s)| (*id, s.pressure)).collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = OutletId> + '_ {
        self.outlets.keys().copied()
    }

    pub fn outlets(&self) -> impl Iterator<Item = &OutletState> {
        self.outlets.values()
    }

    pub(crate) fn get_mut(&mut self, id: OutletId) -> Option<&mut OutletState> {
        self.outlets.get_mut(&id)
    }
}

fn check_reference(reference_pressure: f64) -> SimResult<()> {
    if !reference_pressure.is_finite() {
        return Err(SimError::InvalidArg {
            what: "reference pressure must be finite",
        });
    }
    Ok(())
}

fn check_specs(specs: &[OutletSpec], tolerance: f64) -> SimResult<()> {
    if specs.is_empty() {
        return Err(SimError::InvalidSetup {
            what: "at least one outlet is required".to_string(),
        });
    }
    let mut seen = HashSet::new();
    for spec in specs {
        if !seen.insert(spec.id) {
            return Err(SimError::InvalidSetup {
                what: format!("duplicate outlet {}", spec.id),
            });
        }
    }
    let ratios: Vec<f64> = specs.iter().map(|s| s.area_ratio).collect();
    ensure_unit_sum(&ratios, tolerance).map_err(|_| SimError::InvalidSetup {
        what: format!(
            "area ratios sum to {} (expected 1 within {tolerance})",
            ratios.iter().sum::<f64>()
        ),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_core::mm2;

    fn two_outlets() -> Vec<OutletSpec> {
        vec![OutletSpec::new(3, 0.4), OutletSpec::new(2, 0.6)]
    }

    #[test]
    fn initial_pressure_proportional_to_ratio() {
        let bank = OutletBank::new(&two_outlets(), 2.0).unwrap();
        assert_eq!(bank.len(), 2);
        assert!((bank.pressure(2.into()).unwrap() - 1.2).abs() < 1e-12);
        assert!((bank.pressure(3.into()).unwrap() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn outlets_iterate_in_tag_order() {
        let bank = OutletBank::new(&two_outlets(), 1.0).unwrap();
        let ids: Vec<u32> = bank.ids().map(|id| id.get()).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn initial_pressure_from_areas() {
        let areas: [(OutletId, Area); 2] = [(2.into(), mm2(3.0)), (3.into(), mm2(1.0))];
        let bank = OutletBank::with_outlet_areas(&two_outlets(), &areas, 1.0, RATIO_SUM_TOLERANCE).unwrap();
        assert!((bank.pressure(2.into()).unwrap() - 0.75).abs() < 1e-9);
        assert!((bank.pressure(3.into()).unwrap() - 0.25).abs() < 1e-9);
        // target split is unaffected by the measured areas
        assert_eq!(bank.get(2.into()).unwrap().area_ratio, 0.6);
    }

    #[test]
    fn missing_area_rejected() {
        let areas: [(OutletId, Area); 1] = [(2.into(), mm2(3.0))];
        assert!(OutletBank::with_outlet_areas(&two_outlets(), &areas, 1.0, RATIO_SUM_TOLERANCE).is_err());
    }

    #[test]
    fn ratio_sum_checked() {
        let specs = [OutletSpec::new(2, 0.6), OutletSpec::new(3, 0.3)];
        let err = OutletBank::new(&specs, 1.0).unwrap_err();
        assert!(matches!(err, SimError::InvalidSetup { .. }));
        assert!(OutletBank::with_tolerance(&specs, 1.0, 0.2).is_ok());
    }

    #[test]
    fn duplicate_and_empty_rejected() {
        let specs = [OutletSpec::new(2, 0.5), OutletSpec::new(2, 0.5)];
        assert!(OutletBank::new(&specs, 1.0).is_err());
        assert!(OutletBank::new(&[], 1.0).is_err());
    }

    #[test]
    fn invalid_single_ratio_rejected() {
        let specs = [OutletSpec::new(2, 1.2), OutletSpec::new(3, -0.2)];
        let err = OutletBank::new(&specs, 1.0).unwrap_err();
        assert!(matches!(err, SimError::InvalidSetup { .. }));
    }

    #[test]
    fn restart_from_states_keeps_pressures() {
        let mut bank = OutletBank::new(&two_outlets(), 1.0).unwrap();
        bank.get_mut(2.into()).unwrap().pressure = -0.3;
        let restored = OutletBank::from_states(bank.outlets().cloned(), RATIO_SUM_TOLERANCE).unwrap();
        assert_eq!(restored, bank);
    }

    #[test]
    fn restart_honours_original_tolerance() {
        let specs = [OutletSpec::new(2, 0.6), OutletSpec::new(3, 0.35)];
        let bank = OutletBank::with_tolerance(&specs, 1.0, 0.1).unwrap();
        let restored = OutletBank::from_states(bank.outlets().cloned(), 0.1).unwrap();
        assert_eq!(restored, bank);
        let err = OutletBank::from_states(bank.outlets().cloned(), RATIO_SUM_TOLERANCE).unwrap_err();
        assert!(matches!(err, SimError::InvalidSetup { .. }));
    }

    #[test]
    fn restart_rejects_corrupt_state() {
        let mut state = OutletState::new(2, 1.0, 0.5).unwrap();
        state.pressure = f64::NAN;
        let err = OutletBank::from_states([state], RATIO_SUM_TOLERANCE).unwrap_err();
        assert!(matches!(err, SimError::InvalidSetup { .. }));
    }
}
