// af-core/src/units.rs
//
// Vascular cases are set up in millimetres and milliseconds; these helpers
// keep that convention explicit at the API boundary.

use uom::si::f64::{Area as UomArea, Time as UomTime};

pub type Area = UomArea;
pub type Time = UomTime;

#[inline]
pub fn ms(v: f64) -> Time {
    use uom::si::time::millisecond;
    Time::new::<millisecond>(v)
}

#[inline]
pub fn mm2(v: f64) -> Area {
    use uom::si::area::square_millimeter;
    Area::new::<square_millimeter>(v)
}

#[inline]
pub fn as_ms(t: Time) -> f64 {
    use uom::si::time::millisecond;
    t.get::<millisecond>()
}

#[inline]
pub fn as_mm2(a: Area) -> f64 {
    use uom::si::area::square_millimeter;
    a.get::<square_millimeter>()
}

/// Number of whole time steps of size `dt` that fit in `span`.
///
/// Rounds to the nearest step so that `951 ms / 0.0951 ms` yields 10 000
/// despite binary representation error.
pub fn step_count(span: Time, dt: Time) -> u64 {
    (as_ms(span) / as_ms(dt)).round().max(0.0) as u64
}
