use crate::limits::MS_PER_NIGHT;
use crate::model::{Ms, Stay};

/// Nights billed for a stay: ceiling over the wall-clock duration, so any
/// started night counts whole. A 25-hour stay is two nights; truncating to
/// the day difference instead would undercharge. Durations are validated
/// positive before they reach pricing, so the ceiling arithmetic cannot
/// wrap.
pub fn nights(stay: &Stay) -> Ms {
    (stay.duration_ms() + MS_PER_NIGHT - 1) / MS_PER_NIGHT
}

/// Total price: nightly rate times billed nights. Deliberately unrounded
/// f64; a host that needs money semantics must round at its own edge.
pub fn quote(nightly_rate: f64, stay: &Stay) -> f64 {
    nightly_rate * nights(stay) as f64
}
