use crate::candidate::MileageCandidate;

/// Magnitude gap between the largest and smallest value that marks the small
/// ones as trip-meter or partial readings.
pub const TRIP_METER_RATIO: f64 = 10.0;
/// Once a gap is found, values below this fraction of the largest are dropped.
pub const TRIP_METER_CUTOFF: f64 = 0.5;

/// Drop likely trip-meter readings.
///
/// Only engages when some pair of candidates is at least `ratio` apart in
/// magnitude; close readings (e.g. 30 000 vs 45 000) are all kept.
pub fn discard_trip_meter(
    candidates: Vec<MileageCandidate>,
    ratio: f64,
    cutoff: f64,
) -> Vec<MileageCandidate> {
    if candidates.len() < 2 {
        return candidates;
    }

    let max_value = candidates.iter().map(|c| c.value).max().unwrap_or(0) as f64;
    let min_value = candidates.iter().map(|c| c.value).min().unwrap_or(0) as f64;

    // the widest pair is (min, max); any gap at all shows up there
    if max_value < min_value * ratio {
        return candidates;
    }

    let threshold = cutoff * max_value;
    let (kept, dropped): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|c| c.value as f64 >= threshold);

    if !dropped.is_empty() {
        log::debug!(
            "[trip] dropped {:?} (below {threshold:.0})",
            dropped.iter().map(|c| c.value).collect::<Vec<_>>()
        );
    }
    kept
}
