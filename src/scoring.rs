//! Multi-factor plausibility scoring and final candidate selection.
//!
//! Each candidate gets sub-scores in [0, 1] for digit count, numeric range,
//! OCR confidence and, when available, agreement with the previous known
//! mileage and relative on-screen text size. The sub-scores are combined
//! with one of four fixed weight sets depending on which optional signals
//! exist for that candidate.

use crate::candidate::MileageCandidate;
use std::cmp::Ordering;

// ── Sub-score tables ─────────────────────────────────────────────────────────

/// Digit count → score. Odometers overwhelmingly show 5–7 digits.
const DIGIT_COUNT_SCORES: &[(u32, f64)] = &[(6, 1.0), (5, 0.9), (7, 0.8), (4, 0.5), (3, 0.2)];
const DIGIT_COUNT_FALLBACK: f64 = 0.1;

/// Score for a value lying in the typical range of a used vehicle.
const RANGE_TYPICAL: (i64, i64) = (10_000, 300_000);
const RANGE_LOW: (i64, i64) = (1_000, 10_000);
const RANGE_HIGH: (i64, i64) = (300_000, 500_000);
const RANGE_VERY_HIGH: (i64, i64) = (500_000, 999_999);
const RANGE_TINY: (i64, i64) = (100, 1_000);

/// Forward progress since the prior reading, and the score it earns.
const PRIOR_CLOSE: i64 = 5_000;
const PRIOR_NEAR: i64 = 20_000;
const PRIOR_FAR: i64 = 50_000;
const PRIOR_BACKWARDS_SCORE: f64 = 0.05;

pub fn digit_count(value: i64) -> u32 {
    value.unsigned_abs().checked_ilog10().map_or(1, |d| d + 1)
}

pub fn digit_count_score(value: i64) -> f64 {
    let digits = digit_count(value);
    DIGIT_COUNT_SCORES
        .iter()
        .find(|(d, _)| *d == digits)
        .map_or(DIGIT_COUNT_FALLBACK, |(_, s)| *s)
}

pub fn range_score(value: i64) -> f64 {
    let within = |(lo, hi): (i64, i64)| (lo..=hi).contains(&value);
    if within(RANGE_TYPICAL) {
        1.0
    } else if (RANGE_LOW.0..RANGE_LOW.1).contains(&value) {
        0.7
    } else if value > RANGE_HIGH.0 && value <= RANGE_HIGH.1 {
        0.6
    } else if value > RANGE_VERY_HIGH.0 && value <= RANGE_VERY_HIGH.1 {
        0.4
    } else if (RANGE_TINY.0..RANGE_TINY.1).contains(&value) {
        0.3
    } else {
        0.1
    }
}

/// Odometers don't run backwards, so a value below the prior is nearly ruled out.
pub fn prior_score(value: i64, prior: i64) -> f64 {
    let delta = value.saturating_sub(prior);
    if delta < 0 {
        PRIOR_BACKWARDS_SCORE
    } else if delta <= PRIOR_CLOSE {
        1.0
    } else if delta <= PRIOR_NEAR {
        0.8
    } else if delta <= PRIOR_FAR {
        0.5
    } else {
        0.2
    }
}

// ── Weight policies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub digit_count: f64,
    pub range: f64,
    pub confidence: f64,
    pub prior: f64,
    pub area: f64,
}

/// Which optional signals a candidate has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightPolicy {
    PriorAndArea,
    PriorOnly,
    AreaOnly,
    Baseline,
}

impl WeightPolicy {
    pub fn for_signals(has_prior: bool, has_area: bool) -> Self {
        match (has_prior, has_area) {
            (true, true) => Self::PriorAndArea,
            (true, false) => Self::PriorOnly,
            (false, true) => Self::AreaOnly,
            (false, false) => Self::Baseline,
        }
    }

    pub fn weights(self) -> Weights {
        match self {
            Self::PriorAndArea => Weights {
                digit_count: 0.25,
                range: 0.10,
                confidence: 0.25,
                prior: 0.25,
                area: 0.15,
            },
            Self::PriorOnly => Weights {
                digit_count: 0.30,
                range: 0.15,
                confidence: 0.30,
                prior: 0.25,
                area: 0.0,
            },
            Self::AreaOnly => Weights {
                digit_count: 0.30,
                range: 0.15,
                confidence: 0.25,
                prior: 0.0,
                area: 0.30,
            },
            Self::Baseline => Weights {
                digit_count: 0.40,
                range: 0.25,
                confidence: 0.35,
                prior: 0.0,
                area: 0.0,
            },
        }
    }
}

// ── Selection ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: MileageCandidate,
    pub score: f64,
    pub policy: WeightPolicy,
}

fn score_candidate(
    c: &MileageCandidate,
    prior: Option<i64>,
    max_area: Option<f64>,
) -> ScoredCandidate {
    let area = match (c.metadata, max_area) {
        (Some(meta), Some(max)) => Some(meta.area / max),
        _ => None,
    };
    let prior_sub = prior.map(|p| prior_score(c.value, p));
    let policy = WeightPolicy::for_signals(prior_sub.is_some(), area.is_some());
    let w = policy.weights();

    let digits = digit_count_score(c.value);
    let range = range_score(c.value);
    let score = w.digit_count * digits
        + w.range * range
        + w.confidence * c.confidence
        + w.prior * prior_sub.unwrap_or(0.0)
        + w.area * area.unwrap_or(0.0);

    log::debug!(
        "[score] {:>9}  digits={digits:.2} range={range:.2} conf={:.3} prior={:?} area={:?} {policy:?} → {score:.4}",
        c.value,
        c.confidence,
        prior_sub,
        area
    );

    ScoredCandidate {
        candidate: c.clone(),
        score,
        policy,
    }
}

/// Score every candidate, best first. Equal scores keep input order.
pub fn rank(
    candidates: &[MileageCandidate],
    prior: Option<i64>,
    has_area_data: bool,
) -> Vec<ScoredCandidate> {
    let max_area = if has_area_data {
        candidates
            .iter()
            .filter_map(|c| c.metadata.map(|m| m.area))
            .fold(None, |acc: Option<f64>, a| Some(acc.map_or(a, |m| m.max(a))))
            .filter(|m| *m > 0.0)
    } else {
        None
    };

    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .map(|c| score_candidate(c, prior, max_area))
        .collect();
    // stable: ties stay in encounter order
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored
}

/// Highest-scoring candidate, or `None` for an empty list.
pub fn select(
    candidates: &[MileageCandidate],
    prior: Option<i64>,
    has_area_data: bool,
) -> Option<MileageCandidate> {
    rank(candidates, prior, has_area_data)
        .into_iter()
        .next()
        .map(|s| s.candidate)
}
