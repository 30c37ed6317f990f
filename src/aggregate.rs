use crate::candidate::MileageCandidate;
use std::collections::hash_map::{Entry, HashMap};

/// Confidence added for each extra detection of the same value.
pub const REPEAT_BOOST: f64 = 0.15;

/// Merge candidates sharing a value into one, boosting repeated detections.
///
/// Each group keeps the text, unit and metadata of its highest-confidence
/// member (the earliest one on ties), with confidence
/// `min(1, best + boost * (count - 1))`. Groups come out in the order their
/// value was first seen.
pub fn aggregate(candidates: &[MileageCandidate], boost: f64) -> Vec<MileageCandidate> {
    // value -> (index of best member, member count), plus first-seen order
    let mut groups: HashMap<i64, (usize, usize)> = HashMap::new();
    let mut order: Vec<i64> = Vec::new();

    for (i, c) in candidates.iter().enumerate() {
        match groups.entry(c.value) {
            Entry::Occupied(mut e) => {
                let (best, count) = e.get_mut();
                *count += 1;
                if c.confidence > candidates[*best].confidence {
                    *best = i;
                }
            }
            Entry::Vacant(e) => {
                e.insert((i, 1));
                order.push(c.value);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|value| groups.get(&value))
        .map(|&(best, count)| {
            let base = &candidates[best];
            let boosted = (base.confidence + boost * (count - 1) as f64).min(1.0);
            if count > 1 {
                log::debug!(
                    "[aggregate] {} seen {count}× conf {:.3} → {boosted:.3}",
                    base.value,
                    base.confidence
                );
            }
            base.with_confidence(boosted)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::DistanceUnit;

    fn cand(value: i64, confidence: f64, text: &str) -> MileageCandidate {
        MileageCandidate {
            value,
            confidence,
            source_text: text.to_string(),
            detected_unit: None,
            metadata: None,
        }
    }

    #[test]
    fn repeated_value_is_boosted() {
        let out = aggregate(&[cand(32847, 0.6, "a"), cand(32847, 0.7, "b")], REPEAT_BOOST);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, 32847);
        assert!((out[0].confidence - 0.85).abs() < 1e-9);
        assert_eq!(out[0].source_text, "b");
    }

    #[test]
    fn boost_is_capped_at_one() {
        let input = vec![
            cand(100, 0.9, "a"),
            cand(100, 0.9, "b"),
            cand(100, 0.9, "c"),
        ];
        assert_eq!(aggregate(&input, REPEAT_BOOST)[0].confidence, 1.0);
    }

    #[test]
    fn single_detection_keeps_its_confidence() {
        let out = aggregate(&[cand(5000, 0.42, "x")], REPEAT_BOOST);
        assert_eq!(out[0].confidence, 0.42);
    }

    #[test]
    fn best_member_supplies_unit_and_text() {
        let mut strong = cand(45231, 0.82, "45,231 mi");
        strong.detected_unit = Some(DistanceUnit::Miles);
        let weak = cand(45231, 0.77, "45231");
        let out = aggregate(&[weak, strong], REPEAT_BOOST);
        assert_eq!(out[0].source_text, "45,231 mi");
        assert_eq!(out[0].detected_unit, Some(DistanceUnit::Miles));
    }

    #[test]
    fn ties_keep_the_earliest_member() {
        let out = aggregate(&[cand(7, 0.5, "first"), cand(7, 0.5, "second")], 0.0);
        assert_eq!(out[0].source_text, "first");
    }

    #[test]
    fn groups_follow_first_seen_order() {
        let input = vec![
            cand(3, 0.1, ""),
            cand(1, 0.1, ""),
            cand(3, 0.1, ""),
            cand(2, 0.1, ""),
        ];
        let values: Vec<i64> = aggregate(&input, REPEAT_BOOST).iter().map(|c| c.value).collect();
        assert_eq!(values, vec![3, 1, 2]);
    }
}
