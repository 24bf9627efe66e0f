use serde::{Deserialize, Serialize};

use crate::{FeatureEntry, MatchCandidate, analysis::feature_index::SortedFeatures};

/// Which side of the threshold counts as a candidate.
///
/// `Below` flags neighbours (in feature order) whose blocks are spatially
/// close; `AtLeast` flags the ones that are far apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistancePredicate {
    #[default]
    Below,
    AtLeast,
}

impl DistancePredicate {
    pub fn accepts(&self, distance: f64, threshold: f64) -> bool {
        match self {
            DistancePredicate::Below => distance < threshold,
            DistancePredicate::AtLeast => distance >= threshold,
        }
    }
}

pub fn spatial_distance(a: &FeatureEntry, b: &FeatureEntry) -> f64 {
    let dx = a.x as f64 - b.x as f64;
    let dy = a.y as f64 - b.y as f64;

    (dx * dx + dy * dy).sqrt()
}

/// Scans adjacent pairs of sorted entries and reports the ones whose block
/// distance satisfies the predicate.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateDetector {
    threshold: f64,
    predicate: DistancePredicate,
}

impl DuplicateDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            predicate: DistancePredicate::default(),
        }
    }

    pub fn with_predicate(mut self, predicate: DistancePredicate) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn predicate(&self) -> DistancePredicate {
        self.predicate
    }

    pub fn compare(&self, first: &FeatureEntry, second: &FeatureEntry) -> Option<MatchCandidate> {
        let distance = spatial_distance(first, second);

        self.predicate
            .accepts(distance, self.threshold)
            .then(|| MatchCandidate {
                first: *first,
                second: *second,
                distance,
            })
    }

    pub fn scan(&self, sorted: &SortedFeatures) -> Vec<MatchCandidate> {
        sorted
            .entries()
            .windows(2)
            .filter_map(|pair| self.compare(&pair[0], &pair[1]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FeatureKind, analysis::feature_index::FeatureIndex};

    fn entry(x: u32, y: u32, value: f64) -> FeatureEntry {
        FeatureEntry {
            x,
            y,
            kind: FeatureKind::LumaDc,
            value,
        }
    }

    #[test]
    fn test_distance_is_euclidean() {
        assert!((spatial_distance(&entry(0, 0, 0.0), &entry(4, 4, 0.0)) - 32f64.sqrt()).abs() < 1e-12);
        assert_eq!(spatial_distance(&entry(7, 1, 0.0), &entry(4, 5, 0.0)), 5.0);
    }

    #[test]
    fn test_scan_reports_close_pairs() {
        let sorted = FeatureIndex::from_entries(vec![
            entry(0, 0, 1.0),
            entry(3, 4, 2.0),
            entry(50, 50, 3.0),
        ])
        .into_sorted();

        let candidates = DuplicateDetector::new(10.0).scan(&sorted);

        assert_eq!(candidates.len(), 1);
        assert_eq!((candidates[0].first.x, candidates[0].second.x), (0, 3));
        assert_eq!(candidates[0].distance, 5.0);
    }

    #[test]
    fn test_threshold_is_strict() {
        let detector = DuplicateDetector::new(5.0);
        assert!(detector.compare(&entry(0, 0, 0.0), &entry(3, 4, 0.0)).is_none());

        let far = DuplicateDetector::new(5.0).with_predicate(DistancePredicate::AtLeast);
        assert!(far.compare(&entry(0, 0, 0.0), &entry(3, 4, 0.0)).is_some());
    }

    #[test]
    fn test_predicates_partition_pairs() {
        let sorted = FeatureIndex::from_entries(vec![
            entry(0, 0, 1.0),
            entry(1, 0, 2.0),
            entry(40, 0, 3.0),
            entry(41, 1, 4.0),
        ])
        .into_sorted();

        let near = DuplicateDetector::new(10.0).scan(&sorted);
        let far = DuplicateDetector::new(10.0)
            .with_predicate(DistancePredicate::AtLeast)
            .scan(&sorted);

        assert_eq!(near.len(), 2);
        assert_eq!(far.len(), 1);
        assert_eq!(far[0].first.x, 1);
        assert_eq!(far[0].second.x, 40);
    }

    #[test]
    fn test_short_sequences_yield_nothing() {
        let detector = DuplicateDetector::new(10.0);
        assert!(detector.scan(&FeatureIndex::new().into_sorted()).is_empty());
        assert!(
            detector
                .scan(&FeatureIndex::from_entries(vec![entry(0, 0, 1.0)]).into_sorted())
                .is_empty()
        );
    }
}
