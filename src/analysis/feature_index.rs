use crate::FeatureEntry;

/// Collects descriptor entries from every block and orders them by value.
///
/// Entries are appended by a single producer in partitioner order, then the
/// index is consumed by [`FeatureIndex::into_sorted`].
#[derive(Debug, Clone, Default)]
pub struct FeatureIndex {
    entries: Vec<FeatureEntry>,
}

/// Entries in ascending value order. Equal values keep their insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedFeatures {
    entries: Vec<FeatureEntry>,
}

impl FeatureIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn from_entries(entries: Vec<FeatureEntry>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, entry: FeatureEntry) {
        self.entries.push(entry);
    }

    pub fn extend<I: IntoIterator<Item = FeatureEntry>>(&mut self, entries: I) {
        self.entries.extend(entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FeatureEntry] {
        &self.entries
    }

    /// Stable sort on `value` using the IEEE total order, O(n log n).
    pub fn into_sorted(mut self) -> SortedFeatures {
        self.entries.sort_by(|a, b| a.value.total_cmp(&b.value));

        SortedFeatures {
            entries: self.entries,
        }
    }
}

impl SortedFeatures {
    pub fn entries(&self) -> &[FeatureEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FeatureKind;

    fn entry(x: u32, y: u32, value: f64) -> FeatureEntry {
        FeatureEntry {
            x,
            y,
            kind: FeatureKind::LumaDc,
            value,
        }
    }

    #[test]
    fn test_sorted_is_non_decreasing_permutation() {
        let values = [5.0, -1.5, 3.25, 3.25, 0.0, 100.0, -7.0, 5.0, 2.0];
        let input = values
            .iter()
            .enumerate()
            .map(|(i, &v)| entry(i as u32, (i * 2) as u32, v))
            .collect::<Vec<_>>();

        let sorted = FeatureIndex::from_entries(input.clone()).into_sorted();

        assert_eq!(sorted.len(), input.len());
        assert!(sorted.entries().windows(2).all(|w| w[0].value <= w[1].value));

        let key = |e: &FeatureEntry| (e.x, e.y, e.value.to_bits());
        let mut a = input.iter().map(key).collect::<Vec<_>>();
        let mut b = sorted.entries().iter().map(key).collect::<Vec<_>>();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let mut index = FeatureIndex::new();
        index.push(entry(3, 0, 1.0));
        index.push(entry(1, 0, 0.5));
        index.push(entry(0, 0, 1.0));
        index.push(entry(2, 0, 1.0));

        let order = index
            .into_sorted()
            .entries()
            .iter()
            .map(|e| e.x)
            .collect::<Vec<_>>();

        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_empty_index() {
        let sorted = FeatureIndex::new().into_sorted();
        assert!(sorted.is_empty());
    }
}
