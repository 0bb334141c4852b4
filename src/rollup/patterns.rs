//! Feature-subset fan-out
//!
//! Instead of the full power set of a site's features, an event is projected onto:
//! the empty projection, every contiguous run of features, and the two endpoints of
//! every run longer than two. That keeps fan-out quadratic while still covering every
//! single feature and every pair of features.

use std::collections::HashMap;

/// Which features of a site's ordered feature list take part in one projection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeaturePattern {
    slots: Vec<bool>,
}

impl FeaturePattern {
    fn blank(n: usize) -> Self {
        Self {
            slots: vec![false; n],
        }
    }

    fn with_filled(n: usize, positions: impl IntoIterator<Item = usize>) -> Self {
        let mut pattern = Self::blank(n);
        for i in positions {
            pattern.slots[i] = true;
        }
        pattern
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_filled(&self, position: usize) -> bool {
        self.slots.get(position).copied().unwrap_or(false)
    }

    /// Positions of the features taking part
    pub fn filled_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, filled)| **filled)
            .map(|(i, _)| i)
    }

    /// Slot view with the feature name where filled and `""` where blank
    pub fn names<'a>(&self, features: &'a [String]) -> Vec<&'a str> {
        features
            .iter()
            .enumerate()
            .map(|(i, name)| if self.is_filled(i) { name.as_str() } else { "" })
            .collect()
    }

    /// Materialize this pattern against actual feature values.
    ///
    /// Filled features take their value, blank ones the empty string. Returns `None`
    /// when a filled feature has no value or an empty one, since such a projection is
    /// inconsistent. An empty value would otherwise collide with the blank slot.
    pub fn combo(
        &self,
        features: &[String],
        values: &HashMap<String, String>,
    ) -> Option<FeatureCombo> {
        let mut entries = Vec::with_capacity(features.len());
        for (i, name) in features.iter().enumerate() {
            let value = if self.is_filled(i) {
                values.get(name).filter(|v| !v.is_empty())?.clone()
            } else {
                String::new()
            };
            entries.push((name.clone(), value));
        }
        Some(FeatureCombo { entries })
    }
}

/// One concrete partial-feature projection, in feature order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureCombo {
    entries: Vec<(String, String)>,
}

impl FeatureCombo {
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Combo for a partial value map: present features keep their value, the rest are blank
    pub fn partial(features: &[String], values: &HashMap<String, String>) -> Self {
        let entries = features
            .iter()
            .map(|name| (name.clone(), values.get(name).cloned().unwrap_or_default()))
            .collect();
        Self { entries }
    }

    pub fn get(&self, feature: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, value)| value.as_str())
    }
}

/// Generate the projection patterns for `n` ordered features.
///
/// Order: the all-blank pattern, then for each width `inc + 1` and each window
/// `[j - inc, j]` the window itself, followed by its endpoint pair when `inc > 1`.
pub fn feature_patterns(n: usize) -> Vec<FeaturePattern> {
    let mut patterns = vec![FeaturePattern::blank(n)];

    for inc in 0..n {
        for j in inc..n {
            patterns.push(FeaturePattern::with_filled(n, j - inc..=j));
            if inc > 1 {
                patterns.push(FeaturePattern::with_filled(n, [j - inc, j]));
            }
        }
    }

    patterns
}

/// Number of patterns [`feature_patterns`] yields for `n` features
pub fn pattern_count(n: usize) -> usize {
    let windows = n * (n + 1) / 2;
    let sparse_pairs = if n > 2 { (n - 1) * (n - 2) / 2 } else { 0 };
    1 + windows + sparse_pairs
}

/// All consistent combos of `values` for a site's ordered `features`
pub fn feature_combos(features: &[String], values: &HashMap<String, String>) -> Vec<FeatureCombo> {
    feature_patterns(features.len())
        .iter()
        .filter_map(|pattern| pattern.combo(features, values))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn names(features: &[&str]) -> Vec<String> {
        features.iter().map(|s| s.to_string()).collect()
    }

    fn filled(pattern: &FeaturePattern) -> Vec<usize> {
        pattern.filled_positions().collect()
    }

    #[test]
    fn test_four_feature_patterns() {
        let patterns = feature_patterns(4);
        let actual: Vec<Vec<usize>> = patterns.iter().map(filled).collect();

        let expected: Vec<Vec<usize>> = vec![
            vec![],
            // single features
            vec![0],
            vec![1],
            vec![2],
            vec![3],
            // adjacent pairs, no sparse duplicate
            vec![0, 1],
            vec![1, 2],
            vec![2, 3],
            // runs of three and their endpoints
            vec![0, 1, 2],
            vec![0, 2],
            vec![1, 2, 3],
            vec![1, 3],
            // full run and its endpoints
            vec![0, 1, 2, 3],
            vec![0, 3],
        ];
        assert_eq!(actual, expected);
        assert_eq!(patterns.len(), pattern_count(4));
    }

    #[test]
    fn test_patterns_are_distinct() {
        for n in 0..8 {
            let patterns = feature_patterns(n);
            let unique: HashSet<&FeaturePattern> = patterns.iter().collect();
            assert_eq!(unique.len(), patterns.len());
            assert_eq!(patterns.len(), pattern_count(n));
        }
    }

    #[test]
    fn test_small_pattern_sets() {
        assert_eq!(feature_patterns(0), vec![FeaturePattern::blank(0)]);
        let two: Vec<Vec<usize>> = feature_patterns(2).iter().map(filled).collect();
        assert_eq!(two, vec![vec![], vec![0], vec![1], vec![0, 1]]);
    }

    #[test]
    fn test_every_single_and_pair_is_covered() {
        let n = 5;
        let covered: HashSet<Vec<usize>> = feature_patterns(n).iter().map(filled).collect();

        for i in 0..n {
            assert!(covered.contains(&vec![i]));
            for j in i + 1..n {
                assert!(covered.contains(&vec![i, j]), "pair ({}, {}) missing", i, j);
            }
        }
        // Not a power set: a gapped triple is absent
        assert!(!covered.contains(&vec![0, 1, 3]));
    }

    #[test]
    fn test_pattern_names() {
        let features = names(&["feature1", "feature2", "feature3"]);
        let patterns = feature_patterns(3);
        // [0, 2] endpoint pair is the last pattern
        assert_eq!(
            patterns.last().unwrap().names(&features),
            vec!["feature1", "", "feature3"]
        );
    }

    #[test]
    fn test_combo_materialization() {
        let features = names(&["feature1", "feature2"]);
        let mut values = HashMap::new();
        values.insert("feature1".to_string(), "foo".to_string());
        values.insert("feature2".to_string(), "bar".to_string());

        let combos = feature_combos(&features, &values);
        let rendered: Vec<Vec<&str>> = combos
            .iter()
            .map(|c| c.entries().iter().map(|(_, v)| v.as_str()).collect())
            .collect();
        assert_eq!(
            rendered,
            vec![
                vec!["", ""],
                vec!["foo", ""],
                vec!["", "bar"],
                vec!["foo", "bar"],
            ]
        );
        assert_eq!(combos[1].get("feature1"), Some("foo"));
        assert_eq!(combos[1].get("feature2"), Some(""));
    }

    #[test]
    fn test_inconsistent_combos_discarded() {
        let features = names(&["feature1", "feature2"]);
        let mut values = HashMap::new();
        values.insert("feature1".to_string(), "foo".to_string());

        let combos = feature_combos(&features, &values);
        // Patterns that need feature2 are dropped
        assert_eq!(combos.len(), 2);
        assert!(combos.iter().all(|c| c.get("feature2") == Some("")));
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let features = names(&["feature1", "feature2"]);
        let mut values = HashMap::new();
        values.insert("feature1".to_string(), String::new());
        values.insert("feature2".to_string(), "bar".to_string());

        let combos = feature_combos(&features, &values);
        assert_eq!(combos.len(), 2);
        let unique: HashSet<&FeatureCombo> = combos.iter().collect();
        assert_eq!(unique.len(), combos.len());
        assert!(combos.iter().all(|c| c.get("feature1") == Some("")));
    }
}
