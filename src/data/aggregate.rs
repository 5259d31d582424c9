//! Per-experience-band salary distributions.
//!
//! Quartiles use nearest rank by truncation: for `n` sorted values,
//! `q1 = values[floor(n * 0.25)]` and `q3 = values[floor(n * 0.75)]`. No
//! interpolation is applied, so results on small samples match the
//! published calculator figures exactly.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::model::{ExperienceBand, Observation};

// ---------------------------------------------------------------------------
// DistributionSummary – five numbers and a count
// ---------------------------------------------------------------------------

/// Five-number summary of one band's salaries.
///
/// `min <= q1 <= median <= q3 <= max` and `count >= 1`; empty bands never
/// produce a summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub count: usize,
}

impl DistributionSummary {
    /// Summarise values already sorted ascending. `None` for an empty slice.
    pub fn from_sorted(values: &[f64]) -> Option<Self> {
        let n = values.len();
        if n == 0 {
            return None;
        }

        // Halve before adding so two large middle values cannot overflow.
        let median = if n % 2 == 0 {
            values[n / 2 - 1] / 2.0 + values[n / 2] / 2.0
        } else {
            values[(n - 1) / 2]
        };

        // floor(n * 0.25) and floor(n * 0.75) in integer arithmetic.
        Some(DistributionSummary {
            min: values[0],
            q1: values[n / 4],
            median,
            q3: values[n * 3 / 4],
            max: values[n - 1],
            count: n,
        })
    }

    /// Sort a copy of `values` and summarise it.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted)
    }
}

// ---------------------------------------------------------------------------
// Summary – result of one aggregation
// ---------------------------------------------------------------------------

/// Summaries keyed by band plus an account of what could not be placed.
///
/// Iterating `summaries` yields bands in canonical order. Bands without
/// observations are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub summaries: BTreeMap<ExperienceBand, DistributionSummary>,
    /// Observations whose experience label is not a canonical band.
    pub skipped_count: usize,
    /// Distinct unrecognised labels, for diagnostics.
    pub skipped_labels: BTreeSet<String>,
}

impl Summary {
    pub fn get(&self, band: ExperienceBand) -> Option<&DistributionSummary> {
        self.summaries.get(&band)
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Least experienced band that has data.
    pub fn headline_band(&self) -> Option<ExperienceBand> {
        self.summaries.keys().next().copied()
    }

    /// Largest band maximum, never below `floor`. Sizes a shared salary axis.
    pub fn axis_max(&self, floor: f64) -> f64 {
        self.summaries
            .values()
            .map(|s| s.max)
            .fold(floor, f64::max)
    }

    /// Observations that contributed to some band.
    pub fn total_count(&self) -> usize {
        self.summaries.values().map(|s| s.count).sum()
    }
}

/// Group `observations` by experience band and summarise each band.
///
/// Observations with an unrecognised band label are left out and counted
/// in [`Summary::skipped_count`]. Input order within a band is preserved
/// up to the sort, which is stable.
pub fn summarize(observations: &[Observation]) -> Summary {
    let mut by_band: BTreeMap<ExperienceBand, Vec<f64>> = BTreeMap::new();
    let mut skipped_count = 0;
    let mut skipped_labels = BTreeSet::new();

    for obs in observations {
        match obs.band() {
            Some(band) => by_band.entry(band).or_default().push(obs.value),
            None => {
                skipped_count += 1;
                skipped_labels.insert(obs.experience.clone());
            }
        }
    }

    if skipped_count > 0 {
        log::debug!("Skipped {skipped_count} observations with unrecognised bands: {skipped_labels:?}");
    }

    let summaries = by_band
        .into_iter()
        .filter_map(|(band, mut values)| {
            values.sort_by(f64::total_cmp);
            DistributionSummary::from_sorted(&values).map(|s| (band, s))
        })
        .collect();

    Summary {
        summaries,
        skipped_count,
        skipped_labels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(experience: &str, value: f64) -> Observation {
        Observation {
            value,
            experience: experience.to_string(),
            country: "United Kingdom".to_string(),
            language: "C#".to_string(),
        }
    }

    fn assert_ordered(s: &DistributionSummary) {
        assert!(s.min <= s.q1, "{s:?}");
        assert!(s.q1 <= s.median, "{s:?}");
        assert!(s.median <= s.q3, "{s:?}");
        assert!(s.q3 <= s.max, "{s:?}");
    }

    #[test]
    fn test_four_values() {
        let list: Vec<_> = [10.0, 20.0, 30.0, 40.0]
            .iter()
            .map(|&v| obs("3–5 years", v))
            .collect();
        let summary = summarize(&list);
        let s = summary.get(ExperienceBand::ThreeToFive).unwrap();
        assert_eq!(
            *s,
            DistributionSummary {
                min: 10.0,
                q1: 20.0,
                median: 25.0,
                q3: 40.0,
                max: 40.0,
                count: 4,
            }
        );
        assert_eq!(summary.summaries.len(), 1);
        assert_eq!(summary.skipped_count, 0);
    }

    #[test]
    fn test_single_value() {
        let summary = summarize(&[obs("<1 year", 15.0)]);
        let s = summary.get(ExperienceBand::LessThanOne).unwrap();
        assert_eq!(s.count, 1);
        for v in [s.min, s.q1, s.median, s.q3, s.max] {
            assert_eq!(v, 15.0);
        }
    }

    #[test]
    fn test_two_values() {
        let summary = summarize(&[obs("1–2 years", 70.0), obs("1–2 years", 30.0)]);
        let s = summary.get(ExperienceBand::OneToTwo).unwrap();
        assert_eq!(s.min, 30.0);
        assert_eq!(s.max, 70.0);
        assert_eq!(s.median, 50.0);
        assert_eq!(s.q1, 30.0);
        assert_eq!(s.q3, 70.0);
    }

    #[test]
    fn test_odd_count_median() {
        let s = DistributionSummary::from_values(&[5.0, 1.0, 3.0, 9.0, 7.0]).unwrap();
        assert_eq!(s.median, 5.0);
        // floor(5 * 0.25) = 1, floor(5 * 0.75) = 3
        assert_eq!(s.q1, 3.0);
        assert_eq!(s.q3, 7.0);
    }

    #[test]
    fn test_truncation_indices_with_ties() {
        let s = DistributionSummary::from_values(&[50.0, 10.0, 10.0, 50.0, 30.0, 30.0, 30.0])
            .unwrap();
        // sorted: 10 10 30 30 30 50 50; q1 = [1], q3 = [5]
        assert_eq!(s.q1, 10.0);
        assert_eq!(s.median, 30.0);
        assert_eq!(s.q3, 50.0);
        assert_eq!(s.count, 7);
    }

    #[test]
    fn test_empty_values() {
        assert!(DistributionSummary::from_sorted(&[]).is_none());
        let summary = summarize(&[]);
        assert!(summary.is_empty());
        assert_eq!(summary.skipped_count, 0);
        assert_eq!(summary.headline_band(), None);
    }

    #[test]
    fn test_unrecognised_band_is_skipped() {
        let mut list: Vec<_> = [60.0, 90.0, 75.0, 110.0]
            .iter()
            .map(|&v| obs("6–10 years", v))
            .collect();
        list.insert(2, obs("unknown", 500.0));

        let summary = summarize(&list);
        assert_eq!(summary.summaries.len(), 1);
        assert_eq!(summary.get(ExperienceBand::SixToTen).unwrap().count, 4);
        assert_eq!(summary.skipped_count, 1);
        assert!(summary.skipped_labels.contains("unknown"));
        assert_eq!(summary.total_count(), 4);
    }

    #[test]
    fn test_empty_bands_omitted_and_canonical_order() {
        let list = vec![
            obs("16+ years", 200.0),
            obs("<1 year", 20.0),
            obs("6–10 years", 90.0),
            obs("16+ years", 180.0),
        ];
        let summary = summarize(&list);
        let bands: Vec<_> = summary.summaries.keys().copied().collect();
        assert_eq!(
            bands,
            vec![
                ExperienceBand::LessThanOne,
                ExperienceBand::SixToTen,
                ExperienceBand::SixteenPlus,
            ]
        );
        assert!(summary.get(ExperienceBand::OneToTwo).is_none());
        assert_eq!(summary.headline_band(), Some(ExperienceBand::LessThanOne));
    }

    #[test]
    fn test_hyphen_alias_shares_band() {
        let summary = summarize(&[obs("3-5 years", 40.0), obs("3–5 years", 60.0)]);
        assert_eq!(summary.get(ExperienceBand::ThreeToFive).unwrap().count, 2);
        assert_eq!(summary.skipped_count, 0);
    }

    #[test]
    fn test_idempotent() {
        let list: Vec<_> = (0..37)
            .map(|i| {
                let band = ExperienceBand::ALL[i % 6].label();
                obs(band, ((i * 7919) % 113) as f64)
            })
            .chain(std::iter::once(obs("n/a", 1.0)))
            .collect();
        assert_eq!(summarize(&list), summarize(&list));
    }

    #[test]
    fn test_ordering_invariant_many_sizes() {
        for n in 1..=40usize {
            let values: Vec<f64> = (0..n).map(|i| ((i * 37 + 11) % 23) as f64).collect();
            let s = DistributionSummary::from_values(&values).unwrap();
            assert_eq!(s.count, n);
            assert_ordered(&s);
        }
    }

    #[test]
    fn test_median_of_huge_values_stays_finite() {
        let big = f64::MAX / 1.5;
        let summary = summarize(&[obs("<1 year", big), obs("<1 year", big)]);
        let s = summary.get(ExperienceBand::LessThanOne).unwrap();
        assert!(s.median.is_finite());
        assert_eq!(s.median, big);
        assert_ordered(s);

        let s = DistributionSummary::from_values(&[f64::MAX, f64::MAX / 2.0]).unwrap();
        assert!(s.median.is_finite());
        assert_ordered(&s);
    }

    #[test]
    fn test_axis_max() {
        let summary = summarize(&[obs("<1 year", 40.0), obs("16+ years", 255.0)]);
        assert_eq!(summary.axis_max(100.0), 255.0);
        let small = summarize(&[obs("<1 year", 40.0)]);
        assert_eq!(small.axis_max(100.0), 100.0);
    }

    #[test]
    fn test_input_not_mutated() {
        let list = vec![obs("<1 year", 30.0), obs("<1 year", 10.0)];
        let before = list.clone();
        let _ = summarize(&list);
        assert_eq!(list, before);
    }

    #[test]
    fn test_serialize_keys_are_labels() {
        let summary = summarize(&[obs("11–16 years", 120.0)]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["summaries"]["11–16 years"]["count"], 1);
        assert_eq!(json["skipped_count"], 0);
    }
}
