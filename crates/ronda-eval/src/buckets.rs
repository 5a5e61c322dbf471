//! Cross-sectional bucketing of formation signals.
//!
//! Each formation period is ranked on its own: quantile cut points are computed
//! from that period's signals only, and every security is placed in the bin its
//! signal falls into. Bucket 1 holds the lowest signals, bucket B the highest.

use rayon::prelude::*;
use ronda_traits::{CrossSection, Period, SecurityId, SignalPanel};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Bucket assignments formed in a single period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cohort {
    /// `(security, bucket)` pairs; buckets are 1-based.
    pub members: Vec<(SecurityId, usize)>,
    /// Number of distinct bins that survived cut-point de-duplication.
    pub n_bins: usize,
}

impl Cohort {
    /// Securities placed in `bucket` (1-based).
    pub fn members_of(&self, bucket: usize) -> impl Iterator<Item = SecurityId> + '_ {
        self.members
            .iter()
            .filter(move |(_, b)| *b == bucket)
            .map(|(s, _)| *s)
    }

    /// Bucket of a security, if it was ranked in this period.
    pub fn bucket_of(&self, security: SecurityId) -> Option<usize> {
        self.members
            .iter()
            .find(|(s, _)| *s == security)
            .map(|(_, b)| *b)
    }
}

/// Bucket assignments for every formation period of one signal window.
///
/// Built once per window and shared read-only across holding lengths.
#[derive(Debug, Clone, Default)]
pub struct BucketHistory {
    n_buckets: usize,
    cohorts: BTreeMap<Period, Cohort>,
    degenerate: usize,
}

impl BucketHistory {
    /// Configured number of buckets B.
    pub const fn n_buckets(&self) -> usize {
        self.n_buckets
    }

    /// Cohort formed in `period`, if any security was ranked then.
    pub fn get(&self, period: Period) -> Option<&Cohort> {
        self.cohorts.get(&period)
    }

    /// Formation periods in chronological order.
    pub fn periods(&self) -> impl Iterator<Item = Period> + '_ {
        self.cohorts.keys().copied()
    }

    /// Number of formation periods.
    pub fn len(&self) -> usize {
        self.cohorts.len()
    }

    /// Whether no period was ranked.
    pub fn is_empty(&self) -> bool {
        self.cohorts.is_empty()
    }

    /// Formation periods that produced fewer than B bins.
    pub const fn degenerate_cross_sections(&self) -> usize {
        self.degenerate
    }

    /// Population of each bucket in `period`; index 0 is bucket 1.
    pub fn bucket_counts(&self, period: Period) -> Vec<usize> {
        let mut counts = vec![0; self.n_buckets];
        if let Some(cohort) = self.cohorts.get(&period) {
            for &(_, bucket) in &cohort.members {
                counts[bucket - 1] += 1;
            }
        }
        counts
    }
}

/// Ranks a cross section into B equal-population buckets.
#[derive(Debug, Clone, Copy)]
pub struct Bucketizer {
    n_buckets: usize,
}

impl Bucketizer {
    /// Create a bucketizer for `n_buckets` buckets (at least one).
    pub fn new(n_buckets: usize) -> Self {
        Self {
            n_buckets: n_buckets.max(1),
        }
    }

    /// Number of buckets B.
    pub const fn n_buckets(&self) -> usize {
        self.n_buckets
    }

    /// Quantile cut points of `values`, with duplicates removed.
    ///
    /// Cut point `k` sits at position `k * (n - 1) / B` of the sorted values,
    /// interpolating linearly between neighbours. Non-finite values are ignored.
    pub fn cut_points(&self, values: &[f64]) -> Vec<f64> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
        if sorted.is_empty() {
            return Vec::new();
        }
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let b = self.n_buckets;
        let mut edges: Vec<f64> = (0..=b)
            .map(|k| {
                let numerator = k * (n - 1);
                let (lo, rem) = (numerator / b, numerator % b);
                if rem == 0 {
                    sorted[lo]
                } else {
                    let frac = rem as f64 / b as f64;
                    sorted[lo] + (sorted[lo + 1] - sorted[lo]) * frac
                }
            })
            .collect();
        edges.dedup();
        edges
    }

    /// Bucket (1-based) of every value, and the number of surviving bins.
    ///
    /// Bins are right-closed with the lowest edge included. Non-finite values
    /// get bucket 0. With fewer than two distinct values there is no bin at all
    /// and every value gets bucket 0.
    pub fn assign(&self, values: &[f64]) -> (Vec<usize>, usize) {
        let edges = self.cut_points(values);
        if edges.len() < 2 {
            return (vec![0; values.len()], 0);
        }
        let n_bins = edges.len() - 1;

        let buckets = values
            .iter()
            .map(|&x| {
                if x.is_finite() {
                    (edges[1..].partition_point(|&e| e < x) + 1).min(n_bins)
                } else {
                    0
                }
            })
            .collect();

        (buckets, n_bins)
    }

    /// Ranks one cross section into a cohort.
    pub fn rank(&self, section: &CrossSection) -> Cohort {
        let (buckets, n_bins) = self.assign(&section.values);
        let members = section
            .securities
            .iter()
            .zip(buckets)
            .filter(|(_, bucket)| *bucket > 0)
            .map(|(&security, bucket)| (security, bucket))
            .collect();
        Cohort { members, n_bins }
    }

    /// Ranks every formation period of a panel independently.
    pub fn bucketize(&self, panel: &SignalPanel) -> BucketHistory {
        let sections: Vec<(Period, &CrossSection)> = panel.iter().collect();

        let ranked: Vec<(Period, Cohort)> = sections
            .into_par_iter()
            .filter(|(_, section)| !section.is_empty())
            .map(|(period, section)| (period, self.rank(section)))
            .collect();

        let degenerate = ranked
            .iter()
            .filter(|(period, cohort)| {
                let collapsed = cohort.n_bins < self.n_buckets;
                if collapsed {
                    debug!(
                        period = period.ordinal(),
                        bins = cohort.n_bins,
                        buckets = self.n_buckets,
                        "cut points collapsed"
                    );
                }
                collapsed
            })
            .count();

        if degenerate > 0 {
            warn!(
                window = panel.window(),
                periods = degenerate,
                "cross sections too small or too tied for {} buckets",
                self.n_buckets
            );
        }

        let cohorts = ranked
            .into_iter()
            .filter(|(_, cohort)| !cohort.members.is_empty())
            .collect();

        BucketHistory {
            n_buckets: self.n_buckets,
            cohorts,
            degenerate,
        }
    }
}
