//! Equi-depth histograms over `cynos_core::Value` columns.

use cynos_core::Value;

/// One bucket of an equi-depth histogram.
#[derive(Clone, Debug)]
pub struct HistogramBucket {
    pub lower_bound: Value,
    pub upper_bound: Value,
    pub count: u64,
    pub distinct: u64,
}

/// An equi-depth histogram: buckets are constructed so each holds
/// approximately the same row count, with bounds taken from the sampled
/// extremes. Buckets are non-overlapping and sorted by `lower_bound`.
#[derive(Clone, Debug, Default)]
pub struct Histogram {
    pub buckets: Vec<HistogramBucket>,
    pub total_count: u64,
    pub distinct_count: u64,
}

impl Histogram {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds an equi-depth histogram from already-sorted sample values,
    /// split into up to `num_buckets` buckets of approximately equal count.
    /// Natural ordering (via `Ord`) is used for every value tag, which
    /// gives text columns lexicographic bucketing and numeric columns
    /// magnitude bucketing — there is no special-cased fallback for
    /// categorical columns.
    pub fn build(mut sorted_values: Vec<Value>, num_buckets: usize) -> Self {
        if sorted_values.is_empty() || num_buckets == 0 {
            return Self::empty();
        }
        sorted_values.sort();
        let total = sorted_values.len();
        let bucket_size = (total / num_buckets).max(1);
        let mut buckets = Vec::new();
        let mut i = 0;
        while i < total {
            let end = (i + bucket_size).min(total);
            let slice = &sorted_values[i..end];
            let lower = slice.first().cloned().unwrap_or(Value::Null);
            let upper = slice.last().cloned().unwrap_or(Value::Null);
            let mut distinct_in_bucket: Vec<&Value> = slice.iter().collect();
            distinct_in_bucket.dedup_by(|a, b| a == b);
            buckets.push(HistogramBucket {
                lower_bound: lower,
                upper_bound: upper,
                count: slice.len() as u64,
                distinct: distinct_in_bucket.len() as u64,
            });
            i = end;
        }
        let mut all_distinct: Vec<&Value> = sorted_values.iter().collect();
        all_distinct.dedup_by(|a, b| a == b);
        Self { total_count: total as u64, distinct_count: all_distinct.len() as u64, buckets }
    }

    /// Estimates the selectivity of `low <= col <= high` by summing
    /// overlap-weighted bucket frequencies. Returns a conservative default
    /// when there are no buckets to consult.
    pub fn selectivity_range(&self, low: &Value, high: &Value) -> f64 {
        if self.buckets.is_empty() || self.total_count == 0 {
            return 0.3;
        }
        let mut matched = 0f64;
        for bucket in &self.buckets {
            let overlap = Self::overlap_fraction(bucket, low, high);
            matched += overlap * bucket.count as f64;
        }
        (matched / self.total_count as f64).clamp(0.0, 1.0)
    }

    fn overlap_fraction(bucket: &HistogramBucket, low: &Value, high: &Value) -> f64 {
        // No overlap if the query range is entirely outside the bucket.
        if high < &bucket.lower_bound || low > &bucket.upper_bound {
            return 0.0;
        }
        if bucket.lower_bound == bucket.upper_bound {
            return 1.0;
        }
        let bucket_lo = bucket.lower_bound.as_numeric();
        let bucket_hi = bucket.upper_bound.as_numeric();
        let q_lo = low.as_numeric();
        let q_hi = high.as_numeric();
        match (bucket_lo, bucket_hi, q_lo, q_hi) {
            (Some(blo), Some(bhi), _, _) if bhi > blo => {
                let effective_lo = q_lo.map(|v| v.max(blo)).unwrap_or(blo);
                let effective_hi = q_hi.map(|v| v.min(bhi)).unwrap_or(bhi);
                ((effective_hi - effective_lo) / (bhi - blo)).clamp(0.0, 1.0)
            }
            _ => 1.0,
        }
    }

    /// Invariant check used by tests and by the stats store's background
    /// refresher before publishing a newly built histogram.
    pub fn check_invariants(&self) -> bool {
        let sum: u64 = self.buckets.iter().map(|b| b.count).sum();
        if sum != self.total_count {
            return false;
        }
        for pair in self.buckets.windows(2) {
            if pair[0].upper_bound > pair[1].lower_bound {
                return false;
            }
        }
        true
    }
}
