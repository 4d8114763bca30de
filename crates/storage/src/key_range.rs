//! Key ranges for index scans: the shape the planner hands to the storage
//! layer when it pushes a WHERE predicate down onto an index (see the
//! index-pushdown optimizer).

/// A key range over an ordered key type, used by [`crate::cursor::RowSource`]
/// to bound an index scan.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyRange<K> {
    /// All keys.
    All,
    /// A single key (equality).
    Only(K),
    /// Keys >= (or >, if exclusive) a lower bound.
    LowerBound { value: K, exclusive: bool },
    /// Keys <= (or <, if exclusive) an upper bound.
    UpperBound { value: K, exclusive: bool },
    /// Keys between a lower and an upper bound.
    Bound { lower: K, upper: K, lower_exclusive: bool, upper_exclusive: bool },
}

impl<K: Clone + Ord> KeyRange<K> {
    pub fn all() -> Self {
        KeyRange::All
    }

    pub fn only(key: K) -> Self {
        KeyRange::Only(key)
    }

    pub fn lower_bound(value: K, exclusive: bool) -> Self {
        KeyRange::LowerBound { value, exclusive }
    }

    pub fn upper_bound(value: K, exclusive: bool) -> Self {
        KeyRange::UpperBound { value, exclusive }
    }

    pub fn bound(lower: K, upper: K, lower_exclusive: bool, upper_exclusive: bool) -> Self {
        KeyRange::Bound { lower, upper, lower_exclusive, upper_exclusive }
    }

    pub fn is_only(&self) -> bool {
        matches!(self, KeyRange::Only(_))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, KeyRange::All)
    }

    /// Checks if a key falls within this range.
    pub fn contains(&self, key: &K) -> bool {
        match self {
            KeyRange::All => true,
            KeyRange::Only(k) => key == k,
            KeyRange::LowerBound { value, exclusive } => {
                if *exclusive { key > value } else { key >= value }
            }
            KeyRange::UpperBound { value, exclusive } => {
                if *exclusive { key < value } else { key <= value }
            }
            KeyRange::Bound { lower, upper, lower_exclusive, upper_exclusive } => {
                let lower_ok = if *lower_exclusive { key > lower } else { key >= lower };
                let upper_ok = if *upper_exclusive { key < upper } else { key <= upper };
                lower_ok && upper_ok
            }
        }
    }

    /// Checks if two ranges overlap, used by the optimizer to decide whether
    /// two pushed-down conditions on the same index can be merged.
    pub fn overlaps(&self, other: &KeyRange<K>) -> bool {
        if self.is_all() || other.is_all() {
            return true;
        }
        match (self, other) {
            (KeyRange::Only(k1), KeyRange::Only(k2)) => k1 == k2,
            (KeyRange::Only(k), range) | (range, KeyRange::Only(k)) => range.contains(k),
            (KeyRange::LowerBound { .. }, KeyRange::LowerBound { .. }) => true,
            (KeyRange::UpperBound { .. }, KeyRange::UpperBound { .. }) => true,
            (
                KeyRange::LowerBound { value: lower, exclusive: lower_ex },
                KeyRange::UpperBound { value: upper, exclusive: upper_ex },
            )
            | (
                KeyRange::UpperBound { value: upper, exclusive: upper_ex },
                KeyRange::LowerBound { value: lower, exclusive: lower_ex },
            ) => {
                if *lower_ex || *upper_ex { lower < upper } else { lower <= upper }
            }
            (
                KeyRange::Bound { lower: l1, upper: u1, lower_exclusive: le1, upper_exclusive: ue1 },
                KeyRange::Bound { lower: l2, upper: u2, lower_exclusive: le2, upper_exclusive: ue2 },
            ) => {
                let first_before_second = if *ue1 || *le2 { u1 <= l2 } else { u1 < l2 };
                let second_before_first = if *ue2 || *le1 { u2 <= l1 } else { u2 < l1 };
                !first_before_second && !second_before_first
            }
            (KeyRange::Bound { upper, upper_exclusive, .. }, KeyRange::LowerBound { value, exclusive })
            | (KeyRange::LowerBound { value, exclusive }, KeyRange::Bound { upper, upper_exclusive, .. }) => {
                if *upper_exclusive || *exclusive { upper > value } else { upper >= value }
            }
            (KeyRange::Bound { lower, lower_exclusive, .. }, KeyRange::UpperBound { value, exclusive })
            | (KeyRange::UpperBound { value, exclusive }, KeyRange::Bound { lower, lower_exclusive, .. }) => {
                if *lower_exclusive || *exclusive { lower < value } else { lower <= value }
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_contains_everything() {
        let range: KeyRange<i32> = KeyRange::all();
        assert!(range.contains(&-100));
        assert!(range.contains(&100));
    }

    #[test]
    fn test_only() {
        let range = KeyRange::only(5);
        assert!(!range.contains(&4));
        assert!(range.contains(&5));
        assert!(!range.contains(&6));
    }

    #[test]
    fn test_bound_exclusive() {
        let range = KeyRange::bound(3, 7, true, true);
        assert!(!range.contains(&3));
        assert!(range.contains(&5));
        assert!(!range.contains(&7));
    }

    #[test]
    fn test_overlaps_disjoint_bounds() {
        let r1 = KeyRange::bound(1, 5, false, true);
        let r2 = KeyRange::bound(5, 10, false, false);
        assert!(!r1.overlaps(&r2));
        let r3 = KeyRange::bound(5, 10, true, false);
        assert!(!r1.overlaps(&r3));
    }

    #[test]
    fn test_overlaps_lower_upper() {
        let lower = KeyRange::lower_bound(5, false);
        let upper = KeyRange::upper_bound(5, false);
        assert!(lower.overlaps(&upper));
        let upper_ex = KeyRange::upper_bound(5, true);
        assert!(!lower.overlaps(&upper_ex));
    }
}
