//! `QueryMetadata`: the side channel an `Engine::execute` call returns next
//! to its rows, carrying the planner/executor facts a client or test wants
//! to assert on without parsing `EXPLAIN` output.

use std::time::Duration;

use cynos_query::cost::AccessMethod;

/// Planner and execution facts for one `Engine::execute` call.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryMetadata {
    /// The access method the chosen physical plan drives its scan through.
    pub access_method: AccessMethod,
    /// Estimated output rows from the cost model, before execution.
    pub estimated_rows: f64,
    /// Rows the pull executor actually produced.
    pub actual_rows: usize,
    /// Wall-clock time spent inside the executor's `collect()` call.
    pub execution_time: Duration,
    /// Whether the chosen access method had to look a row up by its primary
    /// storage location on top of the index scan itself. Secondary indexes
    /// here never carry a full row payload, so every `IndexScan`/`IndexGet`/
    /// `IndexInGet` needs one; a table scan already reads primary storage
    /// directly and an empty plan reads nothing.
    pub requires_primary_lookup: bool,
}

impl QueryMetadata {
    /// The index name the chosen access method used, if any.
    pub fn index_name(&self) -> Option<&str> {
        match &self.access_method {
            AccessMethod::IndexScan { index, .. }
            | AccessMethod::IndexGet { index, .. }
            | AccessMethod::IndexInGet { index, .. } => Some(index.as_str()),
            AccessMethod::TableScan { .. } | AccessMethod::Empty => None,
        }
    }
}

/// Whether `method` needs a primary-storage lookup beyond its own scan.
pub(crate) fn requires_primary_lookup(method: &AccessMethod) -> bool {
    matches!(method, AccessMethod::IndexScan { .. } | AccessMethod::IndexGet { .. } | AccessMethod::IndexInGet { .. })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_name_is_none_for_table_scan() {
        let metadata = QueryMetadata {
            access_method: AccessMethod::TableScan { table: "t".into() },
            estimated_rows: 10.0,
            actual_rows: 10,
            execution_time: Duration::from_millis(1),
            requires_primary_lookup: false,
        };
        assert_eq!(metadata.index_name(), None);
    }

    #[test]
    fn test_index_name_reports_index_scan() {
        let metadata = QueryMetadata {
            access_method: AccessMethod::IndexScan { table: "t".into(), index: "idx_t_id".into() },
            estimated_rows: 1.0,
            actual_rows: 1,
            execution_time: Duration::from_micros(5),
            requires_primary_lookup: true,
        };
        assert_eq!(metadata.index_name(), Some("idx_t_id"));
    }

    #[test]
    fn test_requires_primary_lookup_true_for_index_access_methods() {
        assert!(requires_primary_lookup(&AccessMethod::IndexScan { table: "t".into(), index: "i".into() }));
        assert!(requires_primary_lookup(&AccessMethod::IndexGet { table: "t".into(), index: "i".into() }));
        assert!(requires_primary_lookup(&AccessMethod::IndexInGet { table: "t".into(), index: "i".into() }));
    }

    #[test]
    fn test_requires_primary_lookup_false_for_table_scan_and_empty() {
        assert!(!requires_primary_lookup(&AccessMethod::TableScan { table: "t".into() }));
        assert!(!requires_primary_lookup(&AccessMethod::Empty));
    }
}
