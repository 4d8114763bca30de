//! The `Cursor`/`RowSource` contract between the planner and the storage
//! layer: a row source opens a cursor either over an entire table (in
//! physical row order) or over one index (in index-key order, optionally
//! reversed), honoring a pushed-down key range and LIMIT/OFFSET.
//!
//! Secondary indexes here map a key to a `RowId`, not to a full row payload,
//! so reading anything beyond the indexed columns means a second lookup
//! against the table's primary storage. `RowSource::lookup_by_primary` is
//! that second step, made explicit so a non-covering index scan can be seen
//! doing it rather than it happening implicitly inside a cursor.

use alloc::rc::Rc;
use alloc::vec::Vec;
use cynos_core::{Result, Row, RowId, Value};

use crate::catalog::InMemoryCatalog;
use crate::key_range::KeyRange;

/// A single open scan. `next()` is the only method the pull-model executor
/// calls in its per-row loop; everything else is setup.
pub trait Cursor {
    fn next(&mut self) -> Result<Option<Rc<Row>>>;
}

/// What the physical planner asks the storage layer for: either a full
/// table scan or a scan of one named index, in the order and bounds the
/// planner chose.
pub enum ScanRequest<'a> {
    Table { table: &'a str },
    Index { table: &'a str, index: &'a str, range: Option<KeyRange<Value>>, reverse: bool, limit: Option<usize>, offset: usize },
}

/// Opens [`Cursor`]s against an [`InMemoryCatalog`]. This is the only path
/// the executor uses to read rows; it never reaches into `RowStore`
/// directly.
pub trait RowSource {
    fn open(&self, request: ScanRequest<'_>) -> Result<alloc::boxed::Box<dyn Cursor + '_>>;

    /// Fetches one row directly by its row id. The path a non-covering
    /// index scan takes once it has a row id out of the index but still
    /// needs columns the index entry itself doesn't carry.
    fn lookup_by_primary(&self, table: &str, row_id: RowId) -> Result<Option<Rc<Row>>>;

    /// Row ids an index scan matches, in index-key order, without fetching
    /// the rows themselves. Pair with [`RowSource::lookup_by_primary`] to
    /// complete a non-covering index scan.
    fn index_row_ids(
        &self,
        table: &str,
        index: &str,
        range: Option<KeyRange<Value>>,
        reverse: bool,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<RowId>>;
}

struct VecCursor {
    rows: Vec<Rc<Row>>,
    pos: usize,
}

impl Cursor for VecCursor {
    fn next(&mut self) -> Result<Option<Rc<Row>>> {
        if self.pos >= self.rows.len() {
            return Ok(None);
        }
        let row = self.rows[self.pos].clone();
        self.pos += 1;
        Ok(Some(row))
    }
}

impl RowSource for InMemoryCatalog {
    fn open(&self, request: ScanRequest<'_>) -> Result<alloc::boxed::Box<dyn Cursor + '_>> {
        match request {
            ScanRequest::Table { table } => {
                let store = self.row_store(table)?;
                let rows: Vec<Rc<Row>> = store.scan().collect();
                Ok(alloc::boxed::Box::new(VecCursor { rows, pos: 0 }))
            }
            ScanRequest::Index { table, index, range, reverse, limit, offset } => {
                let store = self.row_store(table)?;
                let ids = store.index_scan_ids_with_options(index, range.as_ref(), limit, offset, reverse);
                let rows: Vec<Rc<Row>> = ids.iter().filter_map(|&id| store.get(id)).collect();
                Ok(alloc::boxed::Box::new(VecCursor { rows, pos: 0 }))
            }
        }
    }

    fn lookup_by_primary(&self, table: &str, row_id: RowId) -> Result<Option<Rc<Row>>> {
        let store = self.row_store(table)?;
        Ok(store.get(row_id))
    }

    fn index_row_ids(
        &self,
        table: &str,
        index: &str,
        range: Option<KeyRange<Value>>,
        reverse: bool,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<RowId>> {
        let store = self.row_store(table)?;
        Ok(store.index_scan_ids_with_options(index, range.as_ref(), limit, offset, reverse))
    }
}
