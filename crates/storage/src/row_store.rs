//! Row storage for a single table: the primary key index, secondary
//! indices, and the row map itself, kept consistent on every mutation.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use cynos_core::schema::Table;
use cynos_core::{Error, Result, Row, RowId, Value};

use crate::key_range::KeyRange;

#[cfg(feature = "hash-store")]
type RowMap = hashbrown::HashMap<RowId, Rc<Row>>;
#[cfg(not(feature = "hash-store"))]
type RowMap = BTreeMap<RowId, Rc<Row>>;

/// An ordered index over `Value` keys, mapping each key to the row IDs that
/// carry it. Backed by a `BTreeMap` so range scans come out in key order,
/// matching the cursor ordering guarantee index scans make to the planner.
pub trait IndexStore {
    fn add(&mut self, key: Value, row_id: RowId) -> Result<()>;
    fn set(&mut self, key: Value, row_id: RowId);
    fn get(&self, key: &Value) -> Vec<RowId>;
    fn remove(&mut self, key: &Value, row_id: Option<RowId>);
    fn contains_key(&self, key: &Value) -> bool;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn is_unique(&self) -> bool;
    fn clear(&mut self);
    fn get_range(&self, range: Option<&KeyRange<Value>>, reverse: bool, limit: Option<usize>, skip: usize) -> Vec<RowId>;
    fn get_all(&self) -> Vec<RowId>;
}

/// `BTreeMap`-backed [`IndexStore`]. Entries map one key to a small vector
/// of row IDs; unique indexes are simply never allowed to grow that vector
/// past one element.
pub struct BTreeIndexStore {
    entries: BTreeMap<Value, Vec<RowId>>,
    unique: bool,
    len: usize,
}

impl BTreeIndexStore {
    pub fn new(unique: bool) -> Self {
        Self { entries: BTreeMap::new(), unique, len: 0 }
    }
}

impl IndexStore for BTreeIndexStore {
    fn add(&mut self, key: Value, row_id: RowId) -> Result<()> {
        let slot = self.entries.entry(key.clone()).or_insert_with(Vec::new);
        if self.unique && !slot.is_empty() {
            return Err(Error::UniqueConstraint { column: "index".into(), value: key });
        }
        slot.push(row_id);
        self.len += 1;
        Ok(())
    }

    fn set(&mut self, key: Value, row_id: RowId) {
        let slot = self.entries.entry(key).or_insert_with(Vec::new);
        if !slot.contains(&row_id) {
            slot.push(row_id);
            self.len += 1;
        }
    }

    fn get(&self, key: &Value) -> Vec<RowId> {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    fn remove(&mut self, key: &Value, row_id: Option<RowId>) {
        let Some(slot) = self.entries.get_mut(key) else { return };
        match row_id {
            Some(id) => {
                let before = slot.len();
                slot.retain(|&r| r != id);
                self.len -= before - slot.len();
            }
            None => {
                self.len -= slot.len();
                slot.clear();
            }
        }
        if slot.is_empty() {
            self.entries.remove(key);
        }
    }

    fn contains_key(&self, key: &Value) -> bool {
        self.entries.contains_key(key)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn is_unique(&self) -> bool {
        self.unique
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.len = 0;
    }

    fn get_range(&self, range: Option<&KeyRange<Value>>, reverse: bool, limit: Option<usize>, skip: usize) -> Vec<RowId> {
        let mut out: Vec<RowId> = match range {
            None => self.entries.values().flatten().copied().collect(),
            Some(r) => self.entries.iter().filter(|(k, _)| r.contains(k)).flat_map(|(_, v)| v.iter().copied()).collect(),
        };
        if reverse {
            out.reverse();
        }
        let skipped = out.into_iter().skip(skip);
        match limit {
            Some(n) => skipped.take(n).collect(),
            None => skipped.collect(),
        }
    }

    fn get_all(&self) -> Vec<RowId> {
        self.entries.values().flatten().copied().collect()
    }
}

/// Extracts the index key for a composite key: single-column indices use
/// the column's own value directly, multi-column indices concatenate the
/// debug representation of each value (sufficient for equality and total
/// ordering, not intended to be human-readable).
fn extract_key(row: &Row, col_indices: &[usize]) -> Value {
    if col_indices.len() == 1 {
        row.get(col_indices[0]).cloned().unwrap_or(Value::Null)
    } else {
        let values: Vec<Value> = col_indices.iter().map(|&i| row.get(i).cloned().unwrap_or(Value::Null)).collect();
        let key_str: String = values.iter().map(|v| format!("{:?}", v)).collect::<Vec<_>>().join("|");
        Value::Text(key_str)
    }
}

/// Row storage for a single table: the row map plus the primary key index
/// and every secondary index declared on the table's schema.
pub struct RowStore {
    schema: Table,
    rows: RowMap,
    primary_index: Option<BTreeIndexStore>,
    pk_columns: Vec<usize>,
    secondary_indices: BTreeMap<String, BTreeIndexStore>,
    index_columns: BTreeMap<String, Vec<usize>>,
}

impl RowStore {
    pub fn new(schema: Table) -> Self {
        let mut store = Self {
            schema: schema.clone(),
            rows: RowMap::default(),
            primary_index: None,
            pk_columns: Vec::new(),
            secondary_indices: BTreeMap::new(),
            index_columns: BTreeMap::new(),
        };

        if let Some(pk) = schema.primary_key() {
            store.primary_index = Some(BTreeIndexStore::new(true));
            store.pk_columns = pk.columns().iter().filter_map(|c| schema.get_column_index(&c.name)).collect();
        }

        for idx in schema.indices() {
            let cols: Vec<usize> = idx.columns().iter().filter_map(|c| schema.get_column_index(&c.name)).collect();
            store.secondary_indices.insert(idx.name().to_string(), BTreeIndexStore::new(idx.is_unique()));
            store.index_columns.insert(idx.name().to_string(), cols);
        }

        store
    }

    pub fn schema(&self) -> &Table {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn insert(&mut self, row: Row) -> Result<RowId> {
        let row_id = row.id();
        if self.rows.contains_key(&row_id) {
            return Err(Error::invalid_operation("row id already exists"));
        }

        let pk_value = if !self.pk_columns.is_empty() {
            let pk = extract_key(&row, &self.pk_columns);
            if let Some(ref pk_index) = self.primary_index {
                if pk_index.contains_key(&pk) {
                    return Err(Error::UniqueConstraint { column: "primary_key".into(), value: pk });
                }
            }
            Some(pk)
        } else {
            None
        };

        if let (Some(ref mut pk_index), Some(pk)) = (&mut self.primary_index, pk_value) {
            if pk_index.add(pk.clone(), row_id).is_err() {
                return Err(Error::UniqueConstraint { column: "primary_key".into(), value: pk });
            }
        }

        let index_names: Vec<String> = self.index_columns.keys().cloned().collect();
        for idx_name in &index_names {
            let cols = &self.index_columns[idx_name];
            let key = extract_key(&row, cols);
            if let Some(idx) = self.secondary_indices.get_mut(idx_name) {
                if idx.add(key.clone(), row_id).is_err() {
                    self.rollback_insert(row_id, &row);
                    return Err(Error::UniqueConstraint { column: idx_name.clone(), value: key });
                }
            }
        }

        self.rows.insert(row_id, Rc::new(row));
        Ok(row_id)
    }

    fn rollback_insert(&mut self, row_id: RowId, row: &Row) {
        if let Some(ref mut pk_index) = self.primary_index {
            let pk_value = extract_key(row, &self.pk_columns);
            pk_index.remove(&pk_value, Some(row_id));
        }
        let index_names: Vec<String> = self.index_columns.keys().cloned().collect();
        for idx_name in &index_names {
            let cols = &self.index_columns[idx_name];
            let key = extract_key(row, cols);
            if let Some(idx) = self.secondary_indices.get_mut(idx_name) {
                idx.remove(&key, Some(row_id));
            }
        }
    }

    pub fn update(&mut self, row_id: RowId, new_row: Row) -> Result<()> {
        let old_row = self.rows.get(&row_id).ok_or_else(|| Error::not_found(self.schema.name(), Value::Int64(row_id as i64)))?.clone();

        if !self.pk_columns.is_empty() {
            let old_pk = extract_key(&old_row, &self.pk_columns);
            let new_pk = extract_key(&new_row, &self.pk_columns);
            if let Some(ref pk_index) = self.primary_index {
                if old_pk != new_pk && pk_index.contains_key(&new_pk) {
                    return Err(Error::UniqueConstraint { column: "primary_key".into(), value: new_pk });
                }
            }
        }

        for (idx_name, cols) in &self.index_columns {
            let old_key = extract_key(&old_row, cols);
            let new_key = extract_key(&new_row, cols);
            if let Some(idx) = self.secondary_indices.get(idx_name) {
                if idx.is_unique() && old_key != new_key && idx.contains_key(&new_key) {
                    return Err(Error::UniqueConstraint { column: idx_name.clone(), value: new_key });
                }
            }
        }

        if !self.pk_columns.is_empty() {
            let old_pk = extract_key(&old_row, &self.pk_columns);
            let new_pk = extract_key(&new_row, &self.pk_columns);
            if let Some(ref mut pk_index) = self.primary_index {
                if old_pk != new_pk {
                    pk_index.remove(&old_pk, Some(row_id));
                    let _ = pk_index.add(new_pk, row_id);
                }
            }
        }

        let index_names: Vec<String> = self.index_columns.keys().cloned().collect();
        for idx_name in &index_names {
            let cols = &self.index_columns[idx_name];
            let old_key = extract_key(&old_row, cols);
            let new_key = extract_key(&new_row, cols);
            if let Some(idx) = self.secondary_indices.get_mut(idx_name) {
                if old_key != new_key {
                    idx.remove(&old_key, Some(row_id));
                    let _ = idx.add(new_key, row_id);
                }
            }
        }

        self.rows.insert(row_id, Rc::new(new_row));
        Ok(())
    }

    pub fn delete(&mut self, row_id: RowId) -> Result<Rc<Row>> {
        let row = self.rows.remove(&row_id).ok_or_else(|| Error::not_found(self.schema.name(), Value::Int64(row_id as i64)))?;

        if !self.pk_columns.is_empty() {
            let pk_value = extract_key(&row, &self.pk_columns);
            if let Some(ref mut pk_index) = self.primary_index {
                pk_index.remove(&pk_value, Some(row_id));
            }
        }

        let index_names: Vec<String> = self.index_columns.keys().cloned().collect();
        for idx_name in &index_names {
            let cols = &self.index_columns[idx_name];
            let key = extract_key(&row, cols);
            if let Some(idx) = self.secondary_indices.get_mut(idx_name) {
                idx.remove(&key, Some(row_id));
            }
        }

        Ok(row)
    }

    pub fn get(&self, row_id: RowId) -> Option<Rc<Row>> {
        self.rows.get(&row_id).cloned()
    }

    /// Rows in primary-storage (row id) order — the order a plain table
    /// scan must produce.
    pub fn scan(&self) -> impl Iterator<Item = Rc<Row>> + '_ {
        self.rows.values().cloned()
    }

    pub fn row_ids(&self) -> Vec<RowId> {
        self.rows.keys().copied().collect()
    }

    pub fn get_by_pk(&self, pk_value: &Value) -> Vec<Rc<Row>> {
        match &self.primary_index {
            Some(pk_index) => pk_index.get(pk_value).iter().filter_map(|&id| self.rows.get(&id).cloned()).collect(),
            None => Vec::new(),
        }
    }

    pub fn find_row_id_by_pk(&self, row: &Row) -> Option<RowId> {
        let pk_index = self.primary_index.as_ref()?;
        let pk_value = extract_key(row, &self.pk_columns);
        pk_index.get(&pk_value).first().copied()
    }

    pub fn pk_exists(&self, pk_value: &Value) -> bool {
        self.primary_index.as_ref().is_some_and(|idx| idx.contains_key(pk_value))
    }

    /// Index-key-ordered scan, honoring a pushed-down range, direction and
    /// LIMIT/OFFSET — the access path the planner chooses when an index
    /// covers the query or narrows it enough to beat a table scan.
    pub fn index_scan_with_options(
        &self,
        index_name: &str,
        range: Option<&KeyRange<Value>>,
        limit: Option<usize>,
        offset: usize,
        reverse: bool,
    ) -> Vec<Rc<Row>> {
        self.index_scan_ids_with_options(index_name, range, limit, offset, reverse)
            .iter()
            .filter_map(|&id| self.rows.get(&id).cloned())
            .collect()
    }

    /// Row ids matching an index range, in index-key order, without the
    /// accompanying row fetch — the first half of a non-covering index scan.
    pub fn index_scan_ids_with_options(
        &self,
        index_name: &str,
        range: Option<&KeyRange<Value>>,
        limit: Option<usize>,
        offset: usize,
        reverse: bool,
    ) -> Vec<RowId> {
        match self.secondary_indices.get(index_name) {
            Some(idx) => idx.get_range(range, reverse, limit, offset),
            None => Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        if let Some(ref mut pk_index) = self.primary_index {
            pk_index.clear();
        }
        for idx in self.secondary_indices.values_mut() {
            idx.clear();
        }
    }

    pub fn get_many(&self, row_ids: &[RowId]) -> Vec<Option<Rc<Row>>> {
        row_ids.iter().map(|&id| self.rows.get(&id).cloned()).collect()
    }

    pub fn insert_or_replace(&mut self, row: Row) -> Result<(RowId, bool)> {
        if let Some(existing_row_id) = self.find_row_id_by_pk(&row) {
            let updated_row = Row::new(existing_row_id, row.values().to_vec());
            self.update(existing_row_id, updated_row)?;
            Ok((existing_row_id, true))
        } else {
            let row_id = self.insert(row)?;
            Ok((row_id, false))
        }
    }

    pub fn secondary_index_contains(&self, index_name: &str, key: &Value) -> bool {
        self.secondary_indices.get(index_name).is_some_and(|idx| idx.contains_key(key))
    }

    pub fn pk_columns(&self) -> &[usize] {
        &self.pk_columns
    }

    pub fn extract_pk(&self, row: &Row) -> Option<Value> {
        if self.pk_columns.is_empty() { None } else { Some(extract_key(row, &self.pk_columns)) }
    }

    pub fn has_index(&self, index_name: &str) -> bool {
        self.secondary_indices.contains_key(index_name)
    }
}
