use moor_core::{Column, Row};
use std::{collections::HashMap, sync::Mutex};

/// One table: declared columns plus rows in insertion order.
#[derive(Debug, Default, Clone)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

/// The full table set. Cheap enough to clone, which is exactly what
/// transactions and savepoints snapshot.
pub type Tables = HashMap<String, Table>;

/// Committed database state, shared by every connection of a pool.
///
/// Transactions work on a private snapshot and publish it wholesale on
/// commit: this is a single-writer reference store, not an MVCC engine.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn snapshot(&self) -> Tables {
        self.tables.lock().expect("store mutex poisoned").clone()
    }

    pub(crate) fn publish(&self, tables: Tables) {
        *self.tables.lock().expect("store mutex poisoned") = tables;
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        f(&mut self.tables.lock().expect("store mutex poisoned"))
    }
}
