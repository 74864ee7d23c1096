use crate::{
    MemoryStore, Table, Tables,
    parse::{Command, Filter, parse},
};
use moor_core::{Column, Comparison, Connection, Cursor, Error, Result, Row, Value};
use std::{cmp::Ordering, collections::VecDeque, sync::Arc};

/// A connection to a [`MemoryStore`].
///
/// Outside a transaction every statement applies straight to the shared
/// committed state. `begin` takes a private working snapshot; savepoints
/// snapshot the working state, and rolling back to one restores it while the
/// savepoint itself stays valid for reuse.
#[derive(Debug)]
pub struct MemoryConnection {
    store: Arc<MemoryStore>,
    work: Option<Tables>,
    savepoints: Vec<(String, Tables)>,
}

impl MemoryConnection {
    pub(crate) fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            work: None,
            savepoints: Vec::new(),
        }
    }

    /// Whether a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.work.is_some()
    }

    /// Discard any open transaction state. Runs when a connection goes back
    /// to the pool, so an abandoned transaction cannot leak into the next
    /// session.
    pub(crate) fn reset(&mut self) {
        if self.work.take().is_some() {
            log::warn!("connection returned to the pool with an open transaction, rolling back");
        }
        self.savepoints.clear();
    }

    fn run(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        match parse(sql)? {
            Command::Savepoint(name) => {
                let Some(work) = &self.work else {
                    return Err(Error::msg("SAVEPOINT outside of a transaction"));
                };
                self.savepoints.push((name, work.clone()));
                Ok(Vec::new())
            }
            Command::ReleaseSavepoint(name) => {
                let position = self.position_of_savepoint(&name)?;
                // The changes merge into the enclosing scope; only the marker goes.
                self.savepoints.remove(position);
                Ok(Vec::new())
            }
            Command::RollbackToSavepoint(name) => {
                let position = self.position_of_savepoint(&name)?;
                self.work = Some(self.savepoints[position].1.clone());
                // The savepoint itself survives and can be rolled back to again.
                self.savepoints.truncate(position + 1);
                Ok(Vec::new())
            }
            command => match &mut self.work {
                Some(tables) => execute(tables, command, params),
                None => self.store.with(|tables| execute(tables, command, params)),
            },
        }
    }

    fn position_of_savepoint(&self, name: &str) -> Result<usize> {
        if self.work.is_none() {
            return Err(Error::msg("savepoint control outside of a transaction"));
        }
        self.savepoints
            .iter()
            .rposition(|(savepoint, _)| savepoint == name)
            .ok_or_else(|| Error::msg(format!("No such savepoint `{name}`")))
    }
}

impl Connection for MemoryConnection {
    type Cursor<'c>
        = MemoryCursor<'c>
    where
        Self: 'c;

    fn cursor(&mut self) -> MemoryCursor<'_> {
        MemoryCursor {
            connection: self,
            rows: VecDeque::new(),
        }
    }

    async fn begin(&mut self) -> Result<()> {
        if self.work.is_some() {
            return Err(Error::msg("A transaction is already in progress"));
        }
        self.work = Some(self.store.snapshot());
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        let work = self
            .work
            .take()
            .ok_or_else(|| Error::msg("No transaction in progress"))?;
        self.savepoints.clear();
        self.store.publish(work);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.work
            .take()
            .ok_or_else(|| Error::msg("No transaction in progress"))?;
        self.savepoints.clear();
        Ok(())
    }
}

/// Cursor over a [`MemoryConnection`]: executes one command at a time and
/// buffers its result rows.
pub struct MemoryCursor<'c> {
    connection: &'c mut MemoryConnection,
    rows: VecDeque<Row>,
}

impl Cursor for MemoryCursor<'_> {
    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<()> {
        log::trace!("memory: {sql} {params:?}");
        self.rows = self.connection.run(sql, params)?.into();
        Ok(())
    }

    async fn fetch_one(&mut self) -> Result<Option<Row>> {
        Ok(self.rows.pop_front())
    }

    async fn fetch_all(&mut self) -> Result<Vec<Row>> {
        Ok(self.rows.drain(..).collect())
    }

    async fn close(&mut self) -> Result<()> {
        self.rows.clear();
        Ok(())
    }
}

fn execute(tables: &mut Tables, command: Command, params: &[Value]) -> Result<Vec<Row>> {
    match command {
        Command::CreateTable {
            table,
            columns,
            if_not_exists,
        } => {
            if tables.contains_key(&table) {
                if if_not_exists {
                    return Ok(Vec::new());
                }
                return Err(Error::msg(format!("Table `{table}` already exists")));
            }
            tables.insert(
                table,
                Table {
                    columns,
                    rows: Vec::new(),
                },
            );
            Ok(Vec::new())
        }
        Command::DropTable { table, if_exists } => {
            if tables.remove(&table).is_none() && !if_exists {
                return Err(Error::msg(format!("No such table `{table}`")));
            }
            Ok(Vec::new())
        }
        Command::Insert {
            table,
            columns,
            params: count,
        } => {
            if params.len() != count {
                return Err(Error::msg(format!(
                    "Statement has {count} placeholders but {} parameters were bound",
                    params.len()
                )));
            }
            let table = lookup_mut(tables, &table)?;
            for name in &columns {
                position(&table.columns, name)?;
            }
            let row = table
                .columns
                .iter()
                .map(|column| {
                    columns
                        .iter()
                        .position(|name| *name == column.name)
                        .map(|index| params[index].clone())
                        .unwrap_or(Value::Null)
                })
                .collect();
            table.rows.push(row);
            Ok(Vec::new())
        }
        Command::Select {
            table,
            columns,
            filter,
        } => {
            let table = lookup(tables, &table)?;
            let projection = columns
                .iter()
                .map(|name| position(&table.columns, name))
                .collect::<Result<Vec<_>>>()?;
            let filters = resolve_filters(&table.columns, &filter)?;
            let mut rows = Vec::new();
            for row in &table.rows {
                if row_matches(row, &filters, params)? {
                    rows.push(projection.iter().map(|&index| row[index].clone()).collect());
                }
            }
            Ok(rows)
        }
        Command::Update {
            table,
            assignments,
            filter,
        } => {
            let table = lookup_mut(tables, &table)?;
            let targets = assignments
                .iter()
                .map(|name| position(&table.columns, name))
                .collect::<Result<Vec<_>>>()?;
            let filters = resolve_filters(&table.columns, &filter)?;
            let filter_params = &params[assignments.len()..];
            for row in &mut table.rows {
                if row_matches(row, &filters, filter_params)? {
                    for (value, &index) in params.iter().zip(&targets) {
                        row[index] = value.clone();
                    }
                }
            }
            Ok(Vec::new())
        }
        Command::Delete { table, filter } => {
            let table = lookup_mut(tables, &table)?;
            let filters = resolve_filters(&table.columns, &filter)?;
            let mut kept = Vec::with_capacity(table.rows.len());
            for row in &table.rows {
                kept.push(!row_matches(row, &filters, params)?);
            }
            let mut kept = kept.into_iter();
            table.rows.retain(|_| kept.next().unwrap_or(true));
            Ok(Vec::new())
        }
        Command::Savepoint(..) | Command::ReleaseSavepoint(..) | Command::RollbackToSavepoint(..) => {
            unreachable!("savepoint control is handled at the connection level")
        }
    }
}

fn lookup<'t>(tables: &'t Tables, name: &str) -> Result<&'t Table> {
    tables
        .get(name)
        .ok_or_else(|| Error::msg(format!("No such table `{name}`")))
}

fn lookup_mut<'t>(tables: &'t mut Tables, name: &str) -> Result<&'t mut Table> {
    tables
        .get_mut(name)
        .ok_or_else(|| Error::msg(format!("No such table `{name}`")))
}

fn position(columns: &[Column], name: &str) -> Result<usize> {
    columns
        .iter()
        .position(|column| column.name == name)
        .ok_or_else(|| Error::msg(format!("No such column `{name}`")))
}

fn resolve_filters(columns: &[Column], filter: &[Filter]) -> Result<Vec<(usize, Comparison)>> {
    filter
        .iter()
        .map(|f| Ok((position(columns, &f.column)?, f.comparison)))
        .collect()
}

fn row_matches(row: &Row, filters: &[(usize, Comparison)], params: &[Value]) -> Result<bool> {
    for ((index, comparison), param) in filters.iter().zip(params) {
        let value = &row[*index];
        // NULL never compares equal to anything, SQL style.
        if value.is_null() || param.is_null() {
            return Ok(false);
        }
        let ordering = compare(value, param)?;
        let matched = match comparison {
            Comparison::Equal => ordering == Ordering::Equal,
            Comparison::NotEqual => ordering != Ordering::Equal,
            Comparison::Less => ordering == Ordering::Less,
            Comparison::LessEqual => ordering != Ordering::Greater,
            Comparison::Greater => ordering == Ordering::Greater,
            Comparison::GreaterEqual => ordering != Ordering::Less,
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn compare(left: &Value, right: &Value) -> Result<Ordering> {
    Ok(match (left, right) {
        (Value::Boolean(Some(l)), Value::Boolean(Some(r))) => l.cmp(r),
        (Value::Int64(Some(l)), Value::Int64(Some(r))) => l.cmp(r),
        (Value::Float64(Some(l)), Value::Float64(Some(r))) => l
            .partial_cmp(r)
            .ok_or_else(|| Error::msg("Cannot order NaN"))?,
        (Value::Decimal(Some(l)), Value::Decimal(Some(r))) => l.cmp(r),
        (Value::Varchar(Some(l)), Value::Varchar(Some(r))) => l.cmp(r),
        (Value::Blob(Some(l)), Value::Blob(Some(r))) => l.cmp(r),
        (Value::Timestamp(Some(l)), Value::Timestamp(Some(r))) => l.cmp(r),
        (Value::Uuid(Some(l)), Value::Uuid(Some(r))) => l.cmp(r),
        (l, r) => return Err(Error::msg(format!("Cannot compare {l:?} with {r:?}"))),
    })
}
