use crate::{Column, ColumnType, Error, Predicate, Result, Statement, Value, separated_by};
use std::sync::Arc;

/// A statement compiled for execution: SQL text, positional parameters and
/// the result-column descriptors rows will be decoded with.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub sql: String,
    pub params: Vec<Value>,
    pub columns: Arc<[Column]>,
}

/// Compiles abstract statements into driver SQL.
///
/// Default bodies produce standard SQL; a driver overrides the pieces its
/// engine spells differently (placeholder style, identifier quoting, column
/// type names) and inherits the rest.
pub trait Dialect: Send + Sync {
    fn write_identifier(&self, sql: &mut String, name: &str) {
        sql.push_str(name);
    }

    /// Write the placeholder for the parameter at `index` (1-based).
    fn write_placeholder(&self, sql: &mut String, index: usize) {
        let _ = index;
        sql.push('?');
    }

    fn write_column_type(&self, sql: &mut String, ty: &ColumnType) {
        sql.push_str(match ty {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Integer => "BIGINT",
            ColumnType::Float => "DOUBLE",
            ColumnType::Decimal => "DECIMAL",
            ColumnType::Text => "VARCHAR",
            ColumnType::Blob => "BLOB",
            ColumnType::Timestamp => "TIMESTAMPTZ",
            ColumnType::Uuid => "UUID",
        });
    }

    fn write_savepoint(&self, sql: &mut String, name: &str) {
        sql.push_str("SAVEPOINT ");
        self.write_identifier(sql, name);
    }

    fn write_release_savepoint(&self, sql: &mut String, name: &str) {
        sql.push_str("RELEASE SAVEPOINT ");
        self.write_identifier(sql, name);
    }

    fn write_rollback_to_savepoint(&self, sql: &mut String, name: &str) {
        sql.push_str("ROLLBACK TO SAVEPOINT ");
        self.write_identifier(sql, name);
    }

    /// Append the `WHERE` clause for `filter`, pushing its values onto
    /// `params` in placeholder order.
    fn write_filter(&self, sql: &mut String, params: &mut Vec<Value>, filter: &[Predicate]) {
        if filter.is_empty() {
            return;
        }
        sql.push_str(" WHERE ");
        let mut first = true;
        for predicate in filter {
            if !first {
                sql.push_str(" AND ");
            }
            first = false;
            self.write_identifier(sql, &predicate.column);
            sql.push(' ');
            sql.push_str(predicate.comparison.symbol());
            sql.push(' ');
            params.push(predicate.value.clone());
            self.write_placeholder(sql, params.len());
        }
    }

    fn compile(&self, statement: &Statement) -> Result<Compiled> {
        let mut sql = String::with_capacity(128);
        let mut params = Vec::new();
        let mut columns: Arc<[Column]> = Vec::new().into();
        match statement {
            Statement::CreateTable(create) => {
                sql.push_str("CREATE TABLE ");
                if create.if_not_exists {
                    sql.push_str("IF NOT EXISTS ");
                }
                self.write_identifier(&mut sql, &create.table);
                sql.push_str(" (");
                separated_by(
                    &mut sql,
                    &create.columns,
                    |sql, column| {
                        self.write_identifier(sql, &column.name);
                        sql.push(' ');
                        self.write_column_type(sql, &column.ty);
                    },
                    ", ",
                );
                sql.push(')');
            }
            Statement::DropTable(drop) => {
                sql.push_str("DROP TABLE ");
                if drop.if_exists {
                    sql.push_str("IF EXISTS ");
                }
                self.write_identifier(&mut sql, &drop.table);
            }
            Statement::Insert(insert) => {
                if insert.columns.len() != insert.values.len() {
                    return Err(Error::msg(format!(
                        "INSERT into `{}` names {} columns but carries {} values",
                        insert.table,
                        insert.columns.len(),
                        insert.values.len()
                    )));
                }
                sql.push_str("INSERT INTO ");
                self.write_identifier(&mut sql, &insert.table);
                sql.push_str(" (");
                separated_by(
                    &mut sql,
                    &insert.columns,
                    |sql, column| self.write_identifier(sql, column),
                    ", ",
                );
                sql.push_str(") VALUES (");
                for value in &insert.values {
                    if !params.is_empty() {
                        sql.push_str(", ");
                    }
                    params.push(value.clone());
                    self.write_placeholder(&mut sql, params.len());
                }
                sql.push(')');
            }
            Statement::Select(select) => {
                sql.push_str("SELECT ");
                separated_by(
                    &mut sql,
                    &select.columns,
                    |sql, column| self.write_identifier(sql, &column.name),
                    ", ",
                );
                sql.push_str(" FROM ");
                self.write_identifier(&mut sql, &select.table);
                self.write_filter(&mut sql, &mut params, &select.filter);
                columns = select.columns.clone().into();
            }
            Statement::Update(update) => {
                sql.push_str("UPDATE ");
                self.write_identifier(&mut sql, &update.table);
                sql.push_str(" SET ");
                let mut first = true;
                for (column, value) in &update.assignments {
                    if !first {
                        sql.push_str(", ");
                    }
                    first = false;
                    self.write_identifier(&mut sql, column);
                    sql.push_str(" = ");
                    params.push(value.clone());
                    self.write_placeholder(&mut sql, params.len());
                }
                self.write_filter(&mut sql, &mut params, &update.filter);
            }
            Statement::Delete(delete) => {
                sql.push_str("DELETE FROM ");
                self.write_identifier(&mut sql, &delete.table);
                self.write_filter(&mut sql, &mut params, &delete.filter);
            }
        }
        Ok(Compiled {
            sql,
            params,
            columns,
        })
    }
}
