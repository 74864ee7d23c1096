//! Parser for the SQL subset [`crate::MemoryDialect`] emits.
//!
//! Values never appear inline: the dialect always compiles them to `?`
//! placeholders, so parsing is purely structural. Anything outside the
//! emitted grammar is rejected.

use moor_core::{Column, ColumnType, Comparison, Error, Result};

#[derive(Debug, PartialEq)]
pub(crate) enum Command {
    CreateTable {
        table: String,
        columns: Vec<Column>,
        if_not_exists: bool,
    },
    DropTable {
        table: String,
        if_exists: bool,
    },
    Insert {
        table: String,
        columns: Vec<String>,
        params: usize,
    },
    Select {
        table: String,
        columns: Vec<String>,
        filter: Vec<Filter>,
    },
    Update {
        table: String,
        assignments: Vec<String>,
        filter: Vec<Filter>,
    },
    Delete {
        table: String,
        filter: Vec<Filter>,
    },
    Savepoint(String),
    ReleaseSavepoint(String),
    RollbackToSavepoint(String),
}

/// One `column <op> ?` predicate; the compared value arrives via params.
#[derive(Debug, PartialEq)]
pub(crate) struct Filter {
    pub column: String,
    pub comparison: Comparison,
}

pub(crate) fn parse(sql: &str) -> Result<Command> {
    let mut parser = Parser::new(sql);
    let command = if parser.keyword("CREATE") {
        parser.expect_keyword("TABLE")?;
        let mut if_not_exists = false;
        if parser.keyword("IF") {
            parser.expect_keyword("NOT")?;
            parser.expect_keyword("EXISTS")?;
            if_not_exists = true;
        }
        let table = parser.identifier()?;
        parser.expect_token("(")?;
        let mut columns = Vec::new();
        loop {
            let name = parser.identifier()?;
            let ty = column_type(&parser.identifier()?)?;
            columns.push(Column::new(name, ty));
            if !parser.token(",") {
                break;
            }
        }
        parser.expect_token(")")?;
        Command::CreateTable {
            table,
            columns,
            if_not_exists,
        }
    } else if parser.keyword("DROP") {
        parser.expect_keyword("TABLE")?;
        let mut if_exists = false;
        if parser.keyword("IF") {
            parser.expect_keyword("EXISTS")?;
            if_exists = true;
        }
        Command::DropTable {
            table: parser.identifier()?,
            if_exists,
        }
    } else if parser.keyword("INSERT") {
        parser.expect_keyword("INTO")?;
        let table = parser.identifier()?;
        parser.expect_token("(")?;
        let mut columns = Vec::new();
        loop {
            columns.push(parser.identifier()?);
            if !parser.token(",") {
                break;
            }
        }
        parser.expect_token(")")?;
        parser.expect_keyword("VALUES")?;
        parser.expect_token("(")?;
        let mut params = 0;
        loop {
            parser.expect_token("?")?;
            params += 1;
            if !parser.token(",") {
                break;
            }
        }
        parser.expect_token(")")?;
        Command::Insert {
            table,
            columns,
            params,
        }
    } else if parser.keyword("SELECT") {
        let mut columns = Vec::new();
        loop {
            columns.push(parser.identifier()?);
            if !parser.token(",") {
                break;
            }
        }
        parser.expect_keyword("FROM")?;
        let table = parser.identifier()?;
        let filter = filter(&mut parser)?;
        Command::Select {
            table,
            columns,
            filter,
        }
    } else if parser.keyword("UPDATE") {
        let table = parser.identifier()?;
        parser.expect_keyword("SET")?;
        let mut assignments = Vec::new();
        loop {
            assignments.push(parser.identifier()?);
            parser.expect_token("=")?;
            parser.expect_token("?")?;
            if !parser.token(",") {
                break;
            }
        }
        let filter = filter(&mut parser)?;
        Command::Update {
            table,
            assignments,
            filter,
        }
    } else if parser.keyword("DELETE") {
        parser.expect_keyword("FROM")?;
        let table = parser.identifier()?;
        let filter = filter(&mut parser)?;
        Command::Delete { table, filter }
    } else if parser.keyword("SAVEPOINT") {
        Command::Savepoint(parser.identifier()?)
    } else if parser.keyword("RELEASE") {
        parser.expect_keyword("SAVEPOINT")?;
        Command::ReleaseSavepoint(parser.identifier()?)
    } else if parser.keyword("ROLLBACK") {
        parser.expect_keyword("TO")?;
        parser.expect_keyword("SAVEPOINT")?;
        Command::RollbackToSavepoint(parser.identifier()?)
    } else {
        return Err(Error::msg(format!("Unsupported statement: `{sql}`")));
    };
    if !parser.finished() {
        return Err(Error::msg(format!(
            "Unexpected trailing input in statement: `{sql}`"
        )));
    }
    Ok(command)
}

fn filter(parser: &mut Parser) -> Result<Vec<Filter>> {
    let mut filter = Vec::new();
    if parser.keyword("WHERE") {
        loop {
            let column = parser.identifier()?;
            let comparison = parser.comparison()?;
            parser.expect_token("?")?;
            filter.push(Filter { column, comparison });
            if !parser.keyword("AND") {
                break;
            }
        }
    }
    Ok(filter)
}

fn column_type(keyword: &str) -> Result<ColumnType> {
    Ok(match keyword {
        "BOOLEAN" => ColumnType::Boolean,
        "BIGINT" => ColumnType::Integer,
        "DOUBLE" => ColumnType::Float,
        "DECIMAL" => ColumnType::Decimal,
        "VARCHAR" => ColumnType::Text,
        "BLOB" => ColumnType::Blob,
        "TIMESTAMPTZ" => ColumnType::Timestamp,
        "UUID" => ColumnType::Uuid,
        other => return Err(Error::msg(format!("Unknown column type `{other}`"))),
    })
}

struct Parser<'s> {
    rest: &'s str,
}

impl<'s> Parser<'s> {
    fn new(sql: &'s str) -> Self {
        Self { rest: sql }
    }

    fn finished(&mut self) -> bool {
        self.rest = self.rest.trim_start();
        self.rest.is_empty()
    }

    /// Consume `keyword` if it is next, on a word boundary.
    fn keyword(&mut self, keyword: &str) -> bool {
        self.rest = self.rest.trim_start();
        if let Some(rest) = self.rest.strip_prefix(keyword)
            && rest
                .chars()
                .next()
                .is_none_or(|c| !c.is_alphanumeric() && c != '_')
        {
            self.rest = rest;
            return true;
        }
        false
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.keyword(keyword) {
            Ok(())
        } else {
            Err(Error::msg(format!(
                "Expected `{keyword}` before `{}`",
                self.rest
            )))
        }
    }

    fn token(&mut self, token: &str) -> bool {
        self.rest = self.rest.trim_start();
        if let Some(rest) = self.rest.strip_prefix(token) {
            self.rest = rest;
            return true;
        }
        false
    }

    fn expect_token(&mut self, token: &str) -> Result<()> {
        if self.token(token) {
            Ok(())
        } else {
            Err(Error::msg(format!(
                "Expected `{token}` before `{}`",
                self.rest
            )))
        }
    }

    fn identifier(&mut self) -> Result<String> {
        self.rest = self.rest.trim_start();
        let len = self
            .rest
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .count();
        if len == 0 {
            return Err(Error::msg(format!(
                "Expected an identifier before `{}`",
                self.rest
            )));
        }
        let (identifier, rest) = self.rest.split_at(len);
        self.rest = rest;
        Ok(identifier.to_owned())
    }

    fn comparison(&mut self) -> Result<Comparison> {
        self.rest = self.rest.trim_start();
        // Longest symbols first so `<` does not shadow `<=` and `<>`.
        for symbol in ["<=", ">=", "<>", "<", ">", "="] {
            if let Some(rest) = self.rest.strip_prefix(symbol) {
                self.rest = rest;
                return Comparison::from_symbol(symbol)
                    .ok_or_else(|| Error::msg(format!("Unknown comparison `{symbol}`")));
            }
        }
        Err(Error::msg(format!(
            "Expected a comparison before `{}`",
            self.rest
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_table() {
        let command = parse("CREATE TABLE IF NOT EXISTS notes (id BIGINT, text VARCHAR)")
            .expect("Failed to parse CREATE TABLE");
        assert_eq!(
            command,
            Command::CreateTable {
                table: "notes".into(),
                columns: vec![
                    Column::new("id", ColumnType::Integer),
                    Column::new("text", ColumnType::Text),
                ],
                if_not_exists: true,
            }
        );
    }

    #[test]
    fn insert() {
        let command = parse("INSERT INTO notes (text, completed) VALUES (?, ?)")
            .expect("Failed to parse INSERT");
        assert_eq!(
            command,
            Command::Insert {
                table: "notes".into(),
                columns: vec!["text".into(), "completed".into()],
                params: 2,
            }
        );
    }

    #[test]
    fn select_with_filter() {
        let command = parse("SELECT id, text FROM notes WHERE completed = ? AND id >= ?")
            .expect("Failed to parse SELECT");
        assert_eq!(
            command,
            Command::Select {
                table: "notes".into(),
                columns: vec!["id".into(), "text".into()],
                filter: vec![
                    Filter {
                        column: "completed".into(),
                        comparison: Comparison::Equal,
                    },
                    Filter {
                        column: "id".into(),
                        comparison: Comparison::GreaterEqual,
                    },
                ],
            }
        );
    }

    #[test]
    fn update() {
        let command =
            parse("UPDATE notes SET text = ?, completed = ? WHERE id = ?").expect("Failed to parse UPDATE");
        assert_eq!(
            command,
            Command::Update {
                table: "notes".into(),
                assignments: vec!["text".into(), "completed".into()],
                filter: vec![Filter {
                    column: "id".into(),
                    comparison: Comparison::Equal,
                }],
            }
        );
    }

    #[test]
    fn savepoint_control() {
        assert_eq!(
            parse("SAVEPOINT MOOR_SAVEPOINT_abc").expect("Failed to parse SAVEPOINT"),
            Command::Savepoint("MOOR_SAVEPOINT_abc".into())
        );
        assert_eq!(
            parse("RELEASE SAVEPOINT sp1").expect("Failed to parse RELEASE SAVEPOINT"),
            Command::ReleaseSavepoint("sp1".into())
        );
        assert_eq!(
            parse("ROLLBACK TO SAVEPOINT sp1").expect("Failed to parse ROLLBACK TO SAVEPOINT"),
            Command::RollbackToSavepoint("sp1".into())
        );
    }

    #[test]
    fn rejects_unknown_statements() {
        assert!(parse("VACUUM").is_err());
        assert!(parse("SELECT id FROM notes garbage").is_err());
    }
}
