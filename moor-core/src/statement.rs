use crate::{Column, ColumnType, Value};

/// Comparison operator of a single `WHERE` predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl Comparison {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Equal => "=",
            Comparison::NotEqual => "<>",
            Comparison::Less => "<",
            Comparison::LessEqual => "<=",
            Comparison::Greater => ">",
            Comparison::GreaterEqual => ">=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "=" => Comparison::Equal,
            "<>" => Comparison::NotEqual,
            "<" => Comparison::Less,
            "<=" => Comparison::LessEqual,
            ">" => Comparison::Greater,
            ">=" => Comparison::GreaterEqual,
            _ => return None,
        })
    }
}

/// One `column <op> value` predicate. Predicates on a statement are ANDed.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub comparison: Comparison,
    pub value: Value,
}

/// Abstract statement handed to a [`crate::Dialect`] for compilation.
///
/// Deliberately small: single table, flat predicates, values always carried
/// as [`Value`] and compiled to placeholders. It stands in for the query
/// side of the system; the session layer only cares that a statement
/// compiles to SQL text, parameters and result columns.
#[derive(Debug, Clone)]
pub enum Statement {
    CreateTable(CreateTable),
    DropTable(DropTable),
    Insert(Insert),
    Select(Select),
    Update(Update),
    Delete(Delete),
}

impl Statement {
    pub fn create_table(table: impl Into<String>) -> CreateTable {
        CreateTable {
            table: table.into(),
            columns: Vec::new(),
            if_not_exists: false,
        }
    }

    pub fn drop_table(table: impl Into<String>) -> DropTable {
        DropTable {
            table: table.into(),
            if_exists: false,
        }
    }

    pub fn insert(table: impl Into<String>) -> Insert {
        Insert {
            table: table.into(),
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn select(table: impl Into<String>) -> Select {
        Select {
            table: table.into(),
            columns: Vec::new(),
            filter: Vec::new(),
        }
    }

    pub fn update(table: impl Into<String>) -> Update {
        Update {
            table: table.into(),
            assignments: Vec::new(),
            filter: Vec::new(),
        }
    }

    pub fn delete(table: impl Into<String>) -> Delete {
        Delete {
            table: table.into(),
            filter: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateTable {
    pub table: String,
    pub columns: Vec<Column>,
    pub if_not_exists: bool,
}

impl CreateTable {
    pub fn column(mut self, name: impl Into<String>, ty: ColumnType) -> Self {
        self.columns.push(Column::new(name, ty));
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct DropTable {
    pub table: String,
    pub if_exists: bool,
}

impl DropTable {
    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

impl Insert {
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(name.into());
        self
    }

    /// Append one value.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Replace the whole value set; this is what a batched execute uses to
    /// rebind the same statement shape per input row.
    pub fn values(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.values = values.into_iter().collect();
        self
    }
}

#[derive(Debug, Clone)]
pub struct Select {
    pub table: String,
    pub columns: Vec<Column>,
    pub filter: Vec<Predicate>,
}

impl Select {
    pub fn column(mut self, name: impl Into<String>, ty: ColumnType) -> Self {
        self.columns.push(Column::new(name, ty));
        self
    }

    pub fn filter(
        mut self,
        column: impl Into<String>,
        comparison: Comparison,
        value: impl Into<Value>,
    ) -> Self {
        self.filter.push(Predicate {
            column: column.into(),
            comparison,
            value: value.into(),
        });
        self
    }
}

#[derive(Debug, Clone)]
pub struct Update {
    pub table: String,
    pub assignments: Vec<(String, Value)>,
    pub filter: Vec<Predicate>,
}

impl Update {
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.assignments.push((column.into(), value.into()));
        self
    }

    pub fn filter(
        mut self,
        column: impl Into<String>,
        comparison: Comparison,
        value: impl Into<Value>,
    ) -> Self {
        self.filter.push(Predicate {
            column: column.into(),
            comparison,
            value: value.into(),
        });
        self
    }
}

#[derive(Debug, Clone)]
pub struct Delete {
    pub table: String,
    pub filter: Vec<Predicate>,
}

impl Delete {
    pub fn filter(
        mut self,
        column: impl Into<String>,
        comparison: Comparison,
        value: impl Into<Value>,
    ) -> Self {
        self.filter.push(Predicate {
            column: column.into(),
            comparison,
            value: value.into(),
        });
        self
    }
}

impl From<CreateTable> for Statement {
    fn from(value: CreateTable) -> Self {
        Statement::CreateTable(value)
    }
}

impl From<DropTable> for Statement {
    fn from(value: DropTable) -> Self {
        Statement::DropTable(value)
    }
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Statement::Insert(value)
    }
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Statement::Select(value)
    }
}

impl From<Update> for Statement {
    fn from(value: Update) -> Self {
        Statement::Update(value)
    }
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Self {
        Statement::Delete(value)
    }
}
