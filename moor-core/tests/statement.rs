use moor_core::{ColumnType, Comparison, Dialect, Statement, Value};

struct StandardDialect;
impl Dialect for StandardDialect {}

/// Numbered-placeholder dialect, the way a postgres-flavored driver would
/// override the default.
struct NumberedDialect;
impl Dialect for NumberedDialect {
    fn write_placeholder(&self, sql: &mut String, index: usize) {
        sql.push('$');
        sql.push_str(&index.to_string());
    }
}

#[test]
fn create_and_drop_table() {
    let compiled = StandardDialect
        .compile(
            &Statement::create_table("notes")
                .column("id", ColumnType::Integer)
                .column("text", ColumnType::Text)
                .column("completed", ColumnType::Boolean)
                .if_not_exists()
                .into(),
        )
        .expect("Failed to compile CREATE TABLE");
    assert_eq!(
        compiled.sql,
        "CREATE TABLE IF NOT EXISTS notes (id BIGINT, text VARCHAR, completed BOOLEAN)"
    );
    assert!(compiled.params.is_empty());
    assert!(compiled.columns.is_empty());

    let compiled = StandardDialect
        .compile(&Statement::drop_table("notes").if_exists().into())
        .expect("Failed to compile DROP TABLE");
    assert_eq!(compiled.sql, "DROP TABLE IF EXISTS notes");
}

#[test]
fn insert() {
    let compiled = StandardDialect
        .compile(
            &Statement::insert("notes")
                .column("text")
                .column("completed")
                .value("example")
                .value(true)
                .into(),
        )
        .expect("Failed to compile INSERT");
    assert_eq!(
        compiled.sql,
        "INSERT INTO notes (text, completed) VALUES (?, ?)"
    );
    assert_eq!(
        compiled.params,
        [
            Value::Varchar(Some("example".into())),
            Value::Boolean(Some(true)),
        ]
    );
}

#[test]
fn insert_arity_mismatch_is_rejected() {
    let statement = Statement::insert("notes")
        .column("text")
        .column("completed")
        .value("example")
        .into();
    assert!(StandardDialect.compile(&statement).is_err());
}

#[test]
fn select_carries_result_columns() {
    let compiled = StandardDialect
        .compile(
            &Statement::select("notes")
                .column("id", ColumnType::Integer)
                .column("text", ColumnType::Text)
                .filter("completed", Comparison::Equal, true)
                .filter("id", Comparison::GreaterEqual, 2)
                .into(),
        )
        .expect("Failed to compile SELECT");
    assert_eq!(
        compiled.sql,
        "SELECT id, text FROM notes WHERE completed = ? AND id >= ?"
    );
    assert_eq!(
        compiled.params,
        [Value::Boolean(Some(true)), Value::Int64(Some(2))]
    );
    assert_eq!(compiled.columns.len(), 2);
    assert_eq!(compiled.columns[0].name, "id");
    assert_eq!(compiled.columns[1].ty, ColumnType::Text);
}

#[test]
fn update_orders_assignment_params_before_filter_params() {
    let compiled = StandardDialect
        .compile(
            &Statement::update("notes")
                .set("text", "renamed")
                .set("completed", false)
                .filter("id", Comparison::Equal, 7)
                .into(),
        )
        .expect("Failed to compile UPDATE");
    assert_eq!(
        compiled.sql,
        "UPDATE notes SET text = ?, completed = ? WHERE id = ?"
    );
    assert_eq!(
        compiled.params,
        [
            Value::Varchar(Some("renamed".into())),
            Value::Boolean(Some(false)),
            Value::Int64(Some(7)),
        ]
    );
}

#[test]
fn delete() {
    let compiled = StandardDialect
        .compile(
            &Statement::delete("notes")
                .filter("completed", Comparison::NotEqual, true)
                .into(),
        )
        .expect("Failed to compile DELETE");
    assert_eq!(compiled.sql, "DELETE FROM notes WHERE completed <> ?");
    assert_eq!(compiled.params, [Value::Boolean(Some(true))]);
}

#[test]
fn savepoint_control() {
    let mut sql = String::new();
    StandardDialect.write_savepoint(&mut sql, "sp1");
    assert_eq!(sql, "SAVEPOINT sp1");
    sql.clear();
    StandardDialect.write_release_savepoint(&mut sql, "sp1");
    assert_eq!(sql, "RELEASE SAVEPOINT sp1");
    sql.clear();
    StandardDialect.write_rollback_to_savepoint(&mut sql, "sp1");
    assert_eq!(sql, "ROLLBACK TO SAVEPOINT sp1");
}

#[test]
fn placeholder_style_is_overridable() {
    let compiled = NumberedDialect
        .compile(
            &Statement::insert("notes")
                .column("text")
                .column("completed")
                .value("example")
                .value(true)
                .into(),
        )
        .expect("Failed to compile INSERT");
    assert_eq!(
        compiled.sql,
        "INSERT INTO notes (text, completed) VALUES ($1, $2)"
    );
}
