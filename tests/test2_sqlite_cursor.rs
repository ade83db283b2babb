#![cfg(feature = "sqlite")]
use dbapi_bridge::prelude::*;
use dbapi_bridge::sqlite;

fn seeded() -> Result<(Connection, Cursor), DbApiError> {
    let conn = sqlite::connect(&Keywords::new())?;
    let mut cur = conn.cursor()?;
    cur.execute("CREATE TABLE people (id INTEGER, name TEXT, score REAL)", &[])?;
    cur.executemany(
        "INSERT INTO people (id, name, score) VALUES (?, ?, ?)",
        &[
            vec![RowValues::Int(1), RowValues::Text("ada".into()), RowValues::Float(9.5)],
            vec![RowValues::Int(2), RowValues::Null, RowValues::Float(7.0)],
            vec![RowValues::Int(3), RowValues::Text("grace".into()), RowValues::Null],
            vec![RowValues::Int(4), RowValues::Text("linus".into()), RowValues::Float(6.25)],
            vec![RowValues::Int(5), RowValues::Text("barbara".into()), RowValues::Float(8.0)],
        ],
    )?;
    assert_eq!(cur.rowcount(), 5);
    Ok((conn, cur))
}

#[test]
fn select_sets_description_and_non_query_clears_it() -> Result<(), DbApiError> {
    let (_conn, mut cur) = seeded()?;

    cur.execute("  select id, name FROM people", &[])?;
    let description = cur.description().expect("query has a description");
    let names: Vec<&str> = description.iter().map(|col| col.name.as_str()).collect();
    assert_eq!(names, ["id", "name"]);
    assert_eq!(description[0].type_code, "INTEGER");
    assert_eq!(description[1].type_code, "TEXT");
    assert_eq!(description[0].as_tuple().0, "id");
    assert_eq!(description[0].null_ok, None);

    cur.execute("UPDATE people SET score = 0 WHERE id > ?", &[RowValues::Int(3)])?;
    assert!(cur.description().is_none());
    assert_eq!(cur.rowcount(), 2);
    Ok(())
}

#[test]
fn null_comes_back_as_the_portable_marker_on_every_path() -> Result<(), DbApiError> {
    let (_conn, mut cur) = seeded()?;
    let sql = "SELECT id, name, score FROM people WHERE id = 2";

    cur.execute(sql, &[])?;
    let row = cur.fetchone()?.expect("row 2");
    assert_eq!(row[1], RowValues::Null);
    assert!(row.get("name").is_some_and(RowValues::is_null));

    cur.execute(sql, &[])?;
    let rows = cur.fetchall()?;
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].values(),
        &[RowValues::Int(2), RowValues::Null, RowValues::Float(7.0)]
    );

    cur.execute(sql, &[])?;
    let iterated: Vec<Row> = cur.rows().collect::<Result<_, _>>()?;
    assert_eq!(iterated, rows);
    Ok(())
}

#[test]
fn fetchmany_drains_in_batches() -> Result<(), DbApiError> {
    let (_conn, mut cur) = seeded()?;
    cur.execute("SELECT id FROM people ORDER BY id", &[])?;

    let first = cur.fetchmany(Some(3))?;
    let ids: Vec<i64> = first.iter().filter_map(|row| row[0].as_int().copied()).collect();
    assert_eq!(ids, [1, 2, 3]);
    assert_eq!(cur.fetchmany(Some(3))?.len(), 2);
    assert!(cur.fetchmany(Some(3))?.is_empty());
    assert!(cur.fetchone()?.is_none());
    assert_eq!(cur.rowcount(), 5);
    Ok(())
}

#[test]
fn fetchmany_defaults_to_arraysize() -> Result<(), DbApiError> {
    let (_conn, mut cur) = seeded()?;
    assert_eq!(cur.arraysize(), 1);
    assert!(matches!(cur.set_arraysize(0), Err(DbApiError::CursorState(_))));
    cur.set_arraysize(4)?;
    cur.execute("SELECT id FROM people", &[])?;
    assert_eq!(cur.fetchmany(None)?.len(), 4);
    assert_eq!(cur.fetchmany(None)?.len(), 1);
    Ok(())
}

#[test]
fn re_execute_discards_the_pending_result() -> Result<(), DbApiError> {
    let (_conn, mut cur) = seeded()?;
    cur.execute("SELECT id FROM people ORDER BY id", &[])?;
    assert!(cur.fetchone()?.is_some());
    cur.execute("SELECT name FROM people WHERE id = ?", &[RowValues::Int(5)])?;
    let rows = cur.fetchall()?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some(&RowValues::Text("barbara".into())));
    Ok(())
}

#[test]
fn fetch_without_a_query_is_a_state_error() -> Result<(), DbApiError> {
    let (conn, _) = seeded()?;
    let mut fresh = conn.cursor()?;
    assert!(matches!(fresh.fetchone(), Err(DbApiError::CursorState(_))));

    fresh.execute("DELETE FROM people WHERE id = 1", &[])?;
    assert_eq!(fresh.rowcount(), 1);
    assert!(matches!(fresh.fetchall(), Err(DbApiError::CursorState(_))));
    Ok(())
}

#[test]
fn closed_cursor_rejects_everything() -> Result<(), DbApiError> {
    let (_conn, mut cur) = seeded()?;
    cur.execute("SELECT id FROM people", &[])?;
    cur.close();
    cur.close();
    assert!(cur.is_closed());
    assert!(matches!(cur.fetchone(), Err(DbApiError::CursorState(_))));
    assert!(matches!(cur.execute("SELECT 1", &[]), Err(DbApiError::CursorState(_))));
    Ok(())
}

#[test]
fn closing_the_connection_invalidates_its_cursors() -> Result<(), DbApiError> {
    let (conn, mut cur) = seeded()?;
    conn.close()?;
    assert!(matches!(cur.execute("SELECT 1", &[]), Err(DbApiError::CursorState(_))));
    assert!(matches!(conn.cursor(), Err(DbApiError::Connection { .. })));
    Ok(())
}

#[test]
fn backend_errors_name_the_statement() -> Result<(), DbApiError> {
    let (_conn, mut cur) = seeded()?;
    match cur.execute("SELECT * FROM missing_table", &[]) {
        Err(DbApiError::StatementExecution { sql, .. }) => {
            assert_eq!(sql, "SELECT * FROM missing_table");
        }
        other => panic!("expected StatementExecution, got {other:?}"),
    }
    Ok(())
}

#[test]
fn with_queries_run_as_non_queries() -> Result<(), DbApiError> {
    let (_conn, mut cur) = seeded()?;
    cur.execute("WITH x AS (SELECT 1) SELECT * FROM x", &[])?;
    assert!(cur.description().is_none());
    assert_eq!(cur.rowcount(), -1);
    Ok(())
}

#[test]
fn typed_values_round_trip_through_sqlite() -> Result<(), DbApiError> {
    let conn = sqlite::connect_dsn("db=:memory:")?;
    let mut cur = conn.cursor()?;
    cur.execute("CREATE TABLE blobs (data BLOB, flag INTEGER)", &[])?;
    cur.execute(
        "INSERT INTO blobs VALUES (?, ?)",
        &[RowValues::Blob(vec![0, 159, 146, 150]), RowValues::Bool(true)],
    )?;
    cur.execute("SELECT data, flag FROM blobs", &[])?;
    let row = cur.fetchone()?.expect("one row");
    assert_eq!(row[0].as_blob(), Some(&[0_u8, 159, 146, 150][..]));
    assert_eq!(row[1].as_bool(), Some(true));
    Ok(())
}
