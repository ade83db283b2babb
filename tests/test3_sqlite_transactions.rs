#![cfg(feature = "sqlite")]
use dbapi_bridge::prelude::*;
use dbapi_bridge::sqlite;

fn count(cur: &mut Cursor) -> Result<i64, DbApiError> {
    cur.execute("SELECT COUNT(*) FROM items", &[])?;
    let row = cur.fetchone()?.expect("count row");
    Ok(row[0].as_int().copied().unwrap_or(-1))
}

#[test]
fn rollback_discards_and_commit_keeps() -> Result<(), DbApiError> {
    let conn = sqlite::connect(&Keywords::new())?;
    let mut cur = conn.cursor()?;
    cur.execute("CREATE TABLE items (id INTEGER PRIMARY KEY, label TEXT)", &[])?;
    conn.commit()?;

    cur.execute("INSERT INTO items (label) VALUES (?)", &[RowValues::Text("a".into())])?;
    assert_eq!(cur.rowcount(), 1);
    conn.rollback()?;
    assert_eq!(count(&mut cur)?, 0);

    cur.execute("INSERT INTO items (label) VALUES (?)", &[RowValues::Text("b".into())])?;
    conn.commit()?;
    conn.rollback()?;
    assert_eq!(count(&mut cur)?, 1);
    Ok(())
}

#[test]
fn transaction_ids_advance_on_each_boundary() -> Result<(), DbApiError> {
    let conn = sqlite::connect(&Keywords::new())?;
    let first = conn.transaction_id().expect("open connection has a transaction");
    conn.commit()?;
    let second = conn.transaction_id().expect("still open");
    conn.rollback()?;
    let third = conn.transaction_id().expect("still open");
    assert!(first < second && second < third);
    assert_eq!(conn.backend(), sqlite::DRIVER_ID);

    conn.close()?;
    assert!(conn.is_closed());
    assert_eq!(conn.transaction_id(), None);
    assert!(matches!(conn.commit(), Err(DbApiError::Transaction { .. })));
    assert!(matches!(conn.rollback(), Err(DbApiError::Transaction { .. })));
    conn.close()?;
    Ok(())
}

#[test]
fn changes_are_visible_to_other_connections_only_after_commit()
-> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("shared.db");
    let mut kw = Keywords::new();
    kw.insert("db".to_string(), path.to_string_lossy().into_owned());

    let writer = sqlite::connect(&kw)?;
    let mut wcur = writer.cursor()?;
    wcur.execute("CREATE TABLE items (id INTEGER PRIMARY KEY, label TEXT)", &[])?;
    writer.commit()?;

    let reader = sqlite::connect(&kw)?;
    let mut rcur = reader.cursor()?;

    wcur.execute("INSERT INTO items (label) VALUES ('pending')", &[])?;
    assert_eq!(count(&mut rcur)?, 0);
    // End the reader's snapshot so the writer can take its commit lock.
    reader.rollback()?;

    writer.commit()?;
    assert_eq!(count(&mut rcur)?, 1);
    Ok(())
}

#[test]
fn closing_rolls_back_uncommitted_work() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("close.db");
    let dsn = format!("db={}", path.display());
    if dsn.contains(char::is_whitespace) {
        return Ok(());
    }

    {
        let conn = sqlite::connect_dsn(&dsn)?;
        let mut cur = conn.cursor()?;
        cur.execute("CREATE TABLE items (id INTEGER PRIMARY KEY, label TEXT)", &[])?;
        conn.commit()?;
        cur.execute("INSERT INTO items (label) VALUES ('lost')", &[])?;
        conn.close()?;
    }
    {
        let conn = sqlite::connect_dsn(&dsn)?;
        let mut cur = conn.cursor()?;
        cur.execute("INSERT INTO items (label) VALUES ('dropped')", &[])?;
        // Dropped without commit.
    }

    let conn = sqlite::connect_dsn(&dsn)?;
    let mut cur = conn.cursor()?;
    assert_eq!(count(&mut cur)?, 0);
    Ok(())
}

#[test]
fn options_connect_to_sqlite() -> Result<(), DbApiError> {
    let opts = ConnectOptions::from_json(r#"{"backend": "sqlite", "params": "db=:memory:"}"#)?;
    let conn = opts.connect()?;
    let mut cur = conn.cursor()?;
    cur.execute("SELECT 1 + 1 AS two", &[])?;
    assert_eq!(cur.fetchone()?.and_then(|row| row.get("two").cloned()), Some(RowValues::Int(2)));

    let conn = ConnectOptions::builder(BackendKind::Sqlite).connect()?;
    assert!(!conn.is_closed());

    let err = ConnectOptions::builder(BackendKind::Sqlite)
        .keyword("host", "localhost")
        .connect()
        .unwrap_err();
    assert!(matches!(err, DbApiError::KeyMapping { .. }));
    Ok(())
}
