#![cfg(feature = "sqlite")]

use sqlstream_loader::{
    LargeLiteralPolicy, LoadSummary, Loader, LoaderConfig, LoaderError, SqliteConnection,
    SqliteExecutor,
};
use std::io::{Cursor, Write};

fn setup_loader(config: LoaderConfig) -> Loader<SqliteExecutor> {
    let conn = SqliteConnection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE T (A INTEGER, B TEXT);")
        .unwrap();
    Loader::new(config, SqliteExecutor::new(conn))
}

fn row_count(loader: &Loader<SqliteExecutor>) -> i64 {
    loader
        .executor()
        .connection()
        .query_row("SELECT COUNT(*) FROM T", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn test_load_in_batches_skipping_non_inserts() {
    let config = LoaderConfig {
        batch_size: 2,
        ..Default::default()
    };
    let mut loader = setup_loader(config);
    let script = "INSERT INTO T (A, B) VALUES (1, 'a;b');\n\
        UPDATE T SET B = 'ignored';\n\
        /* comment */ INSERT INTO T (A, B) VALUES (2, 'b');\n\
        insert into T (A, B) values (3, 'c');\n\
        INSERT INTO T (A, B) VALUES (4, 'd')";

    let summary = loader.run(Cursor::new(script)).unwrap();
    assert_eq!(
        summary,
        LoadSummary {
            executed: 4,
            failed: 0,
            total_statements: 0,
        }
    );
    assert_eq!(row_count(&loader), 4);

    let b: String = loader
        .executor()
        .connection()
        .query_row("SELECT B FROM T WHERE A = 1", [], |row| row.get(0))
        .unwrap();
    assert_eq!(b, "a;b");
}

#[test]
fn test_ignore_pk_removes_column_before_execution() {
    let config = LoaderConfig {
        ignore_pk: true,
        pk_name: "ROW_ID".to_string(),
        ..Default::default()
    };
    let mut loader = setup_loader(config);
    let script = "INSERT INTO T (ROW_ID, A, B) VALUES (100, 1, 'x');\n\
        INSERT INTO T (A, row_id, B) VALUES (2, 200, 'y');\n\
        INSERT INTO T (A, B) VALUES (3, 'z');";

    let summary = loader.run(Cursor::new(script)).unwrap();
    assert_eq!(summary.executed, 3);
    assert_eq!(row_count(&loader), 3);
}

#[test]
fn test_oversized_literal_goes_through_parameterized_path() {
    let config = LoaderConfig {
        large_literal: LargeLiteralPolicy {
            max_inline_bytes: 64,
            max_inline_chars: 10,
        },
        ..Default::default()
    };
    let mut loader = setup_loader(config);
    let long_text = "x".repeat(50);
    let script = format!(
        "INSERT INTO T (A, B) VALUES (1, 'short');\n\
         INSERT INTO T (A, B) VALUES (2, '{long_text}');\n\
         INSERT INTO T (A, B) VALUES (3, TO_TIMESTAMP('19-8月 -25 10.30.00.000000000 下午','DD-MON-RR HH.MI.SSXFF AM'));"
    );

    let summary = loader.run(Cursor::new(script)).unwrap();
    assert_eq!(summary.executed, 3);

    let conn = loader.executor().connection();
    let stored: String = conn
        .query_row("SELECT B FROM T WHERE A = 2", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored, long_text);

    let stored: String = conn
        .query_row("SELECT B FROM T WHERE A = 3", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored, "2025-08-19 22:30:00.000000000");
}

#[test]
fn test_continue_on_error_counts_failures() {
    let config = LoaderConfig {
        batch_size: 1,
        continue_on_error: true,
        ignore_pk: true,
        ..Default::default()
    };
    let mut loader = setup_loader(config);
    let script = "INSERT INTO T (A, B) VALUES (1, 'a');\n\
        INSERT INTO MISSING (A) VALUES (2);\n\
        INSERT INTO T SELECT 3, 'c';\n\
        INSERT INTO T (A, WCSID) VALUES (4, 5, 6);\n\
        INSERT INTO T (A, B) VALUES (5, 'e');";

    let summary = loader.run(Cursor::new(script)).unwrap();
    assert_eq!(summary.executed, 2);
    assert_eq!(summary.failed, 3);
    assert_eq!(row_count(&loader), 2);
}

#[test]
fn test_failed_batch_is_rolled_back() {
    let config = LoaderConfig {
        batch_size: 10,
        continue_on_error: true,
        ..Default::default()
    };
    let mut loader = setup_loader(config);
    let script = "INSERT INTO T (A, B) VALUES (1, 'a');\n\
        INSERT INTO T (A, B) VALUES (2, 'b');\n\
        INSERT INTO MISSING (A) VALUES (3);";

    let summary = loader.run(Cursor::new(script)).unwrap();
    assert_eq!(summary.executed, 0);
    assert_eq!(summary.failed, 3);
    assert_eq!(row_count(&loader), 0);
}

#[test]
fn test_error_aborts_without_continue_on_error() {
    let mut loader = setup_loader(LoaderConfig::default());
    let script = "INSERT INTO MISSING (A) VALUES (1);";

    let err = loader.run(Cursor::new(script)).unwrap_err();
    assert!(err.to_string().contains("batch of 1 statements failed"));
    assert!(matches!(
        err.downcast_ref::<LoaderError>(),
        Some(LoaderError::Sqlite(_))
    ));
}

#[test]
fn test_structural_error_aborts_without_continue_on_error() {
    let config = LoaderConfig {
        ignore_pk: true,
        ..Default::default()
    };
    let mut loader = setup_loader(config);

    let err = loader
        .run(Cursor::new("INSERT INTO T (A, WCSID) VALUES (1, 2, 3);"))
        .unwrap_err();
    match err.downcast_ref::<LoaderError>() {
        Some(LoaderError::ColumnValueCountMismatch { columns, values }) => {
            assert_eq!((*columns, *values), (2, 3));
        }
        other => panic!("Expected ColumnValueCountMismatch error, got: {other:?}"),
    }
}

#[test]
fn test_run_file_pre_scans_insert_count() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "-- export header").unwrap();
    for i in 0..7 {
        writeln!(file, "INSERT INTO T (A, B) VALUES ({i}, '行 {i}');").unwrap();
    }
    writeln!(file, "COMMIT;").unwrap();

    let config = LoaderConfig {
        batch_size: 3,
        chunk_size: 16,
        ..Default::default()
    };
    let mut loader = setup_loader(config);
    let summary = loader.run_file(file.path()).unwrap();

    assert_eq!(summary.total_statements, 7);
    assert_eq!(summary.executed, 7);
    assert_eq!(summary.failed, 0);
    assert_eq!(row_count(&loader), 7);
}
