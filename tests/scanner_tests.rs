use sqlstream_loader::{Scanner, Statement, split_sql_statements};

fn texts(statements: &[Statement]) -> Vec<&str> {
    statements.iter().map(|s| s.as_str()).collect()
}

/// Scan `sql` as two chunks split at every char boundary and check each matches the whole-text result
fn assert_chunk_independent(sql: &str) {
    let expected = split_sql_statements(sql);
    for (split, _) in sql.char_indices().skip(1) {
        let mut scanner = Scanner::new();
        let mut got: Vec<Statement> = scanner.feed(&sql[..split]).collect();
        got.extend(scanner.feed(&sql[split..]));
        got.extend(scanner.finish());
        assert_eq!(got, expected, "split at byte {split} of {sql:?}");
    }
}

#[test]
fn test_basic_split_and_trim() {
    let statements = split_sql_statements("  INSERT INTO t VALUES (1);\n\nUPDATE t SET a = 2 ;SELECT 1");
    assert_eq!(
        texts(&statements),
        vec!["INSERT INTO t VALUES (1)", "UPDATE t SET a = 2", "SELECT 1"]
    );
}

#[test]
fn test_semicolon_in_single_quoted_string() {
    let statements = split_sql_statements("INSERT INTO T (A) VALUES ('a;b');");
    assert_eq!(texts(&statements), vec!["INSERT INTO T (A) VALUES ('a;b')"]);
}

#[test]
fn test_semicolon_in_quoted_identifier() {
    let statements = split_sql_statements(r#"INSERT INTO "we;ird""x" (A) VALUES (1);SELECT 2;"#);
    assert_eq!(
        texts(&statements),
        vec![r#"INSERT INTO "we;ird""x" (A) VALUES (1)"#, "SELECT 2"]
    );
}

#[test]
fn test_escaped_quote_does_not_end_string() {
    let statements = split_sql_statements("INSERT INTO T (A) VALUES ('it''s; fine');SELECT 1;");
    assert_eq!(
        texts(&statements),
        vec!["INSERT INTO T (A) VALUES ('it''s; fine')", "SELECT 1"]
    );
}

#[test]
fn test_double_quote_inside_string_is_plain_text() {
    let statements = split_sql_statements(r#"INSERT INTO T (A) VALUES ('<a href="x;y">');"#);
    assert_eq!(
        texts(&statements),
        vec![r#"INSERT INTO T (A) VALUES ('<a href="x;y">')"#]
    );
}

#[test]
fn test_line_comment_is_stripped_but_newline_kept() {
    let statements = split_sql_statements("SELECT 1 -- trailing; comment\nFROM t;");
    assert_eq!(texts(&statements), vec!["SELECT 1 \nFROM t"]);
}

#[test]
fn test_block_comment_is_stripped() {
    let statements = split_sql_statements("SELECT /* a; b */ 1; /* only a comment; */ SELECT 2;");
    assert_eq!(texts(&statements), vec!["SELECT  1", "SELECT 2"]);
}

#[test]
fn test_stripped_block_comment_does_not_join_delimiters() {
    let statements = split_sql_statements("SELECT 4 //**/* 2;SELECT 5;SELECT 6-/**/-1;");
    assert_eq!(
        texts(&statements),
        vec!["SELECT 4 / * 2", "SELECT 5", "SELECT 6- -1"]
    );
}

#[test]
fn test_comment_markers_inside_string_are_text() {
    let statements = split_sql_statements("INSERT INTO T (A) VALUES ('-- not /* a comment');");
    assert_eq!(
        texts(&statements),
        vec!["INSERT INTO T (A) VALUES ('-- not /* a comment')"]
    );
}

#[test]
fn test_semicolon_inside_parentheses() {
    let statements = split_sql_statements("CALL p(1; 2);SELECT 3;");
    assert_eq!(texts(&statements), vec!["CALL p(1; 2)", "SELECT 3"]);
}

#[test]
fn test_paren_depth_saturates_at_zero() {
    let statements = split_sql_statements("SELECT ) ;SELECT 2;");
    assert_eq!(texts(&statements), vec!["SELECT )", "SELECT 2"]);
}

#[test]
fn test_empty_statements_are_not_emitted() {
    let statements = split_sql_statements(";;  ;\n SELECT 1;;");
    assert_eq!(texts(&statements), vec!["SELECT 1"]);
}

#[test]
fn test_division_and_negative_numbers_survive() {
    let statements = split_sql_statements("SELECT 6/3, -1, 4 - 2;");
    assert_eq!(texts(&statements), vec!["SELECT 6/3, -1, 4 - 2"]);
}

#[test]
fn test_feed_is_lazy() {
    let mut scanner = Scanner::new();
    let mut feed = scanner.feed("A;B;C");
    assert_eq!(feed.next().unwrap(), "A");
    assert_eq!(feed.next().unwrap(), "B");
    assert!(feed.next().is_none());
    drop(feed);
    assert_eq!(scanner.finish(), vec!["C"]);
}

#[test]
fn test_dropped_feed_defers_remaining_statements() {
    let mut scanner = Scanner::new();
    let mut feed = scanner.feed("A;B;C;");
    assert_eq!(feed.next().unwrap(), "A");
    drop(feed);

    let out: Vec<_> = scanner.feed("E;").collect();
    assert_eq!(texts(&out), vec!["B", "C", "E"]);
    assert!(scanner.finish().is_empty());

    // held-back statements also come out of finish
    let mut scanner = Scanner::new();
    drop(scanner.feed("X;Y;Z"));
    assert_eq!(scanner.finish(), vec!["X", "Y", "Z"]);
}

#[test]
fn test_state_is_carried_across_chunks() {
    let mut scanner = Scanner::new();
    assert_eq!(scanner.feed("INSERT INTO t VALUES ('ab;").count(), 0);
    assert!(scanner.state().in_single_quote());
    assert_eq!(scanner.state().paren_depth(), 1);

    assert_eq!(scanner.feed("c') /* x;").count(), 0);
    assert!(scanner.state().in_block_comment());
    assert_eq!(scanner.state().paren_depth(), 0);

    let out: Vec<_> = scanner.feed(" */;-- tail").collect();
    assert_eq!(texts(&out), vec!["INSERT INTO t VALUES ('ab;c')"]);
    assert!(scanner.state().in_line_comment());
}

#[test]
fn test_delimiters_split_across_chunks() {
    assert_chunk_independent("SELECT 1 -- c;\n;SELECT 2;");
    assert_chunk_independent("SELECT /* c; */ 3;SELECT 4 /* ** */;");
    assert_chunk_independent("INSERT INTO T (A) VALUES ('it''s;'), (\"q\"\"x;\");");
    assert_chunk_independent("SELECT 8 - 2 / 4;SELECT '月;' FROM DUAL");
}

#[test]
fn test_single_character_chunks() {
    let sql = "INSERT INTO T (A, B) VALUES ('x;y', /* c */ 2); -- done\nSELECT 1;";
    let mut scanner = Scanner::new();
    let mut got = Vec::new();
    let mut buf = [0u8; 4];
    for c in sql.chars() {
        got.extend(scanner.feed(c.encode_utf8(&mut buf)));
    }
    got.extend(scanner.finish());
    assert_eq!(got, split_sql_statements(sql));
    assert_eq!(got.len(), 2);
}

#[test]
fn test_finish_flushes_and_resets() {
    let mut scanner = Scanner::new();
    assert_eq!(scanner.feed("SELECT 'unterminated").count(), 0);
    assert_eq!(scanner.finish(), vec!["SELECT 'unterminated"]);
    assert!(!scanner.state().in_single_quote());
    assert_eq!(scanner.state().paren_depth(), 0);
    assert!(scanner.finish().is_empty());

    let out: Vec<_> = scanner.feed("SELECT 1;").collect();
    assert_eq!(texts(&out), vec!["SELECT 1"]);
}

#[test]
fn test_two_independent_passes_agree() {
    let sql = "INSERT INTO T (A) VALUES (1);\n/* c */INSERT INTO T (A) VALUES ('a;b');UPDATE T SET A=1";
    let chunks = ["INSERT INTO T (A) VAL", "UES (1);\n/", "* c */INSERT INTO T (A) VALUES ('a;", "b');UPDATE T SET A=1"];
    assert_eq!(chunks.concat(), sql);

    let run = || {
        let mut scanner = Scanner::new();
        let mut out: Vec<Statement> = Vec::new();
        for chunk in chunks {
            out.extend(scanner.feed(chunk));
        }
        out.extend(scanner.finish());
        out
    };
    let first = run();
    let second = run();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_resegmentation_is_idempotent() {
    for sql in [
        "INSERT INTO T (A) VALUES ('x;y');  -- c\nSELECT (1;2) ; /* z */ DELETE FROM T",
        "SELECT 4 //**/* 2;SELECT 5;",
        "SELECT 'a'/**/';' FROM DUAL;SELECT 1 -/* x */-2",
    ] {
        let first = split_sql_statements(sql);
        let joined = first
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(";");
        let second = split_sql_statements(&joined);
        assert_eq!(first, second, "{sql:?}");
    }
}
