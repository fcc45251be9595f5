#[cfg(test)]
mod tests {
    use parser_sql::{parse_dump, parse_table, SqlParseError, SqlValue};
    use pretty_assertions::assert_eq;

    fn fixture() -> String {
        std::fs::read_to_string("tests/fixtures/mysql_dump.sql")
            .expect("Unable to read example dump file")
    }

    #[test]
    fn test_parse_real_dump() {
        let statements = parse_dump(&fixture()).unwrap();
        assert_eq!(statements.len(), 3);

        let tables: Vec<_> = statements.iter().map(|s| s.table.as_str()).collect();
        assert_eq!(tables, vec!["isro_space_missions", "isro_space_missions", "launch_sites"]);

        // The launch_sites insert has no column list
        assert!(statements[2].columns.is_none());
        assert_eq!(statements[2].rows.len(), 2);
    }

    #[test]
    fn test_rows_keep_source_order_and_values() {
        let statements = parse_table(&fixture(), "isro_space_missions").unwrap();
        let rows: Vec<_> = statements.iter().flat_map(|s| s.rows.iter()).collect();
        assert_eq!(rows.len(), 8);

        let ids: Vec<_> = rows.iter().map(|r| r[0].clone()).collect();
        assert_eq!(ids, (1..=8).map(SqlValue::Int).collect::<Vec<_>>());

        assert_eq!(rows[0][1], SqlValue::Str("Aryabhata".into()));
        assert_eq!(rows[7][1], SqlValue::Str("Oceansat-2 'Oceansat'".into()));
        assert_eq!(rows[7][5], SqlValue::Null);
    }

    #[test]
    fn test_column_lookup_by_name() {
        let statements = parse_table(&fixture(), "isro_space_missions").unwrap();
        let first = &statements[0];
        assert_eq!(first.column_index("ORBIT_TYPE"), Some(4));
        assert_eq!(first.column_index("payload_mass"), None);
    }

    #[test]
    fn test_error_reports_statement_line() {
        let input = "CREATE TABLE t (a int);\n\nINSERT INTO t (a, b) VALUES\n(1, 2),\n(3, 4, 5);\n";
        let err = parse_dump(input).unwrap_err();
        assert_eq!(err.line(), 3);
        assert!(matches!(err, SqlParseError::ColumnCountMismatch { row: 2, expected: 2, found: 3, .. }));
    }

    #[test]
    fn test_sqlite_style_dump() {
        let input = r#"PRAGMA foreign_keys=OFF;
BEGIN TRANSACTION;
CREATE TABLE "missions" (name TEXT, year INTEGER);
INSERT INTO "missions" ("name","year") VALUES('GSAT-1',2001);
INSERT INTO "missions" ("name","year") VALUES('it''s',2002);
COMMIT;"#;
        let statements = parse_table(input, "missions").unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1].rows[0][0], SqlValue::Str("it's".into()));
        assert_eq!(statements[1].rows[0][1].as_text().as_deref(), Some("2002"));
    }
}
