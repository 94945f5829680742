use uralex_export::error::ExportError;
use uralex_export::tsv::Table;

#[test]
fn columns_are_keyed_by_header() {
    let table = Table::parse("Data.tsv", "lgid3\turalex_mng\tcogn_set\nfin\thand\t1\nest\thand\t1\n").unwrap();
    assert_eq!(table.name(), "Data.tsv");
    assert_eq!(table.headers(), ["lgid3", "uralex_mng", "cogn_set"]);
    assert_eq!(table.len(), 2);
    assert_eq!(table.column("lgid3").unwrap(), ["fin", "est"]);
    assert!(table.has_column("cogn_set"));
    assert!(!table.has_column("form_set"));
}

#[test]
fn byte_order_mark_and_windows_line_endings() {
    let table = Table::parse("Languages.tsv", "\u{feff}lgid3\tASCII_name\r\nfin\tFinnish\r\n").unwrap();
    assert_eq!(table.headers(), ["lgid3", "ASCII_name"]);
    assert_eq!(table.column("ASCII_name").unwrap(), ["Finnish"]);
}

#[test]
fn quoted_fields_may_hold_tabs_quotes_and_newlines() {
    let text = "a\tb\n\"x\ty\"\t\"say \"\"hi\"\"\nagain\"\n";
    let table = Table::parse("t", text).unwrap();
    assert_eq!(table.column("a").unwrap(), ["x\ty"]);
    assert_eq!(table.column("b").unwrap(), ["say \"hi\"\nagain"]);
}

#[test]
fn blank_lines_are_skipped_and_short_rows_padded() {
    let table = Table::parse("t", "a\tb\tc\n\n1\t2\n\n4\t5\t6").unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.column("c").unwrap(), ["", "6"]);
}

#[test]
fn columns_without_header_are_ignored() {
    let table = Table::parse("t", "a\t\tb\n1\tx\t2\n").unwrap();
    assert_eq!(table.headers(), ["a", "b"]);
    assert_eq!(table.column("b").unwrap(), ["2"]);
}

#[test]
fn duplicate_headers_are_rejected() {
    let err = Table::parse("Data.tsv", "a\tb\ta\n1\t2\t3\n").unwrap_err();
    assert!(matches!(err, ExportError::MalformedTable { ref table, .. } if table == "Data.tsv"));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn missing_columns_and_unterminated_quotes_are_malformed() {
    let table = Table::parse("t", "a\n1\n").unwrap();
    assert!(matches!(table.column("b"), Err(ExportError::MalformedTable { .. })));
    assert!(table.first_column_of(&["lgid3", "uralex_lang"]).is_err());
    assert!(Table::parse("t", "a\n\"open\n").is_err());
    assert!(Table::parse("t", "").is_err());
}

#[test]
fn first_matching_column_wins() {
    let table = Table::parse("t", "uralex_lang\tlgid3\nfin\tfin\n").unwrap();
    assert_eq!(table.first_column_of(&["lgid3", "uralex_lang"]).unwrap(), "lgid3");
}
