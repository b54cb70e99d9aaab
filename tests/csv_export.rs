use chrono::NaiveDate;
use po_scanner_lib::export::{export_items_csv, save_artifact};
use po_scanner_lib::models::ITEM_COLUMNS;
use po_scanner_lib::{ItemCell, ItemRow, ProcessorKind, ProcessorProfile, ReconciledRow};
use proptest::prelude::*;

/// RFC 4180 reader: quoted fields may contain separators, line breaks and doubled quotes.
fn parse_csv(input: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => record.push(std::mem::take(&mut field)),
                '\n' => {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                _ => field.push(c),
            }
        }
    }
    record.push(field);
    records.push(record);
    records
}

fn unreconciled(values: &[String]) -> ReconciledRow {
    ReconciledRow {
        row: ItemRow {
            cells: ITEM_COLUMNS
                .iter()
                .zip(values)
                .map(|(col, v)| ItemCell {
                    key: col.key.to_string(),
                    value: v.clone(),
                    confidence: Some(0.5),
                    page: Some(1),
                })
                .collect(),
        },
        original_code: "-".to_string(),
        normalized_code: "-".to_string(),
        matched_product: None,
        has_discrepancy: false,
    }
}

fn export(rows: &[ReconciledRow]) -> String {
    let profile = ProcessorProfile::new(ProcessorKind::Standard, "p");
    let artifact = export_items_csv(rows, &profile, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
    let text = String::from_utf8(artifact.bytes).unwrap();
    text.strip_prefix('\u{FEFF}').unwrap().to_string()
}

#[test]
fn header_line_is_column_labels() {
    let records = parse_csv(&export(&[]));
    let labels: Vec<&str> = ITEM_COLUMNS.iter().map(|c| c.label).collect();
    assert_eq!(records, vec![labels.iter().map(|s| s.to_string()).collect::<Vec<_>>()]);
}

#[test]
fn multiline_value_survives_round_trip() {
    let mut values = vec!["-".to_string(); ITEM_COLUMNS.len()];
    values[2] = "ウィジェット\n(青), \"特価\"".to_string();
    let records = parse_csv(&export(&[unreconciled(&values)]));
    assert_eq!(records.len(), 2);
    assert_eq!(records[1], values);
}

#[test]
fn saved_file_keeps_bom_and_dated_name() {
    let dir = tempfile::tempdir().unwrap();
    let profile = ProcessorProfile::new(ProcessorKind::Detailed, "p");
    let artifact = export_items_csv(&[], &profile, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
    let path = save_artifact(&artifact, Some(dir.path())).unwrap();
    assert!(path.ends_with("purchase_order_items_20250331.csv"));
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
}

proptest! {
    #[test]
    fn any_field_round_trips(
        rows in proptest::collection::vec(
            proptest::collection::vec("[a-z0-9 ,\"\n\r東京-]{0,12}", ITEM_COLUMNS.len()),
            1..5,
        )
    ) {
        let reconciled: Vec<ReconciledRow> = rows.iter().map(|v| unreconciled(v)).collect();
        let records = parse_csv(&export(&reconciled));
        prop_assert_eq!(records.len(), rows.len() + 1);
        for (parsed, original) in records[1..].iter().zip(&rows) {
            prop_assert_eq!(parsed, original);
        }
    }
}
