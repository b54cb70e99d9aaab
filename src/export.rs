use crate::catalog::parse_number;
use crate::error::{Result, ScanError};
use crate::models::{ColumnDef, ProcessorProfile, NUMERIC_ITEM_COLUMNS};
use crate::types::ReconciledRow;
use chrono::NaiveDate;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet, XlsxError};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Byte-order mark so spreadsheet applications detect UTF-8.
const BOM: char = '\u{FEFF}';

const FILE_STEM: &str = "purchase_order_items";
const SHEET_NAME: &str = "Items";

/// Named export payload for the caller to persist or serve.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn export_file_name(date: NaiveDate, extension: &str) -> String {
    format!("{}_{}.{}", FILE_STEM, date.format("%Y%m%d"), extension)
}

/// Quote a field containing a comma, quote or line break; inner quotes are doubled.
pub fn escape_csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn csv_line<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    fields.map(escape_csv_field).collect::<Vec<_>>().join(",")
}

/// Label line followed by one line per row of substituted display values, BOM-prefixed.
pub fn items_to_csv(rows: &[ReconciledRow], columns: &[ColumnDef]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(csv_line(columns.iter().map(|c| c.label)));
    for row in rows {
        lines.push(csv_line(columns.iter().map(|c| row.display_value(c.key))));
    }
    let mut out = String::new();
    out.push(BOM);
    out.push_str(&lines.join("\n"));
    out
}

pub fn export_items_csv(
    rows: &[ReconciledRow],
    profile: &ProcessorProfile,
    export_date: NaiveDate,
) -> ExportArtifact {
    let csv = items_to_csv(rows, profile.item_columns);
    tracing::info!("exported {} item rows to CSV", rows.len());
    ExportArtifact {
        file_name: export_file_name(export_date, "csv"),
        content_type: CSV_CONTENT_TYPE,
        bytes: csv.into_bytes(),
    }
}

/// Next free path for `file_name` in `dir`: `name.ext`, then `name_2.ext`, `name_3.ext`...
pub fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let first = dir.join(file_name);
    if !first.exists() {
        return first;
    }
    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{}", ext)),
        None => (file_name, String::new()),
    };
    let mut counter = 2u32;
    loop {
        let candidate = dir.join(format!("{}_{}{}", stem, counter, ext));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Default export folder: Downloads, else Desktop.
pub fn default_export_dir() -> Result<PathBuf> {
    dirs::download_dir()
        .or_else(dirs::desktop_dir)
        .ok_or_else(|| ScanError::Export("Could not find Downloads or Desktop folder.".to_string()))
}

/// Write the artifact into `dir` (or the default export folder) without overwriting. Returns the path.
pub fn save_artifact(artifact: &ExportArtifact, dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match dir {
        Some(d) => d.to_path_buf(),
        None => default_export_dir()?,
    };
    std::fs::create_dir_all(&dir)?;
    let path = unique_path(&dir, &artifact.file_name);
    std::fs::write(&path, &artifact.bytes)?;
    tracing::info!("saved {}", path.display());
    Ok(path)
}

/// Drop characters that are invalid in sheet XML (control chars except tab/newline/CR).
fn sanitize_cell(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            let u = c as u32;
            c == '\t' || c == '\n' || c == '\r' || !(u < 0x20 || u == 0x7F || u == 0xFFFE || u == 0xFFFF)
        })
        .collect()
}

/// Column width from text length; full-width characters count double. Clamped 10–50.
fn estimate_text_width(text: &str) -> f64 {
    let units: f64 = text
        .chars()
        .map(|c| if c.is_ascii() { 1.0 } else { 2.0 })
        .sum();
    (units * 1.2).clamp(10.0, 50.0)
}

fn calculate_column_widths(rows: &[ReconciledRow], columns: &[ColumnDef]) -> Vec<f64> {
    columns
        .iter()
        .map(|col| {
            rows.iter()
                .map(|r| estimate_text_width(r.display_value(col.key)))
                .fold(estimate_text_width(col.label), f64::max)
        })
        .collect()
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    key: &str,
    value: &str,
    text_format: &Format,
    number_format: &Format,
) -> std::result::Result<(), XlsxError> {
    if NUMERIC_ITEM_COLUMNS.contains(&key) {
        if let Some(num) = parse_number(value) {
            return worksheet
                .write_number_with_format(row, col, num, number_format)
                .map(|_| ());
        }
    }
    worksheet
        .write_string_with_format(row, col, sanitize_cell(value), text_format)
        .map(|_| ())
}

/// Write the reconciled rows to a new workbook at `path`. Rows with a product-code
/// discrepancy are highlighted.
pub fn export_items_to_xlsx(
    rows: &[ReconciledRow],
    profile: &ProcessorProfile,
    path: &Path,
) -> Result<()> {
    let columns = profile.item_columns;
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x2563EB))
        .set_font_color(Color::RGB(0xFFFFFF));
    let text_format = Format::new().set_text_wrap();
    let number_format = Format::new()
        .set_num_format("#,##0.##")
        .set_align(FormatAlign::Right);
    let flagged_text = text_format.clone().set_background_color(Color::RGB(0xFDE2E2));
    let flagged_number = number_format.clone().set_background_color(Color::RGB(0xFDE2E2));

    for (col, width) in calculate_column_widths(rows, columns).into_iter().enumerate() {
        worksheet.set_column_width(col as u16, width)?;
    }
    for (col, def) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, def.label, &header_format)?;
    }
    for (row_idx, row) in rows.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        let (text_fmt, number_fmt) = if row.has_discrepancy {
            (&flagged_text, &flagged_number)
        } else {
            (&text_format, &number_format)
        };
        for (col, def) in columns.iter().enumerate() {
            write_cell(
                worksheet,
                excel_row,
                col as u16,
                def.key,
                row.display_value(def.key),
                text_fmt,
                number_fmt,
            )?;
        }
    }
    worksheet.set_freeze_panes(1, 0)?;
    workbook.save(path)?;
    tracing::info!("exported {} item rows to {}", rows.len(), path.display());
    Ok(())
}
