//! Product master: loaded once per run, then read-only.

use crate::error::{Result, ScanError};
use crate::types::Product;
use calamine::{open_workbook_auto, DataType, Reader};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Header texts accepted for each product master column (English key or Japanese label).
const CODE_HEADERS: &[&str] = &["product_code", "商品コード"];
const NAME_HEADERS: &[&str] = &["product_name", "商品名"];
const ID_HEADERS: &[&str] = &["id", "商品id"];
const PURCHASE_PRICE_HEADERS: &[&str] = &["purchase_price", "仕入価格", "仕入単価"];
const SALES_PRICE_HEADERS: &[&str] = &["sales_price", "販売価格", "売価"];

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    by_code: HashMap<String, usize>,
}

impl Catalog {
    /// Index products by code. Codes must be unique.
    pub fn from_products(products: Vec<Product>) -> Result<Self> {
        let mut by_code = HashMap::with_capacity(products.len());
        for (i, p) in products.iter().enumerate() {
            if by_code.insert(p.product_code.clone(), i).is_some() {
                return Err(ScanError::Catalog(format!(
                    "duplicate product code '{}'",
                    p.product_code
                )));
            }
        }
        Ok(Self { products, by_code })
    }

    /// Load a product master from `.json` (array of products) or a spreadsheet (first sheet).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ScanError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Product master not found: {}", path.display()),
            )));
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        let products = match ext.as_str() {
            "json" => {
                let reader = BufReader::new(File::open(path)?);
                serde_json::from_reader::<_, Vec<Product>>(reader)?
            }
            "xlsx" | "xlsm" | "xls" | "ods" => read_products_from_sheet(path)?,
            other => {
                return Err(ScanError::Catalog(format!(
                    "unsupported product master format '.{}'",
                    other
                )))
            }
        };
        let catalog = Self::from_products(products)?;
        tracing::info!("loaded {} products from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn find(&self, code: &str) -> Option<&Product> {
        self.by_code.get(code).map(|&i| &self.products[i])
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

fn find_column(headers: &[String], accepted: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.trim().to_lowercase();
        accepted.iter().any(|a| h == *a)
    })
}

/// Parse a numeric cell, tolerating thousands separators and a leading yen sign.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_start_matches(['¥', '￥'])
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().ok()
}

fn cell_number<T: DataType>(row: &[T], col: Option<usize>) -> Option<f64> {
    let cell = row.get(col?)?;
    cell.as_f64()
        .or_else(|| cell.as_string().and_then(|s| parse_number(&s)))
}

fn cell_text<T: DataType>(row: &[T], col: Option<usize>) -> String {
    col.and_then(|c| row.get(c))
        .and_then(|cell| cell.as_string())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Header row 1, one product per following row; rows without a code are skipped.
fn read_products_from_sheet(path: &Path) -> Result<Vec<Product>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ScanError::Catalog(format!("Could not open product master: {}", e)))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ScanError::Catalog("product master has no worksheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ScanError::Catalog(format!("Sheet not found: {}", e)))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(|c| c.as_string().unwrap_or_default()).collect())
        .unwrap_or_default();
    let code_col = find_column(&headers, CODE_HEADERS).ok_or_else(|| {
        ScanError::Catalog("product master has no product_code column".to_string())
    })?;
    let name_col = find_column(&headers, NAME_HEADERS);
    let id_col = find_column(&headers, ID_HEADERS);
    let purchase_col = find_column(&headers, PURCHASE_PRICE_HEADERS);
    let sales_col = find_column(&headers, SALES_PRICE_HEADERS);

    let mut products = Vec::new();
    for (i, row) in rows.enumerate() {
        let product_code = cell_text(row, Some(code_col));
        if product_code.is_empty() {
            continue;
        }
        let id = cell_number(row, id_col)
            .map(|n| n as i64)
            .unwrap_or((i + 1) as i64);
        products.push(Product {
            id,
            product_code,
            product_name: cell_text(row, name_col),
            purchase_price: cell_number(row, purchase_col).unwrap_or(0.0),
            sales_price: cell_number(row, sales_col).unwrap_or(0.0),
        });
    }
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn product(id: i64, code: &str, name: &str) -> Product {
        Product {
            id,
            product_code: code.to_string(),
            product_name: name.to_string(),
            purchase_price: 100.0,
            sales_price: 150.0,
        }
    }

    #[test]
    fn find_is_exact_match() {
        let catalog = Catalog::from_products(vec![product(1, "2160", "Widget A")]).unwrap();
        assert_eq!(catalog.find("2160").map(|p| p.product_name.as_str()), Some("Widget A"));
        assert!(catalog.find("216").is_none());
        assert!(catalog.find("21605").is_none());
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let err = Catalog::from_products(vec![product(1, "2160", "A"), product(2, "2160", "B")]);
        assert!(matches!(err, Err(ScanError::Catalog(_))));
    }

    #[test]
    fn loads_json_with_numeric_codes() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"id":1,"product_code":2160,"product_name":"Widget A","purchase_price":80,"sales_price":120}},
               {{"id":2,"product_code":"3100","product_name":"Widget B","purchase_price":1.5,"sales_price":2}}]"#
        )
        .unwrap();
        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find("2160").unwrap().sales_price, 120.0);
        assert_eq!(catalog.find("3100").unwrap().id, 2);
    }

    #[test]
    fn loads_xlsx_by_header_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("master.xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, h) in ["id", "商品コード", "商品名", "仕入価格", "販売価格"].iter().enumerate() {
            sheet.write_string(0, col as u16, *h).unwrap();
        }
        sheet.write_number(1, 0, 7.0).unwrap();
        sheet.write_number(1, 1, 2160.0).unwrap();
        sheet.write_string(1, 2, "Widget A").unwrap();
        sheet.write_string(1, 3, "1,200").unwrap();
        sheet.write_number(1, 4, 1500.0).unwrap();
        sheet.write_string(2, 2, "no code row").unwrap();
        workbook.save(&path).unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        let p = catalog.find("2160").unwrap();
        assert_eq!(p.id, 7);
        assert_eq!(p.product_name, "Widget A");
        assert_eq!(p.purchase_price, 1200.0);
        assert_eq!(p.sales_price, 1500.0);
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            Catalog::load(Path::new("/nonexistent/master.json")),
            Err(ScanError::Io(_))
        ));
    }

    #[test]
    fn parse_number_handles_separators() {
        assert_eq!(parse_number("¥1,234.5"), Some(1234.5));
        assert_eq!(parse_number("abc"), None);
    }
}
