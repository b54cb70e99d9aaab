//! Product-code reconciliation against the product master.
//!
//! Extraction over-reads trailing characters of the code cell, while master codes are
//! always `CANONICAL_CODE_LEN` characters. The normalized code is therefore the first
//! `CANONICAL_CODE_LEN` characters of the extracted code; shorter codes are left as-is
//! and never flagged.

use crate::catalog::Catalog;
use crate::models::{PRODUCT_CODE_COLUMN, PRODUCT_NAME_COLUMN};
use crate::types::{ItemRow, ReconciledRow};

pub const CANONICAL_CODE_LEN: usize = 4;

/// First `CANONICAL_CODE_LEN` characters, or the code unchanged when shorter.
pub fn normalize_code(code: &str) -> String {
    code.chars().take(CANONICAL_CODE_LEN).collect()
}

fn is_reconcilable(code: &str) -> bool {
    code.chars().count() >= CANONICAL_CODE_LEN
}

pub fn reconcile_row(row: &ItemRow, catalog: &Catalog) -> ReconciledRow {
    let original_code = row.value(PRODUCT_CODE_COLUMN).to_string();
    let normalized_code = normalize_code(&original_code);
    let matched_product = catalog.find(&normalized_code).cloned();
    let has_discrepancy = is_reconcilable(&original_code) && matched_product.is_none();
    if has_discrepancy {
        tracing::warn!("product code '{}' not found in product master", original_code);
    }
    ReconciledRow {
        row: row.clone(),
        original_code,
        normalized_code,
        matched_product,
        has_discrepancy,
    }
}

pub fn reconcile_rows(rows: &[ItemRow], catalog: &Catalog) -> Vec<ReconciledRow> {
    rows.iter().map(|row| reconcile_row(row, catalog)).collect()
}

impl ReconciledRow {
    /// Column value as displayed and exported: `product_code`/`product_name` are replaced by the
    /// master's canonical values when the extracted code matched; every other column is raw.
    pub fn display_value(&self, key: &str) -> &str {
        if is_reconcilable(&self.original_code) {
            if let Some(product) = &self.matched_product {
                match key {
                    PRODUCT_CODE_COLUMN => return &product.product_code,
                    PRODUCT_NAME_COLUMN => return &product.product_name,
                    _ => {}
                }
            }
        }
        self.row.value(key)
    }
}
