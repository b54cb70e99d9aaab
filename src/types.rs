use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder shown for a field with neither a value nor a normalized value.
pub const EMPTY_DISPLAY: &str = "-";

/// One flattened Document AI entity with its nested properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityNode {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub value: String,
    pub confidence: f64,
    pub normalized_value: String,
    /// 1-based page number.
    pub page: u32,
    pub properties: Vec<EntityNode>,
}

impl EntityNode {
    /// `value` if non-empty, else `normalized_value`, else a dash.
    pub fn display_value(&self) -> &str {
        if !self.value.is_empty() {
            &self.value
        } else if !self.normalized_value.is_empty() {
            &self.normalized_value
        } else {
            EMPTY_DISPLAY
        }
    }

    /// First direct child of the given type, in source order.
    pub fn property(&self, entity_type: &str) -> Option<&EntityNode> {
        self.properties.iter().find(|p| p.entity_type == entity_type)
    }
}

/// Header row entry shown above the item table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderField {
    #[serde(rename = "type")]
    pub field_type: String,
    pub value: String,
    pub confidence: f64,
    pub page: u32,
}

/// Resolved value of one item column. `confidence`/`page` are absent when the item had no such property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCell {
    pub key: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// One line item, cells in column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRow {
    pub cells: Vec<ItemCell>,
}

impl ItemRow {
    pub fn cell(&self, key: &str) -> Option<&ItemCell> {
        self.cells.iter().find(|c| c.key == key)
    }

    /// Raw resolved value of a column (dash when the column is unknown).
    pub fn value(&self, key: &str) -> &str {
        self.cell(key).map(|c| c.value.as_str()).unwrap_or(EMPTY_DISPLAY)
    }
}

/// Product master record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(deserialize_with = "code_from_string_or_number")]
    pub product_code: String,
    pub product_name: String,
    #[serde(default)]
    pub purchase_price: f64,
    #[serde(default)]
    pub sales_price: f64,
}

/// Product masters exported from spreadsheets often carry codes as bare integers.
fn code_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Int(i64),
    }
    Ok(match Code::deserialize(deserializer)? {
        Code::Text(s) => s.trim().to_string(),
        Code::Int(n) => n.to_string(),
    })
}

/// An item row after product-code reconciliation against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledRow {
    pub row: ItemRow,
    pub original_code: String,
    pub normalized_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_product: Option<Product>,
    pub has_discrepancy: bool,
}

/// Result of one document-processing invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedDocument {
    pub processor_id: String,
    pub kind: crate::models::ProcessorKind,
    pub entities: Vec<EntityNode>,
    pub header: Vec<HeaderField>,
    pub items: Vec<ReconciledRow>,
    pub discrepancy_count: usize,
}
