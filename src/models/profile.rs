use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Item column: entity type key and the label used in exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub key: &'static str,
    pub label: &'static str,
}

/// Item columns in export order (order matches the purchase-order form).
pub const ITEM_COLUMNS: &[ColumnDef] = &[
    ColumnDef { key: "jan_code", label: "JANコード" },
    ColumnDef { key: "product_code", label: "商品コード" },
    ColumnDef { key: "product_name", label: "商品名" },
    ColumnDef { key: "quantity_per_case", label: "入数" },
    ColumnDef { key: "box_count", label: "箱数" },
    ColumnDef { key: "case_count", label: "ケース数" },
    ColumnDef { key: "quantity", label: "数量" },
    ColumnDef { key: "unit_price", label: "単価" },
    ColumnDef { key: "amount", label: "金額" },
    ColumnDef { key: "delivery_date", label: "納品日" },
];

/// Item columns written as numbers in spreadsheet exports.
pub const NUMERIC_ITEM_COLUMNS: &[&str] = &[
    "quantity_per_case",
    "box_count",
    "case_count",
    "quantity",
    "unit_price",
    "amount",
];

const STANDARD_HEADER_FIELDS: &[&str] = &[
    "order_number",
    "order_date",
    "delivery_date",
    "orderer_name",
    "supplier_name",
    "total_amount",
];

const DETAILED_HEADER_FIELDS: &[&str] = &[
    "order_number",
    "order_date",
    "delivery_date",
    "orderer_name",
    "supplier_name",
    "total_amount",
    "shipping_address",
    "phone_number",
    "fax_number",
    "remarks",
];

/// Top-level entity whose `name`/`address` children are promoted into the header.
pub const RECIPIENT_COMPANY: &str = "recipient_company";
pub const RECIPIENT_COMPANY_FIELDS: &[&str] = &["name", "address"];

/// Entity type of a repeating line item.
pub const ITEM_ENTITY: &str = "item";

/// Column holding the extracted product code.
pub const PRODUCT_CODE_COLUMN: &str = "product_code";
pub const PRODUCT_NAME_COLUMN: &str = "product_name";

/// Header labels for display (Japanese, as printed on the form).
const HEADER_LABELS: &[(&str, &str)] = &[
    ("order_number", "注文番号"),
    ("order_date", "発注日"),
    ("delivery_date", "納品日"),
    ("orderer_name", "発注者"),
    ("supplier_name", "仕入先"),
    ("total_amount", "合計金額"),
    ("shipping_address", "納品先住所"),
    ("phone_number", "電話番号"),
    ("fax_number", "FAX番号"),
    ("remarks", "備考"),
    ("name", "宛先会社名"),
    ("address", "宛先住所"),
];

/// Label for a header field type; unknown types fall back to the type itself.
pub fn header_label(field_type: &str) -> &str {
    HEADER_LABELS
        .iter()
        .find(|(key, _)| *key == field_type)
        .map(|(_, label)| *label)
        .unwrap_or(field_type)
}

/// Which Document AI processor variant produced the entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessorKind {
    Standard,
    Detailed,
}

impl ProcessorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessorKind::Standard => "standard",
            ProcessorKind::Detailed => "detailed",
        }
    }

    fn header_fields(&self) -> &'static [&'static str] {
        match self {
            ProcessorKind::Standard => STANDARD_HEADER_FIELDS,
            ProcessorKind::Detailed => DETAILED_HEADER_FIELDS,
        }
    }
}

impl fmt::Display for ProcessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(ProcessorKind::Standard),
            "detailed" => Ok(ProcessorKind::Detailed),
            other => Err(format!("Unknown processor kind '{}' (expected standard or detailed)", other)),
        }
    }
}

/// Header field set, item column set and processor id of one processing variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorProfile {
    pub kind: ProcessorKind,
    pub processor_id: String,
    pub header_fields: &'static [&'static str],
    pub item_columns: &'static [ColumnDef],
}

impl ProcessorProfile {
    pub fn new(kind: ProcessorKind, processor_id: impl Into<String>) -> Self {
        Self {
            kind,
            processor_id: processor_id.into(),
            header_fields: kind.header_fields(),
            item_columns: ITEM_COLUMNS,
        }
    }

    pub fn is_header_field(&self, entity_type: &str) -> bool {
        self.header_fields.contains(&entity_type)
    }
}
