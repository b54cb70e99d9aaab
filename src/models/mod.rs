pub mod profile;

pub use profile::{
    header_label, ColumnDef, ProcessorKind, ProcessorProfile, ITEM_COLUMNS, ITEM_ENTITY,
    NUMERIC_ITEM_COLUMNS, PRODUCT_CODE_COLUMN, PRODUCT_NAME_COLUMN, RECIPIENT_COMPANY,
    RECIPIENT_COMPANY_FIELDS,
};
