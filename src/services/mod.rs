pub mod flatten;
pub mod header;
pub mod items;
pub mod reconcile;

pub use flatten::{flatten_document, flatten_entity, SourceText};
pub use header::resolve_header;
pub use items::build_item_rows;
pub use reconcile::{normalize_code, reconcile_row, reconcile_rows, CANONICAL_CODE_LEN};
