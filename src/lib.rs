pub mod catalog;
pub mod config;
pub mod docai;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod types;

pub use catalog::Catalog;
pub use config::AppConfig;
pub use docai::{extract_document, DocumentAiClient, DocumentSource, JsonFileSource};
pub use error::{Result, ScanError};
pub use models::{ProcessorKind, ProcessorProfile};
pub use types::{EntityNode, HeaderField, ItemCell, ItemRow, ProcessedDocument, Product, ReconciledRow};

use serde_json::Value;

/// Flatten, resolve and reconcile one Document AI response (or bare document).
/// Structural errors abort the whole run; missing fields and unknown codes do not.
pub fn process_document(
    response: &Value,
    profile: &ProcessorProfile,
    catalog: &Catalog,
) -> Result<ProcessedDocument> {
    let document = extract_document(response)?;
    let entities = services::flatten_document(document)?;
    let header = services::resolve_header(&entities, profile);
    let rows = services::build_item_rows(&entities, profile);
    let items = services::reconcile_rows(&rows, catalog);
    let discrepancy_count = items.iter().filter(|r| r.has_discrepancy).count();
    tracing::debug!(
        "processed document: {} header fields, {} items, {} discrepancies",
        header.len(),
        items.len(),
        discrepancy_count
    );
    Ok(ProcessedDocument {
        processor_id: profile.processor_id.clone(),
        kind: profile.kind,
        entities,
        header,
        items,
        discrepancy_count,
    })
}
