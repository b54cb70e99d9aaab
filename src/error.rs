use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Error, Debug)]
pub enum ScanError {
    /// The entity document (or one of its entities) is not a JSON record.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The Document AI response carried no document body.
    #[error("No document in Document AI response.")]
    NoDocument,

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("Document AI request failed ({status}): {body}")]
    Service { status: u16, body: String },

    #[error("{0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Product master error: {0}")]
    Catalog(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rust_xlsxwriter::XlsxError> for ScanError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ScanError::Export(err.to_string())
    }
}
