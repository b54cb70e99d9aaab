//! Document AI access: the `process` call and saved-response files.

use crate::error::{Result, ScanError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_LOCATION: &str = "us";

/// Anything that can turn an input file into a Document AI response (or bare document).
pub trait DocumentSource {
    fn fetch_document(&self, path: &Path) -> Result<Value>;
}

/// The `document` record of a `process` response. A bare document (carrying `text` or
/// `entities`) is accepted as-is.
pub fn extract_document(response: &Value) -> Result<&Value> {
    match response.get("document") {
        Some(Value::Null) => Err(ScanError::NoDocument),
        Some(doc) => Ok(doc),
        None if response.get("text").is_some() || response.get("entities").is_some() => {
            Ok(response)
        }
        None if response.is_object() => Err(ScanError::NoDocument),
        None => Err(ScanError::MalformedInput(
            "Document AI response is not a JSON object".to_string(),
        )),
    }
}

fn mime_type_for(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => Ok("application/pdf"),
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "tif" | "tiff" => Ok("image/tiff"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        _ => Err(ScanError::UnsupportedFile(path.display().to_string())),
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ScanError::Io(std::io::Error::new(e.kind(), "File not found."))
        } else {
            ScanError::Io(e)
        }
    })
}

#[derive(Debug, Clone)]
pub struct DocumentAiConfig {
    pub project_id: String,
    pub location: String,
    pub processor_id: String,
    pub access_token: String,
    /// Overrides `https://{location}-documentai.googleapis.com`.
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

impl DocumentAiConfig {
    pub fn process_url(&self) -> String {
        let endpoint = match &self.endpoint {
            Some(e) => e.trim_end_matches('/').to_string(),
            None => format!("https://{}-documentai.googleapis.com", self.location),
        };
        format!(
            "{}/v1/projects/{}/locations/{}/processors/{}:process",
            endpoint, self.project_id, self.location, self.processor_id
        )
    }
}

pub struct DocumentAiClient {
    client: Client,
    config: DocumentAiConfig,
}

impl DocumentAiClient {
    pub fn new(config: DocumentAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScanError::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn processor_id(&self) -> &str {
        &self.config.processor_id
    }
}

impl DocumentSource for DocumentAiClient {
    fn fetch_document(&self, path: &Path) -> Result<Value> {
        let mime_type = mime_type_for(path)?;
        let bytes = read_input(path)?;
        let body = json!({
            "rawDocument": {
                "content": BASE64.encode(&bytes),
                "mimeType": mime_type,
            }
        });
        tracing::info!(
            "sending {} ({} bytes) to processor {}",
            path.display(),
            bytes.len(),
            self.config.processor_id
        );

        let response = self
            .client
            .post(self.config.process_url())
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .map_err(|e| {
                ScanError::Network(
                    if e.is_connect() || e.is_timeout() {
                        "Check your internet connection and try again."
                    } else {
                        "Network error."
                    }
                    .to_string(),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .map_err(|e| ScanError::Network(format!("Failed to read error response: {}", e)))?;
            return Err(ScanError::Service {
                status: status.as_u16(),
                body: if body.is_empty() {
                    "Invalid token or processor?".to_string()
                } else {
                    body
                },
            });
        }
        response
            .json::<Value>()
            .map_err(|e| ScanError::Network(format!("Invalid JSON: {}", e)))
    }
}

/// Reads a saved `process` response (or bare document) from disk.
pub struct JsonFileSource;

impl DocumentSource for JsonFileSource {
    fn fetch_document(&self, path: &Path) -> Result<Value> {
        let bytes = read_input(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
