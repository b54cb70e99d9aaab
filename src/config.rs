use crate::docai::{DocumentAiClient, DocumentAiConfig, DEFAULT_LOCATION};
use crate::error::{Result, ScanError};
use crate::models::{ProcessorKind, ProcessorProfile};
use std::path::PathBuf;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Settings read from the environment (and `.env`).
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub project_id: Option<String>,
    pub location: String,
    pub processor_id: Option<String>,
    pub detailed_processor_id: Option<String>,
    pub access_token: Option<String>,
    pub endpoint: Option<String>,
    pub product_master_path: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require(value: &Option<String>, key: &str) -> Result<String> {
    value
        .clone()
        .ok_or_else(|| ScanError::Config(format!("{} not set in .env", key)))
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(env_var)
    }

    /// Build from any key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            project_id: lookup("DOCAI_PROJECT_ID"),
            location: lookup("DOCAI_LOCATION").unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            processor_id: lookup("DOCAI_PROCESSOR_ID"),
            detailed_processor_id: lookup("DOCAI_PROCESSOR_ID_DETAILED"),
            access_token: lookup("DOCAI_ACCESS_TOKEN"),
            endpoint: lookup("DOCAI_ENDPOINT"),
            product_master_path: lookup("PRODUCT_MASTER_PATH").map(PathBuf::from),
            export_dir: lookup("EXPORT_DIR").map(PathBuf::from),
        }
    }

    fn processor_id_for(&self, kind: ProcessorKind) -> (&Option<String>, &'static str) {
        match kind {
            ProcessorKind::Standard => (&self.processor_id, "DOCAI_PROCESSOR_ID"),
            ProcessorKind::Detailed => (&self.detailed_processor_id, "DOCAI_PROCESSOR_ID_DETAILED"),
        }
    }

    /// Profile for `kind`; the processor id is empty when not configured (e.g. offline JSON input).
    pub fn profile(&self, kind: ProcessorKind) -> ProcessorProfile {
        let (id, _) = self.processor_id_for(kind);
        ProcessorProfile::new(kind, id.clone().unwrap_or_default())
    }

    pub fn docai_client(&self, kind: ProcessorKind) -> Result<DocumentAiClient> {
        let (id, key) = self.processor_id_for(kind);
        DocumentAiClient::new(DocumentAiConfig {
            project_id: require(&self.project_id, "DOCAI_PROJECT_ID")?,
            location: self.location.clone(),
            processor_id: require(id, key)?,
            access_token: require(&self.access_token, "DOCAI_ACCESS_TOKEN")?,
            endpoint: self.endpoint.clone(),
            timeout: REQUEST_TIMEOUT,
        })
    }

    /// "configured" when the standard processor can be called.
    pub fn status(&self) -> &'static str {
        match (&self.project_id, &self.processor_id, &self.access_token) {
            (Some(_), Some(_), Some(_)) => "configured",
            _ => "not_configured",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn location_defaults_to_us() {
        assert_eq!(config(&[]).location, "us");
        assert_eq!(config(&[]).status(), "not_configured");
    }

    #[test]
    fn profile_carries_configured_processor_id() {
        let cfg = config(&[("DOCAI_PROCESSOR_ID", "std1"), ("DOCAI_PROCESSOR_ID_DETAILED", "det1")]);
        assert_eq!(cfg.profile(ProcessorKind::Standard).processor_id, "std1");
        assert_eq!(cfg.profile(ProcessorKind::Detailed).processor_id, "det1");
    }

    #[test]
    fn client_requires_named_variable() {
        let cfg = config(&[("DOCAI_PROJECT_ID", "p"), ("DOCAI_ACCESS_TOKEN", "t"), ("DOCAI_PROCESSOR_ID", "s")]);
        assert_eq!(cfg.status(), "configured");
        assert!(cfg.docai_client(ProcessorKind::Standard).is_ok());
        match cfg.docai_client(ProcessorKind::Detailed) {
            Err(ScanError::Config(msg)) => assert!(msg.contains("DOCAI_PROCESSOR_ID_DETAILED")),
            _ => panic!("expected config error"),
        }
    }
}
