//! Document AI entity tree -> `EntityNode` tree.
//!
//! Walks the raw JSON the same way for every depth: display text comes from
//! `mentionText`, or from the document text sliced by `textAnchor.textSegments`.

use crate::error::{Result, ScanError};
use crate::types::EntityNode;
use serde_json::{json, Value};

/// Full document text addressable by character offsets.
pub struct SourceText<'a> {
    text: &'a str,
    /// Byte offset of every char, plus `text.len()` as the end sentinel.
    boundaries: Vec<usize>,
}

impl<'a> SourceText<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        Self { text, boundaries }
    }

    pub fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Characters `start..end`, clamped to the text. Empty when `end <= start`.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let len = self.char_len();
        let start = start.min(len);
        let end = end.min(len);
        if end <= start {
            return "";
        }
        &self.text[self.boundaries[start]..self.boundaries[end]]
    }
}

/// Document AI encodes int64 offsets as JSON strings; accept both forms.
fn offset_value(v: Option<&Value>) -> Option<usize> {
    let v = v?;
    v.as_u64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse::<u64>().ok()))
        .map(|n| n as usize)
}

fn get_str<'v>(obj: &'v Value, key: &str) -> Option<&'v str> {
    obj.get(key).and_then(|v| v.as_str())
}

/// Text covered by `textAnchor.textSegments`, segments joined without separator, trimmed.
/// `None` when the entity carries no anchor.
fn anchored_text(raw: &Value, text: &SourceText) -> Option<String> {
    let segments = raw
        .get("textAnchor")
        .and_then(|a| a.get("textSegments"))
        .and_then(|s| s.as_array())?;
    let mut out = String::new();
    for segment in segments {
        // Missing startIndex is the proto3 default of 0; a segment without an end covers nothing.
        let start = offset_value(segment.get("startIndex")).unwrap_or(0);
        let Some(end) = offset_value(segment.get("endIndex")) else {
            continue;
        };
        out.push_str(text.slice(start, end));
    }
    Some(out.trim().to_string())
}

fn resolve_value(raw: &Value, text: &SourceText) -> String {
    if let Some(mention) = get_str(raw, "mentionText").filter(|s| !s.is_empty()) {
        return mention.to_string();
    }
    anchored_text(raw, text).unwrap_or_default()
}

fn resolve_confidence(raw: &Value) -> f64 {
    match raw.get("confidence").and_then(|c| c.as_f64()) {
        Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

fn resolve_normalized(raw: &Value) -> String {
    match raw.get("normalizedValue") {
        Some(Value::String(s)) => s.clone(),
        Some(obj) => get_str(obj, "text").unwrap_or("").to_string(),
        None => String::new(),
    }
}

/// First page reference, converted from 0-based to 1-based.
fn resolve_page(raw: &Value) -> u32 {
    raw.get("pageAnchor")
        .and_then(|a| a.get("pageRefs"))
        .and_then(|r| r.as_array())
        .and_then(|refs| refs.first())
        .map(|first| offset_value(first.get("page")).unwrap_or(0))
        .map(|p| u32::try_from(p).unwrap_or(u32::MAX).saturating_add(1))
        .unwrap_or(1)
}

fn flatten_at(raw: &Value, text: &SourceText, path: &str) -> Result<EntityNode> {
    if !raw.is_object() {
        return Err(ScanError::MalformedInput(format!("{} is not a JSON object", path)));
    }
    let properties = match raw.get("properties") {
        Some(Value::Array(children)) => children
            .iter()
            .enumerate()
            .map(|(i, child)| flatten_at(child, text, &format!("{}.properties[{}]", path, i)))
            .collect::<Result<Vec<_>>>()?,
        Some(Value::Null) | None => Vec::new(),
        Some(_) => {
            tracing::warn!("{}.properties is not an array; treating as empty", path);
            Vec::new()
        }
    };
    Ok(EntityNode {
        entity_type: get_str(raw, "type").unwrap_or("").to_string(),
        value: resolve_value(raw, text),
        confidence: resolve_confidence(raw),
        normalized_value: resolve_normalized(raw),
        page: resolve_page(raw),
        properties,
    })
}

/// Flatten a single raw entity against the document text.
pub fn flatten_entity(raw: &Value, text: &SourceText) -> Result<EntityNode> {
    flatten_at(raw, text, "entity")
}

/// Flatten every top-level entity of a Document AI `document` record, in source order.
pub fn flatten_document(document: &Value) -> Result<Vec<EntityNode>> {
    if !document.is_object() {
        return Err(ScanError::MalformedInput(
            "document is not a JSON object".to_string(),
        ));
    }
    let full_text = get_str(document, "text").unwrap_or("");
    let text = SourceText::new(full_text);
    let entities: &[Value] = match document.get("entities") {
        Some(Value::Array(entities)) => entities.as_slice(),
        Some(Value::Null) | None => &[],
        Some(_) => {
            tracing::warn!("document.entities is not an array; treating as empty");
            &[]
        }
    };
    let nodes = entities
        .iter()
        .enumerate()
        .map(|(i, raw)| flatten_at(raw, &text, &format!("entities[{}]", i)))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(
        "flattened {} top-level entities over {} chars of text",
        nodes.len(),
        text.char_len()
    );
    Ok(nodes)
}

impl EntityNode {
    /// Raw Document AI form of this node; flattening it again yields the same node.
    pub fn to_raw(&self) -> Value {
        json!({
            "type": self.entity_type,
            "mentionText": self.value,
            "confidence": self.confidence,
            "normalizedValue": { "text": self.normalized_value },
            "pageAnchor": { "pageRefs": [{ "page": (self.page.saturating_sub(1)).to_string() }] },
            "properties": self.properties.iter().map(EntityNode::to_raw).collect::<Vec<_>>(),
        })
    }
}
