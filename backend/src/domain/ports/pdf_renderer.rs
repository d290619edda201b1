//! Port for rendering circuit-breaker detail sheets.
//!
//! The text layout lives on [`CbDetailRecord`] so every renderer prints the
//! same lines; adapters only decide how lines become pages.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::CircuitBreaker;

use super::define_port_error;

define_port_error! {
    /// Errors raised while producing a detail sheet.
    pub enum PdfRenderError {
        Render { message: String } => InternalError: "pdf rendering failed: {message}",
    }
}

/// Title printed at the top of every detail sheet.
pub const DETAIL_SHEET_TITLE: &str = "Circuit Breaker Details";

/// Circuit breaker and the switchgear it was looked up under.
#[derive(Debug, Clone, PartialEq)]
pub struct CbDetailRecord {
    pub switchgear_id: String,
    pub cb_id: i64,
    pub fields: Map<String, Value>,
}

impl CbDetailRecord {
    pub fn new(
        switchgear_id: impl Into<String>,
        cb_id: i64,
        breaker: &CircuitBreaker,
    ) -> Result<Self, PdfRenderError> {
        let fields = match serde_json::to_value(breaker) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => Map::new(),
            Err(err) => return Err(PdfRenderError::render(err.to_string())),
        };
        Ok(Self {
            switchgear_id: switchgear_id.into(),
            cb_id,
            fields,
        })
    }

    /// Header lines, printed larger than the body.
    pub fn header_lines(&self) -> [String; 2] {
        [
            format!("Switchgear ID: {}", self.switchgear_id),
            format!("Circuit Breaker ID: {}", self.cb_id),
        ]
    }

    /// One `key: value` line per field; nested values indent two spaces a level.
    pub fn body_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (key, value) in &self.fields {
            push_field(&mut lines, key, value, 0);
        }
        lines
    }

    /// Attachment name offered to the client.
    pub fn file_name(&self) -> String {
        format!("CB_{}_{}_Details.pdf", self.cb_id, self.switchgear_id)
    }
}

fn push_field(lines: &mut Vec<String>, key: &str, value: &Value, depth: usize) {
    let indent = " ".repeat(depth * 2);
    match value {
        Value::Object(map) => {
            lines.push(format!("{indent}{key}:"));
            for (child_key, child) in map {
                push_field(lines, child_key, child, depth + 1);
            }
        }
        Value::Array(items) => {
            lines.push(format!("{indent}{key}:"));
            for (index, child) in items.iter().enumerate() {
                push_field(lines, &index.to_string(), child, depth + 1);
            }
        }
        Value::String(text) => lines.push(format!("{indent}{key}: {text}")),
        other => lines.push(format!("{indent}{key}: {other}")),
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, record: &CbDetailRecord) -> Result<Vec<u8>, PdfRenderError>;
}

/// Renderer emitting the sheet as plain text, for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePdfRenderer;

#[async_trait]
impl PdfRenderer for FixturePdfRenderer {
    async fn render(&self, record: &CbDetailRecord) -> Result<Vec<u8>, PdfRenderError> {
        let mut text = vec![DETAIL_SHEET_TITLE.to_owned()];
        text.extend(record.header_lines());
        text.extend(record.body_lines());
        Ok(text.join("\n").into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn breaker() -> CircuitBreaker {
        CircuitBreaker {
            id: Some(3),
            name: Some("Feeder".into()),
            configurations: Some(json!({
                "equipmentDetails": {"data": {"switchgearLocation": "Bay 2"}},
                "ratings": [630, 800],
            })),
            ..CircuitBreaker::default()
        }
    }

    #[test]
    fn nested_values_indent_per_level() {
        let record = CbDetailRecord::new("SG1", 3, &breaker()).expect("record built");
        let lines = record.body_lines();

        assert!(lines.contains(&"name: Feeder".to_owned()));
        assert!(lines.contains(&"configurations:".to_owned()));
        assert!(lines.contains(&"  equipmentDetails:".to_owned()));
        assert!(lines.contains(&"      switchgearLocation: Bay 2".to_owned()));
        assert!(lines.contains(&"    1: 800".to_owned()));
    }

    #[test]
    fn header_names_both_identifiers() {
        let record = CbDetailRecord::new("SG1", 3, &breaker()).expect("record built");
        assert_eq!(
            record.header_lines(),
            ["Switchgear ID: SG1".to_owned(), "Circuit Breaker ID: 3".to_owned()]
        );
        assert_eq!(record.file_name(), "CB_3_SG1_Details.pdf");
    }

    #[tokio::test]
    async fn fixture_renderer_prints_title_first() {
        let record = CbDetailRecord::new("SG1", 3, &breaker()).expect("record built");
        let bytes = FixturePdfRenderer.render(&record).await.expect("rendered");
        let text = String::from_utf8(bytes).expect("utf8");
        assert!(text.starts_with(DETAIL_SHEET_TITLE));
    }
}
