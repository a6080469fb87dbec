//! Format option schema and the options panel state
//!
//! The server describes the configurable parameters of an output format as a
//! list of descriptors. Each one becomes a form control whose `name` is the
//! multipart field key submitted with the conversion.

use crate::config::ClientConfig;
use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Control type declared by a descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OptionKind {
    Text,
    Number,
    Select,
    Checkbox,
    /// Any type this client does not know how to render
    #[default]
    Unknown,
}

impl From<String> for OptionKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "text" => OptionKind::Text,
            "number" => OptionKind::Number,
            "select" => OptionKind::Select,
            "checkbox" => OptionKind::Checkbox,
            _ => OptionKind::Unknown,
        }
    }
}

impl From<OptionKind> for String {
    fn from(kind: OptionKind) -> Self {
        match kind {
            OptionKind::Text => "text",
            OptionKind::Number => "number",
            OptionKind::Select => "select",
            OptionKind::Checkbox => "checkbox",
            OptionKind::Unknown => "unknown",
        }
        .to_string()
    }
}

/// Server-declared schema for one configurable parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatOptionDescriptor {
    /// Form field key
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: OptionKind,
    #[serde(default)]
    pub default: Value,
    #[serde(default)]
    pub min: Value,
    #[serde(default)]
    pub max: Value,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Choices of a select control
    #[serde(default)]
    pub options: Vec<Value>,
}

/// Body of `GET /options/{format}`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionsResponse {
    #[serde(default)]
    pub options: Option<Vec<FormatOptionDescriptor>>,
}

impl OptionsResponse {
    pub fn from_json(body: &str) -> Result<Self, ClientError> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn descriptors(&self) -> &[FormatOptionDescriptor] {
        self.options.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InputType {
    Text,
    Number,
}

impl InputType {
    pub fn as_str(self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Number => "number",
        }
    }
}

/// One entry of a select control
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub value: String,
    pub selected: bool,
}

/// Render model of one option
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OptionControl {
    Input {
        name: String,
        label: String,
        icon: Option<String>,
        description: Option<String>,
        input_type: InputType,
        value: String,
        min: Option<String>,
        max: Option<String>,
        /// Suffix shown after number inputs (may be empty)
        unit: Option<String>,
    },
    Select {
        name: String,
        label: String,
        icon: Option<String>,
        description: Option<String>,
        choices: Vec<Choice>,
    },
    Switch {
        name: String,
        label: String,
        checked: bool,
    },
}

impl OptionControl {
    pub fn name(&self) -> &str {
        match self {
            OptionControl::Input { name, .. }
            | OptionControl::Select { name, .. }
            | OptionControl::Switch { name, .. } => name,
        }
    }
}

impl FormatOptionDescriptor {
    /// Control for this descriptor, `None` for unknown types
    pub fn control(&self) -> Option<OptionControl> {
        let icon = non_empty(&self.icon);
        let description = non_empty(&self.description);

        match self.kind {
            OptionKind::Text | OptionKind::Number => {
                let input_type = if self.kind == OptionKind::Number {
                    InputType::Number
                } else {
                    InputType::Text
                };
                Some(OptionControl::Input {
                    name: self.name.clone(),
                    label: self.label.clone(),
                    icon,
                    description,
                    input_type,
                    value: truthy_text(&self.default).unwrap_or_default(),
                    min: truthy_text(&self.min),
                    max: truthy_text(&self.max),
                    unit: (input_type == InputType::Number)
                        .then(|| self.unit.clone().unwrap_or_default()),
                })
            }
            OptionKind::Select => Some(OptionControl::Select {
                name: self.name.clone(),
                label: self.label.clone(),
                icon,
                description,
                choices: self
                    .options
                    .iter()
                    .map(|opt| Choice {
                        value: value_text(opt),
                        selected: strict_eq(opt, &self.default),
                    })
                    .collect(),
            }),
            OptionKind::Checkbox => Some(OptionControl::Switch {
                name: self.name.clone(),
                label: self.label.clone(),
                checked: is_truthy(&self.default),
            }),
            OptionKind::Unknown => None,
        }
    }
}

/// Controls for every renderable descriptor, in server order
pub fn build_controls(descriptors: &[FormatOptionDescriptor]) -> Vec<OptionControl> {
    descriptors
        .iter()
        .filter_map(FormatOptionDescriptor::control)
        .collect()
}

fn non_empty(s: &Option<String>) -> Option<String> {
    s.as_ref().filter(|s| !s.is_empty()).cloned()
}

/// Browser truthiness: null, false, 0 and "" are falsy
fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Browser `===` on JSON values: numbers compare by value, so 72 equals 72.0
fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn truthy_text(v: &Value) -> Option<String> {
    is_truthy(v).then(|| value_text(v))
}

/// Text of a JSON scalar as a form value
fn value_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// What the options panel currently shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OptionsPanel {
    /// No format chosen yet
    Prompt,
    Loading { format: String },
    /// The format has no options
    Empty,
    /// The schema could not be fetched or decoded
    Failed,
    Ready(Vec<OptionControl>),
}

impl OptionsPanel {
    /// Placeholder text, `None` when controls are shown
    pub fn message(&self) -> Option<&'static str> {
        match self {
            OptionsPanel::Prompt => Some("Please choose an output format first"),
            OptionsPanel::Loading { .. } => Some("Loading options..."),
            OptionsPanel::Empty => Some("This format has no advanced options"),
            OptionsPanel::Failed => Some("Failed to load options"),
            OptionsPanel::Ready(_) => None,
        }
    }
}

/// A pending schema fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsRequest {
    /// Only a response carrying the latest generation is applied
    pub generation: u64,
    pub format: String,
    pub url: String,
}

/// Loads option schemas and discards responses to superseded selections
#[derive(Debug)]
pub struct OptionsLoader {
    generation: u64,
    panel: OptionsPanel,
}

impl Default for OptionsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionsLoader {
    pub fn new() -> Self {
        Self {
            generation: 0,
            panel: OptionsPanel::Prompt,
        }
    }

    pub fn panel(&self) -> &OptionsPanel {
        &self.panel
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// React to a format selection
    ///
    /// Returns the fetch to issue, or `None` for the empty format.
    pub fn select(&mut self, format: &str, config: &ClientConfig) -> Option<OptionsRequest> {
        self.generation += 1;

        if format.is_empty() {
            self.panel = OptionsPanel::Prompt;
            return None;
        }

        self.panel = OptionsPanel::Loading {
            format: format.to_string(),
        };
        Some(OptionsRequest {
            generation: self.generation,
            format: format.to_string(),
            url: config.options_url(format),
        })
    }

    /// Apply a fetched body (or the fetch error)
    ///
    /// Returns `false` when the response was stale and ignored.
    pub fn complete(&mut self, generation: u64, body: Result<String, ClientError>) -> bool {
        if generation != self.generation {
            debug!(
                generation,
                latest = self.generation,
                "discarding stale options response"
            );
            return false;
        }

        self.panel = match body.and_then(|b| OptionsResponse::from_json(&b)) {
            Ok(resp) if !resp.descriptors().is_empty() => {
                OptionsPanel::Ready(build_controls(resp.descriptors()))
            }
            Ok(_) => OptionsPanel::Empty,
            Err(e) => {
                warn!(error = %e, "failed to load format options");
                OptionsPanel::Failed
            }
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PDF_OPTIONS: &str = r#"{"options": [
        {"name": "base_font_size", "type": "number", "label": "Base font size (pts)", "default": 0},
        {"name": "paper_size", "type": "select", "label": "Paper size",
         "options": ["a4", "a5", "letter", "custom"], "default": "a4"},
        {"name": "pdf_page_margin_left", "type": "number", "label": "Left margin",
         "default": 72, "min": 0, "max": 200, "unit": "pt"},
        {"name": "embed_fonts", "type": "checkbox", "label": "Embed fonts", "default": true},
        {"name": "cover", "type": "file", "label": "Cover image"}
    ]}"#;

    #[test]
    fn test_descriptor_parsing() {
        let resp = OptionsResponse::from_json(PDF_OPTIONS).unwrap();
        let kinds: Vec<_> = resp.descriptors().iter().map(|d| d.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                OptionKind::Number,
                OptionKind::Select,
                OptionKind::Number,
                OptionKind::Checkbox,
                OptionKind::Unknown,
            ]
        );
    }

    #[test]
    fn test_unknown_types_render_nothing() {
        let resp = OptionsResponse::from_json(PDF_OPTIONS).unwrap();
        let controls = build_controls(resp.descriptors());
        assert_eq!(controls.len(), 4);
        assert!(controls.iter().all(|c| c.name() != "cover"));
    }

    #[test]
    fn test_number_input_follows_truthiness() {
        let resp = OptionsResponse::from_json(PDF_OPTIONS).unwrap();
        let controls = build_controls(resp.descriptors());

        match &controls[0] {
            OptionControl::Input {
                value, min, unit, ..
            } => {
                assert_eq!(value, "");
                assert_eq!(*min, None);
                assert_eq!(unit.as_deref(), Some(""));
            }
            other => panic!("unexpected control {:?}", other),
        }

        match &controls[2] {
            OptionControl::Input {
                input_type,
                value,
                min,
                max,
                unit,
                ..
            } => {
                assert_eq!(*input_type, InputType::Number);
                assert_eq!(value, "72");
                assert_eq!(*min, None);
                assert_eq!(max.as_deref(), Some("200"));
                assert_eq!(unit.as_deref(), Some("pt"));
            }
            other => panic!("unexpected control {:?}", other),
        }
    }

    #[test]
    fn test_select_preselects_default() {
        let resp = OptionsResponse::from_json(PDF_OPTIONS).unwrap();
        let controls = build_controls(resp.descriptors());

        match &controls[1] {
            OptionControl::Select { choices, .. } => {
                let selected: Vec<&str> = choices
                    .iter()
                    .filter(|c| c.selected)
                    .map(|c| c.value.as_str())
                    .collect();
                assert_eq!(selected, vec!["a4"]);
                assert_eq!(choices.len(), 4);
            }
            other => panic!("unexpected control {:?}", other),
        }
    }

    #[test]
    fn test_select_matches_numeric_default_by_value() {
        let desc: FormatOptionDescriptor = serde_json::from_str(
            r#"{"name": "dpi", "type": "select", "label": "DPI",
                "options": [72.0, 150, "300"], "default": 72}"#,
        )
        .unwrap();
        match desc.control() {
            Some(OptionControl::Select { choices, .. }) => {
                let selected: Vec<bool> = choices.iter().map(|c| c.selected).collect();
                assert_eq!(selected, vec![true, false, false]);
                assert_eq!(choices[0].value, "72");
            }
            other => panic!("unexpected control {:?}", other),
        }
    }

    #[test]
    fn test_select_string_default_does_not_match_number() {
        let desc: FormatOptionDescriptor = serde_json::from_str(
            r#"{"name": "dpi", "type": "select", "label": "DPI",
                "options": [150, 300], "default": "150"}"#,
        )
        .unwrap();
        match desc.control() {
            Some(OptionControl::Select { choices, .. }) => {
                assert!(choices.iter().all(|c| !c.selected));
            }
            other => panic!("unexpected control {:?}", other),
        }
    }

    #[test]
    fn test_checkbox_becomes_switch() {
        let resp = OptionsResponse::from_json(PDF_OPTIONS).unwrap();
        let controls = build_controls(resp.descriptors());
        assert_eq!(
            controls[3],
            OptionControl::Switch {
                name: "embed_fonts".to_string(),
                label: "Embed fonts".to_string(),
                checked: true,
            }
        );
    }

    #[test]
    fn test_text_input_has_no_unit() {
        let desc: FormatOptionDescriptor = serde_json::from_str(
            r#"{"name": "title", "type": "text", "label": "Title", "default": "My Book", "unit": "x"}"#,
        )
        .unwrap();
        match desc.control() {
            Some(OptionControl::Input { value, unit, .. }) => {
                assert_eq!(value, "My Book");
                assert_eq!(unit, None);
            }
            other => panic!("unexpected control {:?}", other),
        }
    }

    #[test]
    fn test_value_text_drops_float_zero_fraction() {
        assert_eq!(value_text(&serde_json::json!(72.0)), "72");
        assert_eq!(value_text(&serde_json::json!(1.5)), "1.5");
        assert_eq!(value_text(&serde_json::json!("3")), "3");
    }

    #[test]
    fn test_loader_flow() {
        let config = ClientConfig::default();
        let mut loader = OptionsLoader::new();
        assert_eq!(*loader.panel(), OptionsPanel::Prompt);

        let req = loader.select("pdf", &config).unwrap();
        assert_eq!(req.url, "/options/pdf");
        assert!(matches!(loader.panel(), OptionsPanel::Loading { .. }));

        assert!(loader.complete(req.generation, Ok(PDF_OPTIONS.to_string())));
        assert!(matches!(loader.panel(), OptionsPanel::Ready(c) if c.len() == 4));
    }

    #[test]
    fn test_loader_empty_and_missing_options() {
        let config = ClientConfig::default();
        let mut loader = OptionsLoader::new();

        let req = loader.select("txt", &config).unwrap();
        loader.complete(req.generation, Ok(r#"{"options": []}"#.to_string()));
        assert_eq!(*loader.panel(), OptionsPanel::Empty);

        let req = loader.select("txt", &config).unwrap();
        loader.complete(req.generation, Ok(r#"{"error": "Invalid format"}"#.to_string()));
        assert_eq!(*loader.panel(), OptionsPanel::Empty);
    }

    #[test]
    fn test_loader_failure_shows_error_placeholder() {
        let config = ClientConfig::default();
        let mut loader = OptionsLoader::new();

        let req = loader.select("pdf", &config).unwrap();
        loader.complete(req.generation, Ok("<html>".to_string()));
        assert_eq!(*loader.panel(), OptionsPanel::Failed);

        let req = loader.select("pdf", &config).unwrap();
        loader.complete(
            req.generation,
            Err(ClientError::Transport("offline".to_string())),
        );
        assert_eq!(*loader.panel(), OptionsPanel::Failed);
        assert_eq!(loader.panel().message(), Some("Failed to load options"));
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let config = ClientConfig::default();
        let mut loader = OptionsLoader::new();

        let old = loader.select("pdf", &config).unwrap();
        let new = loader.select("epub", &config).unwrap();

        assert!(!loader.complete(old.generation, Ok(PDF_OPTIONS.to_string())));
        assert!(matches!(loader.panel(), OptionsPanel::Loading { format } if format == "epub"));

        assert!(loader.complete(new.generation, Ok(r#"{"options": []}"#.to_string())));
        assert_eq!(*loader.panel(), OptionsPanel::Empty);
    }

    #[test]
    fn test_empty_format_prompts_and_supersedes_pending_fetch() {
        let config = ClientConfig::default();
        let mut loader = OptionsLoader::new();

        let pending = loader.select("pdf", &config).unwrap();
        assert!(loader.select("", &config).is_none());
        assert_eq!(*loader.panel(), OptionsPanel::Prompt);

        assert!(!loader.complete(pending.generation, Ok(PDF_OPTIONS.to_string())));
        assert_eq!(*loader.panel(), OptionsPanel::Prompt);
    }
}
