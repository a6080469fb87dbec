//! Client configuration
//!
//! Every field has a default matching the stock server and page markup, so an
//! empty JSON object (or no configuration at all) yields a working client.

use crate::error::ClientError;
use serde::{Deserialize, Serialize};

/// Upload limit enforced by the stock server (100 MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Top-level client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefix prepended to every endpoint path (e.g. "https://host")
    pub api_base: String,
    pub endpoints: Endpoints,
    pub timings: Timings,
    pub elements: ElementIds,
    /// Total upload size limit checked before submission; `None` disables it
    pub max_upload_bytes: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            endpoints: Endpoints::default(),
            timings: Timings::default(),
            elements: ElementIds::default(),
            max_upload_bytes: Some(DEFAULT_MAX_UPLOAD_BYTES),
        }
    }
}

impl ClientConfig {
    /// Parse configuration from a JSON string
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json(s: &str) -> Result<Self, ClientError> {
        serde_json::from_str(s).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// URL of the option schema for one output format
    pub fn options_url(&self, format: &str) -> String {
        format!(
            "{}{}/{}",
            self.api_base,
            self.endpoints.options,
            urlencoding::encode(format)
        )
    }

    /// URL the conversion form is posted to
    pub fn submit_url(&self, advanced: bool) -> String {
        let path = if advanced {
            &self.endpoints.advanced
        } else {
            &self.endpoints.upload
        };
        format!("{}{}", self.api_base, path)
    }

    /// URL removing the archive of one batch
    pub fn cleanup_url(&self, batch_id: &str) -> String {
        format!(
            "{}{}/{}",
            self.api_base,
            self.endpoints.cleanup,
            urlencoding::encode(batch_id)
        )
    }
}

/// Endpoint paths, relative to `api_base`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub options: String,
    pub upload: String,
    pub advanced: String,
    pub cleanup: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            options: "/options".to_string(),
            upload: "/upload".to_string(),
            advanced: "/advanced-conversion".to_string(),
            cleanup: "/clean-zip".to_string(),
        }
    }
}

/// UI delays in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Delay between a download click and the cleanup call
    pub cleanup_delay_ms: u32,
    /// How long an alert stays before fading
    pub alert_dismiss_ms: u32,
    /// Fade duration before the alert is removed
    pub alert_fade_ms: u32,
    /// Delay before scrolling the results into view
    pub results_scroll_delay_ms: u32,
    pub advanced_show_ms: u32,
    pub advanced_hide_ms: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            cleanup_delay_ms: 3000,
            alert_dismiss_ms: 5000,
            alert_fade_ms: 300,
            results_scroll_delay_ms: 300,
            advanced_show_ms: 10,
            advanced_hide_ms: 400,
        }
    }
}

/// Element ids the host page must provide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub form: String,
    pub file_input: String,
    pub drop_zone: String,
    pub selected_files: String,
    pub format_select: String,
    pub advanced_toggle: String,
    pub advanced_panel: String,
    pub format_options: String,
    pub submit_button: String,
    pub spinner: String,
    pub results_panel: String,
    pub results_table: String,
    pub download_link: String,
    /// CSS selector of the element alerts are prepended to
    pub alert_container: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            form: "upload-form".to_string(),
            file_input: "files".to_string(),
            drop_zone: "upload-zone".to_string(),
            selected_files: "selected-files".to_string(),
            format_select: "output_format".to_string(),
            advanced_toggle: "show-advanced".to_string(),
            advanced_panel: "advanced-options".to_string(),
            format_options: "format-options".to_string(),
            submit_button: "convert-btn".to_string(),
            spinner: "loading-spinner".to_string(),
            results_panel: "conversion-results".to_string(),
            results_table: "results-table".to_string(),
            download_link: "download-link".to_string(),
            alert_container: ".card-body".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_json_yields_defaults() {
        let config = ClientConfig::from_json("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.max_upload_bytes, Some(DEFAULT_MAX_UPLOAD_BYTES));
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config = ClientConfig::from_json(
            r#"{"api_base": "https://convert.example", "timings": {"cleanup_delay_ms": 10}}"#,
        )
        .unwrap();
        assert_eq!(config.api_base, "https://convert.example");
        assert_eq!(config.timings.cleanup_delay_ms, 10);
        assert_eq!(config.timings.alert_dismiss_ms, 5000);
        assert_eq!(config.elements.file_input, "files");
    }

    #[test]
    fn test_null_limit_disables_check() {
        let config = ClientConfig::from_json(r#"{"max_upload_bytes": null}"#).unwrap();
        assert_eq!(config.max_upload_bytes, None);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = ClientConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_urls() {
        let config = ClientConfig::default();
        assert_eq!(config.options_url("pdf"), "/options/pdf");
        assert_eq!(config.submit_url(false), "/upload");
        assert_eq!(config.submit_url(true), "/advanced-conversion");
        assert_eq!(config.cleanup_url("abc-123"), "/clean-zip/abc-123");
    }

    #[test]
    fn test_options_url_encodes_format() {
        let config = ClientConfig {
            api_base: "http://localhost:5000".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(
            config.options_url("a b/c"),
            "http://localhost:5000/options/a%20b%2Fc"
        );
    }
}
