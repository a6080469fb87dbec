//! Conversion results and the post-download cleanup trigger

use crate::config::ClientConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResultStatus {
    Success,
    /// Anything the server reports other than "success"
    #[default]
    Failed,
}

impl From<String> for ResultStatus {
    fn from(s: String) -> Self {
        if s == "success" {
            ResultStatus::Success
        } else {
            ResultStatus::Failed
        }
    }
}

impl From<ResultStatus> for String {
    fn from(status: ResultStatus) -> Self {
        match status {
            ResultStatus::Success => "success".to_string(),
            ResultStatus::Failed => "failed".to_string(),
        }
    }
}

/// Server-reported outcome for one uploaded file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResultItem {
    #[serde(alias = "filename")]
    pub original_name: String,
    #[serde(default)]
    pub status: ResultStatus,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub converted_name: Option<String>,
}

/// Opaque id of one conversion job's output
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BatchId(String);

impl BatchId {
    /// Final path segment of a download URL
    ///
    /// Query string and fragment are ignored, as is a trailing slash.
    pub fn from_download_url(url: &str) -> Option<Self> {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let segment = path.trim_end_matches('/').rsplit('/').next()?;

        if segment.is_empty() {
            None
        } else {
            Some(BatchId(segment.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the results table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub original_name: String,
    pub succeeded: bool,
    pub status_text: &'static str,
    pub status_icon: &'static str,
    pub status_class: &'static str,
    pub error: Option<String>,
    /// Converted file name, or "-" when there is none
    pub converted: String,
}

impl From<&ConversionResultItem> for ResultRow {
    fn from(item: &ConversionResultItem) -> Self {
        let succeeded = item.status == ResultStatus::Success;
        let converted = if succeeded {
            item.converted_name.clone()
        } else {
            None
        };

        Self {
            original_name: item.original_name.clone(),
            succeeded,
            status_text: if succeeded { "Success" } else { "Failed" },
            status_icon: if succeeded {
                "bi-check-circle-fill"
            } else {
                "bi-x-circle-fill"
            },
            status_class: if succeeded {
                "status-success"
            } else {
                "status-failed"
            },
            error: item.error.clone().filter(|e| !e.is_empty()),
            converted: converted.unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Everything the result renderer needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsView {
    pub rows: Vec<ResultRow>,
    pub download_url: Option<String>,
    pub batch: Option<BatchId>,
}

impl ResultsView {
    pub fn new(files: &[ConversionResultItem], download_url: Option<String>) -> Self {
        let batch = download_url.as_deref().and_then(BatchId::from_download_url);
        Self {
            rows: files.iter().map(ResultRow::from).collect(),
            download_url,
            batch,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.rows.iter().filter(|r| r.succeeded).count()
    }
}

/// A cleanup call to issue after a delay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupRequest {
    pub batch: BatchId,
    pub url: String,
    pub delay_ms: u32,
}

/// Single-use cleanup armed for the latest batch
#[derive(Debug, Default)]
pub struct CleanupTrigger {
    armed: Option<BatchId>,
}

impl CleanupTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm for a new batch, replacing whatever was armed before
    pub fn arm(&mut self, batch: Option<BatchId>) {
        self.armed = batch;
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Download link clicked; yields the cleanup only the first time
    pub fn fire(&mut self, config: &ClientConfig) -> Option<CleanupRequest> {
        self.armed.take().map(|batch| CleanupRequest {
            url: config.cleanup_url(batch.as_str()),
            delay_ms: config.timings.cleanup_delay_ms,
            batch,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_batch_id_is_final_segment() {
        let id = BatchId::from_download_url("/download/3f2a-99").unwrap();
        assert_eq!(id.as_str(), "3f2a-99");

        let id = BatchId::from_download_url("https://host/download/abc?x=1#top").unwrap();
        assert_eq!(id.as_str(), "abc");

        let id = BatchId::from_download_url("/download/abc/").unwrap();
        assert_eq!(id.as_str(), "abc");
    }

    #[test]
    fn test_batch_id_missing() {
        assert_eq!(BatchId::from_download_url(""), None);
        assert_eq!(BatchId::from_download_url("/"), None);
    }

    #[test]
    fn test_result_item_accepts_filename_alias() {
        let item: ConversionResultItem = serde_json::from_str(
            r#"{"filename": "a.txt", "status": "failed", "error": "bad extension"}"#,
        )
        .unwrap();
        assert_eq!(item.original_name, "a.txt");
        assert_eq!(item.status, ResultStatus::Failed);
    }

    #[test]
    fn test_failed_row_shows_dash_and_error() {
        let item = ConversionResultItem {
            original_name: "broken.mobi".to_string(),
            status: ResultStatus::Failed,
            error: Some("conversion timed out".to_string()),
            converted_name: Some("ignored.epub".to_string()),
        };
        let row = ResultRow::from(&item);
        assert!(!row.succeeded);
        assert_eq!(row.converted, "-");
        assert_eq!(row.error.as_deref(), Some("conversion timed out"));
        assert_eq!(row.status_class, "status-failed");
    }

    #[test]
    fn test_success_row_shows_converted_name() {
        let item = ConversionResultItem {
            original_name: "book.epub".to_string(),
            status: ResultStatus::Success,
            error: None,
            converted_name: Some("book.pdf".to_string()),
        };
        let row = ResultRow::from(&item);
        assert!(row.succeeded);
        assert_eq!(row.converted, "book.pdf");
        assert_eq!(row.status_text, "Success");
    }

    #[test]
    fn test_cleanup_fires_once() {
        let config = ClientConfig::default();
        let mut trigger = CleanupTrigger::new();
        trigger.arm(BatchId::from_download_url("/download/b1"));

        let req = trigger.fire(&config).unwrap();
        assert_eq!(req.url, "/clean-zip/b1");
        assert_eq!(req.delay_ms, 3000);
        assert_eq!(trigger.fire(&config), None);
    }

    #[test]
    fn test_rearm_targets_new_batch() {
        let config = ClientConfig::default();
        let mut trigger = CleanupTrigger::new();
        trigger.arm(BatchId::from_download_url("/download/old"));
        trigger.arm(BatchId::from_download_url("/download/new"));

        assert_eq!(trigger.fire(&config).unwrap().batch.as_str(), "new");
        assert!(!trigger.is_armed());
    }
}
