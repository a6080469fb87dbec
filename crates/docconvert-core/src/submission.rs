//! Conversion submission
//!
//! Validation happens before any request is built, and only one submission
//! may be in flight at a time.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::results::ConversionResultItem;
use serde::{Deserialize, Serialize};

/// Body returned by `/upload` and `/advanced-conversion`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub files: Vec<ConversionResultItem>,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl ConversionResponse {
    pub fn from_json(body: &str) -> Result<Self, ClientError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Turn an application-level failure into an error
    pub fn into_result(self) -> Result<Self, ClientError> {
        if self.success {
            Ok(self)
        } else {
            let reason = self
                .error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "Unknown error".to_string());
            Err(ClientError::Server(reason))
        }
    }
}

/// A validated submission ready to post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub url: String,
    pub advanced: bool,
    pub format: String,
}

/// Check a submission before any request is made
pub fn validate(
    file_count: usize,
    total_bytes: u64,
    format: &str,
    max_upload_bytes: Option<u64>,
) -> Result<(), ClientError> {
    if file_count == 0 {
        return Err(ClientError::NoFiles);
    }
    if format.is_empty() {
        return Err(ClientError::NoFormat);
    }
    if let Some(limit) = max_upload_bytes {
        if total_bytes > limit {
            return Err(ClientError::UploadTooLarge {
                total: total_bytes,
                limit,
            });
        }
    }
    Ok(())
}

/// Tracks whether a submission is in flight
#[derive(Debug, Default)]
pub struct SubmissionPipeline {
    in_flight: bool,
}

impl SubmissionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Validate and mark the pipeline busy
    pub fn begin(
        &mut self,
        file_count: usize,
        total_bytes: u64,
        format: &str,
        advanced: bool,
        config: &ClientConfig,
    ) -> Result<SubmitRequest, ClientError> {
        if self.in_flight {
            return Err(ClientError::SubmissionInFlight);
        }
        validate(file_count, total_bytes, format, config.max_upload_bytes)?;

        self.in_flight = true;
        Ok(SubmitRequest {
            url: config.submit_url(advanced),
            advanced,
            format: format.to_string(),
        })
    }

    /// Response (or failure) arrived
    pub fn finish(&mut self) {
        self.in_flight = false;
    }
}
