use thiserror::Error;

/// Failures while mutating the file selection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("File index {index} out of range ({len} selected)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("File list cannot be rebuilt on this platform")]
    RemovalUnsupported,

    #[error("Platform rejected the file list: {0}")]
    Platform(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("No files selected")]
    NoFiles,

    #[error("No output format chosen")]
    NoFormat,

    #[error("Selected files total {total} bytes, limit is {limit}")]
    UploadTooLarge { total: u64, limit: u64 },

    #[error("A conversion is already in progress")]
    SubmissionInFlight,

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Server reported failure: {0}")]
    Server(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Text shown to the user in an alert.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::NoFiles => "Please select at least one file".to_string(),
            ClientError::NoFormat => "Please choose an output format".to_string(),
            ClientError::UploadTooLarge { limit, .. } => format!(
                "Selected files are too large, the limit is {}",
                crate::format::format_bytes(*limit)
            ),
            ClientError::SubmissionInFlight => {
                "A conversion is already running, please wait".to_string()
            }
            ClientError::Selection(SelectionError::RemovalUnsupported) => {
                "Your browser cannot remove single files, please select your files again"
                    .to_string()
            }
            ClientError::Selection(_) => {
                "Removing the file failed, please select your files again".to_string()
            }
            ClientError::Server(msg) => format!("Conversion failed: {}", msg),
            ClientError::Transport(_) | ClientError::Decode(_) => {
                "Conversion request failed, see the console for details".to_string()
            }
            ClientError::Config(msg) => format!("Invalid configuration: {}", msg),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
