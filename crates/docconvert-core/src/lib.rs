//! Document conversion upload client: platform-free core
//!
//! Holds all state and decisions of the upload page so they can be tested
//! natively. The browser crate (`docconvert-wasm`) owns the DOM, fetch and
//! timers and feeds events into [`UploadController`].
//!
//! ## Flow
//!
//! ```text
//! DOM event ──► UploadController::handle_* ──► Vec<UiEffect> ──► DOM / fetch / timers
//!                        ▲                                              │
//!                        └──────────── handle_*_loaded / _response ◄────┘
//! ```

pub mod alert;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod options;
pub mod results;
pub mod selection;
pub mod submission;

pub use alert::{Alert, AlertId, AlertPresenter, Severity};
pub use config::{ClientConfig, ElementIds, Endpoints, Timings};
pub use controller::{UiEffect, UploadController};
pub use error::{ClientError, SelectionError};
pub use format::{format_bytes, FileKind};
pub use options::{
    build_controls, Choice, FormatOptionDescriptor, InputType, OptionControl, OptionKind,
    OptionsLoader, OptionsPanel, OptionsRequest, OptionsResponse,
};
pub use results::{
    BatchId, CleanupRequest, CleanupTrigger, ConversionResultItem, ResultRow, ResultStatus,
    ResultsView,
};
pub use selection::{
    FileBatch, FileHandle, FileListTarget, FileRow, FileSelection, MutableMerge,
    ReplaceOnUnsupported, SelectionStrategy, StrategyKind,
};
pub use submission::{ConversionResponse, SubmissionPipeline, SubmitRequest};
