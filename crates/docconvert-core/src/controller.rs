//! Upload controller
//!
//! One controller exists per page. Each `handle_*` method maps one UI or
//! network event to a state change plus a list of [`UiEffect`]s for the host
//! to apply: DOM updates, HTTP calls and timers. The controller itself never
//! touches the platform beyond the file-list target, which keeps every
//! transition testable without a browser.

use crate::alert::{Alert, AlertId, AlertPresenter, Severity};
use crate::config::ClientConfig;
use crate::error::{ClientError, SelectionError};
use crate::options::{OptionsLoader, OptionsPanel, OptionsRequest};
use crate::results::{BatchId, CleanupRequest, CleanupTrigger, ResultsView};
use crate::selection::{FileBatch, FileListTarget, FileSelection, StrategyKind};
use crate::submission::{ConversionResponse, SubmissionPipeline, SubmitRequest};
use tracing::{debug, info, warn};

/// Work the host must perform after a handler returns
#[derive(Debug, Clone, PartialEq)]
pub enum UiEffect {
    /// Redraw the selected-files list from [`UploadController::selection`]
    RenderSelection,
    /// Redraw the options panel from [`UploadController::options_panel`]
    RenderOptions,
    ShowAlert {
        alert: Alert,
        replaces: Option<AlertId>,
    },
    FetchOptions(OptionsRequest),
    SetAdvancedPanel {
        visible: bool,
    },
    /// Disable the submit control and show the spinner (or undo both)
    SetBusy(bool),
    HideResults,
    /// Post the conversion form
    Submit(SubmitRequest),
    ShowResults(ResultsView),
    ScheduleCleanup(CleanupRequest),
}

pub struct UploadController<T: FileListTarget> {
    config: ClientConfig,
    selection: FileSelection<T>,
    options: OptionsLoader,
    submission: SubmissionPipeline,
    cleanup: CleanupTrigger,
    alerts: AlertPresenter,
    advanced: bool,
}

impl<T: FileListTarget> UploadController<T> {
    pub fn new(config: ClientConfig, target: T, strategy: StrategyKind) -> Self {
        info!(?strategy, "upload controller ready");
        Self {
            config,
            selection: FileSelection::new(target, strategy),
            options: OptionsLoader::new(),
            submission: SubmissionPipeline::new(),
            cleanup: CleanupTrigger::new(),
            alerts: AlertPresenter::new(),
            advanced: false,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn selection(&self) -> &FileSelection<T> {
        &self.selection
    }

    pub fn options_panel(&self) -> &OptionsPanel {
        self.options.panel()
    }

    pub fn is_advanced(&self) -> bool {
        self.advanced
    }

    pub fn is_busy(&self) -> bool {
        self.submission.in_flight()
    }

    pub fn cleanup_armed(&self) -> bool {
        self.cleanup.is_armed()
    }

    fn alert(&mut self, message: impl Into<String>, severity: Severity) -> UiEffect {
        let (alert, replaces) = self.alerts.show(message, severity);
        UiEffect::ShowAlert { alert, replaces }
    }

    /// Adopt the form state the page already had when the controller mounted
    ///
    /// Browsers restore form controls on reload and back-navigation, so the
    /// advanced toggle may be checked, the input may hold files and a format
    /// may be chosen before any listener runs.
    pub fn handle_mounted(
        &mut self,
        advanced: bool,
        format: &str,
        batch: FileBatch<T::Native, T::File>,
    ) -> Vec<UiEffect> {
        let mut effects = Vec::new();

        if advanced {
            effects.extend(self.handle_advanced_toggled(true));
        }
        if !batch.is_empty() {
            debug!(files = batch.len(), "adopting restored file input");
            self.selection.add(batch);
            effects.push(UiEffect::RenderSelection);
        }
        if !format.is_empty() {
            effects.extend(self.handle_format_changed(format));
        }
        effects
    }

    /// The file picker delivered a new batch
    ///
    /// Post: the selection holds the previous files plus the batch (or only
    /// the batch under the replace strategy). A cancelled picker that emptied
    /// the input gets the previous selection written back.
    pub fn handle_files_picked(&mut self, batch: FileBatch<T::Native, T::File>) -> Vec<UiEffect> {
        if batch.is_empty() {
            if !self.selection.is_empty() {
                // an emptied input that cannot be refilled means an empty selection
                let _ = self.selection.resync();
            }
            return vec![UiEffect::RenderSelection];
        }

        self.selection.add(batch);
        vec![UiEffect::RenderSelection]
    }

    /// Files were dropped on the drop zone
    ///
    /// Dropping zero files does nothing.
    pub fn handle_files_dropped(&mut self, batch: FileBatch<T::Native, T::File>) -> Vec<UiEffect> {
        if batch.is_empty() {
            return Vec::new();
        }

        let added = batch.len();
        self.selection.add(batch);
        let noun = if added == 1 { "file" } else { "files" };
        let alert = self.alert(format!("Added {} {}", added, noun), Severity::Success);
        vec![UiEffect::RenderSelection, alert]
    }

    /// Remove control clicked for the file at `index` (platform order)
    ///
    /// Post: the file is gone, or, when the platform cannot rebuild the list,
    /// the whole selection is cleared and a warning is shown.
    pub fn handle_remove(&mut self, index: usize) -> Vec<UiEffect> {
        match self.selection.remove(index) {
            Ok(()) => vec![UiEffect::RenderSelection],
            Err(SelectionError::IndexOutOfRange { index, len }) => {
                debug!(index, len, "ignoring removal of unknown file");
                Vec::new()
            }
            Err(e) => {
                let err = ClientError::from(e);
                let alert = self.alert(err.user_message(), Severity::Warning);
                vec![UiEffect::RenderSelection, alert]
            }
        }
    }

    /// Output format select changed
    pub fn handle_format_changed(&mut self, format: &str) -> Vec<UiEffect> {
        let mut effects = vec![UiEffect::RenderOptions];
        if let Some(request) = self.options.select(format, &self.config) {
            debug!(format, generation = request.generation, "loading format options");
            effects.push(UiEffect::FetchOptions(request));
        }
        effects
    }

    /// Options fetch finished; stale generations are dropped
    pub fn handle_options_loaded(
        &mut self,
        generation: u64,
        body: Result<String, ClientError>,
    ) -> Vec<UiEffect> {
        if self.options.complete(generation, body) {
            vec![UiEffect::RenderOptions]
        } else {
            Vec::new()
        }
    }

    /// Advanced mode toggled; also selects the submission endpoint
    pub fn handle_advanced_toggled(&mut self, enabled: bool) -> Vec<UiEffect> {
        self.advanced = enabled;
        vec![UiEffect::SetAdvancedPanel { visible: enabled }]
    }

    /// Form submitted with the currently chosen format
    ///
    /// Pre: none. Post: either an error alert and no request, or the
    /// pipeline is busy and a `Submit` effect is emitted.
    pub fn handle_submit(&mut self, format: &str) -> Vec<UiEffect> {
        let request = self.submission.begin(
            self.selection.len(),
            self.selection.total_bytes(),
            format,
            self.advanced,
            &self.config,
        );

        match request {
            Ok(request) => {
                info!(
                    url = %request.url,
                    files = self.selection.len(),
                    format,
                    "submitting conversion"
                );
                let alert = self.alert("Conversion started, please wait...", Severity::Info);
                vec![
                    UiEffect::SetBusy(true),
                    UiEffect::HideResults,
                    alert,
                    UiEffect::Submit(request),
                ]
            }
            Err(ClientError::SubmissionInFlight) => {
                debug!("submit ignored, conversion already running");
                Vec::new()
            }
            Err(e) => {
                debug!(error = %e, "submission rejected");
                vec![self.alert(e.user_message(), Severity::Danger)]
            }
        }
    }

    /// Submission finished with a body, or failed at the transport level
    ///
    /// Post: the pipeline is idle and the submit control re-enabled.
    pub fn handle_submit_response(&mut self, body: Result<String, ClientError>) -> Vec<UiEffect> {
        self.submission.finish();
        let mut effects = vec![UiEffect::SetBusy(false)];

        let outcome = body
            .and_then(|b| ConversionResponse::from_json(&b))
            .and_then(ConversionResponse::into_result);

        match outcome {
            Ok(response) => {
                let view = ResultsView::new(&response.files, response.download_url);
                if view.batch.is_none() {
                    warn!("conversion response has no usable download url");
                }
                info!(
                    files = view.rows.len(),
                    succeeded = view.succeeded(),
                    "conversion finished"
                );
                self.cleanup.arm(view.batch.clone());
                effects.push(UiEffect::ShowResults(view));
                effects.push(self.alert("Conversion complete!", Severity::Success));
            }
            Err(e) => {
                warn!(error = %e, "conversion failed");
                effects.push(self.alert(e.user_message(), Severity::Danger));
            }
        }
        effects
    }

    /// Download link clicked
    ///
    /// Only the first click after a result set schedules a cleanup.
    pub fn handle_download_click(&mut self) -> Vec<UiEffect> {
        match self.cleanup.fire(&self.config) {
            Some(request) => {
                debug!(batch = %request.batch, delay_ms = request.delay_ms, "cleanup scheduled");
                vec![UiEffect::ScheduleCleanup(request)]
            }
            None => Vec::new(),
        }
    }

    /// Cleanup call finished; the outcome is only logged
    pub fn handle_cleanup_finished(&mut self, batch: &BatchId, body: Result<String, ClientError>) {
        match body {
            Ok(body) => info!(batch = %batch, response = %body, "cleanup finished"),
            Err(e) => warn!(batch = %batch, error = %e, "cleanup failed"),
        }
    }

    /// Auto-dismiss timer elapsed for an alert
    pub fn handle_alert_expired(&mut self, id: AlertId) -> bool {
        self.alerts.expire(id)
    }
}
