//! Upload page wiring
//!
//! Owns the DOM listeners and turns every browser event into a call on the
//! core [`UploadController`], then applies the returned effects. Controller
//! borrows are never held across an `.await` or into `apply`.

use crate::dom::{set_display, zone_click_opens_picker, PageElements};
use crate::files::{batch_from_list, can_build_file_list, InputFileList};
use crate::http::{self, describe, transport_error};
use crate::render::{self, REMOVE_BUTTON_CLASS, ROW_INDEX_ATTR};
use crate::timer::set_timeout;
use docconvert_core::{
    Alert, AlertId, ClientConfig, CleanupRequest, OptionsRequest, ResultsView, StrategyKind,
    SubmitRequest, UiEffect, UploadController,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    DragEvent, Element, Event, EventTarget, FormData, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition,
};

const HIGHLIGHT_CLASS: &str = "highlighted";
const DRAG_EVENTS: [&str; 4] = ["dragenter", "dragover", "dragleave", "drop"];

type Controller = UploadController<InputFileList>;

struct Inner {
    page: PageElements,
    controller: RefCell<Controller>,
    /// The alert element currently on the page
    current_alert: RefCell<Option<(AlertId, Element)>>,
}

#[derive(Clone)]
struct App(Rc<Inner>);

/// The upload page, mounted on the elements named in the config
#[wasm_bindgen]
pub struct UploadApp {
    app: App,
}

#[wasm_bindgen]
impl UploadApp {
    /// Mount on the current document; `config_json` overrides defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<UploadApp, JsValue> {
        let config = match config_json.as_deref().map(str::trim) {
            Some(json) if !json.is_empty() => {
                ClientConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?
            }
            _ => ClientConfig::default(),
        };

        let window = web_sys::window().ok_or("No window")?;
        let document = window.document().ok_or("No document")?;
        let page = PageElements::locate(&document, &config.elements)?;

        let strategy = StrategyKind::detect(can_build_file_list());
        let target = InputFileList::new(page.file_input.clone());
        let controller = UploadController::new(config, target, strategy);
        info!(
            strategy = controller.selection().strategy_name(),
            "upload page mounted"
        );

        let app = App(Rc::new(Inner {
            page,
            controller: RefCell::new(controller),
            current_alert: RefCell::new(None),
        }));
        app.wire()?;
        app.adopt_restored_state();

        Ok(UploadApp { app })
    }

    /// Name of the file-list strategy in use
    #[wasm_bindgen(getter)]
    pub fn strategy(&self) -> String {
        self.app
            .0
            .controller
            .borrow()
            .selection()
            .strategy_name()
            .to_string()
    }

    /// Number of files currently selected
    #[wasm_bindgen(js_name = selectedCount)]
    pub fn selected_count(&self) -> usize {
        self.app.0.controller.borrow().selection().len()
    }

    /// Selected-file rows as shown, for scripting and debugging
    #[wasm_bindgen(js_name = selectedFiles)]
    pub fn selected_files(&self) -> Result<JsValue, JsValue> {
        let rows = self.app.0.controller.borrow().selection().rows();
        serde_wasm_bindgen::to_value(&rows).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = isBusy)]
    pub fn is_busy(&self) -> bool {
        self.app.0.controller.borrow().is_busy()
    }
}

fn listen<F>(target: &EventTarget, event: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn event_element(event: &Event) -> Option<Element> {
    event.target().and_then(|t| t.dyn_into::<Element>().ok())
}

impl App {
    fn page(&self) -> &PageElements {
        &self.0.page
    }

    fn wire(&self) -> Result<(), JsValue> {
        let page = self.page();

        let app = self.clone();
        listen(&page.file_input, "change", move |_| {
            let batch = batch_from_list(app.page().file_input.files());
            let effects = app.0.controller.borrow_mut().handle_files_picked(batch);
            app.apply(effects);
        })?;

        for name in DRAG_EVENTS {
            listen(&page.document, name, |e: Event| {
                e.prevent_default();
            })?;
        }

        if let Some(zone) = &page.drop_zone {
            self.wire_drop_zone(zone)?;
        }

        let app = self.clone();
        listen(&page.selected_files, "click", move |e: Event| {
            let index = event_element(&e)
                .and_then(|el| el.closest(&format!(".{}", REMOVE_BUTTON_CLASS)).ok().flatten())
                .and_then(|button| button.get_attribute(ROW_INDEX_ATTR))
                .and_then(|value| value.parse::<usize>().ok());
            if let Some(index) = index {
                // keep the drop zone from opening the picker
                e.stop_propagation();
                let effects = app.0.controller.borrow_mut().handle_remove(index);
                app.apply(effects);
            }
        })?;

        let app = self.clone();
        listen(&page.format_select, "change", move |_| {
            let format = app.page().format_select.value();
            let effects = app.0.controller.borrow_mut().handle_format_changed(&format);
            app.apply(effects);
        })?;

        let app = self.clone();
        listen(&page.advanced_toggle, "change", move |_| {
            let enabled = app.page().advanced_toggle.checked();
            let effects = app.0.controller.borrow_mut().handle_advanced_toggled(enabled);
            app.apply(effects);
        })?;

        let app = self.clone();
        listen(&page.form, "submit", move |e: Event| {
            e.prevent_default();
            let format = app.page().format_select.value();
            let effects = app.0.controller.borrow_mut().handle_submit(&format);
            app.apply(effects);
        })?;

        let app = self.clone();
        listen(&page.download_link, "click", move |_| {
            let effects = app.0.controller.borrow_mut().handle_download_click();
            app.apply(effects);
        })?;

        Ok(())
    }

    /// Sync the controller with form state restored before mounting
    fn adopt_restored_state(&self) {
        let page = self.page();
        let advanced = page.advanced_toggle.checked();
        let format = page.format_select.value();
        let batch = batch_from_list(page.file_input.files());
        let effects = self
            .0
            .controller
            .borrow_mut()
            .handle_mounted(advanced, &format, batch);
        self.apply(effects);
    }

    fn wire_drop_zone(&self, zone: &web_sys::HtmlElement) -> Result<(), JsValue> {
        for name in DRAG_EVENTS {
            let highlight = matches!(name, "dragenter" | "dragover");
            let el = zone.clone();
            listen(zone, name, move |e: Event| {
                e.prevent_default();
                e.stop_propagation();
                let classes = el.class_list();
                let _ = if highlight {
                    classes.add_1(HIGHLIGHT_CLASS)
                } else {
                    classes.remove_1(HIGHLIGHT_CLASS)
                };
            })?;
        }

        let app = self.clone();
        listen(zone, "drop", move |e: Event| {
            let list = e
                .dyn_ref::<DragEvent>()
                .and_then(|drag| drag.data_transfer())
                .and_then(|transfer| transfer.files());
            let batch = batch_from_list(list);
            let effects = app.0.controller.borrow_mut().handle_files_dropped(batch);
            app.apply(effects);
        })?;

        let app = self.clone();
        let zone_el = zone.clone();
        listen(zone, "click", move |e: Event| {
            let Some(target) = event_element(&e) else {
                return;
            };
            if zone_click_opens_picker(&zone_el, &target) {
                e.prevent_default();
                e.stop_propagation();
                app.page().file_input.click();
            }
        })?;

        Ok(())
    }

    fn apply(&self, effects: Vec<UiEffect>) {
        for effect in effects {
            if let Err(e) = self.apply_one(effect) {
                error!(error = %describe(&e), "failed to apply UI effect");
            }
        }
    }

    fn apply_one(&self, effect: UiEffect) -> Result<(), JsValue> {
        let page = self.page();
        match effect {
            UiEffect::RenderSelection => {
                let rows = self.0.controller.borrow().selection().rows();
                render::render_selection(&page.document, &page.selected_files, &rows)
            }
            UiEffect::RenderOptions => {
                let panel = self.0.controller.borrow().options_panel().clone();
                render::render_options(&page.document, &page.format_options, &panel)
            }
            UiEffect::ShowAlert { alert, replaces } => self.show_alert(alert, replaces),
            UiEffect::FetchOptions(request) => {
                self.fetch_options(request);
                Ok(())
            }
            UiEffect::SetAdvancedPanel { visible } => self.set_advanced_panel(visible),
            UiEffect::SetBusy(busy) => {
                page.submit_button.set_disabled(busy);
                if busy {
                    page.spinner.class_list().remove_1("d-none")
                } else {
                    page.spinner.class_list().add_1("d-none")
                }
            }
            UiEffect::HideResults => set_display(&page.results_panel, "none"),
            UiEffect::Submit(request) => self.submit(request),
            UiEffect::ShowResults(view) => self.show_results(&view),
            UiEffect::ScheduleCleanup(request) => self.schedule_cleanup(request),
        }
    }

    fn fetch_options(&self, request: OptionsRequest) {
        let app = self.clone();
        spawn_local(async move {
            let body = http::get_text(&request.url).await.map_err(transport_error);
            if let Err(e) = &body {
                warn!(format = %request.format, error = %e, "options request failed");
            }
            let effects = app
                .0
                .controller
                .borrow_mut()
                .handle_options_loaded(request.generation, body);
            app.apply(effects);
        });
    }

    fn submit(&self, request: SubmitRequest) -> Result<(), JsValue> {
        let form = match FormData::new_with_form(&self.page().form) {
            Ok(form) => form,
            Err(e) => {
                // release the pipeline so the user can retry
                let effects = self
                    .0
                    .controller
                    .borrow_mut()
                    .handle_submit_response(Err(transport_error(e.clone())));
                self.apply(effects);
                return Err(e);
            }
        };

        let app = self.clone();
        spawn_local(async move {
            debug!(url = %request.url, advanced = request.advanced, "posting form");
            let body = http::post_form(&request.url, &form)
                .await
                .map_err(transport_error);
            let effects = app.0.controller.borrow_mut().handle_submit_response(body);
            app.apply(effects);
        });
        Ok(())
    }

    fn show_results(&self, view: &ResultsView) -> Result<(), JsValue> {
        let page = self.page();
        render::render_results(&page.document, &page.results_table, view)?;

        match &view.download_url {
            Some(url) => page.download_link.set_href(url),
            None => page.download_link.remove_attribute("href")?,
        }
        set_display(&page.results_panel, "block")?;

        let delay = self.0.controller.borrow().config().timings.results_scroll_delay_ms;
        let panel = page.results_panel.clone();
        set_timeout(delay, move || {
            let opts = ScrollIntoViewOptions::new();
            opts.set_behavior(ScrollBehavior::Smooth);
            opts.set_block(ScrollLogicalPosition::Start);
            panel.scroll_into_view_with_scroll_into_view_options(&opts);
        })?;
        Ok(())
    }

    fn schedule_cleanup(&self, request: CleanupRequest) -> Result<(), JsValue> {
        let app = self.clone();
        set_timeout(request.delay_ms, move || {
            spawn_local(async move {
                let body = http::post_empty(&request.url)
                    .await
                    .map_err(transport_error);
                app.0
                    .controller
                    .borrow_mut()
                    .handle_cleanup_finished(&request.batch, body);
            });
        })?;
        Ok(())
    }

    fn set_advanced_panel(&self, visible: bool) -> Result<(), JsValue> {
        let page = self.page();
        let timings = self.0.controller.borrow().config().timings;
        let panel = page.advanced_panel.clone();
        let toggle = page.advanced_toggle.clone();

        if visible {
            set_display(&panel, "flex")?;
            set_timeout(timings.advanced_show_ms, move || {
                if toggle.checked() {
                    let _ = panel.class_list().add_1("show");
                }
            })?;
        } else {
            panel.class_list().remove_1("show")?;
            set_timeout(timings.advanced_hide_ms, move || {
                // toggled back on while fading out
                if !toggle.checked() {
                    let _ = set_display(&panel, "none");
                }
            })?;
        }
        Ok(())
    }

    fn show_alert(&self, alert: Alert, replaces: Option<AlertId>) -> Result<(), JsValue> {
        let page = self.page();

        if let Some((id, el)) = self.0.current_alert.borrow_mut().take() {
            debug!(alert = id.0, expected = ?replaces.map(|r| r.0), "replacing alert");
            el.remove();
        }

        let el = render::build_alert(&page.document, &alert)?;
        let host = page.alert_host()?;
        host.insert_before(&el, host.first_child().as_ref())?;
        *self.0.current_alert.borrow_mut() = Some((alert.id, el.clone()));

        let timings = self.0.controller.borrow().config().timings;
        let app = self.clone();
        let id = alert.id;
        set_timeout(timings.alert_dismiss_ms, move || {
            let _ = el.class_list().remove_1("show");
            let result = set_timeout(timings.alert_fade_ms, move || app.expire_alert(id, &el));
            if let Err(e) = result {
                error!(error = %describe(&e), "failed to schedule alert removal");
            }
        })?;
        Ok(())
    }

    fn expire_alert(&self, id: AlertId, el: &Element) {
        if !self.0.controller.borrow_mut().handle_alert_expired(id) {
            // already replaced; the successor stays
            return;
        }
        el.remove();
        let mut current = self.0.current_alert.borrow_mut();
        if matches!(current.as_ref(), Some((current_id, _)) if *current_id == id) {
            *current = None;
        }
    }
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use std::cell::Cell;
    use wasm_bindgen_futures::JsFuture;
    use wasm_bindgen_test::*;
    use web_sys::{HtmlElement, HtmlInputElement};

    wasm_bindgen_test_configure!(run_in_browser);

    const PAGE: &str = r#"
        <div class="card-body">
          <form id="upload-form">
            <div id="upload-zone">
              <div class="upload-placeholder"><span id="zone-hint">Drop files here</span></div>
              <button type="button" id="zone-control">Clear</button>
              <input type="file" id="files" name="files[]" multiple>
              <div id="selected-files"></div>
            </div>
            <select id="output_format" name="output_format">
              <option value="">Choose</option>
              <option value="pdf">PDF</option>
            </select>
            <input type="checkbox" id="show-advanced">
            <div id="advanced-options" style="display: none">
              <div id="format-options"></div>
            </div>
            <button type="submit" id="convert-btn">Convert</button>
            <div id="loading-spinner" class="d-none"></div>
          </form>
          <div id="conversion-results" style="display: none">
            <table><tbody id="results-table"></tbody></table>
            <a id="download-link" href="">Download</a>
          </div>
        </div>"#;

    fn document() -> web_sys::Document {
        web_sys::window().unwrap().document().unwrap()
    }

    fn by_id<T: JsCast>(id: &str) -> T {
        document().get_element_by_id(id).unwrap().unchecked_into()
    }

    /// Insert the page markup; the caller removes the returned host
    fn insert_page() -> Element {
        let host = document().create_element("div").unwrap();
        host.set_inner_html(PAGE);
        document().body().unwrap().append_child(&host).unwrap();
        host
    }

    fn count_clicks(target: &EventTarget) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        listen(target, "click", move |_| counter.set(counter.get() + 1)).unwrap();
        count
    }

    fn change(el: &HtmlInputElement, checked: bool) {
        el.set_checked(checked);
        el.dispatch_event(&Event::new("change").unwrap()).unwrap();
    }

    fn display(el: &HtmlElement) -> String {
        el.style().get_property_value("display").unwrap()
    }

    async fn sleep(ms: i32) {
        let promise = js_sys::Promise::new(&mut |resolve, _| {
            web_sys::window()
                .unwrap()
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
                .unwrap();
        });
        JsFuture::from(promise).await.unwrap();
    }

    #[wasm_bindgen_test]
    fn test_child_control_click_leaves_picker_closed() {
        let host = insert_page();
        let _app = UploadApp::new(None).unwrap();
        let input: HtmlInputElement = by_id("files");
        let clicks = count_clicks(&input);

        by_id::<HtmlElement>("zone-control").click();
        assert_eq!(clicks.get(), 0);

        host.remove();
    }

    #[wasm_bindgen_test]
    fn test_placeholder_click_opens_picker() {
        let host = insert_page();
        let _app = UploadApp::new(None).unwrap();
        let input: HtmlInputElement = by_id("files");
        let clicks = count_clicks(&input);

        by_id::<HtmlElement>("zone-hint").click();
        assert_eq!(clicks.get(), 1);

        host.remove();
    }

    #[wasm_bindgen_test]
    async fn test_advanced_panel_transitions() {
        let host = insert_page();
        let _app = UploadApp::new(None).unwrap();
        let toggle: HtmlInputElement = by_id("show-advanced");
        let panel: HtmlElement = by_id("advanced-options");

        change(&toggle, true);
        assert_eq!(display(&panel), "flex");
        assert!(!panel.class_list().contains("show"));
        sleep(50).await;
        assert!(panel.class_list().contains("show"));

        // off then on again before the hide delay elapses
        change(&toggle, false);
        assert!(!panel.class_list().contains("show"));
        sleep(50).await;
        change(&toggle, true);
        sleep(500).await;
        assert_eq!(display(&panel), "flex");
        assert!(panel.class_list().contains("show"));

        change(&toggle, false);
        sleep(500).await;
        assert_eq!(display(&panel), "none");

        host.remove();
    }

    #[wasm_bindgen_test]
    fn test_drag_over_zone_toggles_highlight() {
        let host = insert_page();
        let _app = UploadApp::new(None).unwrap();
        let zone: HtmlElement = by_id("upload-zone");

        zone.dispatch_event(&Event::new("dragenter").unwrap()).unwrap();
        assert!(zone.class_list().contains("highlighted"));
        zone.dispatch_event(&Event::new("dragleave").unwrap()).unwrap();
        assert!(!zone.class_list().contains("highlighted"));

        host.remove();
    }

    #[wasm_bindgen_test]
    fn test_mount_adopts_checked_toggle() {
        let host = insert_page();
        by_id::<HtmlInputElement>("show-advanced").set_checked(true);

        let _app = UploadApp::new(None).unwrap();
        let panel: HtmlElement = by_id("advanced-options");
        assert_eq!(display(&panel), "flex");

        host.remove();
    }
}
