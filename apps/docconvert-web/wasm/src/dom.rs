//! Page element lookup and small DOM helpers

use docconvert_core::ElementIds;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlAnchorElement, HtmlButtonElement, HtmlElement, HtmlFormElement,
    HtmlInputElement, HtmlSelectElement, Node,
};

/// Elements the upload page is built from
pub struct PageElements {
    pub document: Document,
    pub form: HtmlFormElement,
    pub file_input: HtmlInputElement,
    /// Optional; without it only the picker adds files
    pub drop_zone: Option<HtmlElement>,
    pub selected_files: HtmlElement,
    pub format_select: HtmlSelectElement,
    pub advanced_toggle: HtmlInputElement,
    pub advanced_panel: HtmlElement,
    pub format_options: HtmlElement,
    pub submit_button: HtmlButtonElement,
    pub spinner: HtmlElement,
    pub results_panel: HtmlElement,
    pub results_table: HtmlElement,
    pub download_link: HtmlAnchorElement,
    pub alert_container: String,
}

impl PageElements {
    pub fn locate(document: &Document, ids: &ElementIds) -> Result<Self, JsValue> {
        Ok(Self {
            document: document.clone(),
            form: by_id(document, &ids.form)?,
            file_input: by_id(document, &ids.file_input)?,
            drop_zone: optional_by_id(document, &ids.drop_zone)?,
            selected_files: by_id(document, &ids.selected_files)?,
            format_select: by_id(document, &ids.format_select)?,
            advanced_toggle: by_id(document, &ids.advanced_toggle)?,
            advanced_panel: by_id(document, &ids.advanced_panel)?,
            format_options: by_id(document, &ids.format_options)?,
            submit_button: by_id(document, &ids.submit_button)?,
            spinner: by_id(document, &ids.spinner)?,
            results_panel: by_id(document, &ids.results_panel)?,
            results_table: by_id(document, &ids.results_table)?,
            download_link: by_id(document, &ids.download_link)?,
            alert_container: ids.alert_container.clone(),
        })
    }

    /// Element alerts are prepended to
    pub fn alert_host(&self) -> Result<Element, JsValue> {
        self.document
            .query_selector(&self.alert_container)?
            .ok_or_else(|| JsValue::from_str(&format!("Missing element {}", self.alert_container)))
    }
}

fn by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    optional_by_id(document, id)?
        .ok_or_else(|| JsValue::from_str(&format!("Missing element #{}", id)))
}

fn optional_by_id<T: JsCast>(document: &Document, id: &str) -> Result<Option<T>, JsValue> {
    match document.get_element_by_id(id) {
        Some(el) => el
            .dyn_into::<T>()
            .map(Some)
            .map_err(|_| JsValue::from_str(&format!("Element #{} has unexpected type", id))),
        None => Ok(None),
    }
}

pub fn set_display(el: &HtmlElement, value: &str) -> Result<(), JsValue> {
    el.style().set_property("display", value)
}

/// Placeholder inside the drop zone that also opens the picker
pub const PLACEHOLDER_SELECTOR: &str = ".upload-placeholder";

/// Whether a click on `target` inside the drop zone should open the picker.
///
/// Only clicks on the zone itself or inside its placeholder count, so
/// controls inside the zone (remove buttons, links) keep their own behavior.
pub fn zone_click_opens_picker(zone: &Element, target: &Element) -> bool {
    let zone_node: &Node = zone;
    if target.is_same_node(Some(zone_node)) {
        return true;
    }
    match target.closest(PLACEHOLDER_SELECTOR) {
        Ok(Some(placeholder)) => {
            let placeholder_node: &Node = &placeholder;
            zone.contains(Some(placeholder_node))
        }
        _ => false,
    }
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_missing_element_is_error() {
        let document = web_sys::window().unwrap().document().unwrap();
        let ids = ElementIds {
            form: "no-such-form".to_string(),
            ..ElementIds::default()
        };
        let err = PageElements::locate(&document, &ids).err().unwrap();
        assert!(err.as_string().unwrap().contains("no-such-form"));
    }

    fn zone_fixture(document: &Document) -> Element {
        let zone = document.create_element("div").unwrap();
        zone.set_inner_html(
            r#"<div class="upload-placeholder"><span class="hint">Drop files</span></div>
               <div class="file-item"><button type="button" class="remove-file">x</button></div>"#,
        );
        zone
    }

    #[wasm_bindgen_test]
    fn test_click_on_zone_or_placeholder_opens_picker() {
        let document = web_sys::window().unwrap().document().unwrap();
        let zone = zone_fixture(&document);
        let hint = zone.query_selector(".hint").unwrap().unwrap();

        assert!(zone_click_opens_picker(&zone, &zone));
        assert!(zone_click_opens_picker(&zone, &hint));
    }

    #[wasm_bindgen_test]
    fn test_click_on_child_control_does_not_open_picker() {
        let document = web_sys::window().unwrap().document().unwrap();
        let zone = zone_fixture(&document);
        let button = zone.query_selector(".remove-file").unwrap().unwrap();

        assert!(!zone_click_opens_picker(&zone, &button));
    }

    #[wasm_bindgen_test]
    fn test_placeholder_outside_zone_does_not_count() {
        let document = web_sys::window().unwrap().document().unwrap();
        let outer = zone_fixture(&document);
        let zone = document.create_element("div").unwrap();
        let hint = outer.query_selector(".hint").unwrap().unwrap();
        outer.append_child(&zone).unwrap();

        assert!(!zone_click_opens_picker(&zone, &hint));
    }

    #[wasm_bindgen_test]
    fn test_set_display() {
        let document = web_sys::window().unwrap().document().unwrap();
        let el: HtmlElement = document.create_element("div").unwrap().unchecked_into();
        set_display(&el, "none").unwrap();
        assert_eq!(el.style().get_property_value("display").unwrap(), "none");
    }
}
