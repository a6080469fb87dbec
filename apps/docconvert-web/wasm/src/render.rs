//! DOM renderers for the core view models
//!
//! Everything is built with `create_element` and text nodes. File names and
//! server messages never pass through `innerHTML`.

use crate::dom::set_display;
use docconvert_core::{Alert, FileRow, OptionControl, OptionsPanel, ResultsView};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

/// Class of the per-row remove button, used for click delegation
pub const REMOVE_BUTTON_CLASS: &str = "remove-file";
pub const ROW_INDEX_ATTR: &str = "data-index";

fn element(doc: &Document, tag: &str, class: &str) -> Result<Element, JsValue> {
    let el = doc.create_element(tag)?;
    if !class.is_empty() {
        el.set_class_name(class);
    }
    Ok(el)
}

fn icon(doc: &Document, class: &str) -> Result<Element, JsValue> {
    element(doc, "i", &format!("bi {}", class))
}

fn text(doc: &Document, parent: &Element, value: &str) -> Result<(), JsValue> {
    parent.append_child(&doc.create_text_node(value))?;
    Ok(())
}

fn clear(el: &Element) {
    el.set_text_content(None);
}

/// Selected-files list; hidden when empty
pub fn render_selection(
    doc: &Document,
    container: &HtmlElement,
    rows: &[FileRow],
) -> Result<(), JsValue> {
    clear(container);
    if rows.is_empty() {
        return set_display(container, "none");
    }

    for row in rows {
        let item = element(doc, "div", "file-item")?;

        let info = element(doc, "div", "d-flex align-items-center")?;
        info.append_child(&icon(doc, &format!("{} me-2", row.icon))?.into())?;
        let name = element(doc, "span", "file-name")?;
        name.set_attribute("title", &row.name)?;
        text(doc, &name, &row.name)?;
        info.append_child(&name)?;

        let actions = element(doc, "div", "d-flex align-items-center")?;
        let size = element(doc, "span", "file-size me-2")?;
        text(doc, &size, &row.size_label)?;
        actions.append_child(&size)?;
        let remove = element(doc, "button", &format!("btn-close {}", REMOVE_BUTTON_CLASS))?;
        remove.set_attribute("type", "button")?;
        remove.set_attribute("aria-label", "Remove")?;
        remove.set_attribute(ROW_INDEX_ATTR, &row.index.to_string())?;
        actions.append_child(&remove)?;

        item.append_child(&info)?;
        item.append_child(&actions)?;
        container.append_child(&item)?;
    }

    set_display(container, "block")
}

/// Options panel for the current loader state
pub fn render_options(
    doc: &Document,
    container: &HtmlElement,
    panel: &OptionsPanel,
) -> Result<(), JsValue> {
    clear(container);
    let message = panel.message().unwrap_or_default();

    match panel {
        OptionsPanel::Prompt => {
            let p = element(doc, "p", "text-muted text-center py-3")?;
            text(doc, &p, message)?;
            container.append_child(&p)?;
        }
        OptionsPanel::Loading { .. } => {
            let wrap = element(doc, "div", "text-center py-3")?;
            let spinner = element(doc, "div", "spinner-border text-primary")?;
            spinner.set_attribute("role", "status")?;
            let hidden = element(doc, "span", "visually-hidden")?;
            text(doc, &hidden, "Loading...")?;
            spinner.append_child(&hidden)?;
            let p = element(doc, "p", "mt-2")?;
            text(doc, &p, message)?;
            wrap.append_child(&spinner)?;
            wrap.append_child(&p)?;
            container.append_child(&wrap)?;
        }
        OptionsPanel::Empty => {
            container.append_child(&notice(doc, "alert-info", "bi-info-circle", message)?.into())?;
        }
        OptionsPanel::Failed => {
            container.append_child(&notice(
                doc,
                "alert-danger",
                "bi-exclamation-triangle",
                message,
            )?.into())?;
        }
        OptionsPanel::Ready(controls) => {
            for control in controls {
                container.append_child(&option_group(doc, control)?.into())?;
            }
        }
    }
    Ok(())
}

fn notice(
    doc: &Document,
    class: &str,
    icon_class: &str,
    message: &str,
) -> Result<Element, JsValue> {
    let div = element(doc, "div", &format!("alert {} text-center", class))?;
    div.append_child(&icon(doc, &format!("{} me-2", icon_class))?.into())?;
    text(doc, &div, message)?;
    Ok(div)
}

fn field_label(
    doc: &Document,
    name: &str,
    label: &str,
    icon_class: Option<&str>,
) -> Result<Element, JsValue> {
    let el = element(doc, "label", "form-label")?;
    el.set_attribute("for", name)?;
    if let Some(class) = icon_class {
        el.append_child(&icon(doc, &format!("{} me-1", class))?.into())?;
    }
    text(doc, &el, label)?;
    Ok(el)
}

fn help_text(doc: &Document, description: Option<&str>) -> Result<Option<Element>, JsValue> {
    match description {
        Some(desc) => {
            let small = element(doc, "small", "text-muted d-block mt-1")?;
            text(doc, &small, desc)?;
            Ok(Some(small))
        }
        None => Ok(None),
    }
}

fn option_group(doc: &Document, control: &OptionControl) -> Result<Element, JsValue> {
    let group = element(doc, "div", "option-group mb-3")?;

    match control {
        OptionControl::Input {
            name,
            label,
            icon,
            description,
            input_type,
            value,
            min,
            max,
            unit,
        } => {
            group.append_child(&field_label(doc, name, label, icon.as_deref())?.into())?;
            let wrap = element(doc, "div", "input-group")?;
            let input = element(doc, "input", "form-control")?;
            input.set_attribute("type", input_type.as_str())?;
            input.set_attribute("id", name)?;
            input.set_attribute("name", name)?;
            input.set_attribute("value", value)?;
            if let Some(min) = min {
                input.set_attribute("min", min)?;
            }
            if let Some(max) = max {
                input.set_attribute("max", max)?;
            }
            wrap.append_child(&input)?;
            if let Some(unit) = unit {
                let suffix = element(doc, "span", "input-group-text")?;
                text(doc, &suffix, unit)?;
                wrap.append_child(&suffix)?;
            }
            group.append_child(&wrap)?;
            if let Some(help) = help_text(doc, description.as_deref())? {
                group.append_child(&help)?;
            }
        }
        OptionControl::Select {
            name,
            label,
            icon,
            description,
            choices,
        } => {
            group.append_child(&field_label(doc, name, label, icon.as_deref())?.into())?;
            let select = element(doc, "select", "form-select")?;
            select.set_attribute("id", name)?;
            select.set_attribute("name", name)?;
            for choice in choices {
                let option = element(doc, "option", "")?;
                option.set_attribute("value", &choice.value)?;
                if choice.selected {
                    option.set_attribute("selected", "")?;
                }
                text(doc, &option, &choice.value)?;
                select.append_child(&option)?;
            }
            group.append_child(&select)?;
            if let Some(help) = help_text(doc, description.as_deref())? {
                group.append_child(&help)?;
            }
        }
        OptionControl::Switch {
            name,
            label,
            checked,
        } => {
            let wrap = element(doc, "div", "form-check form-switch")?;
            let input = element(doc, "input", "form-check-input")?;
            input.set_attribute("type", "checkbox")?;
            input.set_attribute("role", "switch")?;
            input.set_attribute("id", name)?;
            input.set_attribute("name", name)?;
            if *checked {
                input.set_attribute("checked", "")?;
            }
            let caption = element(doc, "label", "form-check-label")?;
            caption.set_attribute("for", name)?;
            text(doc, &caption, label)?;
            wrap.append_child(&input)?;
            wrap.append_child(&caption)?;
            group.append_child(&wrap)?;
        }
    }

    Ok(group)
}

/// Results table body
pub fn render_results(
    doc: &Document,
    table: &HtmlElement,
    view: &ResultsView,
) -> Result<(), JsValue> {
    clear(table);

    for row in &view.rows {
        let tr = element(doc, "tr", "")?;

        let original = element(doc, "td", "")?;
        original.append_child(&icon(doc, "bi-file-earmark me-2")?.into())?;
        text(doc, &original, &row.original_name)?;

        let status = element(doc, "td", row.status_class)?;
        status.append_child(&icon(doc, &format!("{} me-1", row.status_icon))?.into())?;
        text(doc, &status, row.status_text)?;
        if let Some(error) = &row.error {
            let small = element(doc, "small", "text-muted ms-1")?;
            text(doc, &small, &format!("({})", error))?;
            status.append_child(&small)?;
        }

        let converted = element(doc, "td", "")?;
        if row.succeeded {
            converted.append_child(&icon(doc, "bi-file-earmark-text me-2")?.into())?;
        }
        text(doc, &converted, &row.converted)?;

        tr.append_child(&original)?;
        tr.append_child(&status)?;
        tr.append_child(&converted)?;
        table.append_child(&tr)?;
    }
    Ok(())
}

/// Dismissible Bootstrap alert
pub fn build_alert(doc: &Document, alert: &Alert) -> Result<Element, JsValue> {
    let div = element(doc, "div", &alert.class_name())?;
    div.set_attribute("role", "alert")?;
    div.append_child(&icon(doc, &format!("{} me-2", alert.severity.icon()))?.into())?;
    text(doc, &div, &alert.message)?;

    let close = element(doc, "button", "btn-close")?;
    close.set_attribute("type", "button")?;
    close.set_attribute("data-bs-dismiss", "alert")?;
    close.set_attribute("aria-label", "Close")?;
    div.append_child(&close)?;
    Ok(div)
}
