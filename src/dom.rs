use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlFormElement, HtmlImageElement, HtmlInputElement};

use rfo_imagelib_core::{DomIds, GalleryError};

#[derive(Debug, Error)]
pub(crate) enum DomError {
    #[error("window unavailable")]
    NoWindow,
    #[error("document unavailable")]
    NoDocument,
    #[error("missing element #{0}")]
    MissingElement(String),
    #[error("element #{id} is not {expected}")]
    WrongType { id: String, expected: &'static str },
    #[error("missing form named '{0}'")]
    MissingForm(String),
    #[error("form '{form}' has no input named '{field}'")]
    MissingField { form: String, field: String },
    #[error("thumbnail #{0} has no data-recid")]
    MissingRecid(String),
    #[error("thumbnail at index {0} has no id")]
    MissingThumbId(u32),
    #[error("selector failed: {0}")]
    Selector(String),
    #[error(transparent)]
    Gallery(#[from] GalleryError),
}

pub(crate) fn document() -> Result<Document, DomError> {
    web_sys::window()
        .ok_or(DomError::NoWindow)?
        .document()
        .ok_or(DomError::NoDocument)
}

pub(crate) fn js_err(error: JsValue) -> String {
    if let Some(value) = error.as_string() {
        return value;
    }
    if let Ok(json) = js_sys::JSON::stringify(&error) {
        if let Some(value) = json.as_string() {
            return value;
        }
    }
    "js error".to_string()
}

fn element_by_id(document: &Document, id: &str) -> Result<Element, DomError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| DomError::MissingElement(id.to_string()))
}

fn typed_by_id<T: JsCast>(document: &Document, id: &str, expected: &'static str) -> Result<T, DomError> {
    element_by_id(document, id)?
        .dyn_into::<T>()
        .map_err(|_| DomError::WrongType {
            id: id.to_string(),
            expected,
        })
}

/// Fixed template elements of the preview and help overlays.
pub(crate) struct OverlayElements {
    pub(crate) preview_container: HtmlElement,
    pub(crate) preview_window: HtmlElement,
    pub(crate) preview_img: HtmlImageElement,
    pub(crate) preview_filename: Element,
    pub(crate) preview_content: HtmlElement,
    pub(crate) preview_detail: Element,
    pub(crate) preview_select: Element,
    pub(crate) help_container: HtmlElement,
    pub(crate) help_body: Element,
}

impl OverlayElements {
    pub(crate) fn locate(document: &Document, ids: &DomIds) -> Result<Self, DomError> {
        Ok(Self {
            preview_container: typed_by_id(document, &ids.preview_container, "an html element")?,
            preview_window: typed_by_id(document, &ids.preview_window, "an html element")?,
            preview_img: typed_by_id(document, &ids.preview_img, "an <img>")?,
            preview_filename: element_by_id(document, &ids.preview_filename)?,
            preview_content: typed_by_id(document, &ids.preview_content, "an html element")?,
            preview_detail: element_by_id(document, &ids.preview_detail)?,
            preview_select: element_by_id(document, &ids.preview_select)?,
            help_container: typed_by_id(document, &ids.help_container, "an html element")?,
            help_body: element_by_id(document, &ids.help_body)?,
        })
    }
}

pub(crate) struct DownloadForm {
    pub(crate) form: HtmlFormElement,
    pub(crate) field: HtmlInputElement,
}

impl DownloadForm {
    pub(crate) fn locate(document: &Document, ids: &DomIds) -> Result<Self, DomError> {
        let form = query(document, &format!("form[name=\"{}\"]", ids.download_form))?
            .or_else(|| document.get_element_by_id(&ids.download_form))
            .ok_or_else(|| DomError::MissingForm(ids.download_form.clone()))?
            .dyn_into::<HtmlFormElement>()
            .map_err(|_| DomError::WrongType {
                id: ids.download_form.clone(),
                expected: "a <form>",
            })?;
        let missing_field = || DomError::MissingField {
            form: ids.download_form.clone(),
            field: ids.download_field.clone(),
        };
        let field = form
            .query_selector(&format!("[name=\"{}\"]", ids.download_field))
            .map_err(|err| DomError::Selector(js_err(err)))?
            .ok_or_else(missing_field)?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| missing_field())?;
        Ok(Self { form, field })
    }
}

fn query(document: &Document, selector: &str) -> Result<Option<Element>, DomError> {
    document
        .query_selector(selector)
        .map_err(|err| DomError::Selector(js_err(err)))
}

/// A `.thumb` container as found in the page.
pub(crate) struct ThumbSource {
    pub(crate) id: String,
    pub(crate) recid: String,
    pub(crate) src: String,
    pub(crate) element: HtmlElement,
}

/// One entry per `.thumb` container in document order. A malformed container
/// yields an error for that entry only.
pub(crate) fn scan_thumbs(document: &Document, ids: &DomIds) -> Vec<Result<ThumbSource, DomError>> {
    let collection = document.get_elements_by_class_name(&ids.thumb_class);
    (0..collection.length())
        .filter_map(|index| collection.item(index).map(|element| (index, element)))
        .map(|(index, element)| read_thumb(document, ids, index, element))
        .collect()
}

fn read_thumb(document: &Document, ids: &DomIds, index: u32, element: Element) -> Result<ThumbSource, DomError> {
    let id = element.id();
    if id.trim().is_empty() {
        return Err(DomError::MissingThumbId(index));
    }
    let recid = element
        .get_attribute("data-recid")
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| DomError::MissingRecid(id.clone()))?;
    let image_id = format!("{id}{}", ids.thumb_image_suffix);
    let image: HtmlImageElement = typed_by_id(document, &image_id, "an <img>")?;
    let element = element.dyn_into::<HtmlElement>().map_err(|_| DomError::WrongType {
        id: id.clone(),
        expected: "an html element",
    })?;
    Ok(ThumbSource {
        id,
        recid,
        src: image.src(),
        element,
    })
}

pub(crate) fn set_border_color(element: &HtmlElement, css: &str) {
    let _ = element.style().set_property("border-color", css);
}

pub(crate) fn set_shown(element: &HtmlElement, shown: bool) {
    let display = if shown { "block" } else { "none" };
    let _ = element.style().set_property("display", display);
}

pub(crate) fn is_shown(element: &HtmlElement) -> bool {
    element
        .style()
        .get_property_value("display")
        .map(|value| value == "block")
        .unwrap_or(false)
}

pub(crate) fn set_error_text(region: &Element, class: &str, message: &str) -> Result<(), JsValue> {
    region.set_inner_html("");
    let document = region
        .owner_document()
        .ok_or_else(|| JsValue::from_str("detached region"))?;
    let line = document.create_element("p")?;
    line.set_class_name(class);
    line.set_text_content(Some(message));
    region.append_child(&line)?;
    Ok(())
}
