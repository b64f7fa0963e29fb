use serde_json::Value;
use web_sys::Document;

use rfo_imagelib_core::GalleryConfig;

pub(crate) const CONFIG_ELEMENT_ID: &str = "imagelib-config";

pub(crate) fn build_time_config() -> GalleryConfig {
    let mut config = GalleryConfig::default();
    if let Some(endpoint) = option_env!("RFO_IMAGELIB_DETAIL_ENDPOINT") {
        config = config.with_detail_endpoint(endpoint);
    }
    if let Some(url) = option_env!("RFO_IMAGELIB_HELP_URL") {
        config = config.with_help_url(url);
    }
    config
}

/// Defaults, then build-time overrides, then the page's
/// `<script type="application/json" id="imagelib-config">` block.
pub(crate) fn load_config(document: &Document) -> GalleryConfig {
    let base = build_time_config();
    let Some(element) = document.get_element_by_id(CONFIG_ELEMENT_ID) else {
        return base;
    };
    let raw = element.text_content().unwrap_or_default();
    match merge_page_config(base.clone(), &raw) {
        Ok(config) => config,
        Err(err) => {
            gloo::console::warn!("ignoring page config", err.to_string());
            base
        }
    }
}

/// Fields the page block leaves out keep the values from `base`.
pub(crate) fn merge_page_config(base: GalleryConfig, raw: &str) -> Result<GalleryConfig, serde_json::Error> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(base);
    }
    let value: Value = serde_json::from_str(raw)?;
    let mut config: GalleryConfig = serde_json::from_value(value.clone())?;
    if value.get("detail_endpoint").is_none() {
        config.detail_endpoint = base.detail_endpoint;
    }
    if value.get("help_url").is_none() {
        config.help_url = base.help_url;
    }
    Ok(config)
}
