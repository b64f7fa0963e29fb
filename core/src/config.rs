use serde::Deserialize;

use crate::selection::BorderColor;

pub const DEFAULT_COLOR_SELECTED: &str = "#ffbbba";
pub const DEFAULT_COLOR_UNSELECTED: &str = "gray";
pub const DEFAULT_COLOR_DOWNLOADING: &str = "orange";
pub const DEFAULT_RECOLOR_DELAY_MS: u32 = 2000;
pub const DEFAULT_DETAIL_ENDPOINT: &str = "/deets";
pub const DEFAULT_HELP_URL: &str = "static/help.html";
pub const DEFAULT_THUMB_SUFFIX: &str = "-thumb.png";
pub const DEFAULT_FULL_SUFFIX: &str = ".png";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    pub selected: String,
    pub unselected: String,
    pub downloading: String,
}

impl ColorScheme {
    pub fn css(&self, color: BorderColor) -> &str {
        match color {
            BorderColor::Selected => &self.selected,
            BorderColor::Unselected => &self.unselected,
            BorderColor::Downloading => &self.downloading,
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            selected: DEFAULT_COLOR_SELECTED.to_string(),
            unselected: DEFAULT_COLOR_UNSELECTED.to_string(),
            downloading: DEFAULT_COLOR_DOWNLOADING.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThumbnailNaming {
    pub thumb_suffix: String,
    pub full_suffix: String,
}

impl Default for ThumbnailNaming {
    fn default() -> Self {
        Self {
            thumb_suffix: DEFAULT_THUMB_SUFFIX.to_string(),
            full_suffix: DEFAULT_FULL_SUFFIX.to_string(),
        }
    }
}

/// Ids and names of the template elements the gallery attaches to.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DomIds {
    pub thumb_class: String,
    pub thumb_image_suffix: String,
    pub preview_container: String,
    pub preview_window: String,
    pub preview_img: String,
    pub preview_filename: String,
    pub preview_content: String,
    pub preview_detail: String,
    pub preview_select: String,
    pub help_container: String,
    pub help_body: String,
    pub download_form: String,
    pub download_field: String,
}

impl Default for DomIds {
    fn default() -> Self {
        Self {
            thumb_class: "thumb".to_string(),
            thumb_image_suffix: "img".to_string(),
            preview_container: "preview-container".to_string(),
            preview_window: "preview-window".to_string(),
            preview_img: "preview-img".to_string(),
            preview_filename: "preview-filename".to_string(),
            preview_content: "preview-content".to_string(),
            preview_detail: "preview-deets".to_string(),
            preview_select: "preview-select".to_string(),
            help_container: "help-container".to_string(),
            help_body: "help-html".to_string(),
            download_form: "dlform".to_string(),
            download_field: "recids".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub colors: ColorScheme,
    pub recolor_delay_ms: u32,
    pub detail_endpoint: String,
    pub help_url: String,
    pub naming: ThumbnailNaming,
    pub dom: DomIds,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            colors: ColorScheme::default(),
            recolor_delay_ms: DEFAULT_RECOLOR_DELAY_MS,
            detail_endpoint: DEFAULT_DETAIL_ENDPOINT.to_string(),
            help_url: DEFAULT_HELP_URL.to_string(),
            naming: ThumbnailNaming::default(),
            dom: DomIds::default(),
        }
    }
}

impl GalleryConfig {
    pub fn with_detail_endpoint(mut self, endpoint: &str) -> Self {
        let endpoint = endpoint.trim();
        if !endpoint.is_empty() {
            self.detail_endpoint = endpoint.to_string();
        }
        self
    }

    pub fn with_help_url(mut self, url: &str) -> Self {
        let url = url.trim();
        if !url.is_empty() {
            self.help_url = url.to_string();
        }
        self
    }
}
