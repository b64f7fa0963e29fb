use web_sys::HtmlElement;

use crate::dom::{self, OverlayElements};
use rfo_imagelib_core::{ColorScheme, FragmentState, GalleryView, HelpView, PreviewView};

pub(crate) const ERROR_CLASS: &str = "imagelib-error";

/// Projects `GalleryView` snapshots onto the page, touching only what changed
/// since the previous snapshot.
pub(crate) struct Renderer {
    overlays: OverlayElements,
    thumbs: Vec<HtmlElement>,
    colors: ColorScheme,
    last: GalleryView,
}

impl Renderer {
    /// `thumbs` must be in registration order, matching `GalleryView::thumbs`.
    pub(crate) fn new(overlays: OverlayElements, thumbs: Vec<HtmlElement>, colors: ColorScheme) -> Self {
        Self {
            overlays,
            thumbs,
            colors,
            last: GalleryView::default(),
        }
    }

    pub(crate) fn overlays(&self) -> &OverlayElements {
        &self.overlays
    }

    /// Paints everything regardless of the previous snapshot.
    pub(crate) fn render_full(&mut self, view: &GalleryView) {
        for (element, paint) in self.thumbs.iter().zip(&view.thumbs) {
            dom::set_border_color(element, self.colors.css(paint.color));
        }
        self.render_preview(None, view.preview.as_ref());
        self.render_help(None, view.help.as_ref());
        self.last = view.clone();
    }

    pub(crate) fn render(&mut self, view: &GalleryView) {
        if self.last.thumbs.len() != view.thumbs.len() {
            self.render_full(view);
            return;
        }
        for ((element, paint), previous) in self.thumbs.iter().zip(&view.thumbs).zip(&self.last.thumbs) {
            if paint.color != previous.color {
                dom::set_border_color(element, self.colors.css(paint.color));
            }
        }
        let last_preview = self.last.preview.take();
        self.render_preview(last_preview.as_ref(), view.preview.as_ref());
        let last_help = self.last.help.take();
        self.render_help(last_help.as_ref(), view.help.as_ref());
        self.last = view.clone();
    }

    fn render_preview(&self, previous: Option<&PreviewView>, next: Option<&PreviewView>) {
        let overlays = &self.overlays;
        let Some(next) = next else {
            if previous.is_some() || dom::is_shown(&overlays.preview_container) {
                dom::set_shown(&overlays.preview_container, false);
            }
            return;
        };
        // The window has no client size until the container is displayed.
        if previous.is_none() {
            dom::set_shown(&overlays.preview_container, true);
        }
        let retarget = previous.map_or(true, |prev| prev.image_src != next.image_src);
        if retarget {
            overlays.preview_img.set_src(&next.image_src);
            self.bound_preview_image();
            overlays.preview_filename.set_text_content(Some(&next.filename));
        }
        if previous.map_or(true, |prev| prev.border != next.border) {
            dom::set_border_color(&overlays.preview_content, self.colors.css(next.border));
        }
        if retarget || previous.map_or(true, |prev| prev.detail != next.detail) {
            paint_fragment(&overlays.preview_detail, &next.detail, "could not load details");
        }
    }

    fn render_help(&self, previous: Option<&HelpView>, next: Option<&HelpView>) {
        let overlays = &self.overlays;
        let Some(next) = next else {
            if previous.is_some() || dom::is_shown(&overlays.help_container) {
                dom::set_shown(&overlays.help_container, false);
            }
            return;
        };
        if previous.map_or(true, |prev| prev.body != next.body) {
            paint_fragment(&overlays.help_body, &next.body, "could not load help");
        }
        if previous.is_none() {
            dom::set_shown(&overlays.help_container, true);
        }
    }

    fn bound_preview_image(&self) {
        let window = &self.overlays.preview_window;
        let style = self.overlays.preview_img.style();
        let width = window.client_width();
        let height = window.client_height();
        if width > 0 {
            let _ = style.set_property("max-width", &format!("{width}px"));
        }
        if height > 0 {
            let _ = style.set_property("max-height", &format!("{height}px"));
        }
    }
}

fn paint_fragment(region: &web_sys::Element, state: &FragmentState, failure: &str) {
    match state {
        FragmentState::Idle | FragmentState::Loading => region.set_inner_html(""),
        FragmentState::Loaded(html) => region.set_inner_html(html),
        FragmentState::Failed(message) => {
            let text = format!("{failure}: {message}");
            if let Err(err) = dom::set_error_text(region, ERROR_CLASS, &text) {
                gloo::console::warn!("error text not rendered", dom::js_err(err));
            }
        }
    }
}
