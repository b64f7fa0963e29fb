use crate::config::GalleryConfig;
use crate::error::{GalleryError, NamingError};
use crate::naming::{detail_url, display_filename, full_image_url};
use crate::overlay::{
    FragmentState, Generations, Key, KeyOutcome, ModalStack, OverlayKind, PreviewState,
    RequestToken,
};
use crate::selection::{BorderColor, SelectionMode, SelectionModel, Thumb};
use crate::thumb_id::{RecId, ThumbId, RECID_SEPARATOR};

/// What the DOM layer needs to issue after `Gallery::open_preview`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewRequest {
    pub token: RequestToken,
    pub target: ThumbId,
    pub detail_url: String,
    /// Set when the thumbnail URL did not follow the naming convention and
    /// the thumbnail itself is shown instead.
    pub naming_error: Option<NamingError>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HelpRequest {
    pub token: RequestToken,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadBatch {
    pub recids: Vec<RecId>,
    pub generation: u64,
}

impl DownloadBatch {
    /// Value for the hidden form field: record ids joined by commas.
    pub fn field_value(&self) -> String {
        self.recids
            .iter()
            .map(RecId::as_str)
            .collect::<Vec<_>>()
            .join(RECID_SEPARATOR)
    }

    pub fn is_empty(&self) -> bool {
        self.recids.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThumbPaint {
    pub id: ThumbId,
    pub color: BorderColor,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewView {
    pub target: ThumbId,
    pub image_src: String,
    pub filename: String,
    pub border: BorderColor,
    pub detail: FragmentState,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HelpView {
    pub body: FragmentState,
}

/// Everything visible on the page, derived from `Gallery` state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GalleryView {
    pub thumbs: Vec<ThumbPaint>,
    pub preview: Option<PreviewView>,
    pub help: Option<HelpView>,
    pub keyboard_bound: bool,
}

#[derive(Clone, Debug, Default)]
struct PreviewContent {
    image_src: String,
    filename: String,
    detail: FragmentState,
}

pub struct Gallery {
    config: GalleryConfig,
    selection: SelectionModel,
    preview: PreviewState,
    preview_content: PreviewContent,
    help_body: FragmentState,
    modals: ModalStack,
    generations: Generations,
    download_generation: u64,
}

impl Gallery {
    pub fn new(config: GalleryConfig) -> Self {
        Self {
            config,
            selection: SelectionModel::new(),
            preview: PreviewState::default(),
            preview_content: PreviewContent::default(),
            help_body: FragmentState::Idle,
            modals: ModalStack::new(),
            generations: Generations::default(),
            download_generation: 0,
        }
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn preview_state(&self) -> &PreviewState {
        &self.preview
    }

    pub fn modals(&self) -> &ModalStack {
        &self.modals
    }

    pub fn keyboard_bound(&self) -> bool {
        !self.modals.is_empty()
    }

    pub fn register_thumb(&mut self, id: &str, recid: &str, thumb_src: &str) -> Result<(), GalleryError> {
        let thumb = Thumb::new(ThumbId::parse(id)?, RecId::parse(recid)?, thumb_src);
        self.selection.register(thumb)
    }

    pub fn set_selection(&mut self, id: &str, mode: SelectionMode) -> Result<bool, GalleryError> {
        self.selection.set_selection(id, mode)
    }

    pub fn toggle_one(&mut self, id: &str) -> Result<bool, GalleryError> {
        self.selection.toggle_one(id)
    }

    pub fn set_selection_for_prefix(&mut self, prefix: &str, mode: SelectionMode) -> usize {
        self.selection.set_selection_for_prefix(prefix, mode)
    }

    pub fn recolor_all(&mut self) {
        self.selection.recolor_all();
    }

    pub fn open_preview(&mut self, id: &str) -> Result<PreviewRequest, GalleryError> {
        let thumb = self.selection.thumb(id)?;
        let target = thumb.id().clone();
        let (image_src, naming_error) = match full_image_url(thumb.thumb_src(), &self.config.naming) {
            Ok(url) => (url, None),
            Err(err) => (thumb.thumb_src().to_string(), Some(err)),
        };
        let detail_url = detail_url(&self.config.detail_endpoint, thumb.recid());

        self.preview_content = PreviewContent {
            filename: display_filename(&image_src),
            image_src,
            detail: FragmentState::Loading,
        };
        self.preview = PreviewState::Open {
            target: target.clone(),
        };
        self.modals.push(OverlayKind::Preview);
        let token = self.generations.bump(OverlayKind::Preview);
        Ok(PreviewRequest {
            token,
            target,
            detail_url,
            naming_error,
        })
    }

    /// Toggles the previewed thumbnail. Only valid while the preview is open.
    pub fn toggle_current_selection(&mut self) -> Result<(ThumbId, bool), GalleryError> {
        let target = self
            .preview
            .target()
            .cloned()
            .ok_or(GalleryError::PreviewClosed)?;
        let selected = self.selection.toggle_one(target.as_str())?;
        Ok((target, selected))
    }

    /// Returns false if the preview was already closed.
    pub fn close_preview(&mut self) -> bool {
        let Some(target) = self.preview.target().cloned() else {
            return false;
        };
        self.preview = PreviewState::Closed {
            last_target: Some(target),
        };
        self.modals.remove(OverlayKind::Preview);
        self.generations.bump(OverlayKind::Preview);
        true
    }

    pub fn open_help(&mut self) -> HelpRequest {
        self.help_body = FragmentState::Loading;
        self.modals.push(OverlayKind::Help);
        let token = self.generations.bump(OverlayKind::Help);
        HelpRequest {
            token,
            url: self.config.help_url.clone(),
        }
    }

    pub fn close_help(&mut self) -> bool {
        if !self.modals.remove(OverlayKind::Help) {
            return false;
        }
        self.generations.bump(OverlayKind::Help);
        true
    }

    pub fn help_visible(&self) -> bool {
        self.modals.contains(OverlayKind::Help)
    }

    /// Routes a key press to the topmost open overlay.
    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        match (self.modals.top(), key) {
            (Some(OverlayKind::Preview), Key::Escape) => {
                if self.close_preview() {
                    KeyOutcome::Closed(OverlayKind::Preview)
                } else {
                    KeyOutcome::Ignored
                }
            }
            (Some(OverlayKind::Preview), Key::Space) => match self.toggle_current_selection() {
                Ok((target, selected)) => KeyOutcome::Toggled { target, selected },
                Err(_) => KeyOutcome::Ignored,
            },
            (Some(OverlayKind::Help), Key::Escape) => {
                if self.close_help() {
                    KeyOutcome::Closed(OverlayKind::Help)
                } else {
                    KeyOutcome::Ignored
                }
            }
            _ => KeyOutcome::Ignored,
        }
    }

    /// Applies a finished fetch. Returns false when the response is stale:
    /// the overlay was closed or reopened after the request was issued.
    pub fn complete_fetch(&mut self, token: RequestToken, result: Result<String, String>) -> bool {
        if !self.generations.is_current(token) || !self.modals.contains(token.overlay) {
            return false;
        }
        let state = match result {
            Ok(body) => FragmentState::Loaded(body),
            Err(message) => FragmentState::Failed(message),
        };
        match token.overlay {
            OverlayKind::Preview => self.preview_content.detail = state,
            OverlayKind::Help => self.help_body = state,
        }
        true
    }

    /// Takes every selected thumbnail into a download batch. The caller
    /// writes `DownloadBatch::field_value` into the form and later passes the
    /// batch generation to `finish_download`.
    pub fn prepare_download(&mut self) -> DownloadBatch {
        self.download_generation = self.download_generation.wrapping_add(1);
        DownloadBatch {
            recids: self.selection.take_selected_for_download(),
            generation: self.download_generation,
        }
    }

    /// Repaints after the downloading indicator has been shown. Only the most
    /// recent batch repaints.
    pub fn finish_download(&mut self, generation: u64) -> bool {
        if generation != self.download_generation {
            return false;
        }
        self.recolor_all();
        true
    }

    pub fn view(&self) -> GalleryView {
        let thumbs = self
            .selection
            .thumbs()
            .iter()
            .map(|thumb| ThumbPaint {
                id: thumb.id().clone(),
                color: thumb.border_color(),
            })
            .collect();
        let preview = self.preview.target().map(|target| PreviewView {
            target: target.clone(),
            image_src: self.preview_content.image_src.clone(),
            filename: self.preview_content.filename.clone(),
            border: self
                .selection
                .get(target.as_str())
                .map(|thumb| BorderColor::for_selected(thumb.is_selected()))
                .unwrap_or(BorderColor::Unselected),
            detail: self.preview_content.detail.clone(),
        });
        let help = self.help_visible().then(|| HelpView {
            body: self.help_body.clone(),
        });
        GalleryView {
            thumbs,
            preview,
            help,
            keyboard_bound: self.keyboard_bound(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gallery() -> Gallery {
        let mut gallery = Gallery::new(GalleryConfig::default());
        gallery
            .register_thumb("rfo_2024-01-05_001", "7", "/fits/2024-01-05/M31-thumb.png")
            .expect("register");
        gallery
            .register_thumb("rfo_2024-01-05_002", "9", "/fits/2024-01-05/My%20Photo-thumb.png")
            .expect("register");
        gallery
    }

    #[test]
    fn open_preview_derives_image_and_filename() {
        let mut gallery = gallery();
        let request = gallery.open_preview("rfo_2024-01-05_002").expect("open");
        assert_eq!(request.detail_url, "/deets?recid=9");
        assert_eq!(request.naming_error, None);
        let view = gallery.view().preview.expect("preview visible");
        assert_eq!(view.image_src, "/fits/2024-01-05/My%20Photo.png");
        assert_eq!(view.filename, "My Photo.png");
        assert_eq!(view.border, BorderColor::Unselected);
        assert_eq!(view.detail, FragmentState::Loading);
        assert!(gallery.keyboard_bound());
    }

    #[test]
    fn open_preview_of_unknown_thumb_fails() {
        let mut gallery = gallery();
        assert_eq!(
            gallery.open_preview("nope").map(|req| req.target),
            Err(GalleryError::UnknownThumb("nope".to_string()))
        );
        assert!(!gallery.keyboard_bound());
    }

    #[test]
    fn toggle_requires_open_preview() {
        let mut gallery = gallery();
        assert_eq!(
            gallery.toggle_current_selection(),
            Err(GalleryError::PreviewClosed)
        );
        gallery.open_preview("rfo_2024-01-05_001").expect("open");
        let (_, selected) = gallery.toggle_current_selection().expect("toggle");
        assert!(selected);
        let view = gallery.view();
        assert_eq!(view.preview.map(|p| p.border), Some(BorderColor::Selected));
        assert_eq!(view.thumbs[0].color, BorderColor::Selected);
    }

    #[test]
    fn close_keeps_last_target() {
        let mut gallery = gallery();
        gallery.open_preview("rfo_2024-01-05_001").expect("open");
        assert!(gallery.close_preview());
        assert!(!gallery.close_preview());
        assert_eq!(
            gallery.preview_state(),
            &PreviewState::Closed {
                last_target: Some(ThumbId::parse("rfo_2024-01-05_001").expect("id")),
            }
        );
        assert!(gallery.view().preview.is_none());
    }

    #[test]
    fn failed_fetch_is_visible() {
        let mut gallery = gallery();
        let request = gallery.open_preview("rfo_2024-01-05_001").expect("open");
        assert!(gallery.complete_fetch(request.token, Err("status 500".to_string())));
        assert_eq!(
            gallery.view().preview.map(|p| p.detail),
            Some(FragmentState::Failed("status 500".to_string()))
        );
    }

    #[test]
    fn non_thumbnail_source_falls_back_to_itself() {
        let mut gallery = Gallery::new(GalleryConfig::default());
        gallery
            .register_thumb("a", "1", "/fits/plain.png")
            .expect("register");
        let request = gallery.open_preview("a").expect("open");
        assert!(request.naming_error.is_some());
        assert_eq!(
            gallery.view().preview.map(|p| p.image_src),
            Some("/fits/plain.png".to_string())
        );
    }
}
