pub mod config;
pub mod error;
pub mod gallery;
pub mod naming;
pub mod overlay;
pub mod selection;
pub mod thumb_id;

pub use config::{ColorScheme, DomIds, GalleryConfig, ThumbnailNaming};
pub use error::{GalleryError, NamingError};
pub use gallery::{
    DownloadBatch, Gallery, GalleryView, HelpRequest, HelpView, PreviewRequest, PreviewView,
    ThumbPaint,
};
pub use overlay::{FragmentState, Key, KeyOutcome, ModalStack, OverlayKind, PreviewState, RequestToken};
pub use selection::{BorderColor, SelectionMode, SelectionModel, Thumb};
pub use thumb_id::{RecId, RecIdError, ThumbId, ThumbIdError};
