use thiserror::Error;

use crate::thumb_id::{RecIdError, ThumbIdError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GalleryError {
    #[error("no thumbnail with id '{0}'")]
    UnknownThumb(String),
    #[error("thumbnail id '{0}' registered twice")]
    DuplicateThumb(String),
    #[error("preview overlay is not open")]
    PreviewClosed,
    #[error("invalid thumbnail id: {0}")]
    InvalidThumbId(#[from] ThumbIdError),
    #[error("invalid record id: {0}")]
    InvalidRecId(#[from] RecIdError),
    #[error("unknown selection mode '{0}' (expected set, clear or toggle)")]
    InvalidSelectionMode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    #[error("url '{0}' has no filename")]
    EmptyFilename(String),
    #[error("'{file}' does not end with thumbnail suffix '{suffix}'")]
    NotAThumbnail { file: String, suffix: String },
}
