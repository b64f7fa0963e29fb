use std::fmt;

use thiserror::Error;

/// DOM id of a thumbnail container, e.g. `rfo_2024-01-05_003`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThumbId(String);

impl ThumbId {
    pub fn parse(value: &str) -> Result<Self, ThumbIdError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ThumbIdError::Empty);
        }
        if let Some((index, ch)) = trimmed.char_indices().find(|(_, ch)| ch.is_whitespace()) {
            return Err(ThumbIdError::Whitespace { ch, index });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for ThumbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for ThumbId {
    type Err = ThumbIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThumbIdError {
    #[error("thumbnail id cannot be empty")]
    Empty,
    #[error("whitespace {ch:?} at position {index}")]
    Whitespace { ch: char, index: usize },
}

/// Backend record key. Opaque to the gallery apart from `,`, which separates
/// ids in the download field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecId(String);

impl RecId {
    pub fn parse(value: &str) -> Result<Self, RecIdError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(RecIdError::Empty);
        }
        if let Some(index) = trimmed.find(RECID_SEPARATOR) {
            return Err(RecIdError::Separator { index });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub(crate) const RECID_SEPARATOR: &str = ",";

impl fmt::Display for RecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for RecId {
    type Err = RecIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecIdError {
    #[error("record id cannot be empty")]
    Empty,
    #[error("separator ',' at position {index}")]
    Separator { index: usize },
}
