use std::collections::HashMap;
use std::str::FromStr;

use crate::error::GalleryError;
use crate::thumb_id::{RecId, ThumbId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionMode {
    Clear,
    Set,
    Toggle,
}

impl SelectionMode {
    pub fn apply(self, current: bool) -> bool {
        match self {
            SelectionMode::Clear => false,
            SelectionMode::Set => true,
            SelectionMode::Toggle => !current,
        }
    }
}

impl FromStr for SelectionMode {
    type Err = GalleryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("set") || trimmed == "1" {
            Ok(SelectionMode::Set)
        } else if trimmed.eq_ignore_ascii_case("clear") || trimmed == "0" {
            Ok(SelectionMode::Clear)
        } else if trimmed.eq_ignore_ascii_case("toggle") || trimmed == "-1" {
            Ok(SelectionMode::Toggle)
        } else {
            Err(GalleryError::InvalidSelectionMode(trimmed.to_string()))
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BorderColor {
    Selected,
    Unselected,
    Downloading,
}

impl BorderColor {
    pub fn for_selected(selected: bool) -> Self {
        if selected {
            BorderColor::Selected
        } else {
            BorderColor::Unselected
        }
    }
}

#[derive(Clone, Debug)]
pub struct Thumb {
    id: ThumbId,
    recid: RecId,
    thumb_src: String,
    selected: bool,
    downloading: bool,
}

impl Thumb {
    pub fn new(id: ThumbId, recid: RecId, thumb_src: impl Into<String>) -> Self {
        Self {
            id,
            recid,
            thumb_src: thumb_src.into(),
            selected: false,
            downloading: false,
        }
    }

    pub fn id(&self) -> &ThumbId {
        &self.id
    }

    pub fn recid(&self) -> &RecId {
        &self.recid
    }

    pub fn thumb_src(&self) -> &str {
        &self.thumb_src
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_downloading(&self) -> bool {
        self.downloading
    }

    pub fn border_color(&self) -> BorderColor {
        if self.downloading {
            BorderColor::Downloading
        } else {
            BorderColor::for_selected(self.selected)
        }
    }
}

/// Selection flags for every registered thumbnail, kept in document order.
#[derive(Clone, Debug, Default)]
pub struct SelectionModel {
    thumbs: Vec<Thumb>,
    index: HashMap<ThumbId, usize>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, thumb: Thumb) -> Result<(), GalleryError> {
        if self.index.contains_key(thumb.id()) {
            return Err(GalleryError::DuplicateThumb(thumb.id().to_string()));
        }
        self.index.insert(thumb.id().clone(), self.thumbs.len());
        self.thumbs.push(thumb);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.thumbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thumbs.is_empty()
    }

    pub fn thumbs(&self) -> &[Thumb] {
        &self.thumbs
    }

    pub fn get(&self, id: &str) -> Option<&Thumb> {
        self.position(id).map(|idx| &self.thumbs[idx])
    }

    pub fn thumb(&self, id: &str) -> Result<&Thumb, GalleryError> {
        self.get(id)
            .ok_or_else(|| GalleryError::UnknownThumb(id.to_string()))
    }

    pub fn set_selection(&mut self, id: &str, mode: SelectionMode) -> Result<bool, GalleryError> {
        let idx = self
            .position(id)
            .ok_or_else(|| GalleryError::UnknownThumb(id.to_string()))?;
        let thumb = &mut self.thumbs[idx];
        thumb.selected = mode.apply(thumb.selected);
        thumb.downloading = false;
        Ok(thumb.selected)
    }

    pub fn toggle_one(&mut self, id: &str) -> Result<bool, GalleryError> {
        self.set_selection(id, SelectionMode::Toggle)
    }

    /// Applies `mode` to every thumbnail whose id starts with `prefix` and
    /// returns how many were touched.
    pub fn set_selection_for_prefix(&mut self, prefix: &str, mode: SelectionMode) -> usize {
        let mut touched = 0;
        for thumb in self.thumbs.iter_mut().filter(|thumb| thumb.id.has_prefix(prefix)) {
            thumb.selected = mode.apply(thumb.selected);
            thumb.downloading = false;
            touched += 1;
        }
        touched
    }

    pub fn recolor_all(&mut self) {
        for thumb in &mut self.thumbs {
            thumb.downloading = false;
        }
    }

    pub fn selected_count(&self) -> usize {
        self.thumbs.iter().filter(|thumb| thumb.selected).count()
    }

    pub fn selected_recids(&self) -> Vec<RecId> {
        self.thumbs
            .iter()
            .filter(|thumb| thumb.selected)
            .map(|thumb| thumb.recid.clone())
            .collect()
    }

    /// Clears every selected thumbnail, marks it as downloading and returns
    /// the record ids in document order.
    pub(crate) fn take_selected_for_download(&mut self) -> Vec<RecId> {
        let mut recids = Vec::new();
        for thumb in self.thumbs.iter_mut().filter(|thumb| thumb.selected) {
            recids.push(thumb.recid.clone());
            thumb.selected = false;
            thumb.downloading = true;
        }
        recids
    }

    fn position(&self, id: &str) -> Option<usize> {
        let key = ThumbId::parse(id).ok()?;
        self.index.get(&key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(ids: &[(&str, &str)]) -> SelectionModel {
        let mut model = SelectionModel::new();
        for (id, recid) in ids {
            let thumb = Thumb::new(
                ThumbId::parse(id).expect("thumb id"),
                RecId::parse(recid).expect("recid"),
                format!("/fits/{id}-thumb.png"),
            );
            model.register(thumb).expect("register");
        }
        model
    }

    #[test]
    fn set_and_clear_follow_mode() {
        let mut model = model(&[("a", "1")]);
        assert_eq!(model.set_selection("a", SelectionMode::Set), Ok(true));
        assert_eq!(model.thumb("a").map(Thumb::border_color), Ok(BorderColor::Selected));
        assert_eq!(model.set_selection("a", SelectionMode::Set), Ok(true));
        assert_eq!(model.set_selection("a", SelectionMode::Clear), Ok(false));
        assert_eq!(model.thumb("a").map(Thumb::border_color), Ok(BorderColor::Unselected));
    }

    #[test]
    fn unknown_thumb_is_an_error() {
        let mut model = model(&[("a", "1")]);
        assert_eq!(
            model.toggle_one("missing"),
            Err(GalleryError::UnknownThumb("missing".to_string()))
        );
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut model = model(&[("a", "1")]);
        let again = Thumb::new(
            ThumbId::parse("a").expect("id"),
            RecId::parse("2").expect("recid"),
            "x-thumb.png",
        );
        assert_eq!(
            model.register(again),
            Err(GalleryError::DuplicateThumb("a".to_string()))
        );
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn selecting_clears_downloading_indicator() {
        let mut model = model(&[("a", "1"), ("b", "2")]);
        model.set_selection("a", SelectionMode::Set).expect("set");
        let taken = model.take_selected_for_download();
        assert_eq!(taken.len(), 1);
        assert_eq!(model.thumb("a").map(Thumb::border_color), Ok(BorderColor::Downloading));
        model.toggle_one("a").expect("toggle");
        assert_eq!(model.thumb("a").map(Thumb::border_color), Ok(BorderColor::Selected));
    }

    #[test]
    fn mode_parses_names_and_legacy_numbers() {
        assert_eq!("set".parse::<SelectionMode>(), Ok(SelectionMode::Set));
        assert_eq!("0".parse::<SelectionMode>(), Ok(SelectionMode::Clear));
        assert_eq!("-1".parse::<SelectionMode>(), Ok(SelectionMode::Toggle));
        assert_eq!(
            "all".parse::<SelectionMode>(),
            Err(GalleryError::InvalidSelectionMode("all".to_string()))
        );
    }
}
