use crate::thumb_id::ThumbId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Preview,
    Help,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreviewState {
    /// `last_target` is whatever was previewed before closing. It is kept for
    /// inspection only; nothing acts on it while closed.
    Closed { last_target: Option<ThumbId> },
    Open { target: ThumbId },
}

impl PreviewState {
    pub fn is_open(&self) -> bool {
        matches!(self, PreviewState::Open { .. })
    }

    pub fn target(&self) -> Option<&ThumbId> {
        match self {
            PreviewState::Open { target } => Some(target),
            PreviewState::Closed { .. } => None,
        }
    }
}

impl Default for PreviewState {
    fn default() -> Self {
        PreviewState::Closed { last_target: None }
    }
}

/// Open overlays, bottom to top. Only the top one receives key events.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModalStack {
    stack: Vec<OverlayKind>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `kind`, moving it to the top if it is already open.
    pub fn push(&mut self, kind: OverlayKind) {
        self.stack.retain(|open| *open != kind);
        self.stack.push(kind);
    }

    /// Removes `kind` wherever it sits. Returns whether it was open.
    pub fn remove(&mut self, kind: OverlayKind) -> bool {
        let before = self.stack.len();
        self.stack.retain(|open| *open != kind);
        self.stack.len() != before
    }

    pub fn top(&self) -> Option<OverlayKind> {
        self.stack.last().copied()
    }

    pub fn contains(&self, kind: OverlayKind) -> bool {
        self.stack.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Escape,
    Space,
    Other,
}

impl Key {
    /// Maps a DOM `KeyboardEvent`'s `key` value, falling back to the legacy
    /// `keyCode` for old browsers that leave `key` empty.
    pub fn from_dom(key: &str, key_code: u32) -> Self {
        match key {
            "Escape" | "Esc" => Key::Escape,
            " " | "Spacebar" => Key::Space,
            "" => match key_code {
                27 => Key::Escape,
                32 => Key::Space,
                _ => Key::Other,
            },
            _ => Key::Other,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    Closed(OverlayKind),
    Toggled { target: ThumbId, selected: bool },
}

impl KeyOutcome {
    /// Whether the page's default key action (scrolling on Space) should be
    /// suppressed.
    pub fn consumed(&self) -> bool {
        !matches!(self, KeyOutcome::Ignored)
    }
}

/// Content of a region filled by a fetched HTML fragment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FragmentState {
    #[default]
    Idle,
    Loading,
    Loaded(String),
    Failed(String),
}

/// Identifies the overlay state an async request was issued for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestToken {
    pub overlay: OverlayKind,
    pub generation: u64,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Generations {
    preview: u64,
    help: u64,
}

impl Generations {
    pub(crate) fn bump(&mut self, overlay: OverlayKind) -> RequestToken {
        let slot = self.slot_mut(overlay);
        *slot = slot.wrapping_add(1);
        RequestToken {
            overlay,
            generation: *slot,
        }
    }

    pub(crate) fn is_current(&self, token: RequestToken) -> bool {
        let current = match token.overlay {
            OverlayKind::Preview => self.preview,
            OverlayKind::Help => self.help,
        };
        current == token.generation
    }

    fn slot_mut(&mut self, overlay: OverlayKind) -> &mut u64 {
        match overlay {
            OverlayKind::Preview => &mut self.preview,
            OverlayKind::Help => &mut self.help,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_moves_existing_overlay_to_top() {
        let mut stack = ModalStack::new();
        stack.push(OverlayKind::Preview);
        stack.push(OverlayKind::Help);
        assert_eq!(stack.top(), Some(OverlayKind::Help));
        stack.push(OverlayKind::Preview);
        assert_eq!(stack.top(), Some(OverlayKind::Preview));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn remove_from_middle_keeps_top() {
        let mut stack = ModalStack::new();
        stack.push(OverlayKind::Preview);
        stack.push(OverlayKind::Help);
        assert!(stack.remove(OverlayKind::Preview));
        assert!(!stack.remove(OverlayKind::Preview));
        assert_eq!(stack.top(), Some(OverlayKind::Help));
        assert!(stack.remove(OverlayKind::Help));
        assert!(stack.is_empty());
    }

    #[test]
    fn keys_map_from_dom_values() {
        assert_eq!(Key::from_dom("Escape", 27), Key::Escape);
        assert_eq!(Key::from_dom(" ", 32), Key::Space);
        assert_eq!(Key::from_dom("", 27), Key::Escape);
        assert_eq!(Key::from_dom("", 32), Key::Space);
        assert_eq!(Key::from_dom("a", 65), Key::Other);
    }

    #[test]
    fn generations_are_per_overlay() {
        let mut generations = Generations::default();
        let preview = generations.bump(OverlayKind::Preview);
        let help = generations.bump(OverlayKind::Help);
        assert!(generations.is_current(preview));
        assert!(generations.is_current(help));
        generations.bump(OverlayKind::Preview);
        assert!(!generations.is_current(preview));
        assert!(generations.is_current(help));
    }
}
