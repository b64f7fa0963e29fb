use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Event, EventTarget, KeyboardEvent};

use rfo_imagelib_core::{Key, KeyOutcome};

/// The single `keydown` listener shared by both overlays. Bound while any
/// overlay is open.
pub(crate) struct KeyboardBinding {
    listener: Option<EventListener>,
}

impl KeyboardBinding {
    pub(crate) fn new() -> Self {
        Self { listener: None }
    }

    pub(crate) fn is_bound(&self) -> bool {
        self.listener.is_some()
    }

    pub(crate) fn bind<F>(&mut self, target: &EventTarget, mut handler: F)
    where
        F: FnMut(Key) -> KeyOutcome + 'static,
    {
        if self.is_bound() {
            return;
        }
        let options = EventListenerOptions {
            phase: EventListenerPhase::Bubble,
            passive: false,
        };
        let listener = EventListener::new_with_options(target, "keydown", options, move |event: &Event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let key = Key::from_dom(&event.key(), event.key_code());
            if handler(key).consumed() {
                event.prevent_default();
            }
        });
        self.listener = Some(listener);
    }

    pub(crate) fn unbind(&mut self) {
        let Some(listener) = self.listener.take() else {
            return;
        };
        // Escape unbinds from inside this listener's own callback; drop it
        // once the dispatch has returned.
        spawn_local(async move {
            drop(listener);
        });
    }

    pub(crate) fn sync(&mut self, bound: bool, target: &EventTarget, handler: impl FnMut(Key) -> KeyOutcome + 'static) {
        if bound {
            self.bind(target, handler);
        } else {
            self.unbind();
        }
    }
}
