use std::cell::RefCell;

use gloo::console;
use gloo::events::EventListener;

use crate::app::GalleryApp;
use crate::app_runtime;
use crate::config;
use crate::dom::{self, DomError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum BootState {
    ColdStart,
    WaitingForDom,
    Ready,
    Failed(String),
}

thread_local! {
    static BOOT_STATE: RefCell<BootState> = RefCell::new(BootState::ColdStart);
    static DOM_READY_LISTENER: RefCell<Option<EventListener>> = RefCell::new(None);
}

pub(crate) fn boot_state() -> BootState {
    BOOT_STATE.with(|state| state.borrow().clone())
}

fn set_boot_state(next: BootState) {
    BOOT_STATE.with(|state| {
        *state.borrow_mut() = next;
    });
}

/// Attaches the gallery once the document has been parsed.
pub(crate) fn start() {
    if app_runtime::app().is_some() || boot_state() == BootState::WaitingForDom {
        return;
    }
    let document = match dom::document() {
        Ok(document) => document,
        Err(err) => {
            fail(err);
            return;
        }
    };
    if document.ready_state() == "loading" {
        set_boot_state(BootState::WaitingForDom);
        let listener = EventListener::once(&document, "DOMContentLoaded", |_| attach());
        DOM_READY_LISTENER.with(|slot| {
            *slot.borrow_mut() = Some(listener);
        });
        return;
    }
    attach();
}

fn attach() {
    let result = dom::document().and_then(|document| {
        let config = config::load_config(&document);
        GalleryApp::attach(document, config)
    });
    match result {
        Ok(app) => {
            let thumbs = app.gallery().selection().len();
            app_runtime::set_app(app);
            set_boot_state(BootState::Ready);
            console::log!("imagelib ready", thumbs);
        }
        Err(err) => fail(err),
    }
}

fn fail(err: DomError) {
    let message = err.to_string();
    console::error!("imagelib failed to start", message.clone());
    set_boot_state(BootState::Failed(message));
}
