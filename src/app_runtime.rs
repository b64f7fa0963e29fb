use std::cell::RefCell;
use std::rc::Rc;

use crate::app::GalleryApp;

thread_local! {
    static GALLERY_APP: RefCell<Option<Rc<GalleryApp>>> = RefCell::new(None);
}

/// Keeps the attached gallery alive for the lifetime of the page.
pub(crate) fn set_app(app: Rc<GalleryApp>) {
    GALLERY_APP.with(|slot| {
        *slot.borrow_mut() = Some(app);
    });
}

pub(crate) fn app() -> Option<Rc<GalleryApp>> {
    GALLERY_APP.with(|slot| slot.borrow().clone())
}
