use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo::console;
use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, HtmlInputElement};

use crate::dom::{self, DomError, DownloadForm, OverlayElements};
use crate::fetch::fetch_fragment;
use crate::keyboard::KeyboardBinding;
use crate::render::Renderer;
use rfo_imagelib_core::{
    Gallery, GalleryConfig, GalleryError, Key, KeyOutcome, RequestToken, SelectionMode,
};

pub(crate) const ACTION_ATTR: &str = "data-action";

/// Click actions declared by the page template through `data-action`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ClickAction {
    Toggle(String),
    Preview(String),
    SelectGroup { prefix: String, mode: SelectionMode },
    ClosePreview,
    Help,
    CloseHelp,
}

impl ClickAction {
    fn from_element(element: &Element, thumb_class: &str) -> Result<Option<Self>, GalleryError> {
        let Some(action) = element.get_attribute(ACTION_ATTR) else {
            return Ok(None);
        };
        let action = match action.trim() {
            "toggle" => thumb_target(element, thumb_class).map(ClickAction::Toggle),
            "preview" => thumb_target(element, thumb_class).map(ClickAction::Preview),
            "select-group" => {
                let prefix = element.get_attribute("data-prefix").unwrap_or_default();
                let mode = element
                    .get_attribute("data-mode")
                    .unwrap_or_else(|| "toggle".to_string())
                    .parse()?;
                Some(ClickAction::SelectGroup { prefix, mode })
            }
            "close-preview" => Some(ClickAction::ClosePreview),
            "help" => Some(ClickAction::Help),
            "close-help" => Some(ClickAction::CloseHelp),
            _ => None,
        };
        Ok(action)
    }
}

/// `data-target` wins; otherwise the enclosing thumbnail container.
fn thumb_target(element: &Element, thumb_class: &str) -> Option<String> {
    if let Some(target) = element.get_attribute("data-target") {
        return Some(target);
    }
    element
        .closest(&format!(".{thumb_class}"))
        .ok()
        .flatten()
        .map(|thumb| thumb.id())
}

pub(crate) struct GalleryApp {
    this: Weak<GalleryApp>,
    document: Document,
    gallery: RefCell<Gallery>,
    renderer: RefCell<Renderer>,
    keyboard: RefCell<KeyboardBinding>,
    download_field: HtmlInputElement,
    recolor_timer: RefCell<Option<Timeout>>,
    listeners: RefCell<Vec<EventListener>>,
}

impl GalleryApp {
    /// Registers every well-formed thumbnail on the page and wires the
    /// template's controls. Fails if an overlay or the download form is
    /// missing; a malformed thumbnail is logged and left out.
    pub(crate) fn attach(document: Document, config: GalleryConfig) -> Result<Rc<Self>, DomError> {
        let overlays = OverlayElements::locate(&document, &config.dom)?;
        let form = DownloadForm::locate(&document, &config.dom)?;
        let sources = dom::scan_thumbs(&document, &config.dom);

        let colors = config.colors.clone();
        let mut gallery = Gallery::new(config);
        let mut elements = Vec::with_capacity(sources.len());
        for source in sources {
            let registered = source.and_then(|source| {
                gallery.register_thumb(&source.id, &source.recid, &source.src)?;
                Ok(source.element)
            });
            match registered {
                Ok(element) => elements.push(element),
                Err(err) => console::warn!("skipping thumbnail", err.to_string()),
            }
        }
        let mut renderer = Renderer::new(overlays, elements, colors);
        renderer.render_full(&gallery.view());

        let app = Rc::new_cyclic(|this| Self {
            this: this.clone(),
            document,
            gallery: RefCell::new(gallery),
            renderer: RefCell::new(renderer),
            keyboard: RefCell::new(KeyboardBinding::new()),
            download_field: form.field.clone(),
            recolor_timer: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        });
        app.install_listeners(&form);
        Ok(app)
    }

    fn install_listeners(&self, form: &DownloadForm) {
        let mut listeners = self.listeners.borrow_mut();

        let this = self.this.clone();
        listeners.push(EventListener::new(&self.document, "click", move |event: &Event| {
            if let Some(app) = this.upgrade() {
                app.on_click(event);
            }
        }));

        let this = self.this.clone();
        let select = self.renderer.borrow().overlays().preview_select.clone();
        listeners.push(EventListener::new(&select, "click", move |event: &Event| {
            if let Some(app) = this.upgrade() {
                event.prevent_default();
                app.toggle_current();
            }
        }));

        let this = self.this.clone();
        listeners.push(EventListener::new(&form.form, "submit", move |_event: &Event| {
            if let Some(app) = this.upgrade() {
                app.prepare_download();
            }
        }));
    }

    fn on_click(&self, event: &Event) {
        let Some(target) = event.target().and_then(|target| target.dyn_into::<Element>().ok()) else {
            return;
        };
        let Ok(Some(element)) = target.closest(&format!("[{ACTION_ATTR}]")) else {
            return;
        };
        let thumb_class = self.gallery.borrow().config().dom.thumb_class.clone();
        let action = match ClickAction::from_element(&element, &thumb_class) {
            Ok(Some(action)) => action,
            Ok(None) => return,
            Err(err) => {
                console::warn!("ignoring click", err.to_string());
                return;
            }
        };
        event.prevent_default();
        self.dispatch(action);
    }

    pub(crate) fn dispatch(&self, action: ClickAction) {
        match action {
            ClickAction::Toggle(id) => self.toggle(&id),
            ClickAction::Preview(id) => self.open_preview(&id),
            ClickAction::SelectGroup { prefix, mode } => self.select_group(&prefix, mode),
            ClickAction::ClosePreview => self.close_preview(),
            ClickAction::Help => self.open_help(),
            ClickAction::CloseHelp => self.close_help(),
        }
    }

    pub(crate) fn gallery(&self) -> std::cell::Ref<'_, Gallery> {
        self.gallery.borrow()
    }

    #[cfg(test)]
    pub(crate) fn keyboard_bound(&self) -> bool {
        self.keyboard.borrow().is_bound()
    }

    pub(crate) fn toggle(&self, id: &str) {
        console::log!("toggle", id);
        let result = self.gallery.borrow_mut().toggle_one(id);
        match result {
            Ok(_) => self.refresh(),
            Err(err) => console::warn!("toggle failed", err.to_string()),
        }
    }

    pub(crate) fn select_group(&self, prefix: &str, mode: SelectionMode) {
        let touched = self.gallery.borrow_mut().set_selection_for_prefix(prefix, mode);
        console::log!("select group", prefix, format!("{mode:?}"), touched);
        self.refresh();
    }

    pub(crate) fn open_preview(&self, id: &str) {
        console::log!("preview", id);
        let result = self.gallery.borrow_mut().open_preview(id);
        let request = match result {
            Ok(request) => request,
            Err(err) => {
                console::warn!("preview failed", err.to_string());
                return;
            }
        };
        if let Some(err) = &request.naming_error {
            console::warn!("showing thumbnail in preview", err.to_string());
        }
        self.refresh();
        self.spawn_fetch(request.token, request.detail_url);
    }

    pub(crate) fn toggle_current(&self) {
        let result = self.gallery.borrow_mut().toggle_current_selection();
        match result {
            Ok((target, selected)) => {
                console::log!("toggle previewed", target.to_string(), selected);
                self.refresh();
            }
            Err(err) => console::warn!("toggle previewed failed", err.to_string()),
        }
    }

    pub(crate) fn close_preview(&self) {
        if self.gallery.borrow_mut().close_preview() {
            console::log!("close preview");
            self.refresh();
        }
    }

    pub(crate) fn open_help(&self) {
        let request = self.gallery.borrow_mut().open_help();
        console::log!("help", request.url.clone());
        self.refresh();
        self.spawn_fetch(request.token, request.url);
    }

    pub(crate) fn close_help(&self) {
        if self.gallery.borrow_mut().close_help() {
            console::log!("close help");
            self.refresh();
        }
    }

    pub(crate) fn on_key(&self, key: Key) -> KeyOutcome {
        let outcome = self.gallery.borrow_mut().handle_key(key);
        if outcome.consumed() {
            console::log!("key", format!("{key:?}"), format!("{outcome:?}"));
            self.refresh();
        }
        outcome
    }

    /// Fills the download field from the current selection. The form then
    /// submits on its own.
    pub(crate) fn prepare_download(&self) {
        let batch = self.gallery.borrow_mut().prepare_download();
        let value = batch.field_value();
        console::log!("recids", value.clone());
        self.download_field.set_value(&value);
        self.refresh();

        let delay = self.gallery.borrow().config().recolor_delay_ms;
        let this = self.this.clone();
        let generation = batch.generation;
        let timer = Timeout::new(delay, move || {
            if let Some(app) = this.upgrade() {
                app.finish_download(generation);
            }
        });
        *self.recolor_timer.borrow_mut() = Some(timer);
    }

    fn finish_download(&self, generation: u64) {
        let repainted = self.gallery.borrow_mut().finish_download(generation);
        if repainted {
            console::log!("recolor");
            self.refresh();
        }
    }

    fn spawn_fetch(&self, token: RequestToken, url: String) {
        let this = self.this.clone();
        spawn_local(async move {
            let result = fetch_fragment(&url).await.map_err(|err| err.to_string());
            if let Err(message) = &result {
                console::warn!("fetch failed", url.clone(), message.clone());
            }
            let Some(app) = this.upgrade() else {
                return;
            };
            app.complete_fetch(token, result);
        });
    }

    fn complete_fetch(&self, token: RequestToken, result: Result<String, String>) {
        let applied = self.gallery.borrow_mut().complete_fetch(token, result);
        if applied {
            self.refresh();
        } else {
            console::log!("stale response dropped", format!("{:?}", token.overlay), token.generation);
        }
    }

    fn refresh(&self) {
        let view = self.gallery.borrow().view();
        self.renderer.borrow_mut().render(&view);
        let this = self.this.clone();
        self.keyboard
            .borrow_mut()
            .sync(view.keyboard_bound, &self.document, move |key| match this.upgrade() {
                Some(app) => app.on_key(key),
                None => KeyOutcome::Ignored,
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_error_panic_hook::set_once as set_panic_hook;
    use gloo::timers::future::TimeoutFuture;
    use js_sys::Date;
    use rfo_imagelib_core::{FragmentState, OverlayKind};
    use wasm_bindgen_test::*;
    use web_sys::{HtmlElement, KeyboardEvent, KeyboardEventInit};

    wasm_bindgen_test_configure!(run_in_browser);

    struct Fixture {
        root: Element,
        document: Document,
        config: GalleryConfig,
    }

    impl Fixture {
        fn new(tag: &str) -> Self {
            let document = dom::document().expect("document available");
            let mut config = GalleryConfig::default();
            config.recolor_delay_ms = 50;
            config.detail_endpoint = format!("/{tag}-deets");
            config.help_url = format!("/{tag}-help.html");
            let ids = &mut config.dom;
            for id in [
                &mut ids.thumb_class,
                &mut ids.preview_container,
                &mut ids.preview_window,
                &mut ids.preview_img,
                &mut ids.preview_filename,
                &mut ids.preview_content,
                &mut ids.preview_detail,
                &mut ids.preview_select,
                &mut ids.help_container,
                &mut ids.help_body,
                &mut ids.download_form,
            ] {
                *id = format!("{tag}-{id}");
            }
            let d = &config.dom;
            let html = format!(
                r#"
                <div class="{thumb}" id="{tag}-2024_001" data-recid="7">
                  <img id="{tag}-2024_001img" src="/fits/M31-thumb.png">
                  <span id="{tag}-title-1" data-action="toggle">M31</span>
                </div>
                <div class="{thumb}" id="{tag}-2024_002" data-recid="9">
                  <img id="{tag}-2024_002img" src="/fits/My%20Photo-thumb.png">
                </div>
                <div class="{thumb}" id="{tag}-2023_001" data-recid="11">
                  <img id="{tag}-2023_001img" src="/fits/M42-thumb.png">
                </div>
                <button id="{tag}-group" data-action="select-group" data-prefix="{tag}-2024" data-mode="set">all</button>
                <div id="{pc}" style="display: none">
                  <div id="{pw}" style="width: 400px; height: 300px">
                    <div id="{content}">
                      <span id="{fname}"></span>
                      <img id="{img}">
                      <div id="{detail}"></div>
                      <button id="{select}">select</button>
                    </div>
                  </div>
                </div>
                <div id="{hc}" style="display: none"><div id="{hb}"></div></div>
                <form name="{form}" action="javascript:void(0)">
                  <input type="hidden" name="recids" value="">
                </form>
                "#,
                thumb = d.thumb_class,
                pc = d.preview_container,
                pw = d.preview_window,
                content = d.preview_content,
                fname = d.preview_filename,
                img = d.preview_img,
                detail = d.preview_detail,
                select = d.preview_select,
                hc = d.help_container,
                hb = d.help_body,
                form = d.download_form,
            );
            let root = document.create_element("div").expect("create test root");
            root.set_inner_html(&html);
            document
                .body()
                .expect("body available")
                .append_child(&root)
                .expect("append test root");
            Self {
                root,
                document,
                config,
            }
        }

        fn attach(&self) -> Rc<GalleryApp> {
            GalleryApp::attach(self.document.clone(), self.config.clone()).expect("attach gallery")
        }

        fn id(&self, suffix: &str) -> String {
            format!("{}-{suffix}", self.config.dom.thumb_class.trim_end_matches("-thumb"))
        }

        fn html_element(&self, id: &str) -> HtmlElement {
            self.document
                .get_element_by_id(id)
                .and_then(|element| element.dyn_into::<HtmlElement>().ok())
                .unwrap_or_else(|| panic!("element #{id}"))
        }

        fn border(&self, id: &str) -> String {
            self.html_element(id)
                .style()
                .get_property_value("border-color")
                .unwrap_or_default()
        }

        fn press(&self, key: &str) {
            let init = KeyboardEventInit::new();
            init.set_key(key);
            init.set_bubbles(true);
            init.set_cancelable(true);
            let event = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init)
                .expect("keyboard event");
            self.document.dispatch_event(&event).expect("dispatch keydown");
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            self.root.remove();
        }
    }

    #[wasm_bindgen_test]
    fn attach_fails_fast_on_missing_overlay() {
        set_panic_hook();
        let fixture = Fixture::new("missing");
        let mut config = fixture.config.clone();
        config.dom.preview_img = "missing-nowhere".to_string();
        let err = GalleryApp::attach(fixture.document.clone(), config)
            .err()
            .expect("attach should fail");
        assert!(matches!(err, DomError::MissingElement(ref id) if id == "missing-nowhere"));
    }

    #[wasm_bindgen_test]
    fn click_on_title_toggles_thumb() {
        set_panic_hook();
        let fixture = Fixture::new("click");
        let app = fixture.attach();
        let thumb = fixture.id("2024_001");
        assert_eq!(fixture.border(&thumb), "gray");

        fixture.html_element(&fixture.id("title-1")).click();
        assert!(app.gallery().selection().thumb(&thumb).map(|t| t.is_selected()).unwrap_or(false));

        fixture.html_element(&fixture.id("group")).click();
        assert_eq!(app.gallery().selection().selected_count(), 2);
        assert_eq!(fixture.border(&fixture.id("2023_001")), "gray");
    }

    #[wasm_bindgen_test]
    fn escape_closes_preview_and_unbinds() {
        set_panic_hook();
        let fixture = Fixture::new("keys");
        let app = fixture.attach();
        let container = fixture.config.dom.preview_container.clone();

        fixture.press("Escape");
        assert!(!app.gallery().preview_state().is_open());

        app.open_preview(&fixture.id("2024_002"));
        assert!(app.keyboard_bound());
        assert!(dom::is_shown(&fixture.html_element(&container)));
        let filename = fixture
            .document
            .get_element_by_id(&fixture.config.dom.preview_filename)
            .and_then(|element| element.text_content());
        assert_eq!(filename.as_deref(), Some("My Photo.png"));

        fixture.press(" ");
        assert_eq!(app.gallery().selection().selected_count(), 1);

        fixture.press("Escape");
        assert!(!app.gallery().preview_state().is_open());
        assert!(!app.keyboard_bound());
        assert!(!dom::is_shown(&fixture.html_element(&container)));

        fixture.press(" ");
        assert_eq!(app.gallery().selection().selected_count(), 1);
    }

    #[wasm_bindgen_test]
    fn help_over_preview_takes_escape_first() {
        set_panic_hook();
        let fixture = Fixture::new("stack");
        let app = fixture.attach();
        app.open_preview(&fixture.id("2024_001"));
        app.open_help();
        assert_eq!(app.gallery().modals().top(), Some(OverlayKind::Help));

        fixture.press("Escape");
        assert!(!app.gallery().help_visible());
        assert!(app.gallery().preview_state().is_open());
        assert!(app.keyboard_bound());

        fixture.press("Escape");
        assert!(!app.keyboard_bound());
    }

    #[wasm_bindgen_test(async)]
    async fn download_marks_then_repaints() {
        set_panic_hook();
        let fixture = Fixture::new("download");
        let app = fixture.attach();
        let first = fixture.id("2024_001");
        let second = fixture.id("2024_002");
        app.toggle(&first);

        app.prepare_download();
        assert_eq!(app.download_field.value(), "7");
        assert_eq!(fixture.border(&first), "orange");
        assert_eq!(fixture.border(&second), "gray");
        assert_eq!(app.gallery().selection().selected_count(), 0);

        TimeoutFuture::new(200).await;
        assert_eq!(fixture.border(&first), "gray");
    }

    async fn wait_until(what: &str, mut done: impl FnMut() -> bool) {
        let start = Date::now();
        while !done() {
            if Date::now() - start > 5000.0 {
                panic!("{what} did not settle after 5s");
            }
            TimeoutFuture::new(10).await;
        }
    }

    fn error_line(fixture: &Fixture, region_id: &str) -> Option<Element> {
        fixture
            .document
            .get_element_by_id(region_id)
            .and_then(|region| {
                region
                    .query_selector(&format!(".{}", crate::render::ERROR_CLASS))
                    .ok()
                    .flatten()
            })
    }

    #[wasm_bindgen_test(async)]
    async fn failed_detail_fetch_shows_error_line() {
        set_panic_hook();
        // Nothing is served under the fixture's detail endpoint, so the
        // fetch answers 404.
        let fixture = Fixture::new("fetch");
        let app = fixture.attach();
        app.open_preview(&fixture.id("2024_001"));
        wait_until("detail fetch", || {
            !matches!(
                app.gallery().view().preview.map(|preview| preview.detail),
                Some(FragmentState::Loading)
            )
        })
        .await;

        let detail = app.gallery().view().preview.map(|preview| preview.detail);
        assert!(matches!(detail, Some(FragmentState::Failed(_))), "got {detail:?}");
        let line = error_line(&fixture, &fixture.config.dom.preview_detail).expect("error line");
        assert!(line
            .text_content()
            .unwrap_or_default()
            .starts_with("could not load details"));
    }

    #[wasm_bindgen_test(async)]
    async fn help_overlay_shows_and_hides() {
        set_panic_hook();
        let fixture = Fixture::new("help");
        let app = fixture.attach();
        let container = fixture.config.dom.help_container.clone();
        assert!(!dom::is_shown(&fixture.html_element(&container)));

        app.open_help();
        assert!(dom::is_shown(&fixture.html_element(&container)));
        assert!(app.keyboard_bound());
        wait_until("help fetch", || {
            !matches!(
                app.gallery().view().help.map(|help| help.body),
                Some(FragmentState::Loading)
            )
        })
        .await;
        assert!(error_line(&fixture, &fixture.config.dom.help_body).is_some());

        fixture.press("Escape");
        assert!(!app.gallery().help_visible());
        assert!(!dom::is_shown(&fixture.html_element(&container)));
        assert!(!app.keyboard_bound());
    }

    #[wasm_bindgen_test]
    fn preview_image_is_bounded_by_window() {
        set_panic_hook();
        let fixture = Fixture::new("bound");
        let app = fixture.attach();
        app.open_preview(&fixture.id("2024_001"));

        let style = fixture.html_element(&fixture.config.dom.preview_img).style();
        assert_eq!(style.get_property_value("max-width").unwrap_or_default(), "400px");
        assert_eq!(style.get_property_value("max-height").unwrap_or_default(), "300px");

        app.close_preview();
        app.open_preview(&fixture.id("2023_001"));
        assert_eq!(style.get_property_value("max-width").unwrap_or_default(), "400px");
    }

    #[wasm_bindgen_test]
    fn malformed_thumbnails_are_skipped() {
        set_panic_hook();
        let fixture = Fixture::new("skip");
        let thumb = fixture.config.dom.thumb_class.clone();
        let extra = fixture.document.create_element("div").expect("create extra thumbs");
        extra.set_inner_html(&format!(
            r#"
            <div class="{thumb}" id="skip-odd" data-recid="2024/01/05:003">
              <img id="skip-oddimg" src="/fits/odd-thumb.png">
            </div>
            <div class="{thumb}" id="skip-pair" data-recid="7,8">
              <img id="skip-pairimg" src="/fits/pair-thumb.png">
            </div>
            <div class="{thumb}" id="skip-bare" data-recid="12"></div>
            <div class="{thumb}" data-recid="13"></div>
            "#
        ));
        fixture.root.append_child(&extra).expect("append extra thumbs");

        let app = fixture.attach();
        assert_eq!(app.gallery().selection().len(), 4);
        assert!(app.gallery().selection().thumb(&fixture.id("odd")).is_ok());
        assert!(app.gallery().selection().thumb(&fixture.id("pair")).is_err());
        assert!(app.gallery().selection().thumb(&fixture.id("bare")).is_err());

        let odd = fixture.id("odd");
        app.toggle(&odd);
        assert_ne!(fixture.border(&odd), "gray");
        assert_eq!(fixture.border(&fixture.id("2023_001")), "gray");
    }
}
