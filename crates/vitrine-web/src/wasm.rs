#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::rc::Rc;

use vitrine_core::config::PageConfig;
use vitrine_core::debug_overlay::DebugOverlay;
use vitrine_core::fit::{self, FitProfile, TargetWidth, TextFitter};
use vitrine_core::theme::{self, DeferredChange, ThemeController};
use vitrine_core::trigger::{PlatformCaps, ReactionTable, Scheduler, Task, TriggerSource};
use vitrine_core::width_sync::LayoutWidthSync;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AddEventListenerOptions, Document, Event, EventTarget, FontFaceSet, KeyboardEvent,
    ResizeObserver, Window,
};

use crate::dom::{
    DomDebugPage, DomThemePage, DomTimelinePage, StyledElement, by_id_html, computed_padding_x,
    html_elements, query_html,
};
use crate::logging;
use crate::storage::{BrowserStorage, describe};

const PREFERS_DARK_QUERY: &str = "(prefers-color-scheme: dark)";

/// Mount the page behaviors.
///
/// `config_json` optionally overrides any part of the default configuration.
/// While the document is still loading, mounting waits for
/// `DOMContentLoaded`.
#[wasm_bindgen]
pub fn boot(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json.as_deref() {
        Some(json) => PageConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => PageConfig::default(),
    };
    logging::init(&config.log_level);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if document.ready_state() != "loading" {
        return mount(window, document, config);
    }

    let deferred_window = window.clone();
    let deferred_document = document.clone();
    let callback = Closure::once_into_js(move || {
        if let Err(err) = mount(deferred_window, deferred_document, config) {
            tracing::error!(error = %describe(&err), "failed to mount page behaviors");
        }
    });
    let options = AddEventListenerOptions::new();
    options.set_once(true);
    document.add_event_listener_with_callback_and_add_event_listener_options(
        "DOMContentLoaded",
        callback.unchecked_ref(),
        &options,
    )
}

/// All page state, owned by the UI thread.
struct PageRuntime {
    window: Window,
    document: Document,
    config: PageConfig,
    theme: ThemeController<BrowserStorage>,
    debug: DebugOverlay<BrowserStorage>,
    width_sync: LayoutWidthSync,
    headline: TextFitter,
    subhead: TextFitter,
    scheduler: Scheduler,
    observers: Vec<ResizeObserver>,
}

type Shared = Rc<RefCell<PageRuntime>>;

impl PageRuntime {
    fn restore(&mut self) {
        let mut debug_page = DomDebugPage::new(&self.document, &self.config.debug);
        self.debug.restore(&mut debug_page);

        let mut theme_page = DomThemePage::new(&self.document, &self.config.theme);
        let mode = self.theme.restore(&mut theme_page);
        tracing::debug!(mode = %mode, debug = self.debug.is_enabled(), "restored preferences");
    }

    fn handle_debug_key(&mut self, key: &str) {
        let mut page = DomDebugPage::new(&self.document, &self.config.debug);
        self.debug.handle_key(key, &mut page);
    }

    fn run(&mut self, task: Task) {
        let _span = tracing::trace_span!("task", ?task).entered();
        match task {
            Task::FitHeadline => self.fit_headline(),
            Task::FitSubhead => self.fit_subhead(),
            Task::SyncTimelineWidth => {
                let timeline = &self.config.timeline;
                let mut page = DomTimelinePage::new(
                    &self.document,
                    &timeline.container_selector,
                    &timeline.reference_selector,
                );
                self.width_sync.sync(&mut page);
            }
        }
    }

    fn fit_headline(&self) {
        let config = &self.config.headline;
        let Some(measure) = query_html(&self.document, &config.measure_selector) else {
            return;
        };
        let Some(text) = by_id_html(&self.document, &config.text_id) else {
            return;
        };
        let mut words: Vec<StyledElement> = html_elements(text.query_selector_all(&config.word_selector))
            .into_iter()
            .map(StyledElement)
            .collect();
        if words.is_empty() {
            return;
        }
        let width = TargetWidth::ClientWidth.resolve(f64::from(measure.client_width()), 0.0);
        let mut container = StyledElement(text);
        fit::fit_headline(&self.headline, &mut container, &mut words, width);
    }

    fn fit_subhead(&self) {
        let config = &self.config.subhead;
        let Some(subhead_box) = query_html(&self.document, &config.box_selector) else {
            return;
        };
        let mut lines: Vec<StyledElement> = html_elements(self.document.query_selector_all(&config.line_selector))
            .into_iter()
            .map(StyledElement)
            .collect();
        if lines.is_empty() {
            return;
        }
        let width = TargetWidth::InnerWidth.resolve(
            f64::from(subhead_box.client_width()),
            computed_padding_x(&self.window, &subhead_box),
        );
        fit::fit_lines(&self.subhead, &mut lines, width);
    }
}

fn mount(window: Window, document: Document, config: PageConfig) -> Result<(), JsValue> {
    let prefers_dark = window
        .match_media(PREFERS_DARK_QUERY)
        .ok()
        .flatten()
        .is_some_and(|query| query.matches());
    let caps = PlatformCaps {
        resize_observer: has_global(&window, "ResizeObserver"),
        font_loading: font_face_set(&document).is_some(),
    };
    tracing::debug!(?caps, prefers_dark, "mounting page behaviors");

    let runtime = PageRuntime {
        theme: ThemeController::new(
            BrowserStorage::from_window(&window),
            config.theme.clone(),
            prefers_dark,
        ),
        debug: DebugOverlay::new(BrowserStorage::from_window(&window), config.debug.clone()),
        width_sync: LayoutWidthSync::new(config.timeline.clone()),
        headline: TextFitter::new(FitProfile::Headline).with_range(config.headline.range),
        subhead: TextFitter::new(FitProfile::Subhead).with_range(config.subhead.range),
        scheduler: Scheduler::new(ReactionTable::standard(caps)),
        observers: Vec::new(),
        window,
        document,
        config,
    };
    let shared: Shared = Rc::new(RefCell::new(runtime));
    shared.borrow_mut().restore();

    install_debug_key(&shared)?;
    install_theme_toggles(&shared)?;
    install_resize(&shared)?;
    install_visibility(&shared)?;
    install_font_readiness(&shared)?;

    dispatch(&shared, TriggerSource::Startup);
    Ok(())
}

/// Route a trigger through the scheduler and run what is due now.
fn dispatch(shared: &Shared, source: TriggerSource) {
    let outcome = shared.borrow_mut().scheduler.dispatch(source);
    if outcome.request_frame {
        request_frame(shared);
    }
    let mut runtime = shared.borrow_mut();
    for task in outcome.run_now {
        runtime.run(task);
    }
}

/// Toggle the theme and broadcast the change.
///
/// `themechange` listeners run inside `dispatchEvent` and may toggle again, so
/// the runtime is released before the event is sent.
fn toggle_theme(shared: &Shared) {
    let (document, config) = {
        let runtime = shared.borrow();
        (runtime.document.clone(), runtime.config.theme.clone())
    };
    let mut page = DeferredChange::new(DomThemePage::new(&document, &config));
    shared.borrow().theme.toggle(&mut page);
    page.flush();
}

fn request_frame(shared: &Shared) {
    let handle = Rc::clone(shared);
    let callback = Closure::once_into_js(move |_timestamp: f64| run_frame(&handle));
    let window = shared.borrow().window.clone();
    if let Err(err) = window.request_animation_frame(callback.unchecked_ref()) {
        tracing::warn!(error = %describe(&err), "requestAnimationFrame failed, measuring now");
        run_frame(shared);
    }
}

fn run_frame(shared: &Shared) {
    let tasks = shared.borrow_mut().scheduler.on_frame();
    let mut runtime = shared.borrow_mut();
    for task in tasks {
        runtime.run(task);
    }
}

/// Attach a long-lived listener. The closure lives as long as the page.
fn listen(
    target: &EventTarget,
    event: &str,
    passive: bool,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    let options = AddEventListenerOptions::new();
    options.set_passive(passive);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        closure.as_ref().unchecked_ref(),
        &options,
    )?;
    closure.forget();
    Ok(())
}

fn has_global(window: &Window, name: &str) -> bool {
    js_sys::Reflect::has(window, &JsValue::from_str(name)).unwrap_or(false)
}

fn font_face_set(document: &Document) -> Option<FontFaceSet> {
    js_sys::Reflect::get(document, &JsValue::from_str("fonts"))
        .ok()
        .filter(|fonts| !fonts.is_undefined() && !fonts.is_null())
        .and_then(|fonts| fonts.dyn_into::<FontFaceSet>().ok())
}

fn install_debug_key(shared: &Shared) -> Result<(), JsValue> {
    let document = shared.borrow().document.clone();
    let handle = Rc::clone(shared);
    listen(&document, "keydown", true, move |event| {
        if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
            handle.borrow_mut().handle_debug_key(&event.key());
        }
    })
}

fn install_theme_toggles(shared: &Shared) -> Result<(), JsValue> {
    let (toggle, arrow) = {
        let runtime = shared.borrow();
        let config = &runtime.config.theme;
        (
            runtime.document.get_element_by_id(&config.toggle_id),
            runtime.document.query_selector(&config.arrow_selector).ok().flatten(),
        )
    };

    if let Some(toggle) = toggle {
        let handle = Rc::clone(shared);
        listen(&toggle, "click", false, move |_| {
            toggle_theme(&handle);
        })?;
    }

    if let Some(arrow) = arrow {
        arrow.set_attribute("role", theme::TOGGLE_ROLE)?;
        arrow.set_attribute("tabindex", theme::TOGGLE_TABINDEX)?;
        arrow.set_attribute("aria-label", theme::TOGGLE_ARIA_LABEL)?;

        let handle = Rc::clone(shared);
        listen(&arrow, "click", false, move |_| {
            toggle_theme(&handle);
        })?;

        let handle = Rc::clone(shared);
        listen(&arrow, "keydown", false, move |event| {
            let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if theme::is_activation_key(&key_event.key()) {
                event.prevent_default();
                toggle_theme(&handle);
            }
        })?;
    }
    Ok(())
}

fn install_resize(shared: &Shared) -> Result<(), JsValue> {
    let (window, document, table, headline_selector, subhead_selector) = {
        let runtime = shared.borrow();
        (
            runtime.window.clone(),
            runtime.document.clone(),
            runtime.scheduler.table().clone(),
            runtime.config.headline.measure_selector.clone(),
            runtime.config.subhead.box_selector.clone(),
        )
    };

    for (source, selector) in [
        (TriggerSource::HeadlineResize, headline_selector),
        (TriggerSource::SubheadResize, subhead_selector),
    ] {
        if !table.listens_to(source) {
            continue;
        }
        let Some(target) = query_html(&document, &selector) else {
            continue;
        };
        let handle = Rc::clone(shared);
        let callback = Closure::<dyn FnMut(js_sys::Array, ResizeObserver)>::new(
            move |_entries: js_sys::Array, _observer: ResizeObserver| dispatch(&handle, source),
        );
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
        observer.observe(&target);
        callback.forget();
        shared.borrow_mut().observers.push(observer);
    }

    if table.listens_to(TriggerSource::WindowResize) {
        let handle = Rc::clone(shared);
        listen(&window, "resize", true, move |_| {
            dispatch(&handle, TriggerSource::WindowResize);
        })?;
    }
    Ok(())
}

fn install_visibility(shared: &Shared) -> Result<(), JsValue> {
    let document = shared.borrow().document.clone();
    let handle = Rc::clone(shared);
    let watched = document.clone();
    listen(&document, "visibilitychange", false, move |_| {
        if !watched.hidden() {
            dispatch(&handle, TriggerSource::VisibilityRestored);
        }
    })
}

fn install_font_readiness(shared: &Shared) -> Result<(), JsValue> {
    let (window, document) = {
        let runtime = shared.borrow();
        (runtime.window.clone(), runtime.document.clone())
    };

    if let Some(fonts) = font_face_set(&document) {
        let ready = fonts.ready()?;
        let handle = Rc::clone(shared);
        wasm_bindgen_futures::spawn_local(async move {
            match JsFuture::from(ready).await {
                Ok(_) => dispatch(&handle, TriggerSource::FontsReady),
                Err(err) => {
                    tracing::debug!(error = %describe(&err), "font readiness rejected, keeping current fit");
                }
            }
        });
        return Ok(());
    }

    let handle = Rc::clone(shared);
    let callback = Closure::once_into_js(move || dispatch(&handle, TriggerSource::Deferred));
    window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 0)?;
    Ok(())
}
