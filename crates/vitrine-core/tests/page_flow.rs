//! End-to-end page flow against an in-memory page.
//!
//! Drives the behaviors the way the web host does: restore preferences,
//! dispatch triggers through the scheduler, run tasks now or on the next
//! frame, and handle key presses.

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use vitrine_core::config::PageConfig;
use vitrine_core::debug_overlay::{DebugOverlay, DebugPage, Legend};
use vitrine_core::fit::{
    self, Display, FitElement, FitProfile, TargetWidth, TextFitter, WhiteSpace, Width,
};
use vitrine_core::storage::{KeyValueStore, MemoryStore};
use vitrine_core::theme::{IconSources, ThemeChange, ThemeController, ThemeMode, ThemePage};
use vitrine_core::trigger::{PlatformCaps, ReactionTable, Scheduler, Task, TriggerSource};
use vitrine_core::width_sync::{LayoutWidthSync, TimelinePage};

#[derive(Debug, Clone)]
struct Word {
    em: f64,
    font_size: Option<f64>,
}

impl FitElement for Word {
    fn set_font_size(&mut self, px: Option<f64>) {
        self.font_size = px;
    }
    fn set_display(&mut self, _display: Display) {}
    fn set_white_space(&mut self, _white_space: WhiteSpace) {}
    fn set_width(&mut self, _width: Width) {}
    fn scroll_width(&self) -> f64 {
        self.em * self.font_size.unwrap_or(16.0)
    }
}

#[derive(Debug, Default)]
struct Page {
    attributes: HashMap<&'static str, String>,
    body_children: usize,
    legend: bool,
    events: Vec<ThemeChange>,
    header_width: f64,
    words: Vec<Word>,
    subhead_client: f64,
    subhead_padding: f64,
    lines: Vec<Word>,
    date_column: Option<f64>,
    properties: HashMap<String, String>,
    timeline_passes: usize,
}

impl ThemePage for Page {
    fn set_theme_marker(&mut self, mode: ThemeMode) {
        self.attributes.insert("data-theme", mode.as_str().to_owned());
    }
    fn set_toggle_label(&mut self, _label: &str) {}
    fn set_logo_src(&mut self, src: &str) {
        self.attributes.insert("logo", src.to_owned());
    }
    fn icon_count(&self) -> usize {
        0
    }
    fn icon_sources(&self, _index: usize) -> IconSources {
        IconSources::default()
    }
    fn set_icon_src(&mut self, _index: usize, _src: &str) {}
    fn emit_theme_change(&mut self, change: &ThemeChange) {
        self.events.push(*change);
    }
}

impl DebugPage for Page {
    fn set_debug_marker(&mut self, on: bool) {
        if on {
            self.attributes.insert("data-debug", "1".to_owned());
        } else {
            self.attributes.remove("data-debug");
        }
    }
    fn has_legend(&self) -> bool {
        self.legend
    }
    fn insert_legend(&mut self, _legend: &Legend) {
        self.legend = true;
        self.body_children += 1;
    }
    fn remove_legend(&mut self) {
        self.legend = false;
        self.body_children -= 1;
    }
}

impl TimelinePage for Page {
    fn has_container(&self) -> bool {
        true
    }
    fn reference_width(&self) -> Option<f64> {
        self.date_column
    }
    fn set_property(&mut self, name: &str, value: &str) {
        self.timeline_passes += 1;
        self.properties.insert(name.to_owned(), value.to_owned());
    }
    fn remove_property(&mut self, name: &str) {
        self.timeline_passes += 1;
        self.properties.remove(name);
    }
}

struct Host {
    page: Page,
    theme: ThemeController<MemoryStore>,
    debug: DebugOverlay<MemoryStore>,
    sync: LayoutWidthSync,
    headline: TextFitter,
    subhead: TextFitter,
    scheduler: Scheduler,
    frame_requests: usize,
}

impl Host {
    fn new(store_entries: &[(&str, &str)], prefers_dark: bool, caps: PlatformCaps) -> Self {
        let config = PageConfig::default();
        let page = Page {
            body_children: 5,
            header_width: 900.0,
            words: vec![Word { em: 3.0, font_size: None }, Word { em: 6.0, font_size: None }],
            subhead_client: 640.0,
            subhead_padding: 40.0,
            lines: vec![Word { em: 20.0, font_size: None }],
            date_column: Some(112.0),
            ..Page::default()
        };
        let mut host = Self {
            page,
            theme: ThemeController::new(
                MemoryStore::with_entries(store_entries.iter().copied()),
                config.theme.clone(),
                prefers_dark,
            ),
            debug: DebugOverlay::new(
                MemoryStore::with_entries(store_entries.iter().copied()),
                config.debug.clone(),
            ),
            sync: LayoutWidthSync::new(config.timeline.clone()),
            headline: TextFitter::new(FitProfile::Headline),
            subhead: TextFitter::new(FitProfile::Subhead),
            scheduler: Scheduler::new(ReactionTable::standard(caps)),
            frame_requests: 0,
        };
        host.debug.restore(&mut host.page);
        host.theme.restore(&mut host.page);
        host
    }

    fn trigger(&mut self, source: TriggerSource) {
        let dispatch = self.scheduler.dispatch(source);
        if dispatch.request_frame {
            self.frame_requests += 1;
        }
        for task in dispatch.run_now {
            self.run(task);
        }
    }

    fn frame(&mut self) {
        for task in self.scheduler.on_frame() {
            self.run(task);
        }
    }

    fn run(&mut self, task: Task) {
        match task {
            Task::FitHeadline => {
                let width = TargetWidth::ClientWidth.resolve(self.page.header_width, 0.0);
                let mut container = Word { em: 0.0, font_size: Some(12.0) };
                fit::fit_headline(&self.headline, &mut container, &mut self.page.words, width);
            }
            Task::FitSubhead => {
                let width = TargetWidth::InnerWidth
                    .resolve(self.page.subhead_client, self.page.subhead_padding);
                fit::fit_lines(&self.subhead, &mut self.page.lines, width);
            }
            Task::SyncTimelineWidth => {
                self.sync.sync(&mut self.page);
            }
        }
    }
}

#[test]
fn startup_fits_text_and_syncs_timeline_on_first_frame() {
    let mut host = Host::new(&[], false, PlatformCaps::modern());
    host.trigger(TriggerSource::Startup);

    assert!(host.page.words.iter().all(|w| w.scroll_width() <= 900.0));
    assert!(host.page.lines[0].scroll_width() <= 600.0);
    assert!(host.page.properties.is_empty());

    host.frame();
    assert_eq!(host.page.properties["--timeline-date-col"], "112px");
    assert_eq!(host.frame_requests, 1);
}

#[test]
fn resize_burst_is_one_measurement() {
    let mut host = Host::new(&[], false, PlatformCaps::modern());
    host.trigger(TriggerSource::Startup);
    host.frame();
    let passes = host.page.timeline_passes;

    host.page.date_column = Some(96.5);
    for _ in 0..30 {
        host.trigger(TriggerSource::WindowResize);
    }
    host.frame();

    assert_eq!(host.page.timeline_passes, passes + 1);
    assert_eq!(host.page.properties["--timeline-date-col"], "96.5px");
}

#[test]
fn header_resize_refits_on_next_frame() {
    let mut host = Host::new(&[], false, PlatformCaps::modern());
    host.trigger(TriggerSource::Startup);
    let before = host.page.words[0].font_size.unwrap();

    host.page.header_width = 450.0;
    host.trigger(TriggerSource::HeadlineResize);
    assert_eq!(host.page.words[0].font_size, Some(before));

    host.frame();
    let after = host.page.words[0].font_size.unwrap();
    assert!(after < before);
    assert!(host.page.words[0].scroll_width() <= 450.0);
}

#[test]
fn without_resize_observer_window_resize_refits() {
    let mut host = Host::new(&[], false, PlatformCaps::minimal());
    host.trigger(TriggerSource::Startup);
    host.page.header_width = 300.0;
    host.trigger(TriggerSource::WindowResize);
    host.frame();
    assert!(host.page.words[1].scroll_width() <= 300.0);
}

#[test]
fn collapsed_header_keeps_previous_fit() {
    let mut host = Host::new(&[], false, PlatformCaps::modern());
    host.trigger(TriggerSource::Startup);
    let sizes: Vec<_> = host.page.words.iter().map(|w| w.font_size).collect();

    host.page.header_width = 0.0;
    host.trigger(TriggerSource::VisibilityRestored);

    let unchanged: Vec<_> = host.page.words.iter().map(|w| w.font_size).collect();
    assert_eq!(sizes, unchanged);
}

#[test]
fn persisted_preferences_are_restored() {
    let host = Host::new(&[("theme-mode", "dark"), ("debug.v2", "1")], false, PlatformCaps::modern());
    assert_eq!(host.page.attributes["data-theme"], "dark");
    assert_eq!(host.page.attributes["logo"], "logo-white.svg");
    assert_eq!(host.page.attributes["data-debug"], "1");
    assert_eq!(host.page.body_children, 6);
}

#[test]
fn theme_and_debug_round_trip() {
    let mut host = Host::new(&[], true, PlatformCaps::modern());
    assert_eq!(host.page.attributes["data-theme"], "dark");

    host.theme.toggle(&mut host.page);
    host.theme.toggle(&mut host.page);
    assert_eq!(host.page.attributes["data-theme"], "dark");
    assert_eq!(host.theme.store().get("theme-mode").unwrap().as_deref(), Some("dark"));
    assert_eq!(
        host.page.events,
        vec![
            ThemeChange { theme: ThemeMode::Light },
            ThemeChange { theme: ThemeMode::Dark },
        ]
    );

    let children = host.page.body_children;
    assert!(host.debug.handle_key("D", &mut host.page));
    assert!(host.debug.handle_key("d", &mut host.page));
    assert_eq!(host.page.body_children, children);
    assert!(!host.page.attributes.contains_key("data-debug"));
}
