#![forbid(unsafe_code)]

//! Keyboard-toggled layout debug overlay.
//!
//! When on, the root element carries a debug marker (which the stylesheet uses
//! to outline sections, containers, measures and interactive elements) and a
//! single legend node explains the colors. The flag is persisted so the
//! overlay survives reloads.
//!
//! The key handler does not look at focus: pressing the key inside a text
//! field toggles the overlay too.

use crate::config::DebugConfig;
use crate::storage::{KeyValueStore, read_or_none};

/// Persisted value for "on". Any other value, or none, means off.
pub const DEBUG_ON_VALUE: &str = "1";

/// Swatch colors used by the debug stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swatch {
    Blue,
    Green,
    Purple,
    Orange,
}

impl Swatch {
    /// CSS class suffix of the swatch.
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Purple => "purple",
            Self::Orange => "orange",
        }
    }
}

/// Fixed legend content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Legend {
    pub rows: &'static [(Swatch, &'static str)],
    pub hint: String,
}

const LEGEND_ROWS: &[(Swatch, &str)] = &[
    (Swatch::Blue, "Sections"),
    (Swatch::Green, "Containers / Cards"),
    (Swatch::Purple, "Measures / Gutters"),
    (Swatch::Orange, "Interactive"),
];

impl Legend {
    /// Legend for an overlay bound to `key`.
    #[must_use]
    pub fn for_key(key: char) -> Self {
        Self {
            rows: LEGEND_ROWS,
            hint: format!("Press “{}” to toggle", key.to_uppercase()),
        }
    }

    /// Inner HTML of the legend node.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for (swatch, label) in self.rows {
            html.push_str(&format!(
                r#"<div class="row"><span class="sw {}"></span> {}</div>"#,
                swatch.class(),
                label
            ));
        }
        html.push_str(&format!(r#"<div class="muted">{}</div>"#, self.hint));
        html
    }
}

/// Page surface touched by the overlay.
pub trait DebugPage {
    /// Set or remove the root debug marker attribute.
    fn set_debug_marker(&mut self, on: bool);

    /// Whether the legend node exists.
    fn has_legend(&self) -> bool;

    /// Create and attach the legend node.
    fn insert_legend(&mut self, legend: &Legend);

    /// Detach and drop the legend node.
    fn remove_legend(&mut self);
}

/// Make the page match `on`. Idempotent.
pub fn sync_overlay<P: DebugPage + ?Sized>(on: bool, legend: &Legend, page: &mut P) {
    page.set_debug_marker(on);
    match (on, page.has_legend()) {
        (true, false) => page.insert_legend(legend),
        (false, true) => page.remove_legend(),
        _ => {}
    }
}

/// Persisted on/off debug overlay.
#[derive(Debug)]
pub struct DebugOverlay<S> {
    store: S,
    config: DebugConfig,
    legend: Legend,
    enabled: bool,
}

impl<S: KeyValueStore> DebugOverlay<S> {
    /// Create an overlay in the off state. Call [`restore`](Self::restore) to
    /// pick up the persisted flag.
    #[must_use]
    pub fn new(store: S, config: DebugConfig) -> Self {
        let legend = Legend::for_key(config.toggle_key);
        Self {
            store,
            config,
            legend,
            enabled: false,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persisted flag.
    #[must_use]
    pub fn persisted(&self) -> bool {
        read_or_none(&self.store, &self.config.storage_key).as_deref() == Some(DEBUG_ON_VALUE)
    }

    /// Load the persisted flag and sync the page to it.
    pub fn restore<P: DebugPage + ?Sized>(&mut self, page: &mut P) -> bool {
        let on = self.persisted();
        self.set(on, page);
        on
    }

    /// Turn the overlay on or off, persist, and sync the page.
    pub fn set<P: DebugPage + ?Sized>(&mut self, on: bool, page: &mut P) {
        self.enabled = on;
        let key = &self.config.storage_key;
        let result = if on {
            self.store.set(key, DEBUG_ON_VALUE)
        } else {
            self.store.remove(key)
        };
        if let Err(error) = result {
            tracing::warn!(backend = %self.store.name(), key = %key, %error, "failed to persist debug flag");
        }
        sync_overlay(on, &self.legend, page);
        tracing::debug!(on, "debug overlay");
    }

    /// Flip the overlay.
    pub fn toggle<P: DebugPage + ?Sized>(&mut self, page: &mut P) -> bool {
        let on = !self.enabled;
        self.set(on, page);
        on
    }

    /// Whether `key` (a DOM `KeyboardEvent.key`) is the toggle key.
    ///
    /// Case-insensitive; modifiers are not consulted.
    #[must_use]
    pub fn matches_key(&self, key: &str) -> bool {
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => c.to_lowercase().eq(self.config.toggle_key.to_lowercase()),
            _ => false,
        }
    }

    /// Toggle when `key` is the toggle key. Returns whether it toggled.
    pub fn handle_key<P: DebugPage + ?Sized>(&mut self, key: &str, page: &mut P) -> bool {
        if !self.matches_key(key) {
            return false;
        }
        self.toggle(page);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    /// Page with a body child list, so duplicate legends would be visible.
    #[derive(Debug, Default)]
    struct FakePage {
        marker: bool,
        body: Vec<String>,
    }

    impl FakePage {
        fn with_children(n: usize) -> Self {
            Self {
                marker: false,
                body: (0..n).map(|i| format!("section-{i}")).collect(),
            }
        }

        fn legend_count(&self) -> usize {
            self.body.iter().filter(|c| c.as_str() == "debugLegend").count()
        }
    }

    impl DebugPage for FakePage {
        fn set_debug_marker(&mut self, on: bool) {
            self.marker = on;
        }

        fn has_legend(&self) -> bool {
            self.legend_count() > 0
        }

        fn insert_legend(&mut self, _legend: &Legend) {
            self.body.push("debugLegend".to_owned());
        }

        fn remove_legend(&mut self) {
            self.body.retain(|c| c != "debugLegend");
        }
    }

    fn overlay(store: MemoryStore) -> DebugOverlay<MemoryStore> {
        DebugOverlay::new(store, DebugConfig::default())
    }

    #[test]
    fn restore_reads_persisted_flag() {
        let mut debug = overlay(MemoryStore::with_entries([("debug.v2", "1")]));
        let mut page = FakePage::default();
        assert!(debug.restore(&mut page));
        assert!(page.marker);
        assert_eq!(page.legend_count(), 1);
    }

    #[test]
    fn restore_treats_other_values_as_off() {
        for value in ["0", "true", ""] {
            let mut debug = overlay(MemoryStore::with_entries([("debug.v2", value)]));
            let mut page = FakePage::default();
            assert!(!debug.restore(&mut page));
            assert!(!page.marker);
        }
    }

    #[test]
    fn toggle_persists_one_or_removes_key() {
        let mut debug = overlay(MemoryStore::new());
        let mut page = FakePage::default();

        debug.toggle(&mut page);
        assert_eq!(debug.store().get("debug.v2").unwrap().as_deref(), Some("1"));

        debug.toggle(&mut page);
        assert_eq!(debug.store().get("debug.v2").unwrap(), None);
    }

    #[test]
    fn double_toggle_restores_child_count() {
        let mut debug = overlay(MemoryStore::new());
        let mut page = FakePage::with_children(3);
        debug.restore(&mut page);

        debug.toggle(&mut page);
        assert_eq!(page.body.len(), 4);
        debug.toggle(&mut page);
        assert_eq!(page.body.len(), 3);
        assert!(!page.marker);
    }

    #[test]
    fn legend_never_duplicated() {
        let mut debug = overlay(MemoryStore::new());
        let mut page = FakePage::default();
        debug.set(true, &mut page);
        debug.set(true, &mut page);
        sync_overlay(true, debug.legend(), &mut page);
        assert_eq!(page.legend_count(), 1);
    }

    #[test]
    fn key_match_is_case_insensitive() {
        let mut debug = overlay(MemoryStore::new());
        let mut page = FakePage::default();
        assert!(debug.handle_key("d", &mut page));
        assert!(debug.is_enabled());
        assert!(debug.handle_key("D", &mut page));
        assert!(!debug.is_enabled());
        assert!(!debug.handle_key("Delete", &mut page));
        assert!(!debug.handle_key("e", &mut page));
        assert!(!debug.handle_key("", &mut page));
    }

    #[test]
    fn legend_markup() {
        let html = Legend::for_key('d').to_html();
        assert!(html.starts_with(r#"<div class="row"><span class="sw blue"></span> Sections</div>"#));
        assert!(html.contains("Containers / Cards"));
        assert!(html.contains(r#"<span class="sw orange"></span> Interactive"#));
        assert!(html.ends_with(r#"<div class="muted">Press “D” to toggle</div>"#));
    }
}
