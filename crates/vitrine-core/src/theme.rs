#![forbid(unsafe_code)]

//! Light/dark theme switching.
//!
//! The current mode is a function of one storage key and the OS color-scheme
//! preference captured at startup. A persisted `"light"` or `"dark"` wins;
//! anything else falls back to the OS preference.
//!
//! Toggling persists first, then applies to the page, then notifies
//! listeners. A reload between persist and apply resumes in the new mode.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ThemeConfig;
use crate::storage::{KeyValueStore, read_or_none};

/// Attribute values for a control that toggles the theme.
pub const TOGGLE_ROLE: &str = "button";
pub const TOGGLE_TABINDEX: &str = "0";
pub const TOGGLE_ARIA_LABEL: &str = "Toggle theme (Light/Dark)";

/// The two page color modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    /// Persisted and attribute form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Capitalized form shown on toggle controls.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    /// Mode implied by the OS preference.
    #[must_use]
    pub const fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark { Self::Dark } else { Self::Light }
    }

    /// Exact parse of a persisted value. No trimming, no case folding.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload broadcast after the theme changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeChange {
    pub theme: ThemeMode,
}

impl ThemeChange {
    /// JSON form of the payload, e.g. `{"theme":"dark"}`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Light/dark sources of one themed icon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconSources {
    /// Current `src` attribute.
    pub current: Option<String>,
    /// Declared light variant.
    pub light: Option<String>,
    /// Declared dark variant.
    pub dark: Option<String>,
}

impl IconSources {
    /// Source the icon should show in `mode`.
    ///
    /// The light variant defaults to the current source and the dark variant
    /// defaults to the light one, so icons without declared variants keep
    /// their source.
    #[must_use]
    pub fn source_for(&self, mode: ThemeMode) -> Option<&str> {
        let light = self.light.as_deref().or(self.current.as_deref());
        match mode {
            ThemeMode::Light => light,
            ThemeMode::Dark => self.dark.as_deref().or(light),
        }
    }

    /// Source to write, or `None` when the icon already shows it.
    #[must_use]
    pub fn resolve(&self, mode: ThemeMode) -> Option<&str> {
        self.source_for(mode)
            .filter(|next| !next.is_empty() && self.current.as_deref() != Some(*next))
    }
}

/// Page surface touched by theme changes.
pub trait ThemePage {
    /// Set the root theme marker attribute.
    fn set_theme_marker(&mut self, mode: ThemeMode);

    /// Set the toggle control's label. No-op when there is no toggle.
    fn set_toggle_label(&mut self, label: &str);

    /// Set the logo image source. No-op when there is no logo.
    fn set_logo_src(&mut self, src: &str);

    /// Number of themed icons on the page.
    fn icon_count(&self) -> usize;

    /// Sources of the icon at `index`.
    fn icon_sources(&self, index: usize) -> IconSources;

    fn set_icon_src(&mut self, index: usize, src: &str);

    /// Broadcast a theme change to external listeners.
    fn emit_theme_change(&mut self, change: &ThemeChange);
}

/// Apply `mode` to the page. Pure with respect to storage.
pub fn apply_theme<P: ThemePage + ?Sized>(mode: ThemeMode, config: &ThemeConfig, page: &mut P) {
    page.set_theme_marker(mode);
    page.set_toggle_label(mode.label());
    page.set_logo_src(config.logo_src(mode));

    let mut swapped = 0usize;
    for index in 0..page.icon_count() {
        let sources = page.icon_sources(index);
        if let Some(next) = sources.resolve(mode) {
            page.set_icon_src(index, next);
            swapped += 1;
        }
    }
    tracing::debug!(mode = %mode, icons_swapped = swapped, "applied theme");
}

/// Whether a key should activate a button-like toggle.
#[must_use]
pub fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " ")
}

/// Page wrapper that holds back the change broadcast until [`flush`].
///
/// Broadcast listeners run synchronously and may toggle the theme again, so
/// hosts that keep the controller behind a `RefCell` apply the change through
/// this wrapper, release the borrow, then flush.
///
/// [`flush`]: DeferredChange::flush
#[derive(Debug)]
pub struct DeferredChange<P> {
    page: P,
    pending: Option<ThemeChange>,
}

impl<P: ThemePage> DeferredChange<P> {
    #[must_use]
    pub fn new(page: P) -> Self {
        Self {
            page,
            pending: None,
        }
    }

    /// The change waiting to be broadcast, if any.
    #[must_use]
    pub fn pending(&self) -> Option<ThemeChange> {
        self.pending
    }

    /// Broadcast the held change on the wrapped page. Returns it.
    pub fn flush(&mut self) -> Option<ThemeChange> {
        let change = self.pending.take()?;
        self.page.emit_theme_change(&change);
        Some(change)
    }

    /// Unwrap the page, dropping any unflushed change.
    pub fn into_inner(self) -> P {
        self.page
    }
}

impl<P: ThemePage> ThemePage for DeferredChange<P> {
    fn set_theme_marker(&mut self, mode: ThemeMode) {
        self.page.set_theme_marker(mode);
    }

    fn set_toggle_label(&mut self, label: &str) {
        self.page.set_toggle_label(label);
    }

    fn set_logo_src(&mut self, src: &str) {
        self.page.set_logo_src(src);
    }

    fn icon_count(&self) -> usize {
        self.page.icon_count()
    }

    fn icon_sources(&self, index: usize) -> IconSources {
        self.page.icon_sources(index)
    }

    fn set_icon_src(&mut self, index: usize, src: &str) {
        self.page.set_icon_src(index, src);
    }

    fn emit_theme_change(&mut self, change: &ThemeChange) {
        self.pending = Some(*change);
    }
}

/// Reads, toggles and applies the page theme.
#[derive(Debug)]
pub struct ThemeController<S> {
    store: S,
    config: ThemeConfig,
    system_prefers_dark: bool,
}

impl<S: KeyValueStore> ThemeController<S> {
    /// Create a controller. `system_prefers_dark` is the OS preference at
    /// load time; later OS changes are not tracked.
    #[must_use]
    pub fn new(store: S, config: ThemeConfig, system_prefers_dark: bool) -> Self {
        Self {
            store,
            config,
            system_prefers_dark,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ThemeConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persisted mode if valid, otherwise the OS preference.
    #[must_use]
    pub fn current(&self) -> ThemeMode {
        read_or_none(&self.store, &self.config.storage_key)
            .as_deref()
            .and_then(ThemeMode::parse)
            .unwrap_or_else(|| ThemeMode::from_prefers_dark(self.system_prefers_dark))
    }

    /// Apply `mode` without persisting it.
    pub fn apply<P: ThemePage + ?Sized>(&self, mode: ThemeMode, page: &mut P) {
        apply_theme(mode, &self.config, page);
    }

    /// Apply the current mode. Used at startup.
    pub fn restore<P: ThemePage + ?Sized>(&self, page: &mut P) -> ThemeMode {
        let mode = self.current();
        self.apply(mode, page);
        mode
    }

    /// Switch to the opposite mode: persist, apply, then notify.
    ///
    /// A failed write is logged; the page still switches.
    pub fn toggle<P: ThemePage + ?Sized>(&self, page: &mut P) -> ThemeMode {
        let next = self.current().toggled();
        if let Err(error) = self.store.set(&self.config.storage_key, next.as_str()) {
            tracing::warn!(
                backend = %self.store.name(),
                key = %self.config.storage_key,
                %error,
                "failed to persist theme"
            );
        }
        self.apply(next, page);
        page.emit_theme_change(&ThemeChange { theme: next });
        tracing::info!(mode = %next, "theme toggled");
        next
    }
}
