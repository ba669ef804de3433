#![forbid(unsafe_code)]

//! Publish one element's width for a sibling layout.
//!
//! The timeline's date column is sized by its first entry. Its rendered width
//! is measured and written to a custom property on the timeline container so
//! the remaining entries line up through CSS alone.

use crate::config::TimelineConfig;

/// Page surface used by the width sync.
pub trait TimelinePage {
    /// Whether the timeline container exists.
    fn has_container(&self) -> bool;

    /// Rendered width of the reference element, `None` when it is absent.
    fn reference_width(&self) -> Option<f64>;

    /// Set a custom property on the container.
    fn set_property(&mut self, name: &str, value: &str);

    /// Remove a custom property from the container.
    fn remove_property(&mut self, name: &str);
}

/// Property value for a measured width, or `None` when the property should be
/// cleared (absent, zero, negative or non-finite width).
#[must_use]
pub fn published_value(width: Option<f64>) -> Option<String> {
    width
        .filter(|w| w.is_finite() && *w > 0.0)
        .map(|w| format!("{w}px"))
}

/// Outcome of one measurement pass.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// No timeline on this page.
    NoContainer,
    /// Property set to the contained value.
    Published(String),
    /// Property removed.
    Cleared,
}

/// Measures the reference element and republishes its width.
#[derive(Debug, Clone)]
pub struct LayoutWidthSync {
    config: TimelineConfig,
    passes: u64,
}

impl LayoutWidthSync {
    #[must_use]
    pub fn new(config: TimelineConfig) -> Self {
        Self { config, passes: 0 }
    }

    #[must_use]
    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Number of measurement passes performed.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Run one measurement pass.
    pub fn sync<P: TimelinePage + ?Sized>(&mut self, page: &mut P) -> SyncOutcome {
        if !page.has_container() {
            return SyncOutcome::NoContainer;
        }
        self.passes = self.passes.saturating_add(1);

        let property = &self.config.property;
        match published_value(page.reference_width()) {
            Some(value) => {
                page.set_property(property, &value);
                tracing::trace!(property = %property, value = %value, "published timeline width");
                SyncOutcome::Published(value)
            }
            None => {
                page.remove_property(property);
                tracing::trace!(property = %property, "cleared timeline width");
                SyncOutcome::Cleared
            }
        }
    }
}
