#![forbid(unsafe_code)]

//! Fit text to a container width.
//!
//! [`TextFitter`] finds the largest font size at which an element's rendered
//! content width does not exceed a target width. The search is a bounded
//! bisection over a [`FitRange`]: a fixed number of passes, each of which sets
//! a candidate size, measures, and halves the interval.
//!
//! The element is reached only through [`FitElement`], so the search can run
//! against the DOM or against a deterministic fake.
//!
//! # Example
//!
//! ```
//! use vitrine_core::fit::{search_font_size, FitRange};
//!
//! // Ten glyphs, each 0.5em wide.
//! let low = search_font_size(FitRange::SUBHEAD, 200.0, |size| size * 5.0);
//! assert!(low * 5.0 <= 200.0);
//! assert!((low - 40.0).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};

/// Amount subtracted from the converged size so subpixel rounding can never
/// push the text past the target.
pub const UNDERSHOOT_PX: f64 = 0.5;

/// Font size used to put a headline word into a known state before searching.
const HEADLINE_SEED_PX: f64 = 50.0;

/// Upper bound on bisection passes. Past this an f64 interval stops shrinking,
/// and every pass is a synchronous layout on the UI thread.
pub const MAX_ITERATIONS: u32 = 64;

/// Closed font-size interval and the number of bisection passes over it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitRange {
    /// Smallest candidate size in px.
    pub low: f64,
    /// Largest candidate size in px.
    pub high: f64,
    /// Number of bisection passes.
    pub iterations: u32,
}

impl FitRange {
    /// Wide range for single headline words.
    pub const HEADLINE: Self = Self::new(6.0, 2400.0, 22);

    /// Narrow range for subhead lines.
    pub const SUBHEAD: Self = Self::new(6.0, 320.0, 18);

    /// Create a range.
    #[must_use]
    pub const fn new(low: f64, high: f64, iterations: u32) -> Self {
        Self {
            low,
            high,
            iterations,
        }
    }

    /// Width of the interval left after all passes.
    #[must_use]
    pub fn resolution(&self) -> f64 {
        (self.high - self.low) / 2f64.powi(self.iterations.min(i32::MAX as u32) as i32)
    }

    /// Check that the range can drive a search.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.low.is_finite() || !self.high.is_finite() {
            return Err("bounds must be finite");
        }
        if self.low < 0.0 {
            return Err("lower bound must not be negative");
        }
        if self.low >= self.high {
            return Err("lower bound must be below upper bound");
        }
        if self.iterations == 0 {
            return Err("at least one iteration is required");
        }
        if self.iterations > MAX_ITERATIONS {
            return Err("too many iterations");
        }
        Ok(())
    }
}

/// CSS `display` values the fitter writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    /// Remove the inline value.
    Unset,
    InlineBlock,
    Block,
}

impl Display {
    /// Inline style value; empty means "remove".
    #[must_use]
    pub const fn css_value(self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::InlineBlock => "inline-block",
            Self::Block => "block",
        }
    }
}

/// CSS `white-space` values the fitter writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhiteSpace {
    Unset,
    NoWrap,
}

impl WhiteSpace {
    #[must_use]
    pub const fn css_value(self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::NoWrap => "nowrap",
        }
    }
}

/// CSS `width` values the fitter writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Unset,
    Auto,
    /// `100%` of the containing block.
    Full,
}

impl Width {
    #[must_use]
    pub const fn css_value(self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::Auto => "auto",
            Self::Full => "100%",
        }
    }
}

/// Renderer seam between the search and a concrete element.
pub trait FitElement {
    /// Set the inline font size in px, or remove it with `None`.
    fn set_font_size(&mut self, px: Option<f64>);

    fn set_display(&mut self, display: Display);

    fn set_white_space(&mut self, white_space: WhiteSpace);

    fn set_width(&mut self, width: Width);

    /// Rendered content width in px, including overflow.
    fn scroll_width(&self) -> f64;

    /// Remove every inline style the fitter may have written.
    fn clear_fit_style(&mut self) {
        self.set_font_size(None);
        self.set_display(Display::Unset);
        self.set_white_space(WhiteSpace::Unset);
        self.set_width(Width::Unset);
    }
}

impl<E: FitElement + ?Sized> FitElement for &mut E {
    fn set_font_size(&mut self, px: Option<f64>) {
        (**self).set_font_size(px);
    }

    fn set_display(&mut self, display: Display) {
        (**self).set_display(display);
    }

    fn set_white_space(&mut self, white_space: WhiteSpace) {
        (**self).set_white_space(white_space);
    }

    fn set_width(&mut self, width: Width) {
        (**self).set_width(width);
    }

    fn scroll_width(&self) -> f64 {
        (**self).scroll_width()
    }
}

/// Which call site a fitter serves.
///
/// The profile picks the default range and the inline styles written around
/// the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitProfile {
    /// Large single words that end up as full-width blocks.
    Headline,
    /// Subhead lines that stay inline.
    Subhead,
}

impl FitProfile {
    /// Default range for this profile.
    #[must_use]
    pub const fn range(self) -> FitRange {
        match self {
            Self::Headline => FitRange::HEADLINE,
            Self::Subhead => FitRange::SUBHEAD,
        }
    }

    fn prepare<E: FitElement + ?Sized>(self, element: &mut E) {
        match self {
            Self::Headline => {
                element.set_font_size(Some(HEADLINE_SEED_PX));
                element.set_display(Display::InlineBlock);
                element.set_white_space(WhiteSpace::NoWrap);
                element.set_width(Width::Auto);
            }
            Self::Subhead => {
                element.set_display(Display::InlineBlock);
                element.set_white_space(WhiteSpace::NoWrap);
            }
        }
    }

    fn settle<E: FitElement + ?Sized>(self, element: &mut E, size: f64) {
        element.set_font_size(Some(size));
        if self == Self::Headline {
            element.set_display(Display::Block);
            element.set_white_space(WhiteSpace::Unset);
            element.set_width(Width::Full);
        }
    }
}

/// How the target width is derived from the measuring box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetWidth {
    /// The box's client width.
    ClientWidth,
    /// Client width minus horizontal padding.
    InnerWidth,
}

impl TargetWidth {
    /// Resolve the target from raw box metrics.
    ///
    /// Non-finite padding counts as zero.
    #[must_use]
    pub fn resolve(self, client_width: f64, padding_x: f64) -> f64 {
        match self {
            Self::ClientWidth => client_width,
            Self::InnerWidth => {
                let padding = if padding_x.is_finite() { padding_x } else { 0.0 };
                client_width - padding
            }
        }
    }
}

/// Bounded bisection for the largest size whose measured width fits.
///
/// Returns the final lower bound. `measure` is called exactly
/// `range.iterations` times with the candidate size.
pub fn search_font_size(range: FitRange, max_width: f64, mut measure: impl FnMut(f64) -> f64) -> f64 {
    let mut low = range.low;
    let mut high = range.high;
    for _ in 0..range.iterations {
        let mid = (low + high) / 2.0;
        if measure(mid) > max_width {
            high = mid;
        } else {
            low = mid;
        }
    }
    low
}

/// Whether a target width can be fitted against.
#[must_use]
pub fn is_fittable_width(max_width: f64) -> bool {
    max_width.is_finite() && max_width > 0.0
}

/// Fits elements to a target width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextFitter {
    profile: FitProfile,
    range: FitRange,
}

impl TextFitter {
    /// Fitter with the profile's default range.
    #[must_use]
    pub const fn new(profile: FitProfile) -> Self {
        Self {
            profile,
            range: profile.range(),
        }
    }

    /// Override the search range.
    #[must_use]
    pub const fn with_range(mut self, range: FitRange) -> Self {
        self.range = range;
        self
    }

    #[must_use]
    pub const fn profile(&self) -> FitProfile {
        self.profile
    }

    #[must_use]
    pub const fn range(&self) -> FitRange {
        self.range
    }

    /// Fit one element and return the applied font size.
    ///
    /// Returns `None` without touching the element when `max_width` is zero,
    /// negative or not finite.
    pub fn fit<E: FitElement + ?Sized>(&self, element: &mut E, max_width: f64) -> Option<f64> {
        if !is_fittable_width(max_width) {
            tracing::trace!(profile = ?self.profile, max_width, "skipping fit, no target width");
            return None;
        }

        self.profile.prepare(element);
        let low = search_font_size(self.range, max_width, |size| {
            element.set_font_size(Some(size));
            element.scroll_width()
        });
        let size = (low - UNDERSHOOT_PX).max(0.0);
        self.profile.settle(element, size);

        tracing::trace!(profile = ?self.profile, max_width, size_px = size, "fitted element");
        Some(size)
    }

    /// Fit each element independently. Returns the applied sizes in order,
    /// or an empty vector when the width is not fittable.
    pub fn fit_each<E: FitElement>(&self, elements: &mut [E], max_width: f64) -> Vec<f64> {
        if !is_fittable_width(max_width) {
            return Vec::new();
        }
        elements
            .iter_mut()
            .filter_map(|element| self.fit(element, max_width))
            .collect()
    }
}

/// Fit every headline word to `max_width`.
///
/// Inline styles left by a previous pass are cleared from the container and
/// from each word first, so a shrinking container is never measured against
/// stale sizes.
pub fn fit_headline<C, E>(fitter: &TextFitter, container: &mut C, words: &mut [E], max_width: f64) -> Vec<f64>
where
    C: FitElement + ?Sized,
    E: FitElement,
{
    if !is_fittable_width(max_width) {
        return Vec::new();
    }
    let _span = tracing::debug_span!("fit_headline", words = words.len(), max_width).entered();

    container.clear_fit_style();
    words
        .iter_mut()
        .filter_map(|word| {
            word.clear_fit_style();
            fitter.fit(word, max_width)
        })
        .collect()
}

/// Fit every subhead line to `max_width`.
pub fn fit_lines<E: FitElement>(fitter: &TextFitter, lines: &mut [E], max_width: f64) -> Vec<f64> {
    let _span = tracing::debug_span!("fit_lines", lines = lines.len(), max_width).entered();
    fitter.fit_each(lines, max_width)
}
