#![forbid(unsafe_code)]

//! DOM adapters for the core page traits.
//!
//! Each adapter is built for a single operation and holds the elements it
//! found at that moment. Missing elements turn the matching trait methods
//! into no-ops.

use vitrine_core::config::{DebugConfig, ThemeConfig};
use vitrine_core::debug_overlay::{DebugPage, Legend};
use vitrine_core::fit::{Display, FitElement, WhiteSpace, Width};
use vitrine_core::theme::{IconSources, ThemeChange, ThemeMode, ThemePage};
use vitrine_core::width_sync::TimelinePage;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CustomEvent, CustomEventInit, Document, Element, HtmlElement, NodeList, Window};

use crate::css;
use crate::logging::trace_rejected;
use crate::storage::describe;

/// First element matching `selector`, as an `HtmlElement`.
pub(crate) fn query_html(document: &Document, selector: &str) -> Option<HtmlElement> {
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

/// Element with `id`, as an `HtmlElement`.
pub(crate) fn by_id_html(document: &Document, id: &str) -> Option<HtmlElement> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

/// HTML elements of a node list, in document order.
pub(crate) fn html_elements(list: Result<NodeList, JsValue>) -> Vec<HtmlElement> {
    let Ok(list) = list else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

/// Elements of a node list, in document order.
fn elements(list: Result<NodeList, JsValue>) -> Vec<Element> {
    let Ok(list) = list else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Horizontal padding of `element` from its computed style.
pub(crate) fn computed_padding_x(window: &Window, element: &Element) -> f64 {
    let Ok(Some(style)) = window.get_computed_style(element) else {
        return 0.0;
    };
    let left = style.get_property_value("padding-left").unwrap_or_default();
    let right = style.get_property_value("padding-right").unwrap_or_default();
    css::padding_x(&left, &right)
}

/// An element whose inline style the fitter drives.
#[derive(Debug, Clone)]
pub(crate) struct StyledElement(pub HtmlElement);

impl StyledElement {
    fn set_style(&self, name: &str, value: &str) {
        let style = self.0.style();
        if value.is_empty() {
            trace_rejected("inline style", style.remove_property(name));
        } else {
            trace_rejected("inline style", style.set_property(name, value));
        }
    }
}

impl FitElement for StyledElement {
    fn set_font_size(&mut self, px: Option<f64>) {
        match px {
            Some(px) => self.set_style("font-size", &css::format_px(px)),
            None => self.set_style("font-size", ""),
        }
    }

    fn set_display(&mut self, display: Display) {
        self.set_style("display", display.css_value());
    }

    fn set_white_space(&mut self, white_space: WhiteSpace) {
        self.set_style("white-space", white_space.css_value());
    }

    fn set_width(&mut self, width: Width) {
        self.set_style("width", width.css_value());
    }

    fn scroll_width(&self) -> f64 {
        f64::from(self.0.scroll_width())
    }
}

/// Theme surface: root marker, toggle label, logo, icons, broadcast.
pub(crate) struct DomThemePage<'a> {
    document: &'a Document,
    config: &'a ThemeConfig,
    root: Option<Element>,
    toggle: Option<Element>,
    logo: Option<Element>,
    icons: Vec<Element>,
}

impl<'a> DomThemePage<'a> {
    pub(crate) fn new(document: &'a Document, config: &'a ThemeConfig) -> Self {
        Self {
            document,
            config,
            root: document.document_element(),
            toggle: document.get_element_by_id(&config.toggle_id),
            logo: document.get_element_by_id(&config.logo_id),
            icons: elements(document.query_selector_all(&config.icon_selector)),
        }
    }
}

/// Attribute value, treating empty as absent like `dataset.x || fallback`.
fn non_empty_attr(element: &Element, name: &str) -> Option<String> {
    element.get_attribute(name).filter(|v| !v.is_empty())
}

impl ThemePage for DomThemePage<'_> {
    fn set_theme_marker(&mut self, mode: ThemeMode) {
        if let Some(root) = &self.root {
            trace_rejected("theme marker", root.set_attribute(&self.config.attribute, mode.as_str()));
        }
    }

    fn set_toggle_label(&mut self, label: &str) {
        if let Some(toggle) = &self.toggle {
            toggle.set_text_content(Some(label));
        }
    }

    fn set_logo_src(&mut self, src: &str) {
        if let Some(logo) = &self.logo {
            trace_rejected("logo src", logo.set_attribute("src", src));
        }
    }

    fn icon_count(&self) -> usize {
        self.icons.len()
    }

    fn icon_sources(&self, index: usize) -> IconSources {
        let Some(icon) = self.icons.get(index) else {
            return IconSources::default();
        };
        IconSources {
            current: icon.get_attribute("src"),
            light: non_empty_attr(icon, "data-light-src"),
            dark: non_empty_attr(icon, "data-dark-src"),
        }
    }

    fn set_icon_src(&mut self, index: usize, src: &str) {
        if let Some(icon) = self.icons.get(index) {
            trace_rejected("icon src", icon.set_attribute("src", src));
        }
    }

    fn emit_theme_change(&mut self, change: &ThemeChange) {
        let detail = change
            .to_json()
            .ok()
            .and_then(|json| js_sys::JSON::parse(&json).ok())
            .unwrap_or(JsValue::NULL);
        let init = CustomEventInit::new();
        init.set_detail(&detail);
        match CustomEvent::new_with_event_init_dict(&self.config.change_event, &init) {
            Ok(event) => {
                trace_rejected("theme change event", self.document.dispatch_event(&event));
            }
            Err(err) => {
                tracing::warn!(error = %describe(&err), "failed to create theme change event");
            }
        }
    }
}

/// Debug overlay surface: root marker and legend node.
pub(crate) struct DomDebugPage<'a> {
    document: &'a Document,
    config: &'a DebugConfig,
}

impl<'a> DomDebugPage<'a> {
    pub(crate) fn new(document: &'a Document, config: &'a DebugConfig) -> Self {
        Self { document, config }
    }
}

impl DebugPage for DomDebugPage<'_> {
    fn set_debug_marker(&mut self, on: bool) {
        let Some(root) = self.document.document_element() else {
            return;
        };
        if on {
            trace_rejected("debug marker", root.set_attribute(&self.config.attribute, "1"));
        } else {
            trace_rejected("debug marker", root.remove_attribute(&self.config.attribute));
        }
    }

    fn has_legend(&self) -> bool {
        self.document.get_element_by_id(&self.config.legend_id).is_some()
    }

    fn insert_legend(&mut self, legend: &Legend) {
        let Some(body) = self.document.body() else {
            return;
        };
        let node = match self.document.create_element("div") {
            Ok(node) => node,
            Err(err) => {
                tracing::warn!(error = %describe(&err), "failed to create debug legend");
                return;
            }
        };
        node.set_id(&self.config.legend_id);
        node.set_inner_html(&legend.to_html());
        if let Err(err) = body.append_child(&node) {
            tracing::warn!(error = %describe(&err), "failed to attach debug legend");
        }
    }

    fn remove_legend(&mut self) {
        if let Some(node) = self.document.get_element_by_id(&self.config.legend_id) {
            node.remove();
        }
    }
}

/// Timeline surface: container custom property and reference width.
pub(crate) struct DomTimelinePage<'a> {
    container: Option<HtmlElement>,
    reference_selector: &'a str,
}

impl<'a> DomTimelinePage<'a> {
    pub(crate) fn new(document: &Document, container_selector: &str, reference_selector: &'a str) -> Self {
        Self {
            container: query_html(document, container_selector),
            reference_selector,
        }
    }
}

impl TimelinePage for DomTimelinePage<'_> {
    fn has_container(&self) -> bool {
        self.container.is_some()
    }

    fn reference_width(&self) -> Option<f64> {
        let container = self.container.as_ref()?;
        let reference = container.query_selector(self.reference_selector).ok().flatten()?;
        Some(reference.get_bounding_client_rect().width())
    }

    fn set_property(&mut self, name: &str, value: &str) {
        if let Some(container) = &self.container {
            trace_rejected("timeline property", container.style().set_property(name, value));
        }
    }

    fn remove_property(&mut self, name: &str) {
        if let Some(container) = &self.container {
            trace_rejected("timeline property", container.style().remove_property(name));
        }
    }
}
