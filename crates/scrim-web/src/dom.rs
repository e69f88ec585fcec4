#![forbid(unsafe_code)]

//! [`Document`] over the browser DOM.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CssStyleDeclaration, HtmlElement, ScrollBehavior, ScrollToOptions, Window};

use scrim_core::{Document, Element, HostError, HostResult, Priority, StyleProp};

const VIEWPORT_SELECTOR: &str = r#"meta[name="viewport"]"#;

fn rejected(op: &'static str, err: JsValue) -> HostError {
    HostError::rejected(op, format!("{err:?}"))
}

/// The page's window and document.
#[derive(Debug, Clone)]
pub struct WebDocument {
    window: Window,
    document: web_sys::Document,
}

impl WebDocument {
    /// Bind to the global window. Fails outside a browser page.
    pub fn from_global() -> HostResult<Self> {
        let window = web_sys::window().ok_or(HostError::Unavailable("window"))?;
        let document = window.document().ok_or(HostError::Unavailable("document"))?;
        Ok(Self { window, document })
    }

    fn element(&self, element: Element) -> Option<HtmlElement> {
        match element {
            Element::Body => self.document.body(),
            Element::Root => self
                .document
                .document_element()
                .and_then(|e| e.dyn_into::<HtmlElement>().ok()),
        }
    }

    fn css(&self, element: Element) -> HostResult<CssStyleDeclaration> {
        self.element(element)
            .map(|e| e.style())
            .ok_or(HostError::Unavailable(element.tag()))
    }

    fn viewport_element(&self) -> Option<web_sys::Element> {
        self.document
            .query_selector(VIEWPORT_SELECTOR)
            .ok()
            .flatten()
    }
}

impl Document for WebDocument {
    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn inner_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    fn client_width(&self) -> f64 {
        self.document
            .document_element()
            .map_or(0.0, |e| f64::from(e.client_width()))
    }

    fn style(&self, element: Element, prop: StyleProp) -> Option<String> {
        let css = self.css(element).ok()?;
        css.get_property_value(prop.css_name())
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn style_priority(&self, element: Element, prop: StyleProp) -> Priority {
        self.css(element)
            .map(|css| Priority::from_css(&css.get_property_priority(prop.css_name())))
            .unwrap_or_default()
    }

    fn set_style(
        &self,
        element: Element,
        prop: StyleProp,
        value: &str,
        priority: Priority,
    ) -> HostResult<()> {
        self.css(element)?
            .set_property_with_priority(prop.css_name(), value, priority.as_css())
            .map_err(|e| rejected("set_style", e))
    }

    fn remove_style(&self, element: Element, prop: StyleProp) -> HostResult<()> {
        self.css(element)?
            .remove_property(prop.css_name())
            .map(drop)
            .map_err(|e| rejected("remove_style", e))
    }

    fn has_class(&self, element: Element, class: &str) -> bool {
        self.element(element)
            .is_some_and(|e| e.class_list().contains(class))
    }

    fn add_class(&self, element: Element, class: &str) -> HostResult<()> {
        self.element(element)
            .ok_or(HostError::Unavailable(element.tag()))?
            .class_list()
            .add_1(class)
            .map_err(|e| rejected("add_class", e))
    }

    fn remove_class(&self, element: Element, class: &str) -> HostResult<()> {
        self.element(element)
            .ok_or(HostError::Unavailable(element.tag()))?
            .class_list()
            .remove_1(class)
            .map_err(|e| rejected("remove_class", e))
    }

    fn viewport_meta(&self) -> Option<String> {
        let meta = self.viewport_element()?;
        Some(meta.get_attribute("content").unwrap_or_default())
    }

    fn set_viewport_meta(&self, content: &str) -> HostResult<()> {
        let meta = match self.viewport_element() {
            Some(meta) => meta,
            None => {
                let meta = self
                    .document
                    .create_element("meta")
                    .map_err(|e| rejected("create meta", e))?;
                meta.set_attribute("name", "viewport")
                    .map_err(|e| rejected("set meta name", e))?;
                let head = self.document.head().ok_or(HostError::Unavailable("head"))?;
                head.append_child(&meta)
                    .map_err(|e| rejected("append meta", e))?;
                meta
            }
        };
        meta.set_attribute("content", content)
            .map_err(|e| rejected("set viewport content", e))
    }

    fn remove_viewport_meta(&self) -> HostResult<()> {
        if let Some(meta) = self.viewport_element() {
            meta.remove();
        }
        Ok(())
    }

    fn scroll_to(&self, y: f64) {
        let options = ScrollToOptions::new();
        options.set_top(y);
        options.set_behavior(ScrollBehavior::Auto);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn dispatch_resize(&self) {
        match web_sys::Event::new("resize") {
            Ok(event) => {
                if let Err(err) = self.window.dispatch_event(&event) {
                    scrim_core::warn!(error = ?err, "resize dispatch failed");
                }
            }
            Err(err) => scrim_core::warn!(error = ?err, "resize event construction failed"),
        }
    }

    fn open_external(&self, url: &str) -> HostResult<()> {
        self.window
            .open_with_url_and_target_and_features(url, "_blank", "noopener")
            .map(drop)
            .map_err(|e| rejected("open_external", e))
    }
}
