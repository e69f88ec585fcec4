#![forbid(unsafe_code)]

//! In-memory [`Document`] implementation.
//!
//! Useful for:
//! - unit testing lock, menu and overlay logic without a browser
//! - headless hosts that still want to observe what the core would do
//!
//! The model follows the browser behaviors the core depends on: pinning the
//! body with `position: fixed` resets the window scroll offset to zero, and the
//! offset only comes back through an explicit [`Document::scroll_to`].

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

use crate::host::{Document, Element, HostError, HostResult, Priority, StyleProp};

/// Observable state of a [`MemoryDocument`], comparable with `==`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentState {
    /// Current window scroll offset.
    pub scroll_y: f64,
    /// Inline styles by element and property, with their priority.
    pub styles: BTreeMap<(Element, StyleProp), (String, Priority)>,
    /// Class lists by element.
    pub classes: BTreeMap<Element, BTreeSet<String>>,
    /// Viewport meta content, `None` when the tag is absent.
    pub viewport: Option<String>,
}

/// In-memory page document.
#[derive(Debug)]
pub struct MemoryDocument {
    scroll_y: Cell<f64>,
    inner_width: Cell<f64>,
    client_width: Cell<f64>,
    styles: RefCell<BTreeMap<(Element, StyleProp), (String, Priority)>>,
    classes: RefCell<BTreeMap<Element, BTreeSet<String>>>,
    viewport: RefCell<Option<String>>,
    scroll_writes: RefCell<Vec<f64>>,
    resize_events: Cell<u32>,
    opened: RefCell<Vec<String>>,
    reject_writes: Cell<bool>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Create a document scrolled to the top, 1024px wide, no scrollbar, no
    /// viewport meta tag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scroll_y: Cell::new(0.0),
            inner_width: Cell::new(1024.0),
            client_width: Cell::new(1024.0),
            styles: RefCell::new(BTreeMap::new()),
            classes: RefCell::new(BTreeMap::new()),
            viewport: RefCell::new(None),
            scroll_writes: RefCell::new(Vec::new()),
            resize_events: Cell::new(0),
            opened: RefCell::new(Vec::new()),
            reject_writes: Cell::new(false),
        }
    }

    /// Start scrolled to `y`.
    #[must_use]
    pub fn with_scroll_y(self, y: f64) -> Self {
        self.scroll_y.set(y);
        self
    }

    /// Start with a viewport meta tag carrying `content`.
    #[must_use]
    pub fn with_viewport(self, content: impl Into<String>) -> Self {
        *self.viewport.borrow_mut() = Some(content.into());
        self
    }

    /// Window width including and excluding the vertical scrollbar.
    #[must_use]
    pub fn with_widths(self, inner: f64, client: f64) -> Self {
        self.inner_width.set(inner);
        self.client_width.set(client);
        self
    }

    /// Start with an inline style already set.
    #[must_use]
    pub fn with_style(self, element: Element, prop: StyleProp, value: impl Into<String>) -> Self {
        self.with_style_priority(element, prop, value, Priority::Normal)
    }

    /// Start with an inline style set at `priority`.
    #[must_use]
    pub fn with_style_priority(
        self,
        element: Element,
        prop: StyleProp,
        value: impl Into<String>,
        priority: Priority,
    ) -> Self {
        self.styles
            .borrow_mut()
            .insert((element, prop), (value.into(), priority));
        self
    }

    /// Start with a class already present.
    #[must_use]
    pub fn with_class(self, element: Element, class: impl Into<String>) -> Self {
        self.classes
            .borrow_mut()
            .entry(element)
            .or_default()
            .insert(class.into());
        self
    }

    /// Simulate the user scrolling.
    pub fn user_scroll(&self, y: f64) {
        self.scroll_y.set(y);
    }

    /// Make every subsequent mutation fail with [`HostError::Rejected`].
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }

    /// Snapshot of the observable document state.
    #[must_use]
    pub fn state(&self) -> DocumentState {
        DocumentState {
            scroll_y: self.scroll_y.get(),
            styles: self
                .styles
                .borrow()
                .iter()
                .map(|(k, v)| (*k, v.clone()))
                .collect(),
            classes: self
                .classes
                .borrow()
                .iter()
                .filter(|(_, set)| !set.is_empty())
                .map(|(k, set)| (*k, set.clone()))
                .collect(),
            viewport: self.viewport.borrow().clone(),
        }
    }

    /// Priority an inline style was written with.
    #[must_use]
    pub fn priority(&self, element: Element, prop: StyleProp) -> Option<Priority> {
        self.styles.borrow().get(&(element, prop)).map(|(_, p)| *p)
    }

    /// Every `scroll_to` target, in call order.
    #[must_use]
    pub fn scroll_writes(&self) -> Vec<f64> {
        self.scroll_writes.borrow().clone()
    }

    /// Number of synthetic resize events dispatched.
    #[must_use]
    pub fn resize_events(&self) -> u32 {
        self.resize_events.get()
    }

    /// URLs opened in a new browsing context.
    #[must_use]
    pub fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }

    fn check_writable(&self, op: &'static str) -> HostResult<()> {
        if self.reject_writes.get() {
            Err(HostError::rejected(op, "writes rejected by test host"))
        } else {
            Ok(())
        }
    }
}

impl Document for MemoryDocument {
    fn scroll_y(&self) -> f64 {
        self.scroll_y.get()
    }

    fn inner_width(&self) -> f64 {
        self.inner_width.get()
    }

    fn client_width(&self) -> f64 {
        self.client_width.get()
    }

    fn style(&self, element: Element, prop: StyleProp) -> Option<String> {
        self.styles
            .borrow()
            .get(&(element, prop))
            .map(|(v, _)| v.clone())
    }

    fn style_priority(&self, element: Element, prop: StyleProp) -> Priority {
        self.priority(element, prop).unwrap_or_default()
    }

    fn set_style(
        &self,
        element: Element,
        prop: StyleProp,
        value: &str,
        priority: Priority,
    ) -> HostResult<()> {
        self.check_writable("set_style")?;
        if value.is_empty() {
            self.styles.borrow_mut().remove(&(element, prop));
            return Ok(());
        }
        if element == Element::Body && prop == StyleProp::Position && value == "fixed" {
            self.scroll_y.set(0.0);
        }
        self.styles
            .borrow_mut()
            .insert((element, prop), (value.to_owned(), priority));
        Ok(())
    }

    fn remove_style(&self, element: Element, prop: StyleProp) -> HostResult<()> {
        self.check_writable("remove_style")?;
        self.styles.borrow_mut().remove(&(element, prop));
        Ok(())
    }

    fn has_class(&self, element: Element, class: &str) -> bool {
        self.classes
            .borrow()
            .get(&element)
            .is_some_and(|set| set.contains(class))
    }

    fn add_class(&self, element: Element, class: &str) -> HostResult<()> {
        self.check_writable("add_class")?;
        self.classes
            .borrow_mut()
            .entry(element)
            .or_default()
            .insert(class.to_owned());
        Ok(())
    }

    fn remove_class(&self, element: Element, class: &str) -> HostResult<()> {
        self.check_writable("remove_class")?;
        if let Some(set) = self.classes.borrow_mut().get_mut(&element) {
            set.remove(class);
        }
        Ok(())
    }

    fn viewport_meta(&self) -> Option<String> {
        self.viewport.borrow().clone()
    }

    fn set_viewport_meta(&self, content: &str) -> HostResult<()> {
        self.check_writable("set_viewport_meta")?;
        *self.viewport.borrow_mut() = Some(content.to_owned());
        Ok(())
    }

    fn remove_viewport_meta(&self) -> HostResult<()> {
        self.check_writable("remove_viewport_meta")?;
        *self.viewport.borrow_mut() = None;
        Ok(())
    }

    fn scroll_to(&self, y: f64) {
        self.scroll_writes.borrow_mut().push(y);
        self.scroll_y.set(y.max(0.0));
    }

    fn dispatch_resize(&self) {
        self.resize_events.set(self.resize_events.get() + 1);
    }

    fn open_external(&self, url: &str) -> HostResult<()> {
        self.check_writable("open_external")?;
        self.opened.borrow_mut().push(url.to_owned());
        Ok(())
    }
}
