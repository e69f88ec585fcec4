#![forbid(unsafe_code)]

//! Host document abstraction.
//!
//! The page document and its window are a single global resource shared by
//! every overlay. [`Document`] is the seam between the coordination logic and
//! that resource: the browser implementation lives in `scrim-web`,
//! [`MemoryDocument`](crate::memory_host::MemoryDocument) is the in-memory
//! double used by tests and headless hosts.
//!
//! # Failure Modes
//!
//! | Failure                    | Cause                              | Caller behavior        |
//! |----------------------------|------------------------------------|------------------------|
//! | `HostError::Unavailable`   | No document (detached, torn down)  | Operation skipped      |
//! | `HostError::Rejected`      | Platform refused the write         | Logged, next step runs |

use std::fmt;

/// Element whose inline style or class list is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Element {
    /// The `<html>` element.
    Root,
    /// The `<body>` element.
    Body,
}

impl Element {
    /// Tag name, for logs.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Root => "html",
            Self::Body => "body",
        }
    }
}

/// Inline style properties managed by the scroll lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StyleProp {
    Overflow,
    Position,
    Top,
    Width,
    TouchAction,
    ScrollBehavior,
    PaddingRight,
}

impl StyleProp {
    /// CSS property name as used by `setProperty` / `removeProperty`.
    #[must_use]
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::Overflow => "overflow",
            Self::Position => "position",
            Self::Top => "top",
            Self::Width => "width",
            Self::TouchAction => "touch-action",
            Self::ScrollBehavior => "scroll-behavior",
            Self::PaddingRight => "padding-right",
        }
    }
}

/// Priority of an inline style declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    #[default]
    Normal,
    /// `!important`.
    Important,
}

impl Priority {
    /// Priority string for `CSSStyleDeclaration.setProperty`.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Normal => "",
            Self::Important => "important",
        }
    }
}

impl Priority {
    /// Parse the string returned by `getPropertyPriority`.
    #[must_use]
    pub fn from_css(priority: &str) -> Self {
        if priority.eq_ignore_ascii_case("important") {
            Self::Important
        } else {
            Self::Normal
        }
    }
}

/// An inline declaration: value plus priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineStyle {
    pub value: String,
    pub priority: Priority,
}

impl InlineStyle {
    #[must_use]
    pub fn new(value: impl Into<String>, priority: Priority) -> Self {
        Self {
            value: value.into(),
            priority,
        }
    }
}

/// Host document error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The document or window is not reachable.
    Unavailable(&'static str),
    /// The platform rejected a mutation.
    Rejected {
        /// Operation that failed, e.g. `"set_style"`.
        op: &'static str,
        /// Platform-provided detail.
        detail: String,
    },
}

impl HostError {
    /// Build a [`HostError::Rejected`].
    #[must_use]
    pub fn rejected(op: &'static str, detail: impl Into<String>) -> Self {
        Self::Rejected {
            op,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(what) => write!(f, "host unavailable: {what}"),
            Self::Rejected { op, detail } => write!(f, "{op} rejected: {detail}"),
        }
    }
}

impl std::error::Error for HostError {}

/// Result type for host mutations.
pub type HostResult<T> = Result<T, HostError>;

/// The page document and window, as seen by the overlay core.
///
/// All methods take `&self`: implementations wrap platform handles that are
/// mutated through shared references (the DOM) or use interior mutability.
pub trait Document {
    /// Current vertical scroll offset in CSS pixels.
    fn scroll_y(&self) -> f64;

    /// Window inner width including the scrollbar.
    fn inner_width(&self) -> f64;

    /// Root element client width excluding the scrollbar.
    fn client_width(&self) -> f64;

    /// Inline style value, `None` when the property is not set inline.
    fn style(&self, element: Element, prop: StyleProp) -> Option<String>;

    /// Priority of an inline declaration; `Normal` when it is not set.
    fn style_priority(&self, element: Element, prop: StyleProp) -> Priority;

    /// Set an inline style property.
    fn set_style(
        &self,
        element: Element,
        prop: StyleProp,
        value: &str,
        priority: Priority,
    ) -> HostResult<()>;

    /// Remove an inline style property.
    fn remove_style(&self, element: Element, prop: StyleProp) -> HostResult<()>;

    /// Whether `class` is present on the element.
    fn has_class(&self, element: Element, class: &str) -> bool;

    /// Add a class to the element's class list.
    fn add_class(&self, element: Element, class: &str) -> HostResult<()>;

    /// Remove a class from the element's class list.
    fn remove_class(&self, element: Element, class: &str) -> HostResult<()>;

    /// Content of `meta[name="viewport"]`, `None` when the tag is absent.
    fn viewport_meta(&self) -> Option<String>;

    /// Set the viewport meta content, creating the tag if it is absent.
    fn set_viewport_meta(&self, content: &str) -> HostResult<()>;

    /// Remove the viewport meta tag if present.
    fn remove_viewport_meta(&self) -> HostResult<()>;

    /// Scroll the window to vertical offset `y` without smooth scrolling.
    fn scroll_to(&self, y: f64);

    /// Dispatch a synthetic `resize` event on the window.
    fn dispatch_resize(&self);

    /// Open `url` in a new browsing context.
    fn open_external(&self, url: &str) -> HostResult<()>;

    /// Inline declaration with its priority, `None` when not set inline.
    fn inline_style(&self, element: Element, prop: StyleProp) -> Option<InlineStyle> {
        self.style(element, prop)
            .map(|value| InlineStyle::new(value, self.style_priority(element, prop)))
    }

    /// Width of the vertical scrollbar, never negative.
    fn scrollbar_width(&self) -> f64 {
        (self.inner_width() - self.client_width()).max(0.0)
    }
}
