#![forbid(unsafe_code)]
#![cfg(feature = "tracing")]

//! Tracing integration tests.
//!
//! Run with:
//!   cargo test -p scrim-runtime --features tracing --test tracing_tests

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use scrim_core::{MemoryDocument, ScrimConfig};
use scrim_runtime::{LockProfile, MenuSet, Page};
use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    fields: HashMap<String, String>,
}

/// A tracing Layer that records every event.
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let mut fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.remove("message").unwrap_or_default();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields,
        });
    }
}

fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<CapturedEvent>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: Arc::clone(&events),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    let out = tracing::subscriber::with_default(subscriber, f);
    let events = events.lock().unwrap().clone();
    (out, events)
}

fn messages(events: &[CapturedEvent]) -> Vec<&str> {
    events.iter().map(|e| e.message.as_str()).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn lease_transitions_are_logged() {
    let doc = Rc::new(MemoryDocument::new().with_scroll_y(80.0));
    let page = Page::new(doc, ScrimConfig::default());

    let ((), events) = capture(|| {
        let modal = page.scroll_lock(LockProfile::modal());
        let viewer = page.viewport_guard(LockProfile::image_viewer());
        modal.suspend();
        viewer.suspend();
        viewer.resume();
        modal.resume();
    });

    let msgs = messages(&events);
    assert!(msgs.contains(&"document lease acquired"));
    assert!(msgs.contains(&"document lease joined"));
    assert!(msgs.contains(&"document lease retained by other locks"));
    assert!(msgs.contains(&"document lease released"));

    let acquired = events
        .iter()
        .find(|e| e.message == "document lease acquired")
        .unwrap();
    assert_eq!(acquired.level, tracing::Level::DEBUG);
    assert_eq!(acquired.fields.get("marker").map(String::as_str), Some("modal-open"));
}

#[test]
fn rejected_writes_warn() {
    let doc = Rc::new(MemoryDocument::new());
    doc.set_reject_writes(true);
    let page = Page::new(doc, ScrimConfig::default());

    let ((), events) = capture(|| {
        page.scroll_lock(LockProfile::modal()).suspend();
    });

    let warnings: Vec<_> = events
        .iter()
        .filter(|e| e.level == tracing::Level::WARN)
        .collect();
    assert!(!warnings.is_empty());
    assert!(warnings.iter().all(|e| e.message == "host write failed"));
}

#[test]
fn menu_memory_is_logged() {
    let page = Page::headless(ScrimConfig::default());

    let ((), events) = capture(|| {
        page.menus().close_menus_for_popup(MenuSet::MEMORIES);
        page.menus().restore_menu_state();
        page.menus().restore_menu_state();
    });

    assert_eq!(
        messages(&events),
        vec![
            "menu state stored",
            "menus closed for popup, state stored",
            "restoring menu state",
            "no menu state to restore",
        ]
    );
}
