//! Diagnostic events emitted by alternative switches
#![cfg(feature = "diagnostics")]

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

use tagged_variant::Variant;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Collects `LEVEL message` lines for every event.
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<String>>>);

struct Message(String);

impl Visit for Message {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for Capture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut message = Message(String::new());
        event.record(&mut message);
        let line = format!("{} {}", event.metadata().level(), message.0);
        self.0.lock().unwrap().push(line);
    }
}

#[test]
fn test_switches_and_valueless_transition_are_reported() {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let mut v = Variant::<(i64, String)>::new(1i64);
        v.assign(2i64);
        v.assign("text");
        let _ = catch_unwind(AssertUnwindSafe(|| {
            v.emplace_with::<0, _>(|| panic!("constructor failed"));
        }));
        assert!(v.is_valueless());
    });

    let lines = capture.0.lock().unwrap().clone();
    assert_eq!(
        lines,
        vec![
            "TRACE assign: alternative 0 -> 1".to_string(),
            "TRACE emplace: alternative 1 -> 0".to_string(),
            "DEBUG constructor panicked while switching to alternative 0; variant is valueless"
                .to_string(),
        ]
    );
}
