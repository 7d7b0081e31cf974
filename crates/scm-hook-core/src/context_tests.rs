//! Tests for the request correlation context.

use super::*;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

fn note_target() -> EventTarget {
    EventTarget {
        kind: EventKind::Note,
        merge_request_iid: 12,
        commit_sha: "0123abcd".to_string(),
    }
}

#[test]
fn test_enrich_copies_all_fields() {
    let ctx = RequestContext::enrich("group/project", note_target());

    assert_eq!(ctx.project_id(), "group/project");
    assert_eq!(ctx.merge_request_id(), 12);
    assert_eq!(ctx.commit_sha(), "0123abcd");
    assert_eq!(ctx.event_kind(), EventKind::Note);
}

#[test]
fn test_clones_are_equal() {
    let ctx = RequestContext::enrich("group/project", note_target());
    assert_eq!(ctx.clone(), ctx);
}

/// Records the fields of every span created while it is installed
#[derive(Clone, Default)]
struct SpanFieldRecorder {
    spans: Arc<Mutex<Vec<(String, HashMap<String, String>)>>>,
}

#[derive(Default)]
struct FieldMap(HashMap<String, String>);

impl Visit for FieldMap {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

impl<S: Subscriber> Layer<S> for SpanFieldRecorder {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        let mut fields = FieldMap::default();
        attrs.record(&mut fields);
        self.spans
            .lock()
            .unwrap()
            .push((attrs.metadata().name().to_string(), fields.0));
    }
}

#[test]
fn test_span_carries_all_correlation_fields() {
    let recorder = SpanFieldRecorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());

    let ctx = RequestContext::enrich("group/project", note_target());
    tracing::subscriber::with_default(subscriber, || {
        let _span = ctx.span();
    });

    let spans = recorder.spans.lock().unwrap();
    assert_eq!(spans.len(), 1);
    let (name, fields) = &spans[0];
    assert_eq!(name, "webhook");
    assert_eq!(fields["project"], "group/project");
    assert_eq!(fields["merge_request_id"], "12");
    assert_eq!(fields["commit_sha"], "0123abcd");
    assert_eq!(fields["event_type"], "note");
}
