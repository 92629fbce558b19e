use dashflow::network::TraceContext;
use dashflow::observability::{init_tracing, TRACE_FILE};
use dashflow::Config;
use std::fs;

// One test per binary: the subscriber is process-global.
#[test]
fn spans_are_exported_to_the_trace_file_and_linked_to_requests() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        trace_level: Some("debug".to_string()),
        data_dir: Some(dir.path().join("nested")),
        ..Config::default()
    };

    let trace_file = init_tracing(&config).expect("subscriber installed");
    assert_eq!(trace_file, dir.path().join("nested").join(TRACE_FILE));
    assert_eq!(init_tracing(&config), None);

    let context = tracing::debug_span!("issue_listing").in_scope(TraceContext::from_current);
    let context = context.expect("span context captured");
    assert_eq!(context.trace_id.len(), 32);
    assert_eq!(context.parent_span_id.len(), 16);
    assert_eq!(TraceContext::from_current(), None);

    let contents = fs::read_to_string(&trace_file).unwrap();
    let line = contents.lines().find(|l| l.contains("issue_listing")).expect("span exported");
    let doc: serde_json::Value = serde_json::from_str(line).unwrap();
    let span = &doc["resourceSpans"][0]["scopeSpans"][0]["spans"][0];
    assert_eq!(span["name"], "issue_listing");
    assert_eq!(span["traceId"], context.trace_id.as_str());
}
