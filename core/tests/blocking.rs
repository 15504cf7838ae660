//! `BlockingClient` against a recording stub transport.

mod common;

use common::{RecordingTransport, Reply};
use serde_json::json;
use sky_core::{
    parse_timestamp, BlockingClient, DataType, Endpoint, Event, HttpMethod, InsertionMode, Property,
    Query, SkyError, Table,
};

fn client(transport: &RecordingTransport) -> BlockingClient<&RecordingTransport> {
    BlockingClient::new(Endpoint::default(), transport)
}

fn table() -> Table {
    Table::new("sky-integration")
}

fn event(ts: &str) -> Event {
    Event::new(parse_timestamp(ts).unwrap())
}

#[test]
fn missing_arguments_never_reach_transport() {
    let transport = RecordingTransport::default();
    let c = client(&transport);
    let nameless = Table::new("");

    assert!(matches!(c.get_table(""), Err(SkyError::MissingArgument(_))));
    assert!(matches!(c.create_table(&nameless), Err(SkyError::MissingArgument(_))));
    assert!(matches!(c.get_properties(&nameless), Err(SkyError::MissingArgument(_))));
    assert!(matches!(
        c.delete_property(&table(), &Property::new("", DataType::String)),
        Err(SkyError::MissingArgument("property name"))
    ));
    assert!(matches!(
        c.get_events(&table(), ""),
        Err(SkyError::MissingArgument("object identifier"))
    ));
    assert!(matches!(
        c.add_event(&table(), "", &event("2013-01-01T00:00:00Z"), InsertionMode::Merge),
        Err(SkyError::MissingArgument(_))
    ));
    assert!(matches!(c.merge_objects(&table(), "a", ""), Err(SkyError::MissingArgument(_))));
    assert!(matches!(c.stats(&nameless), Err(SkyError::MissingArgument(_))));

    assert_eq!(transport.calls(), 0);
}

#[test]
fn unknown_insertion_mode_fails_before_any_request() {
    let transport = RecordingTransport::default();
    let err = "overwrite".parse::<InsertionMode>().unwrap_err();
    assert!(matches!(err, SkyError::InvalidInsertionMode(_)));
    assert_eq!(transport.calls(), 0);
}

#[test]
fn replace_sends_put_and_merge_sends_patch() {
    let reply = r#"{"timestamp":"2013-01-01T01:00:00.000000Z","data":{"age":50}}"#;
    let transport =
        RecordingTransport::replying([Reply::Status(200, reply), Reply::Status(200, reply)]);
    let c = client(&transport);
    let e = event("2013-01-01T01:00:00Z").with("age", 50);

    c.add_event(&table(), "obj1", &e, InsertionMode::Replace).unwrap();
    let back = c.add_event(&table(), "obj1", &e, InsertionMode::default()).unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].method, HttpMethod::Put);
    assert_eq!(requests[1].method, HttpMethod::Patch);
    assert_eq!(
        requests[0].path,
        "/tables/sky-integration/objects/obj1/events/2013-01-01T01:00:00.000000Z"
    );
    assert_eq!(back, e);
}

#[test]
fn each_operation_issues_exactly_one_request() {
    let transport = RecordingTransport::replying([
        Reply::Status(200, r#"[{"name":"a"},{"name":"b"}]"#),
        Reply::Status(200, r#"{"count":5}"#),
        Reply::Status(200, ""),
    ]);
    let c = client(&transport);

    let tables = c.get_tables().unwrap();
    assert_eq!(tables, vec![Table::new("a"), Table::new("b")]);
    assert_eq!(c.stats(&table()).unwrap(), json!({"count": 5}));
    c.delete_table(&table()).unwrap();

    let methods: Vec<HttpMethod> = transport.requests().iter().map(|r| r.method).collect();
    assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Get, HttpMethod::Delete]);
}

#[test]
fn step_sequences_are_wrapped_before_sending() {
    let transport = RecordingTransport::ok(r#"{"count":5}"#);
    let c = client(&transport);
    let steps = Query::Steps(vec![json!({
        "type": "selection",
        "fields": [{"name": "count", "expression": "count()"}]
    })]);

    assert_eq!(c.query(&table(), &steps).unwrap(), json!({"count": 5}));

    let sent: serde_json::Value =
        serde_json::from_str(transport.requests()[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(
        sent,
        json!({"steps": [{
            "type": "selection",
            "fields": [{"name": "count", "expression": "count()"}]
        }]})
    );
}

#[test]
fn server_errors_carry_status_and_message() {
    let not_found = r#"{"message":"table not found: nope"}"#;
    let transport = RecordingTransport::replying([Reply::Status(404, not_found)]);
    let err = client(&transport).get_table("nope").unwrap_err();
    match err {
        SkyError::Server { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message.as_deref(), Some("table not found: nope"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn connection_failures_propagate_without_retry() {
    let transport = RecordingTransport::replying([Reply::Unreachable, Reply::Status(200, "[]")]);
    let err = client(&transport).get_tables().unwrap_err();
    assert!(matches!(err, SkyError::Connection(_)));
    assert_eq!(transport.calls(), 1);
}

#[test]
fn ping_is_true_only_for_2xx() {
    let transport = RecordingTransport::ok(r#"{"message":"ok"}"#);
    assert!(client(&transport).ping());
    assert_eq!(transport.requests()[0].path, "/ping");

    let transport = RecordingTransport::replying([Reply::Status(500, "oops")]);
    assert!(!client(&transport).ping());

    let transport = RecordingTransport::replying([Reply::Unreachable]);
    assert!(!client(&transport).ping());
}

#[test]
fn ping_accepts_plain_text_success() {
    let transport = RecordingTransport::ok("pong");
    assert!(client(&transport).ping());
}

#[test]
fn deletes_accept_non_json_success_bodies() {
    let transport =
        RecordingTransport::replying([Reply::Status(200, "OK"), Reply::Status(200, "OK")]);
    client(&transport).delete_table(&table()).unwrap();
    client(&transport).merge_objects(&table(), "a", "b").unwrap();
    assert_eq!(transport.calls(), 2);
}

#[test]
fn property_round_trip_uses_server_copy() {
    let transport =
        RecordingTransport::ok(r#"{"name":"action","transient":true,"data_type":"factor"}"#);
    let property = Property::new("action", DataType::Factor).transient(true);
    let created = client(&transport).create_property(&table(), &property).unwrap();
    assert_eq!(created, property);
    assert_eq!(transport.requests()[0].path, "/tables/sky-integration/properties");
}
