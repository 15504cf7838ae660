//! Verify operations and reshaping against JSON test vectors in `test-vectors/`.
//!
//! Request vectors describe the operation, its arguments, the expected
//! request, a simulated response and the expected result or error. Comparing
//! parsed JSON (not raw strings) avoids false negatives from field ordering.

use serde::Serialize;
use serde_json::Value;
use sky_core::{
    denormalize, normalize, AggregateRow, Event, FromLooseInput, HttpMethod, HttpRequest,
    HttpResponse, InsertionMode, Operation, Property, Query, SkyClient, SkyError, Table,
};

type Finish = Box<dyn FnOnce(&HttpResponse) -> Result<Value, SkyError>>;

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn erase<T: Serialize + 'static>(operation: Operation<T>) -> (HttpRequest, Finish) {
    let request = operation.request().clone();
    let finish: Finish = Box::new(move |response| {
        operation
            .finish(response)
            .map(|value| serde_json::to_value(value).unwrap())
    });
    (request, finish)
}

fn build(
    client: &SkyClient,
    operation: &str,
    args: &Value,
) -> Result<(HttpRequest, Finish), SkyError> {
    let table = || Table::from_loose_input(args["table"].clone());
    let text = |key: &str| args[key].as_str().unwrap_or_default().to_string();
    Ok(match operation {
        "get_tables" => erase(client.get_tables()),
        "create_table" => erase(client.create_table(&table()?)?),
        "delete_table" => erase(client.delete_table(&table()?)?),
        "create_property" => {
            let property = Property::from_loose_input(args["property"].clone())?;
            erase(client.create_property(&table()?, &property)?)
        }
        "get_property" => erase(client.get_property(&table()?, &text("name"))?),
        "add_event" => {
            let mode = match args["mode"].as_str() {
                Some(name) => name.parse::<InsertionMode>()?,
                None => InsertionMode::default(),
            };
            let event = Event::from_loose_input(args["event"].clone())?;
            erase(client.add_event(&table()?, &text("object_id"), &event, mode)?)
        }
        "delete_event" => {
            let event = Event::from_loose_input(args["event"].clone())?;
            erase(client.delete_event(&table()?, &text("object_id"), &event)?)
        }
        "merge_objects" => erase(client.merge_objects(&table()?, &text("dest"), &text("src"))?),
        "query" => {
            let query = Query::from_loose_input(args["query"].clone())?;
            erase(client.query(&table()?, &query)?)
        }
        "stats" => erase(client.stats(&table()?)?),
        "ping" => erase(client.ping()),
        other => panic!("unknown operation: {other}"),
    })
}

fn assert_error(name: &str, err: &SkyError, expected: &str) {
    match expected.split_once(':') {
        Some(("Server", status)) => {
            let status: u16 = status.parse().unwrap();
            assert_eq!(err.status(), Some(status), "{name}: status");
        }
        _ => match expected {
            "MissingArgument" => {
                assert!(matches!(err, SkyError::MissingArgument(_)), "{name}: {err}")
            }
            "InvalidInsertionMode" => {
                assert!(matches!(err, SkyError::InvalidInsertionMode(_)), "{name}: {err}")
            }
            other => panic!("{name}: unknown expected_error: {other}"),
        },
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = SkyClient::default();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let built = build(&c, case["operation"].as_str().unwrap(), &case["args"]);

        let Some(expected_req) = case.get("expected_request") else {
            // Local failure: nothing may have been built.
            let err = built.err().unwrap_or_else(|| panic!("{name}: expected a local error"));
            assert_error(name, &err, case["expected_error"].as_str().unwrap());
            continue;
        };

        let (req, finish) = built.unwrap_or_else(|e| panic!("{name}: build failed: {e}"));
        let method = parse_method(expected_req["method"].as_str().unwrap());
        assert_eq!(req.method, method, "{name}: method");
        assert_eq!(req.path, expected_req["path"].as_str().unwrap(), "{name}: path");
        match expected_req.get("body") {
            Some(expected_body) => {
                let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(&body, expected_body, "{name}: body");
            }
            None => assert!(req.body.is_none(), "{name}: body should be None"),
        }

        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        };
        let result = finish(&response);

        if let Some(expected_error) = case.get("expected_error") {
            assert_error(name, &result.unwrap_err(), expected_error.as_str().unwrap());
        } else {
            assert_eq!(result.unwrap(), case["expected_result"], "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

fn strings(value: &Value) -> Vec<String> {
    serde_json::from_value(value.clone()).unwrap()
}

#[test]
fn denormalize_test_vectors() {
    let raw = include_str!("../../test-vectors/aggregates.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["denormalize"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let dims = strings(&case["dimensions"]);
        let rows = denormalize(&case["tree"], &dims).unwrap();
        let expected: Vec<AggregateRow> =
            serde_json::from_value(case["expected_rows"].clone()).unwrap();
        assert_eq!(rows, expected, "{name}: rows");
    }
}

#[test]
fn normalize_test_vectors() {
    let raw = include_str!("../../test-vectors/aggregates.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["normalize"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let rows: Vec<AggregateRow> = serde_json::from_value(case["rows"].clone()).unwrap();
        let dims = strings(&case["dimensions"]);
        let metrics = strings(&case["metrics"]);

        let tree = normalize(&rows, &dims, &metrics).unwrap();
        assert_eq!(tree, case["expected_tree"], "{name}: tree");
        assert_eq!(denormalize(&tree, &dims).unwrap(), rows, "{name}: round trip");
    }
}
