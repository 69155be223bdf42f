//! Verify the connection pipeline against JSON test vectors stored in
//! `test-vectors/`.
//!
//! `requests.json` pins the wire request each verb produces; `responses.json`
//! pins how raw responses decode or fail. Comparing parsed JSON (not raw
//! strings) avoids false negatives from field-ordering differences.

use std::sync::Mutex;

use connection_core::{
    Connection, ErrorCause, Headers, HttpMethod, HttpRequest, HttpResponse, Query, Transport,
    TransportError,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

/// Records the last request and answers every call with `{}`.
#[derive(Default)]
struct CapturingTransport {
    last: Mutex<Option<HttpRequest>>,
}

impl Transport for CapturingTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        *self.last.lock().unwrap() = Some(request.clone());
        Ok(HttpResponse::new(200, "{}"))
    }
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn parse_headers(raw: &Value) -> Headers {
    raw.as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let transport = CapturingTransport::default();
    let conn = Connection::new(BASE_URL, &transport);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let call = &case["call"];
        let path = call["path"].as_str().unwrap();

        match call["verb"].as_str().unwrap() {
            "get" => {
                let params = call.get("params").map(Query::from_json);
                conn.get(path, params.as_ref()).unwrap();
            }
            "delete" => {
                conn.delete(path).unwrap();
            }
            "post" => {
                conn.post(path, &call["data"]).unwrap();
            }
            "put" => {
                conn.put(path, &call["data"]).unwrap();
            }
            other => panic!("{name}: unknown verb {other}"),
        }

        let req = transport.last.lock().unwrap().take().unwrap();
        let expected = &case["expected_request"];
        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");
        assert_eq!(req.headers, parse_headers(&expected["headers"]), "{name}: headers");

        if expected["body"].is_null() {
            assert!(req.body.is_none(), "{name}: body should be None");
        } else {
            let text = req.body.as_ref().and_then(|b| b.as_json()).unwrap();
            let body: Value = serde_json::from_str(text).unwrap();
            assert_eq!(body, expected["body"], "{name}: body");
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let transport = CapturingTransport::default();
    let conn = Connection::new(BASE_URL, &transport);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let response = HttpResponse::new(
            sim["status"].as_u64().unwrap() as u16,
            sim["body"].as_str().unwrap(),
        );
        let result = conn.parse_response(&response);

        if let Some(expected) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(err.message(), expected["message"].as_str().unwrap(), "{name}: message");
            assert_eq!(
                err.response_status().map(u64::from),
                expected["status"].as_u64(),
                "{name}: status"
            );
            assert_eq!(
                err.response_body().cloned().unwrap_or(Value::Null),
                expected["body"],
                "{name}: body"
            );
            match expected["cause"].as_str().unwrap() {
                "Rejected" => assert!(matches!(err.cause(), Some(ErrorCause::Rejected(_))), "{name}: cause"),
                "Decode" => assert!(matches!(err.cause(), Some(ErrorCause::Decode(_))), "{name}: cause"),
                other => panic!("{name}: unknown cause: {other}"),
            }
        } else {
            assert_eq!(result.unwrap(), case["expected_result"], "{name}: parsed result");
        }
    }

    assert!(transport.last.lock().unwrap().is_none(), "parse_response must not send");
}
