//! Verify request building and response parsing against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Bodies are compared as parsed JSON, not raw strings.

use std::cell::RefCell;

use drone_client::{
    ApiError, ApiResponse, ClientConfig, DroneClient, Failure, HttpMethod, HttpRequest,
    HttpResponse, QueryOptions, Transport,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8080";

/// Captures requests and answers every call with an empty JSON object.
#[derive(Default)]
struct Capture {
    requests: RefCell<Vec<HttpRequest>>,
}

impl Transport for Capture {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.borrow_mut().push(request.clone());
        Ok(HttpResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: "{}".to_string(),
        })
    }
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn str_arg<'a>(args: &'a Value, key: &str) -> &'a str {
    args[key].as_str().unwrap_or_else(|| panic!("missing string arg {key}"))
}

fn num_arg(args: &Value, key: &str) -> u64 {
    args[key].as_u64().unwrap_or_else(|| panic!("missing numeric arg {key}"))
}

fn opts_arg(args: &Value) -> QueryOptions {
    args["opts"]
        .as_array()
        .unwrap()
        .iter()
        .fold(QueryOptions::new(), |opts, pair| {
            opts.add(pair[0].as_str().unwrap(), pair[1].as_str().unwrap())
        })
}

/// Invoke the named operation with arguments taken from the vector.
fn dispatch(c: &DroneClient<&Capture>, operation: &str, args: &Value) -> ApiResponse {
    let owner = || str_arg(args, "owner");
    let repo = || str_arg(args, "repo");
    let result = match operation {
        "get_repo_list" => c.get_repo_list(&opts_arg(args)),
        "get_repo" => c.get_repo(owner(), repo()),
        "activate_repo" => c.activate_repo(owner(), repo()),
        "update_repo" => c.update_repo(owner(), repo(), &args["data"]),
        "delete_repo" => c.delete_repo(owner(), repo()),
        "get_build_list" => c.get_build_list(owner(), repo(), &opts_arg(args)),
        "get_build" => c.get_build(owner(), repo(), num_arg(args, "number")),
        "get_build_feed" => c.get_build_feed(&opts_arg(args)),
        "cancel_build" => c.cancel_build(owner(), repo(), num_arg(args, "number")),
        "approve_build" => {
            c.approve_build(owner(), repo(), num_arg(args, "build"), num_arg(args, "stage"))
        }
        "decline_build" => {
            c.decline_build(owner(), repo(), num_arg(args, "build"), num_arg(args, "stage"))
        }
        "restart_build" => {
            c.restart_build(owner(), repo(), num_arg(args, "build"), &opts_arg(args))
        }
        "get_logs" => c.get_logs(
            owner(),
            repo(),
            num_arg(args, "build"),
            num_arg(args, "stage"),
            num_arg(args, "step"),
        ),
        "get_secret_list" => c.get_secret_list(owner(), repo()),
        "create_secret" => c.create_secret(owner(), repo(), &args["data"]),
        "update_secret" => c.update_secret(owner(), repo(), str_arg(args, "name"), &args["data"]),
        "delete_secret" => c.delete_secret(owner(), repo(), str_arg(args, "name")),
        "get_registry_list" => c.get_registry_list(owner(), repo()),
        "create_registry" => c.create_registry(owner(), repo(), &args["data"]),
        "delete_registry" => c.delete_registry(owner(), repo(), str_arg(args, "address")),
        "synchronize" => c.synchronize(),
        "sign" => c.sign(owner(), repo(), str_arg(args, "data")),
        "get_self" => c.get_self(),
        "get_token" => c.get_token(),
        other => panic!("unknown operation: {other}"),
    };
    result.unwrap()
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

#[test]
fn endpoint_test_vectors() {
    let raw = include_str!("../../test-vectors/endpoints.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let capture = Capture::default();
    let c = DroneClient::with_transport(ClientConfig::new(BASE_URL, "tok"), &capture);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected_req = &case["expected_request"];

        let response = dispatch(&c, case["operation"].as_str().unwrap(), &case["args"]);
        assert_eq!(response, ApiResponse::Json("\"{}\"".to_string()), "{name}: response");

        let req = capture.requests.borrow().last().cloned().unwrap();
        assert_eq!(
            req.method,
            parse_method(expected_req["method"].as_str().unwrap()),
            "{name}: method"
        );
        assert_eq!(
            req.url,
            format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()),
            "{name}: path"
        );
        assert_eq!(req.header("authorization"), Some("Bearer tok"), "{name}: auth");

        match expected_req.get("body") {
            Some(expected_body) => {
                let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(&body, expected_body, "{name}: body");
                assert_eq!(req.header("content-type"), Some("application/json"), "{name}");
            }
            None => {
                assert!(req.body.is_none(), "{name}: body should be None");
                assert_eq!(req.header("content-type"), None, "{name}");
            }
        }
    }

    assert_eq!(
        capture.requests.borrow().len(),
        vectors["cases"].as_array().unwrap().len()
    );
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let capture = Capture::default();
    let c = DroneClient::with_transport(ClientConfig::new(BASE_URL, ""), &capture);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let response = HttpResponse {
            status: case["status"].as_u64().unwrap() as u16,
            headers: case["content_type"]
                .as_str()
                .map(|ct| vec![("Content-Type".to_string(), ct.to_string())])
                .unwrap_or_default(),
            body: case["body"].as_str().unwrap().to_string(),
        };
        let parsed = c.parse_response(response).unwrap();

        let expected = &case["expected"];
        let expected = match expected["kind"].as_str().unwrap() {
            "Json" => ApiResponse::Json(expected["content"].as_str().unwrap().to_string()),
            "Text" => ApiResponse::Text(expected["content"].as_str().unwrap().to_string()),
            "Failure" => ApiResponse::Failure(Failure {
                status: expected["status"].as_u64().unwrap() as u16,
                message: expected["message"].as_str().unwrap().to_string(),
            }),
            other => panic!("{name}: unknown kind {other}"),
        };
        assert_eq!(parsed, expected, "{name}");
    }
}
