//! Verify the person service against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, the request the service must send, a
//! simulated response, and either the expected decoded result or the expected
//! error message. Bodies are compared as parsed JSON so field order does not
//! matter.

use std::cell::RefCell;

use pessoa_core::{
    ApiClient, ClientConfig, DomainError, HttpMethod, HttpRequest, HttpResponse, Person, PersonApi, PersonId,
    PersonService, SavePerson, Transport, TransportFailure,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8080";

/// Replays one canned response and records the request that produced it.
struct Replay {
    response: HttpResponse,
    seen: RefCell<Option<HttpRequest>>,
}

impl Replay {
    fn new(simulated: &Value) -> Self {
        Self {
            response: HttpResponse::new(
                simulated["status"].as_u64().unwrap() as u16,
                simulated["body"].as_str().unwrap(),
            ),
            seen: RefCell::new(None),
        }
    }

    fn request(&self) -> HttpRequest {
        self.seen.borrow().clone().expect("no request was sent")
    }
}

impl Transport for Replay {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        *self.seen.borrow_mut() = Some(request.clone());
        Ok(self.response.clone())
    }
}

fn service(replay: &Replay) -> PersonService<&Replay> {
    PersonService::with_client(ApiClient::with_transport(ClientConfig::new(BASE_URL), replay))
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn load(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let pair = h.as_array().unwrap();
            (pair[0].as_str().unwrap().to_string(), pair[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    match expected.get("body") {
        Some(body) => {
            let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&sent, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn check_outcome<R>(name: &str, case: &Value, result: Result<R, DomainError>)
where
    R: PartialEq + std::fmt::Debug + serde::de::DeserializeOwned,
{
    match case.get("expected_error") {
        Some(expected) => {
            let err = result.unwrap_err();
            assert_eq!(err.message(), expected.as_str().unwrap(), "{name}: error message");
        }
        None => {
            let expected: R = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: decoded result");
        }
    }
}

#[test]
fn list_test_vectors() {
    for case in load(include_str!("../../test-vectors/list.json")) {
        let name = case["name"].as_str().unwrap();
        let replay = Replay::new(&case["simulated_response"]);

        let result = service(&replay).list_all();

        check_request(name, &replay.request(), &case["expected_request"]);
        check_outcome::<Vec<Person>>(name, &case, result);
    }
}

#[test]
fn get_test_vectors() {
    for case in load(include_str!("../../test-vectors/get.json")) {
        let name = case["name"].as_str().unwrap();
        let id = PersonId::new(case["input_key"].as_str().unwrap());
        let replay = Replay::new(&case["simulated_response"]);

        let result = service(&replay).get_by_id(&id);

        check_request(name, &replay.request(), &case["expected_request"]);
        check_outcome::<Person>(name, &case, result);
    }
}

#[test]
fn save_test_vectors() {
    for case in load(include_str!("../../test-vectors/save.json")) {
        let name = case["name"].as_str().unwrap();
        let input: SavePerson = serde_json::from_value(case["input"].clone()).unwrap();
        let replay = Replay::new(&case["simulated_response"]);

        let result = service(&replay).create_or_update(&input);

        check_request(name, &replay.request(), &case["expected_request"]);
        check_outcome::<Person>(name, &case, result);
    }
}

#[test]
fn delete_test_vectors() {
    for case in load(include_str!("../../test-vectors/delete.json")) {
        let name = case["name"].as_str().unwrap();
        let id = PersonId::new(case["input_key"].as_str().unwrap());
        let replay = Replay::new(&case["simulated_response"]);

        let result = service(&replay).delete(&id);

        check_request(name, &replay.request(), &case["expected_request"]);
        check_outcome::<bool>(name, &case, result);
    }
}
