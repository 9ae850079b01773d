//! End-to-end behaviour of the Kontakt routes, driven through
//! `Server::dispatch` without a socket.

use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode, Uri};
use http_body_util::BodyExt;
use kontakt::build_server;
use kontakt_config::KontaktConfig;
use kontakt_core::{DeploymentMode, GENERIC_BAD_REQUEST_MESSAGE};
use kontakt_registry::{ContactRegistry, DUPLICATE_CONTACT_MESSAGE};
use kontakt_server::Server;
use serde_json::{json, Value};

fn server(mode: DeploymentMode) -> Server {
    let config = KontaktConfig::builder().environment(mode).build();
    build_server(&config, Arc::new(ContactRegistry::new())).unwrap()
}

async fn call(server: &Server, method: Method, uri: &str, body: &str) -> (StatusCode, String) {
    let uri: Uri = uri.parse().unwrap();
    let response = server
        .dispatch(&method, &uri, Bytes::copy_from_slice(body.as_bytes()))
        .await;
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn get(server: &Server, uri: &str) -> (StatusCode, String) {
    call(server, Method::GET, uri, "").await
}

fn json_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn hello_named() {
    let server = server(DeploymentMode::Development);
    let (status, body) = get(&server, "/hello/alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hello 'alice' :)");
}

#[tokio::test]
async fn hello_rejects_short_long_and_symbolic_names() {
    let server = server(DeploymentMode::Development);
    let too_long = format!("/hello/{}", "x".repeat(31));
    for uri in ["/hello/ab", "/hello/a-b-c", too_long.as_str()] {
        let (status, _) = get(&server, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn hello_anonymous() {
    let server = server(DeploymentMode::Development);
    for uri in ["/hello", "/hello/"] {
        let (status, body) = get(&server, uri).await;
        assert_eq!(status, StatusCode::OK);
        let token = body
            .strip_prefix("Hello anonymous '")
            .and_then(|rest| rest.strip_suffix("' :)"))
            .unwrap();
        assert_eq!(token.len(), 8);
        assert!(token.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}

#[tokio::test]
async fn search_applies_defaults() {
    let server = server(DeploymentMode::Development);
    let (status, body) = get(&server, "/search?text=foo").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({ "text": "foo", "pageNumber": 1, "lang": "pl" }));
}

#[tokio::test]
async fn search_coerces_page_number() {
    let server = server(DeploymentMode::Development);
    let (status, body) = get(&server, "/search?text=foo&pageNumber=2&lang=gb").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({ "text": "foo", "pageNumber": 2, "lang": "gb" }));
}

#[tokio::test]
async fn search_rejects_bad_queries() {
    let server = server(DeploymentMode::Development);

    let (status, body) = get(&server, "/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body = json_body(&body);
    assert_eq!(body["error"]["details"]["source"], "query");
    assert_eq!(body["error"]["details"]["violations"][0]["path"], "text");
    assert_eq!(body["error"]["details"]["violations"][0]["constraint"], "required");

    for uri in ["/search?text=foo&lang=de", "/search?text=foo&pageNumber=abc"] {
        let (status, _) = get(&server, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn contacts_add_duplicate_and_list() {
    let server = server(DeploymentMode::Development);
    let payload = r#"{"contact":{"name":"Jan","surname":"Kowalski"}}"#;

    let (status, body) = call(&server, Method::POST, "/contacts", payload).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json_body(&body), json!({ "contact": { "name": "Jan", "surname": "Kowalski" } }));

    let (status, body) = call(&server, Method::POST, "/contacts", payload).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, DUPLICATE_CONTACT_MESSAGE);

    let (status, body) = get(&server, "/contacts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json_body(&body),
        json!({ "contacts": [{ "name": "Jan", "surname": "Kowalski" }] })
    );
}

#[tokio::test]
async fn contacts_identity_is_case_sensitive() {
    let server = server(DeploymentMode::Development);
    for payload in [
        r#"{"contact":{"name":"Jan","surname":"Kowalski"}}"#,
        r#"{"contact":{"name":"jan","surname":"Kowalski"}}"#,
    ] {
        let (status, _) = call(&server, Method::POST, "/contacts", payload).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = get(&server, "/contacts").await;
    assert_eq!(json_body(&body)["contacts"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn contacts_reject_invalid_payloads() {
    let server = server(DeploymentMode::Development);

    let (status, body) = call(&server, Method::POST, "/contacts", r#"{"contact":{"name":"Jan"}}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body = json_body(&body);
    assert_eq!(body["error"]["details"]["source"], "payload");
    assert_eq!(body["error"]["details"]["violations"][0]["path"], "contact.surname");

    let (status, body) = call(&server, Method::POST, "/contacts", r#"{"contact":{"name":"","surname":"X"}}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["error"]["details"]["violations"][0]["constraint"], "empty");

    let (status, body) = call(&server, Method::POST, "/contacts", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["error"]["details"]["violations"][0]["constraint"], "json");

    let (status, _) = call(&server, Method::POST, "/contacts", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = get(&server, "/contacts").await;
    assert_eq!(json_body(&body), json!({ "contacts": [] }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicate_inserts_store_one_contact() {
    let server = Arc::new(server(DeploymentMode::Development));
    let payload = r#"{"contact":{"name":"Anna","surname":"Nowak"}}"#;

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let server = Arc::clone(&server);
            tokio::spawn(async move { call(&server, Method::POST, "/contacts", payload).await.0 })
        })
        .collect();

    let mut created = 0;
    let mut conflicts = 0;
    for task in tasks {
        match task.await.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => conflicts += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(conflicts, 31);

    let (_, body) = get(&server, "/contacts").await;
    assert_eq!(json_body(&body)["contacts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn production_hides_violation_detail() {
    let server = server(DeploymentMode::Production);

    let (status, body) = get(&server, "/hello/ab").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body.contains("\"ab\""));
    assert!(!body.contains("min_length"));
    let body = json_body(&body);
    assert_eq!(body["error"]["message"], GENERIC_BAD_REQUEST_MESSAGE);
    assert!(body["error"].get("details").is_none());

    let (status, body) = call(&server, Method::POST, "/contacts", r#"{"contact":{"name":"Jan"}}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body.contains("surname"));
    assert!(!body.contains("required"));
}

#[tokio::test]
async fn development_returns_violation_detail() {
    let server = server(DeploymentMode::Development);

    let (status, body) = get(&server, "/hello/ab").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("\"ab\""));
    assert!(body.contains("min_length"));
}

#[tokio::test]
async fn unknown_route_and_wrong_method() {
    let server = server(DeploymentMode::Development);

    let (status, _) = get(&server, "/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&server, Method::DELETE, "/contacts", "").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    for uri in ["/hello//alice", "//contacts"] {
        let (status, _) = get(&server, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn routes_without_payload_schema_ignore_the_body() {
    for mode in [DeploymentMode::Production, DeploymentMode::Development] {
        let server = server(mode);

        let (status, body) = call(&server, Method::GET, "/contacts", "not json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body), json!({ "contacts": [] }));

        let (status, body) = call(&server, Method::GET, "/hello/alice", "not json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Hello 'alice' :)");

        let (status, _) = call(&server, Method::GET, "/search?text=x", "{oops").await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn documentation_describes_routes() {
    let server = server(DeploymentMode::Development);

    let (status, body) = get(&server, "/swagger.json").await;
    assert_eq!(status, StatusCode::OK);
    let spec = json_body(&body);
    assert_eq!(spec["info"]["title"], "kontakt");
    assert_eq!(spec["paths"]["/hello/{name}"]["get"]["parameters"][0]["required"], false);
    assert!(spec["paths"]["/contacts"]["post"]["responses"]["409"].is_object());
    assert_eq!(
        spec["paths"]["/search"]["get"]["parameters"]
            .as_array()
            .unwrap()
            .len(),
        3
    );

    let (status, body) = get(&server, "/documentation").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("swagger-ui"));
}
