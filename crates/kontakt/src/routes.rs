//! Route table and server assembly.

use std::sync::Arc;

use http::{Method, StatusCode};
use kontakt_config::KontaktConfig;
use kontakt_core::{FieldSchema, ResponseContent, ResponseDoc, RouteSpec, ValidationSchema};
use kontakt_registry::ContactRegistry;
use kontakt_server::{Server, ServerConfig, ServerError};
use serde_json::json;

use crate::handlers::{contacts, greeting, search};

const NAME_MIN_LENGTH: usize = 3;
const NAME_MAX_LENGTH: usize = 30;

fn contact_schema() -> ValidationSchema {
    ValidationSchema::new()
        .field(
            "name",
            FieldSchema::string()
                .required()
                .description("First name")
                .example(json!("Jan")),
        )
        .field(
            "surname",
            FieldSchema::string()
                .required()
                .description("Last name")
                .example(json!("Kowalski")),
        )
}

fn hello_route() -> RouteSpec {
    RouteSpec::new(Method::GET, "/hello/{name?}", "hello", greeting::hello)
        .summary("Greet a user")
        .description("Greets the named user, or an anonymous one with a random token.")
        .tag("greeting")
        .params_schema(
            ValidationSchema::new().field(
                "name",
                FieldSchema::string()
                    .alphanum()
                    .min_length(NAME_MIN_LENGTH)
                    .max_length(NAME_MAX_LENGTH)
                    .description("Name to greet"),
            ),
        )
        .response(ResponseDoc::new(StatusCode::OK, "Greeting", ResponseContent::Text))
}

fn search_route() -> RouteSpec {
    RouteSpec::new(Method::GET, "/search", "search", search::search)
        .summary("Echo a search query")
        .tag("search")
        .query_schema(
            ValidationSchema::new()
                .field("text", FieldSchema::string().required().description("Search phrase"))
                .field(
                    "pageNumber",
                    FieldSchema::number().default_value(json!(1)).description("Page to return"),
                )
                .field(
                    "lang",
                    FieldSchema::string()
                        .one_of(["pl", "gb"])
                        .default_value(json!("pl"))
                        .description("Result language"),
                ),
        )
        .response(ResponseDoc::new(
            StatusCode::OK,
            "The validated query",
            ResponseContent::Json(None),
        ))
}

fn list_contacts_route(registry: Arc<ContactRegistry>) -> RouteSpec {
    RouteSpec::new(Method::GET, "/contacts", "listContacts", move |ctx, req| {
        contacts::list(Arc::clone(&registry), ctx, req)
    })
    .summary("List contacts")
    .tag("contacts")
    .response(ResponseDoc::new(
        StatusCode::OK,
        "All contacts in insertion order",
        ResponseContent::Json(None),
    ))
}

fn add_contact_route(registry: Arc<ContactRegistry>) -> RouteSpec {
    RouteSpec::new(Method::POST, "/contacts", "addContact", move |ctx, req| {
        contacts::add(Arc::clone(&registry), ctx, req)
    })
    .summary("Add a contact")
    .tag("contacts")
    .payload_schema(
        ValidationSchema::new().field("contact", FieldSchema::object(contact_schema()).required()),
    )
    .response(ResponseDoc::new(
        StatusCode::CREATED,
        "The stored contact",
        ResponseContent::Json(Some(
            ValidationSchema::new().field("contact", FieldSchema::object(contact_schema())),
        )),
    ))
    .response(ResponseDoc::new(
        StatusCode::CONFLICT,
        "A contact with the same name and surname exists",
        ResponseContent::Text,
    ))
}

/// Builds the service routes around a shared registry.
#[must_use]
pub fn build_routes(registry: Arc<ContactRegistry>) -> Vec<RouteSpec> {
    vec![
        hello_route(),
        search_route(),
        list_contacts_route(Arc::clone(&registry)),
        add_contact_route(registry),
    ]
}

/// Maps the loaded configuration onto the server settings.
#[must_use]
pub fn server_config(config: &KontaktConfig) -> ServerConfig {
    ServerConfig::builder()
        .http_addr(config.server.http_addr.clone())
        .shutdown_timeout(config.shutdown_timeout())
        .request_timeout(config.request_timeout())
        .docs_enabled(config.server.docs_enabled)
        .service_version(crate::VERSION)
        .build()
}

/// Builds the server for `config` with the failure policy of its mode.
pub fn build_server(config: &KontaktConfig, registry: Arc<ContactRegistry>) -> Result<Server, ServerError> {
    Server::builder()
        .config(server_config(config))
        .policy(config.failure_policy())
        .api_description("Greeting, search and contact registry service")
        .routes(build_routes(registry))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_table() {
        let routes = build_routes(Arc::new(ContactRegistry::new()));
        let ids: Vec<_> = routes.iter().map(RouteSpec::operation_id).collect();
        assert_eq!(ids, ["hello", "search", "listContacts", "addContact"]);
    }

    #[test]
    fn test_server_config_from_kontakt_config() {
        let config = KontaktConfig::default();
        let server = server_config(&config);
        assert_eq!(server.http_addr(), "127.0.0.1:8000");
        assert_eq!(server.request_timeout(), config.request_timeout());
        assert_eq!(server.service_version(), crate::VERSION);
    }

    #[test]
    fn test_build_server_documents_every_route() {
        let server = build_server(&KontaktConfig::default(), Arc::new(ContactRegistry::new())).unwrap();
        assert_eq!(server.router().route_count(), 4);
    }
}
