//! `GET /contacts` and `POST /contacts`.

use std::sync::Arc;

use http::StatusCode;
use kontakt_core::{HandlerResult, Reply, RequestContext, ServiceError, ValidatedRequest};
use kontakt_registry::{Contact, ContactRegistry};
use serde::{Deserialize, Serialize};

/// Body of `POST /contacts` and of its 201 reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEnvelope {
    /// The contact.
    pub contact: Contact,
}

/// Body of `GET /contacts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactList {
    /// Contacts in insertion order.
    pub contacts: Vec<Contact>,
}

/// Lists every stored contact.
pub async fn list(registry: Arc<ContactRegistry>, _ctx: RequestContext, _req: ValidatedRequest) -> HandlerResult {
    Reply::serialize(&ContactList {
        contacts: registry.list(),
    })
}

/// Stores a contact; a duplicate is answered with 409 and a plain message.
pub async fn add(registry: Arc<ContactRegistry>, ctx: RequestContext, req: ValidatedRequest) -> HandlerResult {
    let ContactEnvelope { contact } = serde_json::from_value(req.into_payload())
        .map_err(|e| ServiceError::internal_with_source("Validated contact did not deserialize", e))?;

    match registry.insert(contact) {
        Ok(contact) => {
            tracing::info!(request_id = %ctx.request_id(), contact = %contact, "Contact added");
            Ok(Reply::serialize(&ContactEnvelope { contact })?.with_status(StatusCode::CREATED))
        }
        Err(duplicate) => {
            tracing::info!(request_id = %ctx.request_id(), error = %duplicate, "Contact rejected");
            Ok(Reply::text(duplicate.to_string()).with_status(StatusCode::CONFLICT))
        }
    }
}
