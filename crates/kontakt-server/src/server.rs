//! HTTP server.
//!
//! One Tokio task per connection, HTTP/1.1 via hyper. Every request gets a
//! fresh [`RequestContext`]; its id is returned in the `x-request-id`
//! header and in error envelopes. The request timeout bounds body
//! collection (408) and, separately, pipeline execution (504).
//!
//! Built-in endpoints bypass routing and validation:
//!
//! | Path | Response |
//! |------|----------|
//! | `GET /health` | [`HealthStatus`](crate::HealthStatus) as JSON |
//! | `GET /swagger.json` | OpenAPI document for the route table |
//! | `GET /documentation` | Swagger UI page |

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{ALLOW, CONTENT_TYPE};
use http::{HeaderValue, Method, Request, Response, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};

use kontakt_core::{
    Constraint, FailurePolicy, InputSource, Reply, RequestContext, RequestId, RouteSpec, ServiceError,
    Violation,
};
use kontakt_docs::{OpenApiGenerator, SwaggerUi};
use kontakt_telemetry::{record_request, InFlightGuard};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::health::HealthCheck;
use crate::pipeline::{RawRequest, RequestPipeline};
use crate::router::{RouteLookup, Router};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// HTTP response body type.
pub type ResponseBody = Full<Bytes>;

/// HTTP response type.
pub type HttpResponse = Response<ResponseBody>;

const REQUEST_ID_HEADER: &str = "x-request-id";
const HEALTH_PATH: &str = "/health";
const SPEC_PATH: &str = "/swagger.json";
const DOCS_PATH: &str = "/documentation";
const UNMATCHED_OPERATION: &str = "unmatched";

#[derive(Debug)]
struct Docs {
    spec: Bytes,
    page: Bytes,
}

/// The Kontakt HTTP server.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    router: Router,
    pipeline: RequestPipeline,
    health: HealthCheck,
    docs: Option<Docs>,
}

impl Server {
    /// Creates a server builder.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the router.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Returns the liveness check.
    #[must_use]
    pub fn health(&self) -> &HealthCheck {
        &self.health
    }

    /// Serves until SIGINT or SIGTERM.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Binds the configured address and serves until `shutdown` triggers.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }

    /// Binds a listener on the configured address.
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|e| ServerError::InvalidAddress {
                addr: self.config.http_addr().to_string(),
                reason: e.to_string(),
            })?;

        TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.to_string(),
                source,
            })
    }

    /// Serves connections from `listener` until `shutdown` triggers, then
    /// waits up to the shutdown timeout for open connections to finish.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            addr = %addr,
            routes = self.router.route_count(),
            mode = %self.pipeline.policy().mode(),
            docs = self.docs.is_some(),
            "Server listening"
        );

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let server = Arc::clone(&server);
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            if let Err(e) = server.handle_connection(stream, remote_addr, shutdown).await {
                                tracing::debug!(remote_addr = %remote_addr, error = %e, "Connection error");
                            }
                            drop(token);
                        });
                    }
                    Err(e) => tracing::error!(error = %e, "Failed to accept connection"),
                },
                () = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        let drain = server.config.shutdown_timeout();
        tracing::info!(
            open_connections = tracker.active_connections(),
            timeout = ?drain,
            "Draining connections"
        );
        if tokio::time::timeout(drain, tracker.wait_idle()).await.is_err() {
            tracing::warn!(
                open_connections = tracker.active_connections(),
                "Shutdown timeout reached with connections still open"
            );
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(&self);
        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle_request(req).await) }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => result,
            () = shutdown.recv() => {
                tracing::debug!(remote_addr = %remote_addr, "Closing connection for shutdown");
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        }
    }

    async fn handle_request(&self, req: Request<Incoming>) -> HttpResponse {
        let (parts, body) = req.into_parts();

        let body = match tokio::time::timeout(self.config.request_timeout(), body.collect()).await {
            Ok(Ok(collected)) => collected.to_bytes(),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Failed to read request body");
                return self.unreadable_body(&RequestContext::new(), &e);
            }
            Err(_) => {
                tracing::warn!(method = %parts.method, path = parts.uri.path(), "Request body timed out");
                let error = ServiceError::request_timeout("Request body was not received in time");
                return self.error_response(&RequestContext::new(), &error);
            }
        };

        self.dispatch(&parts.method, &parts.uri, body).await
    }

    /// Handles one request whose body has already been collected.
    ///
    /// This is the whole request path below the transport, which makes it
    /// the entry point for in-process tests.
    pub async fn dispatch(&self, method: &Method, uri: &Uri, body: Bytes) -> HttpResponse {
        let ctx = RequestContext::new();
        let path = uri.path();
        tracing::debug!(request_id = %ctx.request_id(), method = %method, path = %path, "Request received");

        if let Some(response) = self.builtin(method, path, ctx.request_id()) {
            return response;
        }

        match self.router.lookup(method, path) {
            RouteLookup::Matched { route, params } => {
                let raw = RawRequest::new(params, uri.query(), body);
                self.run_route(route, ctx, raw).await
            }
            RouteLookup::MethodNotAllowed { allowed } => {
                let error =
                    ServiceError::method_not_allowed(format!("{method} is not supported on '{path}'"));
                let mut response = self.error_response(&ctx, &error);
                let allow = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
                if let Ok(value) = HeaderValue::from_str(&allow) {
                    response.headers_mut().insert(ALLOW, value);
                }
                response
            }
            RouteLookup::NotFound => self.error_response(&ctx, &ServiceError::no_route(path)),
        }
    }

    async fn run_route(&self, route: &RouteSpec, ctx: RequestContext, raw: RawRequest) -> HttpResponse {
        let ctx = ctx.with_operation_id(route.operation_id());
        let _in_flight = InFlightGuard::new();

        let pending = self.pipeline.handle(route, ctx.clone(), raw);
        let reply = match tokio::time::timeout(self.config.request_timeout(), pending).await {
            Ok(reply) => reply,
            Err(_) => {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    operation = route.operation_id(),
                    "Handler timed out"
                );
                let error = ServiceError::timeout("Handler execution timed out");
                self.pipeline.policy().render_error(&ctx, &error)
            }
        };

        let status = reply.status();
        record_request(route.operation_id(), status.as_u16(), ctx.elapsed());
        tracing::debug!(
            request_id = %ctx.request_id(),
            operation = route.operation_id(),
            status = status.as_u16(),
            elapsed_ms = ctx.elapsed().as_millis(),
            "Request completed"
        );
        into_response(reply, ctx.request_id())
    }

    fn builtin(&self, method: &Method, path: &str, request_id: RequestId) -> Option<HttpResponse> {
        if method != Method::GET {
            return None;
        }
        match (path, &self.docs) {
            (HEALTH_PATH, _) => {
                let status = serde_json::to_value(self.health.status()).unwrap_or_default();
                Some(into_response(Reply::json(status), request_id))
            }
            (SPEC_PATH, Some(docs)) => Some(raw_response(&docs.spec, "application/json", request_id)),
            (DOCS_PATH, Some(docs)) => Some(raw_response(&docs.page, "text/html; charset=utf-8", request_id)),
            _ => None,
        }
    }

    /// Rejects a request whose body could not be read. The failure counts as
    /// a payload violation, so production replies stay generic.
    fn unreadable_body(&self, ctx: &RequestContext, error: &dyn std::fmt::Display) -> HttpResponse {
        let violation = Violation::new(
            "",
            Constraint::Json,
            format!("request body could not be read: {error}"),
            None,
        );
        let reply = self
            .pipeline
            .policy()
            .on_validation_failure(ctx, InputSource::Payload, &[violation]);
        record_request(UNMATCHED_OPERATION, reply.status().as_u16(), ctx.elapsed());
        into_response(reply, ctx.request_id())
    }

    fn error_response(&self, ctx: &RequestContext, error: &ServiceError) -> HttpResponse {
        let reply = self.pipeline.policy().render_error(ctx, error);
        record_request(UNMATCHED_OPERATION, reply.status().as_u16(), ctx.elapsed());
        into_response(reply, ctx.request_id())
    }
}

fn into_response(reply: Reply, request_id: RequestId) -> HttpResponse {
    let mut builder = Response::builder()
        .status(reply.status())
        .header(REQUEST_ID_HEADER, request_id.to_string());
    if let Some(content_type) = reply.content_type() {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    builder
        .body(Full::new(reply.into_bytes()))
        .unwrap_or_else(|_| fallback_response())
}

fn raw_response(body: &Bytes, content_type: &'static str, request_id: RequestId) -> HttpResponse {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(REQUEST_ID_HEADER, request_id.to_string())
        .body(Full::new(body.clone()))
        .unwrap_or_else(|_| fallback_response())
}

fn fallback_response() -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

/// Builder for [`Server`].
#[derive(Debug, Default)]
pub struct ServerBuilder {
    config: ServerConfig,
    policy: FailurePolicy,
    routes: Vec<RouteSpec>,
    api_description: Option<String>,
}

impl ServerBuilder {
    /// Creates a builder with default configuration and a development policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server configuration.
    #[must_use]
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the failure policy.
    #[must_use]
    pub fn policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Adds a route.
    #[must_use]
    pub fn route(mut self, route: RouteSpec) -> Self {
        self.routes.push(route);
        self
    }

    /// Adds several routes.
    #[must_use]
    pub fn routes(mut self, routes: impl IntoIterator<Item = RouteSpec>) -> Self {
        self.routes.extend(routes);
        self
    }

    /// Sets the description shown in the API documentation.
    #[must_use]
    pub fn api_description(mut self, description: impl Into<String>) -> Self {
        self.api_description = Some(description.into());
        self
    }

    /// Builds the server.
    ///
    /// Fails if a route is malformed or duplicated, or if documentation is
    /// enabled and cannot be generated.
    pub fn build(self) -> Result<Server, ServerError> {
        let router = Router::new(self.routes)?;

        let docs = if self.config.docs_enabled() {
            let mut generator = OpenApiGenerator::new()
                .title(self.config.service_name())
                .version(self.config.service_version());
            if let Some(description) = self.api_description {
                generator = generator.description(description);
            }
            let spec = generator.generate_json(router.routes())?;
            let page = SwaggerUi::new(DOCS_PATH, SPEC_PATH, self.config.service_name()).html_bytes();
            Some(Docs {
                spec: Bytes::from(spec),
                page,
            })
        } else {
            None
        };

        let health = HealthCheck::new(self.config.service_name(), self.config.service_version());
        Ok(Server {
            config: self.config,
            router,
            pipeline: RequestPipeline::new(self.policy),
            health,
            docs,
        })
    }
}
