//! Per-connection request loop.
//!
//! # Responsibilities
//! - Pull framed messages off a transport and parse them
//! - Serve `HEAD` as `GET` with the body suppressed
//! - Dispatch to the first matching route, else the static fallback
//! - Enforce the one-shot completion contract before writing
//!
//! # Design Decisions
//! - A parse failure closes the connection without a response
//! - Any transport error is terminal for this connection only
//! - A handler that errors or never completes gets a 500, never silence

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};

use super::static_files::{not_found, StaticFiles};
use super::{ContentType, Request, Response, Status};
use crate::net::{ConnectionId, ConnectionState, Transport};
use crate::observability::metrics;
use crate::routing::RouteTable;

/// Everything a connection needs to answer requests. Shared read-only by
/// all connections of one server.
#[derive(Debug)]
pub struct Dispatcher {
    routes: RouteTable,
    static_files: Option<StaticFiles>,
    server_name: Option<String>,
}

impl Dispatcher {
    /// An empty `server_name` suppresses the `Server` header.
    pub fn new(routes: RouteTable, static_files: Option<StaticFiles>, server_name: Option<String>) -> Self {
        Self {
            routes,
            static_files,
            server_name: server_name.filter(|name| !name.is_empty()),
        }
    }

    /// Frozen route table.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Value sent in the `Server` header, if any.
    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    /// Produce the completed response for one request.
    pub async fn respond(&self, mut request: Request) -> Response {
        let omit_body = request.rewrite_head_as_get();
        let method = request.method();

        let mut response = match self.routes.find(method, request.path()) {
            Some(route) => {
                tracing::trace!(pattern = route.pattern(), "Route matched");
                let mut response = Response::new();
                response.set_omit_body(omit_body);
                match (route.handler())(&request, &mut response) {
                    Ok(()) if response.is_completed() => response,
                    Ok(()) => {
                        tracing::warn!(
                            method = %method,
                            path = request.path(),
                            pattern = route.pattern(),
                            "Handler returned without completing the response"
                        );
                        internal_error()
                    }
                    Err(e) => {
                        tracing::error!(
                            method = %method,
                            path = request.path(),
                            pattern = route.pattern(),
                            error = %e,
                            "Handler failed"
                        );
                        internal_error()
                    }
                }
            }
            None => match &self.static_files {
                Some(files) => files.serve(request.path()).await,
                None => not_found(),
            },
        };

        response.set_omit_body(omit_body);
        response
    }
}

fn internal_error() -> Response {
    let mut response = Response::new();
    response.set_status(Status::InternalServerError);
    response.set_content_type(ContentType::Html);
    response.set_body(Status::InternalServerError.reason());
    response.into_completed()
}

fn enter(id: ConnectionId, state: &mut ConnectionState, next: ConnectionState) {
    tracing::trace!(connection_id = %id, from = ?*state, to = ?next, "Connection state");
    *state = next;
}

/// Run the read → parse → route → respond loop until the connection ends,
/// then close the transport.
pub async fn serve_connection<S>(mut transport: Transport<S>, dispatcher: Arc<Dispatcher>, id: ConnectionId)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut state = ConnectionState::Reading;
    metrics::connection_opened();

    loop {
        let frame = match transport.accept_request().await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::trace!(connection_id = %id, "Peer closed connection");
                break;
            }
            Err(e) => {
                tracing::debug!(connection_id = %id, error = %e, "Transport error");
                break;
            }
        };

        enter(id, &mut state, ConnectionState::Parsed);
        let request = match Request::from_parts(&frame.head, frame.body) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(connection_id = %id, error = %e, "Dropping connection on unparseable request");
                break;
            }
        };
        let method = request.method();
        let path = request.path().to_string();
        let keep_alive = request.keep_alive();

        enter(id, &mut state, ConnectionState::Routed);
        let response = dispatcher.respond(request).await;

        enter(id, &mut state, ConnectionState::Responding);
        let status = response.status();
        let bytes = response.to_bytes(dispatcher.server_name());
        if let Err(e) = transport.send_data(&bytes).await {
            tracing::debug!(connection_id = %id, error = %e, "Failed to send response");
            break;
        }
        metrics::record_request(method, status);
        tracing::debug!(
            connection_id = %id,
            method = %method,
            path = %path,
            status = status.code(),
            "Request served"
        );

        if !keep_alive {
            break;
        }
        enter(id, &mut state, ConnectionState::Reading);
    }

    enter(id, &mut state, ConnectionState::Closed);
    transport.close().await;
    metrics::connection_closed();
}
