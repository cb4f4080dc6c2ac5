//! HTTP→HTTPS redirect routes.

use super::{Method, Request, Response, Status};
use crate::routing::RouteTable;

const DEFAULT_HTTPS_PORT: u16 = 443;

/// `https://` URL for `request` on the encrypted host and port.
pub fn https_location(server_address: &str, https_port: u16, request: &Request) -> String {
    let mut location = format!("https://{server_address}");
    if https_port != DEFAULT_HTTPS_PORT {
        location.push_str(&format!(":{https_port}"));
    }
    location.push_str(request.path());
    if let Some(query) = request.query() {
        location.push('?');
        location.push_str(query);
    }
    location
}

/// A table with one catch-all binding answering `301 Moved Permanently`.
pub fn redirect_routes(server_address: String, https_port: u16) -> RouteTable {
    let mut table = RouteTable::new();
    table.register(Method::Any, "*", move |request: &Request, response: &mut Response| {
        response.set_status(Status::MovedPermanently);
        response.set_location(https_location(&server_address, https_port, request));
        response.complete()
    });
    table
}
