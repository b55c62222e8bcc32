//! HTTP response handlers.

use crate::utils::mime::{self, types::PLAIN};
use anyhow::{Context, Result};
use std::{fs, path::Path};
use tiny_http::{Header, Method, Request, Response, StatusCode};

/// Response options shared by every handler.
#[derive(Debug, Clone, Copy)]
pub struct ResponseOptions {
    /// Send `Access-Control-Allow-Origin: *`.
    pub cors: bool,
}

/// Respond with a file from disk.
pub fn respond_file(request: Request, path: &Path, options: ResponseOptions) -> Result<()> {
    let content_type = mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type, options);
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    send_body(request, 200, content_type, body, options)
}

/// Respond with 404.
pub fn respond_not_found(request: Request, options: ResponseOptions) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 404, PLAIN, options);
    }
    send_body(request, 404, PLAIN, b"404 Not Found".to_vec(), options)
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request, options: ResponseOptions) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec(), options)
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(
    request: Request,
    status: u16,
    content_type: &'static str,
    options: ResponseOptions,
) -> Result<()> {
    let mut response = Response::empty(StatusCode(status));
    for header in headers(content_type, options) {
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
    options: ResponseOptions,
) -> Result<()> {
    let mut response = Response::from_data(body).with_status_code(StatusCode(status));
    for header in headers(content_type, options) {
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}

/// Headers for a dev response: content type, no caching, optional CORS.
fn headers(content_type: &'static str, options: ResponseOptions) -> Vec<Header> {
    let mut pairs = vec![("Content-Type", content_type), ("Cache-Control", "no-store")];
    if options.cors {
        pairs.push(("Access-Control-Allow-Origin", "*"));
    }
    pairs
        .into_iter()
        .filter_map(|(key, value)| Header::from_bytes(key, value).ok())
        .collect()
}
