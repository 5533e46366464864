//! Request preparation for forwarding.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the selected backend
//! - Strip hop-by-hop headers and record the client in `X-Forwarded-For`
//! - Tag requests with an `x-request-id` (see `HttpServer::build_router`)

use std::net::IpAddr;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Uri};
use url::Url;

use crate::http::response::strip_hop_by_hop;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Read the request id assigned by the request-id layer.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Rewrite `original` so it targets `target`.
///
/// Scheme and authority come from the target; the target's base path is joined
/// with the request path, and both query strings are kept.
pub fn forward_uri(target: &Url, original: &Uri) -> Result<Uri, axum::http::Error> {
    let host = target.host_str().unwrap_or_default();
    let authority = match target.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    let mut path_and_query = join_paths(target.path(), original.path());
    let query = match (target.query(), original.query()) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => Some(format!("{}&{}", a, b)),
        (Some(a), _) if !a.is_empty() => Some(a.to_string()),
        (_, Some(b)) => Some(b.to_string()),
        _ => None,
    };
    if let Some(query) = query {
        path_and_query.push('?');
        path_and_query.push_str(&query);
    }

    Uri::builder()
        .scheme(target.scheme())
        .authority(authority.as_str())
        .path_and_query(path_and_query.as_str())
        .build()
}

/// Join two paths with exactly one slash between them.
fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

/// Prepare inbound headers for the upstream request.
pub fn prepare_headers(headers: &mut HeaderMap, client_ip: Option<IpAddr>) {
    strip_hop_by_hop(headers);

    if let Some(ip) = client_ip {
        let forwarded = match headers.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(prior) => format!("{}, {}", prior, ip),
            None => ip.to_string(),
        };
        if let Ok(value) = HeaderValue::from_str(&forwarded) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }
}
