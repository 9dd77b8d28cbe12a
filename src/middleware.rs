use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::net::SocketAddr;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::SharedState;
use crate::response::{apply_rate_limit_headers, retry_after_secs};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Logging middleware for request/response tracking
pub async fn logging_middleware(mut request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let client_ip = get_client_ip(&request);

    let request_id = match request.headers().get(X_REQUEST_ID) {
        Some(id) => id.clone(),
        None => {
            let id = HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("invalid"));
            request.headers_mut().insert(X_REQUEST_ID, id.clone());
            id
        }
    };
    let request_id_str = request_id.to_str().unwrap_or("invalid").to_string();

    info!(
        target: "ecogym::middleware",
        request_id = %request_id_str,
        method = %method,
        uri = %uri,
        client_ip = %client_ip,
        "Incoming request"
    );

    let mut response = next.run(request).await;

    let status = response.status();
    info!(
        target: "ecogym::middleware",
        request_id = %request_id_str,
        method = %method,
        uri = %uri,
        status = %status,
        "Request completed"
    );

    response.headers_mut().insert(X_REQUEST_ID, request_id);
    response
}

/// Gate requests by client address through the shared rate limiter
pub async fn rate_limit_middleware(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let client_ip = get_client_ip(&request);
    let limit = state.api_rate_limit;

    match state.rate_limiter.check(limit, &client_ip) {
        Ok(status) => {
            let mut response = next.run(request).await;
            apply_rate_limit_headers(response.headers_mut(), status.limit, status.remaining);
            response
        }
        Err(err @ ApiError::RateLimitExceeded { .. }) => {
            warn!(
                target: "ecogym::middleware",
                client_ip = %client_ip,
                limit,
                "Client rate limited"
            );
            let retry_after = retry_after_secs(state.rate_limiter.options().interval);
            let mut response = err.into_response();
            apply_rate_limit_headers(response.headers_mut(), limit, 0);
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
        Err(err) => err.into_response(),
    }
}

pub fn get_client_ip(request: &Request) -> String {
    // Try to get real IP from headers first
    if let Some(forwarded) = request.headers().get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(first_ip) = forwarded_str.split(',').next() {
                let first_ip = first_ip.trim();
                if !first_ip.is_empty() {
                    return first_ip.to_string();
                }
            }
        }
    }

    if let Some(real_ip) = request.headers().get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return ip_str.trim().to_string();
        }
    }

    // Fallback to connection info
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        addr.ip().to_string()
    } else {
        "unknown".to_string()
    }
}
