//! Caller identity extraction.
//!
//! Authentication happens upstream; the gateway forwards the caller's user
//! id in a configurable header (default `x-user-id`). A missing, malformed
//! or nil value means the request is anonymous.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// Optional caller identity, for endpoints that work anonymously.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub Option<Uuid>);

/// Caller identity that must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequireCaller(pub Uuid);

/// Read a non-nil UUID from `header`.
pub fn caller_from_headers(headers: &HeaderMap, header: &str) -> Option<Uuid> {
    headers
        .get(header)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .filter(|id| !id.is_nil())
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Caller(caller_from_headers(
            &parts.headers,
            state.identity_header.as_str(),
        )))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Caller(caller) = Caller::from_request_parts(parts, state).await?;
        caller
            .map(RequireCaller)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}
