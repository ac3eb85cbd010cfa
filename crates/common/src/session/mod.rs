//! Session context extraction
//!
//! The session id is an opaque credential minted once per browser session.
//! Handlers receive it through the [`SessionContext`] extractor, which reads
//! the `X-Session-ID` header.

use crate::errors::{AppError, Result};
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Header carrying the session id
pub const SESSION_HEADER: &str = "x-session-id";

/// Longest accepted session id
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Session context available to handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: String,
}

impl SessionContext {
    /// Validate a caller-supplied session id
    pub fn parse(raw: &str) -> Result<Self> {
        let session_id = raw.trim();
        if session_id.is_empty() {
            return Err(AppError::MissingSession);
        }
        if session_id.len() > MAX_SESSION_ID_LEN {
            return Err(AppError::InvalidFormat {
                message: format!("session id longer than {} bytes", MAX_SESSION_ID_LEN),
            });
        }
        Ok(Self {
            session_id: session_id.to_string(),
        })
    }

    /// Mint a fresh session id
    pub fn generate() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
        }
    }
}

/// Axum extractor for SessionContext
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let raw = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::MissingSession)?;

        Self::parse(raw)
    }
}
