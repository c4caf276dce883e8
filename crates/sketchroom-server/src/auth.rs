//! Admission control for room connections.
//!
//! Tokens are issued by the identity service; the relay only checks them.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing session token")]
    MissingToken,
    #[error("invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("session token has no subject")]
    MissingSubject,
    #[error("not a member of room {0}")]
    RoomNotAllowed(String),
}

/// Decides whether a token may open a room.
pub trait RoomAuthorizer: Send + Sync {
    fn authorize(&self, room: &str, token: Option<&str>) -> Result<(), AuthError>;
}

/// Admits every connection. Used when no token secret is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAccess;

impl RoomAuthorizer for OpenAccess {
    fn authorize(&self, _room: &str, _token: Option<&str>) -> Result<(), AuthError> {
        Ok(())
    }
}

/// User ids are database row ids, so tokens may carry them as numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Subject {
    Num(i64),
    Str(String),
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Subject::Num(n) => write!(f, "{n}"),
            Subject::Str(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionClaims {
    #[serde(default)]
    sub: Option<Subject>,
    #[serde(default, rename = "userId")]
    user_id: Option<Subject>,
    /// Rooms the token may open. Absent means any room.
    #[serde(default)]
    rooms: Option<Vec<String>>,
}

/// Validates HS256 session tokens.
pub struct JwtAuthorizer {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAuthorizer {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl RoomAuthorizer for JwtAuthorizer {
    fn authorize(&self, room: &str, token: Option<&str>) -> Result<(), AuthError> {
        let token = token.filter(|t| !t.is_empty()).ok_or(AuthError::MissingToken)?;
        let claims = decode::<SessionClaims>(token, &self.key, &self.validation)?.claims;
        let user = claims
            .user_id
            .or(claims.sub)
            .ok_or(AuthError::MissingSubject)?;
        if let Some(rooms) = claims.rooms {
            if !rooms.iter().any(|r| r == room) {
                return Err(AuthError::RoomNotAllowed(room.to_string()));
            }
        }
        tracing::debug!(user = %user, room = %room, "session token accepted");
        Ok(())
    }
}
