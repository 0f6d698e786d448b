//! Authentication: credential hashing, sessions and the admin route guard.
//!
//! Key and token comparisons are constant-time to mitigate timing attacks.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tokio::sync::{watch, RwLock};

use crate::db::Gateway;
use crate::errors::AppError;
use crate::models::{RoleStatus, Session};

/// Header name for the admin API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Fresh random salt for a credential.
pub fn new_salt() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Hex-encoded SHA-256 of `salt:password`.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_password(salt: &str, password: &str, expected_hash: &str) -> bool {
    constant_time_compare(&hash_password(salt, password), expected_hash)
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Change notifications published to session subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// No change has happened since the manager started
    Initial,
    SignedIn { user_id: String, role: RoleStatus },
    SignedOut { user_id: String },
}

struct SessionEntry {
    session: Session,
    expires_at: Instant,
}

/// In-memory session registry backed by the gateway's credential and role tables.
///
/// Sessions expire `ttl` after sign-in. Expired entries are pruned on every sign-in.
pub struct SessionManager {
    gateway: Arc<dyn Gateway>,
    ttl: Duration,
    sessions: RwLock<HashMap<String, SessionEntry>>,
    events: watch::Sender<SessionEvent>,
}

impl SessionManager {
    pub fn new(gateway: Arc<dyn Gateway>, ttl: Duration) -> Self {
        let (events, _) = watch::channel(SessionEvent::Initial);
        Self {
            gateway,
            ttl,
            sessions: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Verify credentials and open a session.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let user = self
            .gateway
            .authenticate(email, password)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

        let role = self.check_role(&user.id).await;
        let session = Session {
            token: uuid::Uuid::new_v4().simple().to_string(),
            user_id: user.id.clone(),
            email: user.email,
            role,
            created_at: Utc::now().to_rfc3339(),
        };

        let now = Instant::now();
        {
            let mut sessions = self.sessions.write().await;
            let before = sessions.len();
            sessions.retain(|_, entry| entry.expires_at > now);
            if sessions.len() < before {
                tracing::debug!("Pruned {} expired sessions", before - sessions.len());
            }
            sessions.insert(
                session.token.clone(),
                SessionEntry {
                    session: session.clone(),
                    expires_at: now + self.ttl,
                },
            );
        }

        tracing::info!(user_id = %user.id, ?role, "Signed in");
        self.events.send_replace(SessionEvent::SignedIn {
            user_id: user.id,
            role,
        });

        Ok(session)
    }

    /// Look up the roles of a user. A failed lookup never grants admin.
    pub async fn check_role(&self, user_id: &str) -> RoleStatus {
        match self.gateway.roles_for(user_id).await {
            Ok(roles) => RoleStatus::from_roles(&roles),
            Err(e) => {
                tracing::error!(user_id, "Error checking admin role: {}", e);
                RoleStatus::Member
            }
        }
    }

    /// The live session for a token; expired sessions are never returned.
    pub async fn session(&self, token: &str) -> Option<Session> {
        let now = Instant::now();
        let sessions = self.sessions.read().await;
        sessions
            .iter()
            .find(|(candidate, _)| constant_time_compare(candidate, token))
            .filter(|(_, entry)| entry.expires_at > now)
            .map(|(_, entry)| entry.session.clone())
    }

    /// End a session. Returns false when the token was unknown.
    pub async fn sign_out(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token);
        match removed.map(|entry| entry.session) {
            Some(session) => {
                tracing::info!(user_id = %session.user_id, "Signed out");
                self.events.send_replace(SessionEvent::SignedOut {
                    user_id: session.user_id,
                });
                true
            }
            None => false,
        }
    }

    /// Subscribe to session changes. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Drop every session.
    pub async fn clear(&self) {
        let mut sessions = self.sessions.write().await;
        let count = sessions.len();
        sessions.clear();
        if count > 0 {
            tracing::info!("Closed {} sessions", count);
        }
    }
}

/// Extract a bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
}

/// Admission rules for `/api/admin`.
#[derive(Clone)]
pub struct AdminGuard {
    pub psk: Option<String>,
    pub sessions: Arc<SessionManager>,
    /// No key and no administrator configured: every request is admitted
    pub open: bool,
}

impl AdminGuard {
    async fn admits(&self, headers: &HeaderMap) -> bool {
        if self.open {
            return true;
        }

        let provided = headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let bearer = bearer_token(headers);

        if let Some(expected) = &self.psk {
            let key_matches = [provided.as_deref(), bearer.as_deref()]
                .into_iter()
                .flatten()
                .any(|candidate| constant_time_compare(candidate, expected));
            if key_matches {
                return true;
            }
        }

        match bearer {
            Some(token) => self
                .sessions
                .session(&token)
                .await
                .is_some_and(|s| s.role.is_admin()),
            None => false,
        }
    }
}

/// Admin authentication layer function that takes the guard as a parameter.
pub async fn admin_auth_layer(guard: AdminGuard, request: Request, next: Next) -> Response {
    if guard.admits(request.headers()).await {
        next.run(request).await
    } else {
        AppError::Unauthorized("Missing or invalid admin credentials".to_string()).into_response()
    }
}
