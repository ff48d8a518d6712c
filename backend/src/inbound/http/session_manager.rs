//! Server-side registry of active login sessions.
//!
//! The encrypted cookie proves who the browser claims to be; the registry
//! decides whether that claim is still honoured. Each login receives a random
//! token that is tracked here with its owner and last activity. Tokens that
//! the registry has never seen (after a restart, or on another worker) are
//! adopted as long as they are inside the absolute lifetime, so restarts do
//! not log everyone out, unless the cookie itself shows the idle timeout has
//! passed. Revoked and idled-out tokens are remembered until they would have
//! expired anyway, which stops a copied cookie from being replayed after
//! logout or revived after the sweeper dropped it.
//!
//! Time comes from an injected [`Clock`] so expiry rules are testable.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::PerformerId;

const TOKEN_BYTES: usize = 32;

/// Opaque random session token, hex encoded.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a token from 32 random bytes.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0_u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Whether the token carries any material.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.0.get(..8).unwrap_or_default();
        write!(f, "SessionToken({prefix}…)")
    }
}

/// Idle and absolute lifetimes applied to every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Inactivity after which a session is dropped.
    pub idle_timeout: Duration,
    /// Age after which a session is dropped regardless of activity.
    pub absolute_lifetime: Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::minutes(30),
            absolute_lifetime: Duration::hours(24),
        }
    }
}

/// Why a session was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionRejection {
    /// The absolute lifetime has passed.
    #[error("session expired")]
    Expired,
    /// The token was revoked by logout.
    #[error("session revoked")]
    Revoked,
    /// No activity within the idle timeout.
    #[error("session idle for too long")]
    Idle,
    /// The token belongs to another performer.
    #[error("session does not belong to this performer")]
    Mismatch,
    /// The cookie carried no token.
    #[error("session token missing")]
    MissingToken,
}

/// What the cookie claims about its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClaims {
    /// Performer the cookie was issued to.
    pub performer_id: PerformerId,
    /// Login time recorded in the cookie.
    pub created_at: DateTime<Utc>,
    /// Last accepted request recorded in the cookie.
    pub last_activity: DateTime<Utc>,
}

/// Token and creation time handed out by [`SessionManager::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTicket {
    /// Newly registered token.
    pub token: SessionToken,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
struct SessionRecord {
    performer_id: PerformerId,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
struct Retired {
    reason: SessionRejection,
    until: DateTime<Utc>,
}

#[derive(Default)]
struct Registry {
    active: HashMap<SessionToken, SessionRecord>,
    retired: HashMap<SessionToken, Retired>,
}

impl Registry {
    fn retire(&mut self, token: SessionToken, reason: SessionRejection, until: DateTime<Utc>) {
        self.active.remove(&token);
        self.retired.insert(token, Retired { reason, until });
    }
}

/// Active-session registry shared by every worker.
pub struct SessionManager {
    clock: Arc<dyn Clock>,
    policy: SessionPolicy,
    registry: Mutex<Registry>,
}

impl SessionManager {
    /// Registry with the default 30 minute idle and 24 hour absolute limits.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_policy(clock, SessionPolicy::default())
    }

    /// Registry with explicit limits.
    #[must_use]
    pub fn with_policy(clock: Arc<dyn Clock>, policy: SessionPolicy) -> Self {
        Self {
            clock,
            policy,
            registry: Mutex::new(Registry::default()),
        }
    }

    /// Limits applied by this registry.
    #[must_use]
    pub const fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// Current time according to the injected clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new session for `performer_id`.
    pub fn create(&self, performer_id: PerformerId) -> SessionTicket {
        let now = self.now();
        let token = SessionToken::generate();
        self.registry().active.insert(
            token.clone(),
            SessionRecord {
                performer_id,
                created_at: now,
                last_activity: now,
            },
        );
        debug!(performer_id = performer_id.get(), "session registered");
        SessionTicket {
            token,
            created_at: now,
        }
    }

    /// Decide whether the session described by a cookie is still valid.
    ///
    /// # Errors
    /// Returns the [`SessionRejection`] explaining why the session is refused.
    pub fn validate(
        &self,
        token: &SessionToken,
        claims: SessionClaims,
    ) -> Result<(), SessionRejection> {
        if token.is_empty() {
            return Err(SessionRejection::MissingToken);
        }
        let now = self.now();
        let expires_at = claims.created_at + self.policy.absolute_lifetime;
        let mut registry = self.registry();

        if now >= expires_at {
            registry.active.remove(token);
            return Err(SessionRejection::Expired);
        }
        if let Some(retired) = registry.retired.get(token) {
            return Err(retired.reason);
        }

        match registry.active.get(token).copied() {
            Some(record) if now - record.last_activity >= self.policy.idle_timeout => {
                registry.retire(token.clone(), SessionRejection::Idle, expires_at);
                Err(SessionRejection::Idle)
            }
            Some(record) if record.performer_id != claims.performer_id => {
                Err(SessionRejection::Mismatch)
            }
            Some(_) => Ok(()),
            None if now - claims.last_activity >= self.policy.idle_timeout => {
                registry.retire(token.clone(), SessionRejection::Idle, expires_at);
                Err(SessionRejection::Idle)
            }
            None => {
                registry.active.insert(
                    token.clone(),
                    SessionRecord {
                        performer_id: claims.performer_id,
                        created_at: claims.created_at,
                        last_activity: claims.last_activity,
                    },
                );
                debug!(performer_id = claims.performer_id.get(), "session adopted");
                Ok(())
            }
        }
    }

    /// Record activity on `token` and return the new activity time.
    pub fn touch(&self, token: &SessionToken) -> DateTime<Utc> {
        let now = self.now();
        if let Some(record) = self.registry().active.get_mut(token) {
            record.last_activity = now;
        }
        now
    }

    /// Revoke `token` so it is refused until it would have expired.
    pub fn revoke(&self, token: &SessionToken) {
        let now = self.now();
        let mut registry = self.registry();
        let created_at = registry
            .active
            .get(token)
            .map_or(now, |record| record.created_at);
        registry.retire(
            token.clone(),
            SessionRejection::Revoked,
            created_at + self.policy.absolute_lifetime,
        );
    }

    /// Drop idle and expired sessions and stale tombstones.
    ///
    /// Idle sessions leave a tombstone until their absolute expiry so the
    /// cookie cannot be adopted again. Returns the number of active sessions
    /// and tombstones removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.now();
        let policy = self.policy;
        let mut registry = self.registry();

        let stale: Vec<(SessionToken, SessionRecord)> = registry
            .active
            .iter()
            .filter(|(_, record)| {
                now - record.last_activity >= policy.idle_timeout
                    || now - record.created_at >= policy.absolute_lifetime
            })
            .map(|(token, record)| (token.clone(), *record))
            .collect();
        for (token, record) in &stale {
            let until = record.created_at + policy.absolute_lifetime;
            if until > now {
                registry.retire(token.clone(), SessionRejection::Idle, until);
            } else {
                registry.active.remove(token);
            }
        }

        let retired_before = registry.retired.len();
        registry.retired.retain(|_, retired| retired.until > now);
        stale.len() + (retired_before - registry.retired.len())
    }

    /// Number of active sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry().active.len()
    }

    /// Whether no session is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "session_manager_tests.rs"]
mod tests;
