//! Driving port for performer use-cases.
//!
//! Inbound adapters call this port to authenticate performers, list them and
//! change their roles without knowing how performers are stored.

use async_trait::async_trait;

use crate::domain::{
    AuthFailure, AuthOutcome, Error, Performer, PerformerId, PerformerRoleUpdate,
};

/// Domain use-case port for performers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PerformerService: Send + Sync {
    /// Every performer.
    async fn list_all(&self) -> Result<Vec<Performer>, Error>;

    /// Check raw credentials and load the performer on success.
    async fn authenticate(
        &self,
        performer_id: i32,
        password: &str,
    ) -> Result<AuthOutcome, AuthFailure>;

    /// Load a performer or fail with `not_found`.
    async fn find_by_id(&self, id: PerformerId) -> Result<Performer, Error>;

    /// Replace a performer's role assignment.
    async fn update_roles(&self, update: PerformerRoleUpdate) -> Result<(), Error>;

    /// Whether a performer exists.
    async fn exists(&self, id: PerformerId) -> Result<bool, Error>;

    /// Total number of performers.
    async fn count(&self) -> Result<i64, Error>;

    /// One page of performers.
    async fn page(&self, offset: i64, limit: i64) -> Result<Vec<Performer>, Error>;

    /// Performers whose id contains the digits in `pattern`.
    async fn search_by_id(&self, pattern: &str) -> Result<Vec<Performer>, Error>;
}
