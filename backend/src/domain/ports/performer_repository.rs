//! Port for performer persistence.

use async_trait::async_trait;

use crate::domain::{LoginCredentials, Performer, PerformerId, PerformerRoleUpdate};

use super::define_port_error;

define_port_error! {
    /// Errors raised by performer repository adapters.
    pub enum PerformerRepositoryError {
        /// The database could not be reached.
        Connection => "performer repository connection failed: {message}",
        /// A stored procedure failed while executing.
        Query => "performer repository query failed: {message}",
        /// A returned row did not have the expected shape.
        Scan => "performer row could not be read: {message}",
        /// An update matched no rows.
        NotFound => "performer not found: {message}",
    }
}

/// Port for reading performers and changing their role assignments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PerformerRepository: Send + Sync {
    /// Every performer.
    async fn all(&self) -> Result<Vec<Performer>, PerformerRepositoryError>;

    /// Ask the database whether the credentials match.
    async fn auth_by_id_and_pass(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<bool, PerformerRepositoryError>;

    /// Look a performer up by id.
    async fn find_by_id(
        &self,
        id: PerformerId,
    ) -> Result<Option<Performer>, PerformerRepositoryError>;

    /// Replace both role ids; fails with `NotFound` when no row changed.
    async fn update_roles(
        &self,
        update: &PerformerRoleUpdate,
    ) -> Result<(), PerformerRepositoryError>;

    /// Whether a performer with `id` exists.
    async fn exists_by_id(&self, id: PerformerId) -> Result<bool, PerformerRepositoryError>;

    /// Total number of performers.
    async fn count(&self) -> Result<i64, PerformerRepositoryError>;

    /// One page of performers ordered by id.
    async fn page(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Performer>, PerformerRepositoryError>;

    /// Performers whose id matches `pattern`.
    async fn filter_by_id(&self, pattern: &str)
    -> Result<Vec<Performer>, PerformerRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
///
/// Reads return nothing and authentication always fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePerformerRepository;

#[async_trait]
impl PerformerRepository for FixturePerformerRepository {
    async fn all(&self) -> Result<Vec<Performer>, PerformerRepositoryError> {
        Ok(Vec::new())
    }

    async fn auth_by_id_and_pass(
        &self,
        _credentials: &LoginCredentials,
    ) -> Result<bool, PerformerRepositoryError> {
        Ok(false)
    }

    async fn find_by_id(
        &self,
        _id: PerformerId,
    ) -> Result<Option<Performer>, PerformerRepositoryError> {
        Ok(None)
    }

    async fn update_roles(
        &self,
        update: &PerformerRoleUpdate,
    ) -> Result<(), PerformerRepositoryError> {
        Err(PerformerRepositoryError::not_found(
            update.performer_id.to_string(),
        ))
    }

    async fn exists_by_id(&self, _id: PerformerId) -> Result<bool, PerformerRepositoryError> {
        Ok(false)
    }

    async fn count(&self) -> Result<i64, PerformerRepositoryError> {
        Ok(0)
    }

    async fn page(
        &self,
        _offset: i64,
        _limit: i64,
    ) -> Result<Vec<Performer>, PerformerRepositoryError> {
        Ok(Vec::new())
    }

    async fn filter_by_id(
        &self,
        _pattern: &str,
    ) -> Result<Vec<Performer>, PerformerRepositoryError> {
        Ok(Vec::new())
    }
}
