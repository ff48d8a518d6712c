//! Performer domain service.
//!
//! Validates inputs before they reach the repository, applies the login rule
//! and translates repository failures into domain errors.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{PerformerRepository, PerformerRepositoryError, PerformerService};
use crate::domain::{
    AuthFailure, AuthOutcome, Error, LoginCredentials, Performer, PerformerId,
    PerformerRoleUpdate,
};

fn map_repository_error(error: PerformerRepositoryError) -> Error {
    match error {
        PerformerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("performer repository unavailable: {message}"))
        }
        PerformerRepositoryError::Query { message } | PerformerRepositoryError::Scan { message } => {
            Error::internal(format!("performer repository error: {message}"))
        }
        PerformerRepositoryError::NotFound { message } => {
            Error::not_found(format!("performer {message} not found"))
        }
    }
}

fn require_positive(id: PerformerId, field: &str) -> Result<(), Error> {
    if id.is_valid() {
        Ok(())
    } else {
        Err(Error::invalid_request(format!("{field} must be positive"))
            .with_details(json!({ "field": field, "value": id.get() })))
    }
}

/// Performer service backed by a [`PerformerRepository`].
#[derive(Clone)]
pub struct PerformerServiceImpl<R> {
    repo: Arc<R>,
}

impl<R> PerformerServiceImpl<R> {
    /// Create a service over `repo`.
    pub const fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

impl<R> PerformerServiceImpl<R>
where
    R: PerformerRepository,
{
    async fn load_authenticated(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Performer, AuthFailure> {
        let id = credentials.performer_id();
        let matched = self
            .repo
            .auth_by_id_and_pass(credentials)
            .await
            .map_err(|err| AuthFailure::new("authentication failed", map_repository_error(err)))?;
        if !matched {
            return Err(AuthFailure::new(
                "invalid performer id or password",
                Error::unauthorized("invalid credentials"),
            ));
        }

        let performer = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|err| AuthFailure::new("authentication failed", map_repository_error(err)))?
            .ok_or_else(|| {
                AuthFailure::new(
                    "performer record not found",
                    Error::unauthorized(format!("performer {id} matched but could not be loaded")),
                )
            })?;

        if performer.archive {
            return Err(AuthFailure::new(
                "performer is archived",
                Error::unauthorized(format!("performer {id} is archived")),
            ));
        }
        Ok(performer)
    }
}

#[async_trait]
impl<R> PerformerService for PerformerServiceImpl<R>
where
    R: PerformerRepository,
{
    async fn list_all(&self) -> Result<Vec<Performer>, Error> {
        self.repo.all().await.map_err(map_repository_error)
    }

    async fn authenticate(
        &self,
        performer_id: i32,
        password: &str,
    ) -> Result<AuthOutcome, AuthFailure> {
        let credentials = LoginCredentials::try_from_parts(performer_id, password).map_err(|err| {
            AuthFailure::new(err.to_string(), Error::invalid_request(err.to_string()))
        })?;

        match self.load_authenticated(&credentials).await {
            Ok(performer) => {
                info!(performer_id = %performer.id, "performer authenticated");
                Ok(AuthOutcome::succeeded(performer))
            }
            Err(failure) => {
                warn!(
                    performer_id,
                    reason = %failure.outcome.message,
                    "performer authentication failed"
                );
                Err(failure)
            }
        }
    }

    async fn find_by_id(&self, id: PerformerId) -> Result<Performer, Error> {
        require_positive(id, "performerId")?;
        self.repo
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("performer {id} not found")))
    }

    async fn update_roles(&self, update: PerformerRoleUpdate) -> Result<(), Error> {
        require_positive(update.performer_id, "performerId")?;
        require_positive(update.updated_by, "updatedBy")?;
        for (field, role) in [
            ("idRoleAForms", update.roles.forms),
            ("idRoleAFGW", update.roles.fgw),
        ] {
            if role.get() < 0 {
                return Err(Error::invalid_request(format!("{field} must not be negative"))
                    .with_details(json!({ "field": field, "value": role.get() })));
            }
        }

        self.repo
            .update_roles(&update)
            .await
            .map_err(map_repository_error)?;
        info!(
            performer_id = %update.performer_id,
            forms_role = %update.roles.forms,
            fgw_role = %update.roles.fgw,
            updated_by = %update.updated_by,
            "performer roles updated"
        );
        Ok(())
    }

    async fn exists(&self, id: PerformerId) -> Result<bool, Error> {
        require_positive(id, "performerId")?;
        self.repo.exists_by_id(id).await.map_err(map_repository_error)
    }

    async fn count(&self) -> Result<i64, Error> {
        self.repo.count().await.map_err(map_repository_error)
    }

    async fn page(&self, offset: i64, limit: i64) -> Result<Vec<Performer>, Error> {
        if offset < 0 || limit <= 0 {
            return Err(Error::invalid_request("invalid page bounds")
                .with_details(json!({ "offset": offset, "limit": limit })));
        }
        self.repo
            .page(offset, limit)
            .await
            .map_err(map_repository_error)
    }

    async fn search_by_id(&self, pattern: &str) -> Result<Vec<Performer>, Error> {
        let pattern = pattern.trim();
        if pattern.is_empty() || !pattern.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::invalid_request("search must contain digits only")
                .with_details(json!({ "field": "search" })));
        }
        self.repo
            .filter_by_id(pattern)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "performer_service_tests.rs"]
mod tests;
