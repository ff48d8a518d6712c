//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` so they depend only on the
//! driving ports and the session registry, never on the database adapters.

use std::sync::Arc;

use super::session_manager::SessionManager;
use crate::domain::ports::{PerformerService, RoleService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Performer use-cases.
    pub performers: Arc<dyn PerformerService>,
    /// Role use-cases.
    pub roles: Arc<dyn RoleService>,
    /// Active-session registry.
    pub sessions: Arc<SessionManager>,
}

impl HttpState {
    /// Bundle the ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use fgw_admin::domain::ports::{FixturePerformerRepository, FixtureRoleRepository};
    /// use fgw_admin::domain::{PerformerServiceImpl, RoleServiceImpl};
    /// use fgw_admin::inbound::http::session_manager::SessionManager;
    /// use fgw_admin::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(PerformerServiceImpl::new(Arc::new(FixturePerformerRepository))),
    ///     Arc::new(RoleServiceImpl::new(Arc::new(FixtureRoleRepository))),
    ///     Arc::new(SessionManager::new(Arc::new(mockable::DefaultClock))),
    /// );
    /// assert!(state.sessions.is_empty());
    /// ```
    #[must_use]
    pub fn new(
        performers: Arc<dyn PerformerService>,
        roles: Arc<dyn RoleService>,
        sessions: Arc<SessionManager>,
    ) -> Self {
        Self {
            performers,
            roles,
            sessions,
        }
    }
}
