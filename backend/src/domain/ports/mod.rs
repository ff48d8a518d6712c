//! Domain ports for the hexagonal boundary.
//!
//! Repository ports are implemented by outbound adapters; service ports are
//! driven by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod performer_repository;
mod performer_service;
mod role_repository;
mod role_service;

#[cfg(test)]
pub use performer_repository::MockPerformerRepository;
pub use performer_repository::{
    FixturePerformerRepository, PerformerRepository, PerformerRepositoryError,
};
#[cfg(test)]
pub use performer_service::MockPerformerService;
pub use performer_service::PerformerService;
#[cfg(test)]
pub use role_repository::MockRoleRepository;
pub use role_repository::{FixtureRoleRepository, RoleRepository, RoleRepositoryError};
#[cfg(test)]
pub use role_service::MockRoleService;
pub use role_service::RoleService;
