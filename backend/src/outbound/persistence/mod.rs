//! SQL Server persistence adapters.
//!
//! Repositories are thin: each port method is one stored procedure call and
//! a row mapping. Business rules stay in the domain services. Connections
//! come from a `bb8` pool of `tiberius` clients.
//!
//! ```ignore
//! use fgw_admin::outbound::persistence::{DbConfig, DbPool, MssqlRoleRepository, PoolConfig};
//!
//! let config = DbConfig::from_env(&mockable::DefaultEnv::new())?;
//! let pool = DbPool::new(PoolConfig::new(config)).await?;
//! let roles = MssqlRoleRepository::new(pool);
//! ```

mod config;
mod mssql_performer_repository;
mod mssql_role_repository;
mod pool;
mod procedures;
mod rows;

pub use config::{DbConfig, DbConfigError};
pub use mssql_performer_repository::MssqlPerformerRepository;
pub use mssql_role_repository::MssqlRoleRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
