//! Administration backend for FGW performers and roles.
//!
//! Layout follows the ports-and-adapters split: [`domain`] owns the model
//! and rules, [`inbound`] the HTTP surface, [`outbound`] the SQL Server
//! adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI.
pub use doc::ApiDoc;
pub use middleware::Trace;
