//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: SQL Server repositories calling stored procedures.
//!
//! Adapters translate between domain types and driver representations and
//! contain no business logic.

pub mod persistence;
