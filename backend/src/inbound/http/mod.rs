//! HTTP inbound adapter: server-rendered pages, the JSON API and the guards
//! in front of them.

pub mod admin_performers;
pub mod admin_roles;
pub mod api;
pub mod auth_middleware;
pub mod dto;
pub mod error;
pub mod health;
pub mod pages;
pub mod routes;
pub mod session;
pub mod session_check;
pub mod session_config;
pub mod session_manager;
pub mod state;
pub mod templates;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
