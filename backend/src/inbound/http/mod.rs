//! HTTP inbound adapter: session-backed page endpoints and redirects.

pub mod accounts;
pub mod health;
pub mod listings;
pub mod redirects;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod uploads;
pub mod views;

pub use crate::domain::ApiResult;
