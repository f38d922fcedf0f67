//! Infrastructure layer: record store gateway, services, config.

pub mod config;
pub mod record_store;
pub mod services;
