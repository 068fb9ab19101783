//! Core library exports for the quiz bank service.
//!
//! The `data` feature exposes the domain, Diesel models and repositories.
//! The `server` feature adds forms, services, routes and the HTTP plumbing
//! used by the binary.

pub mod db;
pub mod domain;
pub mod models;
pub mod repository;
pub mod schema;

#[cfg(feature = "server")]
pub mod auth;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod error_conversions;
#[cfg(feature = "server")]
pub mod error_log;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod image_host;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;

/// Schema migrations bundled into the binary and applied at start-up.
#[cfg(feature = "server")]
pub const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
    diesel_migrations::embed_migrations!("migrations");
