//! Configuration modules, each loaded from environment variables.
//!
//! - [`cors`]: allowed CORS origins
//! - [`database`]: PostgreSQL connection pool initialization
//! - [`email`]: SMTP configuration for notifications
//! - [`jwt`]: JWT authentication configuration

pub mod cors;
pub mod database;
pub mod email;
pub mod jwt;
