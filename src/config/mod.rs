//! Configuration loaded from environment variables.
//!
//! - [`cors`]: allowed CORS origins
//! - [`database`]: PostgreSQL pool initialization and migrations
//! - [`email`]: SMTP settings for outbound mail
//! - [`jwt`]: signing secret and token lifetime

pub mod cors;
pub mod database;
pub mod email;
pub mod jwt;
