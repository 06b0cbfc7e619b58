//! Feature modules, one directory per resource.
//!
//! Each module follows the same structure: `model.rs` (resources and DTOs),
//! `service.rs` (business logic over the database), `controller.rs` (HTTP
//! handlers) and `router.rs` (route wiring).

pub mod auth;
pub mod entries;
pub mod goals;
pub mod roles;
pub mod users;
