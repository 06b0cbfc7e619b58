//! Shared utilities.
//!
//! - [`email`]: SMTP notifications
//! - [`errors`]: the application error taxonomy and response mapping
//! - [`extract`]: path/query extractors rejecting through the taxonomy
//! - [`jwt`]: token issuance and validation
//! - [`password`]: bcrypt hashing

pub mod email;
pub mod errors;
pub mod extract;
pub mod jwt;
pub mod password;
