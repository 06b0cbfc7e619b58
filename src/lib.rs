//! WalkTrack: a walk-tracking REST service.
//!
//! Payloads are negotiated through versioned, structured media types
//! (`application/json; structure=X; version=N`) resolved against a transcoder
//! registry, for both HTTP bodies and persisted documents. Requests are
//! authenticated by bearer JWT into a per-request context, and handlers gate
//! themselves with named permission requirements resolved either locally or
//! by a peer service.

pub mod client;
pub mod config;
pub mod docs;
pub mod logging;
pub mod media;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;
