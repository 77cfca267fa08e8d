//! `ss-engine` — the request-facing routing service core.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`request`] | `RouteRequest` / `RouteResponse` wire types                |
//! | [`engine`]  | `RouteEngine` — validation, snapping, search orchestration |
//! | [`handle`]  | `GraphHandle` — lazy single-init artifact loading          |
//! | [`error`]   | the full §-style error taxonomy with stable `kind()` strings |
//!
//! # Concurrency model
//!
//! The graph and mask are loaded once and shared read-only; each `route()`
//! call owns its scratch state, so a single `RouteEngine` serves any number
//! of threads without locking.

pub mod engine;
pub mod error;
pub mod handle;
pub mod request;


pub use engine::{EngineData, RouteEngine};
pub use error::{EngineError, EngineResult};
pub use handle::GraphHandle;
pub use request::{RouteDebug, RouteMetrics, RouteOptions, RouteRequest, RouteResponse};
