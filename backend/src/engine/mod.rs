//! The merge engine: placeholder extraction, per-row binding, routing
//! resolution, record preview, and the batch dispatch loop.
//!
//! Everything here operates on explicit values (`Dataset`, `Template`,
//! `Mapping`, `RoutingConfig`) and holds no hidden state, so the HTTP layer
//! and the background worker can share it freely.

pub mod binder;
pub mod dispatch;
pub mod placeholder;
pub mod preview;
pub mod routing;
