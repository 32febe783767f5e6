//! In-memory registry of orders created by clients.
//!
//! Orders are never deleted; they live for the process lifetime. The registry
//! is owned by the server state and injected into handlers — there is no
//! module-level global.

pub mod store;

pub use store::{OrderId, OrderStore};
