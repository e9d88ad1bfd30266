//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the parcel data access contract.
//! - Keep SQL details out of the service layer.
//!
//! # Invariants
//! - Storage failures are passed through with the original
//!   `rusqlite::Error` reachable via `Error::source`.
//! - Missing rows are not errors: reads return `None`/empty, writes no-op.

pub mod parcel_repo;
