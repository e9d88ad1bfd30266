//! Domain model for tracked shipments.
//!
//! # Invariants
//! - A stored parcel is identified by its storage-assigned `ParcelNumber`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod parcel;
