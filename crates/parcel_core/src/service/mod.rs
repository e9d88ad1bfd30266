//! Parcel use-case services.
//!
//! # Responsibility
//! - Apply the delivery workflow on top of the unconstrained store.
//! - Keep callers decoupled from storage details.

pub mod parcel_service;
