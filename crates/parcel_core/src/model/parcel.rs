//! Parcel domain model.
//!
//! # Invariants
//! - `number` is assigned by storage on insert and never changes afterwards.
//! - `created_at` is an RFC3339 timestamp fixed at creation time.
//! - Any `ParcelStatus` may overwrite any other at the storage layer.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Storage-assigned parcel identifier. Zero means "not stored yet".
pub type ParcelNumber = i64;

/// Identifier of the customer who owns a parcel.
pub type ClientId = i64;

/// Delivery lifecycle stage of a parcel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelStatus {
    /// Accepted for delivery, not yet handed to a carrier.
    #[default]
    Registered,
    /// In transit.
    Sent,
    /// Handed to the recipient.
    Delivered,
}

impl ParcelStatus {
    /// Returns the persisted string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
        }
    }

    /// Parses the persisted string form. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "registered" => Some(Self::Registered),
            "sent" => Some(Self::Sent),
            "delivered" => Some(Self::Delivered),
            _ => None,
        }
    }

    /// Returns the following lifecycle stage, or `None` once delivered.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Registered => Some(Self::Sent),
            Self::Sent => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }
}

impl Display for ParcelStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracked shipment record.
///
/// `Parcel::default()` is the empty record. `number == 0` is the only field
/// that marks it as empty; its status is `Registered`, which a stored parcel
/// can also have.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    pub number: ParcelNumber,
    pub client: ClientId,
    pub status: ParcelStatus,
    pub address: String,
    pub created_at: String,
}

impl Parcel {
    /// Creates a registered, not-yet-stored parcel stamped with the current
    /// UTC time.
    pub fn new(client: ClientId, address: impl Into<String>) -> Self {
        Self {
            number: 0,
            client,
            status: ParcelStatus::Registered,
            address: address.into(),
            created_at: now_rfc3339(),
        }
    }

    /// Returns whether storage has assigned a number to this parcel.
    pub fn is_stored(&self) -> bool {
        self.number > 0
    }
}

/// Current UTC time as RFC3339 with second precision, e.g.
/// `2024-01-01T00:00:00Z`.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
