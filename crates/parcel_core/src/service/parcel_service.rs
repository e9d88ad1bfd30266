//! Parcel delivery workflow service.
//!
//! # Invariants
//! - Address changes and deletion are only allowed while a parcel is
//!   `Registered`.
//! - Status only moves forward, one stage per `next_status` call.
//! - Service layer remains storage-agnostic.

use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use crate::repo::parcel_repo::{ParcelRepository, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from parcel workflow operations.
#[derive(Debug)]
pub enum ServiceError {
    /// No parcel is stored under this number.
    NotFound(ParcelNumber),
    /// Operation requires a `Registered` parcel.
    NotRegistered {
        number: ParcelNumber,
        status: ParcelStatus,
    },
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(number) => write!(f, "parcel not found: {number}"),
            Self::NotRegistered { number, status } => write!(
                f,
                "parcel {number} has status `{status}`; only registered parcels can be changed"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Delivery workflow facade over a parcel repository.
pub struct ParcelService<R: ParcelRepository> {
    repo: R,
}

impl<R: ParcelRepository> ParcelService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new parcel for `client`, stamped with the current time.
    ///
    /// Returns the stored parcel including its assigned number.
    pub fn register(&self, client: ClientId, address: impl Into<String>) -> ServiceResult<Parcel> {
        let mut parcel = Parcel::new(client, address);
        parcel.number = self.repo.add(&parcel)?;
        info!(
            "event=parcel_register module=service status=ok number={} client={}",
            parcel.number, client
        );
        Ok(parcel)
    }

    /// Lists all parcels owned by `client`.
    pub fn client_parcels(&self, client: ClientId) -> ServiceResult<Vec<Parcel>> {
        Ok(self.repo.get_by_client(client)?)
    }

    /// Advances the parcel by one lifecycle stage and returns the resulting
    /// status. Delivered parcels are left untouched.
    pub fn next_status(&self, number: ParcelNumber) -> ServiceResult<ParcelStatus> {
        let parcel = self.load(number)?;
        let Some(next) = parcel.status.next() else {
            return Ok(parcel.status);
        };

        self.repo.set_status(number, next)?;
        info!(
            "event=parcel_next_status module=service status=ok number={} from={} to={}",
            number, parcel.status, next
        );
        Ok(next)
    }

    /// Replaces the delivery address of a registered parcel.
    pub fn change_address(&self, number: ParcelNumber, address: &str) -> ServiceResult<()> {
        self.ensure_registered(number)?;
        self.repo.set_address(number, address)?;
        info!("event=parcel_change_address module=service status=ok number={number}");
        Ok(())
    }

    /// Deletes a registered parcel.
    pub fn delete(&self, number: ParcelNumber) -> ServiceResult<()> {
        self.ensure_registered(number)?;
        self.repo.delete(number)?;
        info!("event=parcel_delete module=service status=ok number={number}");
        Ok(())
    }

    fn load(&self, number: ParcelNumber) -> ServiceResult<Parcel> {
        self.repo
            .get(number)?
            .ok_or(ServiceError::NotFound(number))
    }

    fn ensure_registered(&self, number: ParcelNumber) -> ServiceResult<()> {
        let parcel = self.load(number)?;
        if parcel.status != ParcelStatus::Registered {
            return Err(ServiceError::NotRegistered {
                number,
                status: parcel.status,
            });
        }
        Ok(())
    }
}
