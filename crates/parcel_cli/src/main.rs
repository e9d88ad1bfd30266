//! Parcel tracker demo driver.
//!
//! # Responsibility
//! - Walk one parcel through register, address change, delivery and a
//!   rejected delete against a real database file.
//! - Keep output deterministic apart from numbers and timestamps.
//!
//! # Environment
//! - `PARCEL_DB_PATH`: database file, defaults to `tracker.db`.
//! - `PARCEL_LOG_DIR`: absolute log directory; file logging is off when unset.
//! - `PARCEL_LOG_LEVEL`: `trace|debug|info|warn|error`, defaults per build.

use parcel_core::db::open_db;
use parcel_core::{
    default_log_level, init_logging, ClientId, Parcel, ParcelService, ServiceError,
    SqliteParcelStore,
};
use std::env;
use std::error::Error;

const DEFAULT_DB_PATH: &str = "tracker.db";
const DEMO_CLIENT: ClientId = 1;

fn main() -> Result<(), Box<dyn Error>> {
    if let Ok(log_dir) = env::var("PARCEL_LOG_DIR") {
        let level = env::var("PARCEL_LOG_LEVEL").unwrap_or_else(|_| default_log_level().into());
        init_logging(&level, &log_dir)?;
    }

    let db_path = env::var("PARCEL_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    let conn = open_db(&db_path)?;
    let service = ParcelService::new(SqliteParcelStore::try_new(&conn)?);

    let parcel = service.register(DEMO_CLIENT, "Pskov, Oktyabrsky pr. 1")?;
    println!("registered {}", describe(&parcel));

    service.change_address(parcel.number, "Saratov, Verkhnyaya ul. 3")?;
    println!("parcel {} address changed", parcel.number);

    let status = service.next_status(parcel.number)?;
    println!("parcel {} status -> {status}", parcel.number);

    print_client_parcels(&service)?;

    match service.delete(parcel.number) {
        Err(ServiceError::NotRegistered { number, status }) => {
            println!("parcel {number} kept: cannot delete while {status}");
        }
        other => other?,
    }

    let extra = service.register(DEMO_CLIENT, "Pskov, Sadovaya ul. 7")?;
    service.delete(extra.number)?;
    println!("parcel {} deleted", extra.number);

    print_client_parcels(&service)?;
    Ok(())
}

fn print_client_parcels(
    service: &ParcelService<SqliteParcelStore<'_>>,
) -> Result<(), ServiceError> {
    let parcels = service.client_parcels(DEMO_CLIENT)?;
    println!("client {DEMO_CLIENT} has {} parcel(s):", parcels.len());
    for parcel in &parcels {
        println!("  {}", describe(parcel));
    }
    Ok(())
}

fn describe(parcel: &Parcel) -> String {
    format!(
        "#{} client={} status={} address=\"{}\" created_at={}",
        parcel.number, parcel.client, parcel.status, parcel.address, parcel.created_at
    )
}
