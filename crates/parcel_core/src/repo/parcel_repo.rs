//! Parcel repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide add/get/delete/partial-update/list-by-client over the `parcel`
//!   table.
//! - Map rows to `Parcel` values.
//!
//! # Invariants
//! - `number` is assigned by SQLite (`AUTOINCREMENT`) and never rewritten.
//! - Status writes are unconstrained; any status may replace any other.
//! - Read paths reject unknown persisted status strings instead of masking
//!   them.

use crate::db::DbError;
use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PARCEL_TABLE: &str = "parcel";
const PARCEL_COLUMNS: [&str; 5] = ["number", "client", "status", "address", "created_at"];

const PARCEL_SELECT_SQL: &str = "SELECT
    number,
    client,
    status,
    address,
    created_at
FROM parcel";

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from parcel persistence operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error, passed through unchanged.
    Db(DbError),
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted row cannot be converted to a valid `Parcel`.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "parcel store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "parcel store requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted parcel data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for parcel storage.
pub trait ParcelRepository {
    /// Inserts a parcel and returns the storage-assigned number.
    ///
    /// `parcel.number` is ignored.
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber>;
    /// Loads one parcel, `None` when no row matches.
    fn get(&self, number: ParcelNumber) -> RepoResult<Option<Parcel>>;
    /// Hard-deletes one parcel. Deleting a missing number succeeds.
    fn delete(&self, number: ParcelNumber) -> RepoResult<()>;
    /// Replaces the address only.
    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()>;
    /// Replaces the status only.
    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()>;
    /// Lists every parcel owned by `client`, ordered by number.
    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>>;
}

/// SQLite-backed parcel store borrowing a caller-owned connection.
pub struct SqliteParcelStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParcelStore<'conn> {
    /// Wraps a caller-supplied connection.
    ///
    /// The connection may come from `open_db` or be opened directly; only the
    /// shape of the `parcel` table is checked.
    ///
    /// # Errors
    /// Rejects connections missing the `parcel` table or any of its columns.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_parcel_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ParcelRepository for SqliteParcelStore<'_> {
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber> {
        self.conn.execute(
            "INSERT INTO parcel (client, status, address, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                parcel.client,
                parcel.status.as_str(),
                parcel.address.as_str(),
                parcel.created_at.as_str(),
            ],
        )?;

        let number = self.conn.last_insert_rowid();
        debug!(
            "event=parcel_add module=repo status=ok number={} client={}",
            number, parcel.client
        );
        Ok(number)
    }

    fn get(&self, number: ParcelNumber) -> RepoResult<Option<Parcel>> {
        let row = self
            .conn
            .query_row(
                &format!("{PARCEL_SELECT_SQL} WHERE number = ?1;"),
                [number],
                read_parcel_row,
            )
            .optional()?;

        row.map(RawParcelRow::into_parcel).transpose()
    }

    fn delete(&self, number: ParcelNumber) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM parcel WHERE number = ?1;", [number])?;
        debug!("event=parcel_delete module=repo status=ok number={number} changed={changed}");
        Ok(())
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE parcel SET address = ?2 WHERE number = ?1;",
            params![number, address],
        )?;
        debug!("event=parcel_set_address module=repo status=ok number={number} changed={changed}");
        Ok(())
    }

    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE parcel SET status = ?2 WHERE number = ?1;",
            params![number, status.as_str()],
        )?;
        debug!(
            "event=parcel_set_status module=repo status=ok number={} parcel_status={} changed={}",
            number, status, changed
        );
        Ok(())
    }

    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PARCEL_SELECT_SQL}
             WHERE client = ?1
             ORDER BY number ASC;"
        ))?;

        let rows = stmt.query_map([client], read_parcel_row)?;
        let mut parcels = Vec::new();
        for row in rows {
            parcels.push(row?.into_parcel()?);
        }

        Ok(parcels)
    }
}

/// Row as stored, before status validation.
struct RawParcelRow {
    number: ParcelNumber,
    client: ClientId,
    status: String,
    address: String,
    created_at: String,
}

impl RawParcelRow {
    fn into_parcel(self) -> RepoResult<Parcel> {
        let status = ParcelStatus::parse(&self.status).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid status `{}` in parcel.status for number {}",
                self.status, self.number
            ))
        })?;

        Ok(Parcel {
            number: self.number,
            client: self.client,
            status,
            address: self.address,
            created_at: self.created_at,
        })
    }
}

fn read_parcel_row(row: &Row<'_>) -> rusqlite::Result<RawParcelRow> {
    Ok(RawParcelRow {
        number: row.get("number")?,
        client: row.get("client")?,
        status: row.get("status")?,
        address: row.get("address")?,
        created_at: row.get("created_at")?,
    })
}

fn ensure_parcel_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, PARCEL_TABLE)? {
        return Err(RepoError::MissingRequiredTable(PARCEL_TABLE));
    }

    let present = table_columns(conn, PARCEL_TABLE)?;
    if let Some(column) = PARCEL_COLUMNS
        .into_iter()
        .find(|column| !present.iter().any(|name| name.as_str() == *column))
    {
        return Err(RepoError::MissingRequiredColumn {
            table: PARCEL_TABLE,
            column,
        });
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}
