use parcel_core::db::{open_db, open_db_in_memory, DbError};
use parcel_core::{Parcel, ParcelRepository, ParcelStatus, RepoError, SqliteParcelStore};
use rusqlite::Connection;
use std::collections::HashMap;
use std::error::Error;

fn test_parcel() -> Parcel {
    Parcel {
        number: 0,
        client: 1000,
        status: ParcelStatus::Registered,
        address: "test".to_string(),
        created_at: "2024-01-01T00:00:00Z".to_string(),
    }
}

fn assert_same_fields(actual: &Parcel, expected: &Parcel) {
    assert_eq!(actual.client, expected.client);
    assert_eq!(actual.status, expected.status);
    assert_eq!(actual.address, expected.address);
    assert_eq!(actual.created_at, expected.created_at);
}

#[test]
fn add_get_delete_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    let parcel = test_parcel();

    let number = store.add(&parcel).unwrap();
    assert!(number > 0);

    let stored = store.get(number).unwrap().unwrap();
    assert_eq!(stored.number, number);
    assert_same_fields(&stored, &parcel);

    store.delete(number).unwrap();
    assert!(store.get(number).unwrap().is_none());
    assert_eq!(store.get(number).unwrap().unwrap_or_default(), Parcel::default());
}

#[test]
fn add_assigns_unique_increasing_numbers_and_ignores_input_number() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();

    let mut parcel = test_parcel();
    parcel.number = 42_000;
    let first = store.add(&parcel).unwrap();
    let second = store.add(&parcel).unwrap();

    assert!(first > 0);
    assert_ne!(first, 42_000);
    assert!(second > first);
}

#[test]
fn get_missing_number_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();

    assert!(store.get(9_999).unwrap().is_none());
}

#[test]
fn delete_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();

    let number = store.add(&test_parcel()).unwrap();
    store.delete(number).unwrap();
    store.delete(number).unwrap();
    store.delete(123_456).unwrap();
}

#[test]
fn set_address_changes_only_address() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    let parcel = test_parcel();
    let number = store.add(&parcel).unwrap();

    store.set_address(number, "new test address").unwrap();

    let stored = store.get(number).unwrap().unwrap();
    assert_eq!(stored.address, "new test address");
    assert_eq!(stored.client, parcel.client);
    assert_eq!(stored.status, parcel.status);
    assert_eq!(stored.created_at, parcel.created_at);
}

#[test]
fn set_status_changes_only_status_and_allows_any_transition() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    let parcel = test_parcel();
    let number = store.add(&parcel).unwrap();

    store.set_status(number, ParcelStatus::Sent).unwrap();
    let stored = store.get(number).unwrap().unwrap();
    assert_eq!(stored.status, ParcelStatus::Sent);
    assert_eq!(stored.address, parcel.address);
    assert_eq!(stored.client, parcel.client);
    assert_eq!(stored.created_at, parcel.created_at);

    store.set_status(number, ParcelStatus::Delivered).unwrap();
    store.set_status(number, ParcelStatus::Registered).unwrap();
    let stored = store.get(number).unwrap().unwrap();
    assert_eq!(stored.status, ParcelStatus::Registered);
}

#[test]
fn updates_on_missing_number_succeed_without_creating_rows() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();

    store.set_address(777, "anywhere").unwrap();
    store.set_status(777, ParcelStatus::Sent).unwrap();

    assert!(store.get(777).unwrap().is_none());
}

#[test]
fn get_by_client_returns_exactly_that_clients_parcels() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    let client = 5_550_123;

    let mut expected = HashMap::new();
    for address in ["first", "second", "third"] {
        let mut parcel = test_parcel();
        parcel.client = client;
        parcel.address = address.to_string();
        parcel.number = store.add(&parcel).unwrap();
        expected.insert(parcel.number, parcel);
    }

    let mut other = test_parcel();
    other.client = client + 1;
    store.add(&other).unwrap();

    let stored = store.get_by_client(client).unwrap();
    assert_eq!(stored.len(), expected.len());
    for parcel in &stored {
        let original = expected
            .get(&parcel.number)
            .unwrap_or_else(|| panic!("unexpected parcel {}", parcel.number));
        assert_eq!(parcel, original);
    }
}

#[test]
fn get_by_client_without_parcels_returns_empty() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    store.add(&test_parcel()).unwrap();

    assert!(store.get_by_client(1).unwrap().is_empty());
}

#[test]
fn store_data_survives_reopening_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracker.db");
    let parcel = test_parcel();

    let number = {
        let conn = open_db(&path).unwrap();
        let store = SqliteParcelStore::try_new(&conn).unwrap();
        store.add(&parcel).unwrap()
    };

    let conn = open_db(&path).unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    let stored = store.get(number).unwrap().unwrap();
    assert_same_fields(&stored, &parcel);
}

#[test]
fn storage_failures_pass_through_sqlite_error() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    conn.execute_batch("DROP TABLE parcel;").unwrap();

    let err = store.add(&test_parcel()).unwrap_err();
    match &err {
        RepoError::Db(db_err) => assert!(db_err.as_sqlite().to_string().contains("parcel")),
        other => panic!("unexpected error: {other}"),
    }
    let source = err.source().unwrap();
    assert!(source.to_string().contains("parcel"));

    assert!(matches!(
        store.get_by_client(1000),
        Err(RepoError::Db(DbError::Sqlite(_)))
    ));
    assert!(matches!(store.delete(1), Err(RepoError::Db(DbError::Sqlite(_)))));
    assert!(matches!(store.get(1), Err(RepoError::Db(DbError::Sqlite(_)))));
    assert!(matches!(
        store.set_address(1, "new test address"),
        Err(RepoError::Db(DbError::Sqlite(_)))
    ));
    assert!(matches!(
        store.set_status(1, ParcelStatus::Sent),
        Err(RepoError::Db(DbError::Sqlite(_)))
    ));
}

#[test]
fn store_accepts_caller_built_table_without_bootstrap() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE parcel (
            number INTEGER PRIMARY KEY AUTOINCREMENT,
            client INTEGER NOT NULL,
            status TEXT NOT NULL,
            address TEXT NOT NULL,
            created_at TEXT NOT NULL
        );",
    )
    .unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    let parcel = test_parcel();

    let number = store.add(&parcel).unwrap();
    assert!(number > 0);
    assert_same_fields(&store.get(number).unwrap().unwrap(), &parcel);
}

#[test]
fn store_rejects_connection_without_parcel_table() {
    let conn = Connection::open_in_memory().unwrap();

    assert!(matches!(
        SqliteParcelStore::try_new(&conn),
        Err(RepoError::MissingRequiredTable("parcel"))
    ));
}

#[test]
fn store_rejects_connection_missing_parcel_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE parcel (
            number INTEGER PRIMARY KEY AUTOINCREMENT,
            client INTEGER NOT NULL,
            status TEXT NOT NULL,
            address TEXT NOT NULL
        );",
    )
    .unwrap();

    assert!(matches!(
        SqliteParcelStore::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "parcel",
            column: "created_at"
        })
    ));
}
