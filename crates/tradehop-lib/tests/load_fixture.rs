mod common;

use std::fs;

use common::{fixture_db_path, load_fixture};
use rusqlite::Connection;
use tradehop_lib::{load_trade_db, Error, PadSize, Place};

#[test]
fn fixture_loads_every_table() {
    let db = load_fixture();
    assert_eq!(db.systems().count(), 5);
    assert_eq!(db.station_count(), 6);
    assert_eq!(db.trading_count(), 4);

    let Place::Station(id) = db.lookup_place("Lave/Lave Station").expect("resolves") else {
        panic!("expected a station");
    };
    let station = db.station(id).expect("station");
    assert_eq!(station.max_pad_size, PadSize::Large);
    assert_eq!(station.black_market, Some(false));
    assert_eq!(station.ls_from_star, 300.0);
    assert_eq!(station.item_count, 4);
    assert_eq!(station.data_age_days, Some(0.5));
}

#[test]
fn station_without_prices_has_no_items() {
    let db = load_fixture();
    let Place::Station(id) = db.lookup_place("Reilly Hub").expect("resolves") else {
        panic!("expected a station");
    };
    assert_eq!(db.station(id).expect("station").item_count, 0);
}

#[test]
fn range_queries_use_fixture_coordinates() {
    let db = load_fixture();
    let lave = db.system_by_name("lave").expect("Lave").id;
    let mut names: Vec<&str> = db
        .systems_in_range(lave, 7.5)
        .map(|(id, _)| db.system_name(id))
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Diso", "Leesti"]);
}

#[test]
fn missing_tables_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.db");
    let connection = Connection::open(&path).expect("open");
    connection
        .execute_batch("CREATE TABLE System (system_id INTEGER, name TEXT);")
        .expect("schema");
    drop(connection);

    let err = load_trade_db(&path).expect_err("unsupported");
    assert!(matches!(err, Error::UnsupportedSchema));
}

#[test]
fn optional_station_columns_default_to_unknown() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("lean.db");
    let connection = Connection::open(&path).expect("open");
    connection
        .execute_batch(
            "CREATE TABLE System (system_id INTEGER, name TEXT, pos_x REAL, pos_y REAL, pos_z REAL);
             CREATE TABLE Station (station_id INTEGER, name TEXT, system_id INTEGER);
             CREATE TABLE Item (item_id INTEGER, name TEXT);
             CREATE TABLE StationItem (station_id INTEGER, item_id INTEGER,
                                       demand_price INTEGER, supply_price INTEGER);
             INSERT INTO System VALUES (1, 'Solo', 0, 0, 0);
             INSERT INTO Station VALUES (1, 'Only Dock', 1);
             INSERT INTO Station VALUES (2, 'Lost Dock', 99);
             INSERT INTO Item VALUES (1, 'Water');
             INSERT INTO StationItem VALUES (1, 1, 0, 5);",
        )
        .expect("schema");
    drop(connection);

    let db = load_trade_db(&path).expect("loads");
    assert_eq!(db.station_count(), 1, "orphan station skipped");
    let station = db.station(1).expect("station");
    assert_eq!(station.max_pad_size, PadSize::Unknown);
    assert_eq!(station.black_market, None);
    assert_eq!(station.ls_from_star, 0.0);
    assert_eq!(db.trading_count(), 0);
}

#[test]
fn fixture_sql_matches_checked_in_database() {
    let sql = fs::read_to_string(fixture_db_path().with_extension("sql")).expect("sql source");
    let connection = Connection::open_in_memory().expect("memory db");
    connection.execute_batch(&sql).expect("sql applies");
    let rows: i64 = connection
        .query_row("SELECT COUNT(*) FROM StationItem", [], |row| row.get(0))
        .expect("count");

    let on_disk = Connection::open(fixture_db_path()).expect("fixture");
    let disk_rows: i64 = on_disk
        .query_row("SELECT COUNT(*) FROM StationItem", [], |row| row.get(0))
        .expect("count");
    assert_eq!(rows, disk_rows);
}
