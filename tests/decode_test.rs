// Copyright 2026 Stela Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Row decoding tests
//!
//! One untyped `items(value ANY)` table, one bound value per test, decoded
//! through the `FromRow` protocol into progressively narrower targets.

use stela::{Database, DecodeError, Error, FromColumn, FromRow, Row, Statement, ToParam};

/// Single-field record, generic over the field target type.
#[derive(Debug, PartialEq)]
struct Item<T> {
    value: T,
}

impl<T: FromColumn> FromRow for Item<T> {
    fn from_row(row: &Row<'_>) -> stela::Result<Self> {
        Ok(Item {
            value: row.get_named("value")?,
        })
    }
}

fn items_db() -> Database {
    let db = Database::open_in_memory().expect("open in-memory database");
    db.execute("CREATE TABLE items (value ANY)").expect("create items table");
    db
}

/// Insert `value` and return a statement positioned on the stored row.
fn select_stored(db: &Database, value: impl ToParam) -> Statement {
    let mut insert = db
        .prepare("INSERT INTO items (value) VALUES (?)")
        .expect("prepare insert");
    insert.bind(1, value).expect("bind value").execute().expect("run insert");
    let mut select = db.prepare("SELECT value FROM items").expect("prepare select");
    assert!(select.step().expect("step to stored row"));
    select
}

fn data_corrupted(err: Error) -> (String, String) {
    match err {
        Error::Decode(DecodeError::DataCorrupted { path, message }) => {
            (path.to_string(), message)
        }
        other => panic!("expected DataCorrupted, got {other:?}"),
    }
}

// ----------------------------------------------------------------------
// Integer targets
// ----------------------------------------------------------------------

#[test]
fn test_decode_integer() {
    let db = items_db();
    let select = select_stored(&db, 5i64);

    // Keyed record and one-column scalar shortcut see the same value.
    assert_eq!(select.decode::<Item<i64>>().expect("keyed decode"), Item { value: 5 });
    assert_eq!(select.decode::<i64>().expect("scalar decode"), 5);
}

/// Engine dynamic typing: text "9" in an ANY column reads back as integer 9.
#[test]
fn test_decode_integer_from_text() {
    let db = items_db();
    let select = select_stored(&db, "9");
    assert_eq!(select.decode::<Item<i64>>().expect("decode"), Item { value: 9 });
}

/// Documented truncation rule: reading a fractional real as an integer
/// truncates toward zero.
#[test]
fn test_decode_integer_from_real_truncates() {
    let db = items_db();
    let select = select_stored(&db, 0.9f64);
    assert_eq!(select.decode::<Item<i64>>().expect("decode"), Item { value: 0 });
}

#[test]
fn test_decode_integer_from_blob_digits() {
    let db = items_db();
    let select = select_stored(&db, b"3".to_vec());
    assert_eq!(select.decode::<Item<i64>>().expect("decode"), Item { value: 3 });
}

#[test]
fn test_narrowing_overflow_is_data_corrupted() {
    let db = items_db();
    let select = select_stored(&db, 300i64);

    let (path, message) = data_corrupted(select.decode::<Item<u8>>().expect_err("300 into u8"));
    assert_eq!(path, "value");
    assert_eq!(message, "integer value <300> does not fit in u8");
}

#[test]
fn test_negative_into_unsigned_is_data_corrupted() {
    let db = items_db();
    let select = select_stored(&db, -1i64);

    let (_, message) = data_corrupted(select.decode::<Item<u8>>().expect_err("-1 into u8"));
    assert_eq!(message, "integer value <-1> does not fit in u8");

    let (_, message) = data_corrupted(select.decode::<Item<u64>>().expect_err("-1 into u64"));
    assert_eq!(message, "integer value <-1> does not fit in u64");
}

#[test]
fn test_narrowing_in_range_succeeds() {
    let db = items_db();
    let select = select_stored(&db, 255i64);
    assert_eq!(select.decode::<Item<u8>>().expect("255 fits u8"), Item { value: 255 });
    assert_eq!(select.decode::<Item<i16>>().expect("255 fits i16"), Item { value: 255 });
}

// ----------------------------------------------------------------------
// Floating-point targets
// ----------------------------------------------------------------------

#[test]
fn test_decode_double() {
    let db = items_db();
    let select = select_stored(&db, 0.5f64);
    assert_eq!(select.decode::<Item<f64>>().expect("decode"), Item { value: 0.5 });
    assert_eq!(select.decode::<Item<f32>>().expect("0.5 is exact in f32"), Item { value: 0.5 });
}

#[test]
fn test_decode_double_from_integer() {
    let db = items_db();
    let select = select_stored(&db, 1i64);
    assert_eq!(select.decode::<Item<f64>>().expect("decode"), Item { value: 1.0 });
}

#[test]
fn test_inexact_float_narrowing_is_data_corrupted() {
    let db = items_db();
    let select = select_stored(&db, f64::MAX);

    let (path, message) =
        data_corrupted(select.decode::<Item<f32>>().expect_err("f64::MAX into f32"));
    assert_eq!(path, "value");
    assert!(message.contains("does not fit in f32"), "message: {message}");
}

// ----------------------------------------------------------------------
// Bool, text, blob targets
// ----------------------------------------------------------------------

#[test]
fn test_decode_bool_from_integers() {
    let db = items_db();
    assert_eq!(
        select_stored(&db, 1i64).decode::<Item<bool>>().expect("decode"),
        Item { value: true }
    );
    db.execute("DELETE FROM items").expect("clear");
    assert_eq!(
        select_stored(&db, 0i64).decode::<Item<bool>>().expect("decode"),
        Item { value: false }
    );
    db.execute("DELETE FROM items").expect("clear");
    // 0.9 reads as integer 0
    assert_eq!(
        select_stored(&db, 0.9f64).decode::<Item<bool>>().expect("decode"),
        Item { value: false }
    );
}

#[test]
fn test_decode_string_coerces_from_any_kind() {
    let db = items_db();
    assert_eq!(
        select_stored(&db, 0.9f64).decode::<Item<String>>().expect("decode"),
        Item { value: "0.9".to_string() }
    );
    db.execute("DELETE FROM items").expect("clear");
    assert_eq!(
        select_stored(&db, "abc").decode::<Item<String>>().expect("decode"),
        Item { value: "abc".to_string() }
    );
    db.execute("DELETE FROM items").expect("clear");
    assert_eq!(
        select_stored(&db, b"zxc".to_vec()).decode::<Item<String>>().expect("decode"),
        Item { value: "zxc".to_string() }
    );
}

#[test]
fn test_decode_blob_reads_raw_bytes() {
    let db = items_db();
    assert_eq!(
        select_stored(&db, b"zxc".to_vec()).decode::<Item<Vec<u8>>>().expect("decode"),
        Item { value: b"zxc".to_vec() }
    );
    db.execute("DELETE FROM items").expect("clear");
    // Text reads as its raw bytes through the blob path.
    assert_eq!(
        select_stored(&db, "123").decode::<Item<Vec<u8>>>().expect("decode"),
        Item { value: b"123".to_vec() }
    );
}

// ----------------------------------------------------------------------
// Null and optionality
// ----------------------------------------------------------------------

#[test]
fn test_null_into_optional_is_absent() {
    let db = items_db();
    let select = select_stored(&db, Option::<i64>::None);
    assert_eq!(
        select.decode::<Item<Option<i64>>>().expect("decode"),
        Item { value: None }
    );
}

#[test]
fn test_value_into_optional_is_present() {
    let db = items_db();
    let select = select_stored(&db, 1i64);
    assert_eq!(
        select.decode::<Item<Option<i64>>>().expect("decode"),
        Item { value: Some(1) }
    );
}

#[test]
fn test_null_into_required_scalar_is_value_not_found() {
    let db = items_db();
    let select = select_stored(&db, Option::<i64>::None);

    for target_err in [
        select.decode::<Item<i64>>().expect_err("null into i64"),
        select.decode::<Item<String>>().expect_err("null into String"),
        select.decode::<Item<Vec<u8>>>().expect_err("null into blob"),
        select.decode::<Item<bool>>().expect_err("null into bool"),
        select.decode::<Item<f64>>().expect_err("null into f64"),
    ] {
        match target_err {
            Error::Decode(DecodeError::ValueNotFound { path, .. }) => {
                assert_eq!(path.to_string(), "value");
            }
            other => panic!("expected ValueNotFound, got {other:?}"),
        }
    }
}

// ----------------------------------------------------------------------
// Key resolution
// ----------------------------------------------------------------------

#[derive(Debug, PartialEq)]
struct Mislabeled {
    item: i64,
}

impl FromRow for Mislabeled {
    fn from_row(row: &Row<'_>) -> stela::Result<Self> {
        Ok(Mislabeled {
            item: row.get_named("item")?,
        })
    }
}

#[test]
fn test_missing_key_is_key_not_found() {
    let db = items_db();
    let select = select_stored(&db, 1i64);

    let err = select.decode::<Mislabeled>().expect_err("no 'item' column");
    match err {
        Error::Decode(DecodeError::KeyNotFound { key, path }) => {
            assert_eq!(key, "item");
            assert_eq!(path.segments(), ["item"]);
        }
        other => panic!("expected KeyNotFound, got {other:?}"),
    }
}

#[derive(Debug, PartialEq)]
struct Lenient {
    value: i64,
    missing: Option<i64>,
}

impl FromRow for Lenient {
    fn from_row(row: &Row<'_>) -> stela::Result<Self> {
        Ok(Lenient {
            value: row.get_named("value")?,
            missing: row.get_named("missing")?,
        })
    }
}

/// An unknown key decodes an optional field as absent instead of erroring.
#[test]
fn test_missing_key_into_optional_is_absent() {
    let db = items_db();
    let select = select_stored(&db, 5i64);
    assert_eq!(
        select.decode::<Lenient>().expect("decode"),
        Lenient { value: 5, missing: None }
    );
}

// ----------------------------------------------------------------------
// Nested records
// ----------------------------------------------------------------------

#[derive(Debug, PartialEq)]
struct Wrapper {
    value: i64,
    details: Details,
}

#[derive(Debug, PartialEq)]
struct Details {
    label: String,
}

impl FromRow for Wrapper {
    fn from_row(row: &Row<'_>) -> stela::Result<Self> {
        Ok(Wrapper {
            value: row.get_named("value")?,
            details: row.nested("details")?,
        })
    }
}

impl FromRow for Details {
    fn from_row(row: &Row<'_>) -> stela::Result<Self> {
        Ok(Details {
            label: row.get_named("label")?,
        })
    }
}

#[test]
fn test_nested_record_decodes_from_same_row() {
    let db = items_db();
    select_stored(&db, 5i64);

    let mut select = db
        .prepare("SELECT value, 'tagged' AS label FROM items")
        .expect("prepare select");
    assert!(select.step().expect("step"));

    assert_eq!(
        select.decode::<Wrapper>().expect("decode"),
        Wrapper { value: 5, details: Details { label: "tagged".to_string() } }
    );
}

/// A failure inside a nested record names the full path to the field.
#[test]
fn test_nested_failure_carries_full_path() {
    let db = items_db();
    let select = select_stored(&db, 5i64);

    let err = select.decode::<Wrapper>().expect_err("no 'label' column");
    match err {
        Error::Decode(DecodeError::KeyNotFound { key, path }) => {
            assert_eq!(key, "label");
            assert_eq!(path.to_string(), "details.label");
        }
        other => panic!("expected KeyNotFound, got {other:?}"),
    }
}

// ----------------------------------------------------------------------
// Batch decoding
// ----------------------------------------------------------------------

#[test]
fn test_query_as_preserves_row_order() {
    let db = items_db();
    let mut insert = db
        .prepare("INSERT INTO items (value) VALUES (:value)")
        .expect("prepare insert");
    for value in [10i64, 20, 30] {
        insert.bind_name(":value", value).expect("bind");
        insert.execute().expect("insert");
        insert.reset().expect("reset");
    }

    let mut select = db
        .prepare("SELECT value FROM items ORDER BY rowid")
        .expect("prepare select");
    let items: Vec<Item<i64>> = select.query_as().expect("decode all");
    assert_eq!(
        items,
        vec![Item { value: 10 }, Item { value: 20 }, Item { value: 30 }]
    );
}

#[test]
fn test_query_as_empty_result_is_empty_vec() {
    let db = items_db();
    let mut select = db.prepare("SELECT value FROM items").expect("prepare select");
    let items: Vec<Item<i64>> = select.query_as().expect("decode empty result");
    assert!(items.is_empty());
}

/// All-or-nothing: one bad row fails the whole batch.
#[test]
fn test_query_as_fails_on_first_bad_row() {
    let db = items_db();
    db.execute("INSERT INTO items VALUES (1); INSERT INTO items VALUES (NULL); INSERT INTO items VALUES (3);")
        .expect("insert rows");

    let mut select = db
        .prepare("SELECT value FROM items ORDER BY rowid")
        .expect("prepare select");
    let err = select
        .query_as::<Item<i64>>()
        .expect_err("null row must fail the batch");
    assert!(matches!(
        err,
        Error::Decode(DecodeError::ValueNotFound { .. })
    ));
}

#[test]
fn test_query_as_bare_scalars() {
    let db = items_db();
    db.execute("INSERT INTO items VALUES (1); INSERT INTO items VALUES (2);")
        .expect("insert rows");

    let mut select = db
        .prepare("SELECT value FROM items ORDER BY rowid")
        .expect("prepare select");
    assert_eq!(select.query_as::<i64>().expect("decode scalars"), vec![1, 2]);

    let mut optional = db
        .prepare("SELECT value FROM items ORDER BY rowid")
        .expect("prepare select");
    assert_eq!(
        optional.query_as::<Option<i64>>().expect("decode optionals"),
        vec![Some(1), Some(2)]
    );
}

/// The one-column shortcut refuses rows with any other shape.
#[test]
fn test_scalar_decode_requires_one_column() {
    let db = items_db();
    select_stored(&db, 1i64);

    let mut select = db
        .prepare("SELECT value, value FROM items")
        .expect("prepare two-column select");
    assert!(select.step().expect("step"));

    let err = select.decode::<i64>().expect_err("two columns into scalar");
    assert!(matches!(
        err,
        Error::Decode(DecodeError::TypeMismatch { .. })
    ));
}
