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

//! Row views and typed row-to-record decoding
//!
//! [`Row`] is a transient, non-owning view over a statement's current step
//! position: it is only valid while the most recent
//! [`step()`](crate::Statement::step) returned `true`, which the borrow on
//! the statement enforces. A target type implements [`FromRow`] and drives
//! its own decoding by requesting fields from the row; no reflection, no
//! registry.
//!
//! # Example
//!
//! ```ignore
//! use stela::{Database, FromRow, Result, Row};
//!
//! struct User {
//!     id: i64,
//!     name: String,
//!     email: Option<String>,
//! }
//!
//! impl FromRow for User {
//!     fn from_row(row: &Row<'_>) -> Result<Self> {
//!         Ok(User {
//!             id: row.get_named("id")?,
//!             name: row.get_named("name")?,
//!             email: row.get_named("email")?, // Option<T> decodes NULL as None
//!         })
//!     }
//! }
//!
//! let db = Database::open_in_memory()?;
//! db.execute("CREATE TABLE users (id INTEGER, name TEXT, email TEXT)")?;
//! db.execute("INSERT INTO users VALUES (1, 'Alice', NULL)")?;
//!
//! let users: Vec<User> = db.prepare("SELECT * FROM users")?.query_as()?;
//! assert!(users[0].email.is_none());
//! ```

use std::any::type_name;

use crate::error::{DecodeError, Error, FieldPath, Result};
use crate::statement::{ColumnType, Statement};
use crate::value::Value;

/// Transient view over the statement's current row
///
/// Field lookups resolve by column name (case-sensitive exact match) or by
/// 0-based position. Decoding errors carry the full path of field-name
/// segments from the record root, so a failure three structs deep names
/// exactly which field could not be decoded.
pub struct Row<'stmt> {
    stmt: &'stmt Statement,
    path: FieldPath,
}

impl<'stmt> Row<'stmt> {
    pub(crate) fn new(stmt: &'stmt Statement, path: FieldPath) -> Row<'stmt> {
        Row { stmt, path }
    }

    /// The statement this row is a view of.
    pub fn statement(&self) -> &Statement {
        self.stmt
    }

    pub fn column_count(&self) -> usize {
        self.stmt.column_count()
    }

    /// Decode the 0-based column `index` into `T`.
    pub fn get<T: FromColumn>(&self, index: usize) -> Result<T> {
        let count = self.column_count();
        if index >= count {
            return Err(Error::ColumnOutOfRange { index, count });
        }
        T::from_column(&Column {
            stmt: self.stmt,
            index,
            path: self.path.clone(),
        })
    }

    /// Decode the column named `key` into `T`.
    ///
    /// An unknown key fails with [`DecodeError::KeyNotFound`], except for
    /// optional targets, which decode to `None`.
    pub fn get_named<T: FromColumn>(&self, key: &str) -> Result<T> {
        match self.stmt.column_index(key) {
            Some(index) => T::from_column(&Column {
                stmt: self.stmt,
                index,
                path: self.path.child(key),
            }),
            None => T::absent(key, &self.path),
        }
    }

    /// Whether the column named `key` is NULL; unknown keys read as NULL.
    pub fn is_null(&self, key: &str) -> bool {
        self.stmt.is_null_named(key)
    }

    /// Decode a nested structured field.
    ///
    /// The nested target resolves its fields against the same row columns;
    /// `key` is appended to the field path so errors inside it read
    /// `"outer.inner"`.
    pub fn nested<T: FromRow>(&self, key: &str) -> Result<T> {
        T::from_row(&Row {
            stmt: self.stmt,
            path: self.path.child(key),
        })
    }

    /// Decode a one-column row directly into a scalar.
    ///
    /// Bypasses name lookup and reads column 0; fails with
    /// [`DecodeError::TypeMismatch`] when the row has any other number of
    /// columns.
    pub fn scalar<T: FromColumn>(&self) -> Result<T> {
        if self.column_count() != 1 {
            return Err(DecodeError::TypeMismatch {
                target: type_name::<T>(),
                path: self.path.clone(),
            }
            .into());
        }
        T::from_column(&Column {
            stmt: self.stmt,
            index: 0,
            path: self.path.clone(),
        })
    }
}

/// Typed accessor for one (row, column) pair
///
/// Reads perform the engine's dynamic-type coercion to the requested target
/// type. Carries the field path used for error attribution.
pub struct Column<'stmt> {
    stmt: &'stmt Statement,
    index: usize,
    path: FieldPath,
}

impl Column<'_> {
    pub fn is_null(&self) -> bool {
        self.stmt.is_null(self.index)
    }

    pub fn column_type(&self) -> ColumnType {
        self.stmt.column_type(self.index)
    }

    pub fn int64(&self) -> i64 {
        self.stmt.int64(self.index)
    }

    pub fn double(&self) -> f64 {
        self.stmt.double(self.index)
    }

    pub fn text(&self) -> Option<String> {
        self.stmt.text(self.index)
    }

    pub fn blob(&self) -> Option<Vec<u8>> {
        self.stmt.blob(self.index)
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    fn value_not_found(&self, target: &'static str) -> Error {
        DecodeError::ValueNotFound {
            target,
            path: self.path.clone(),
        }
        .into()
    }

    fn data_corrupted(&self, message: String) -> Error {
        DecodeError::DataCorrupted {
            path: self.path.clone(),
            message,
        }
        .into()
    }
}

/// Decode one column value into a concrete field type
///
/// Implementations define the coercion and narrowing rules per target:
/// numeric targets narrow exactly or fail with
/// [`DecodeError::DataCorrupted`]; any NULL column into a non-optional
/// target fails with [`DecodeError::ValueNotFound`]; `Option<T>` decodes
/// NULL (or an unknown key) as `None`.
pub trait FromColumn: Sized {
    fn from_column(column: &Column<'_>) -> Result<Self>;

    /// Resolution for a key the row does not have. Non-optional targets
    /// fail with [`DecodeError::KeyNotFound`]; `Option` overrides this to
    /// decode as `None`.
    #[doc(hidden)]
    fn absent(key: &str, parent: &FieldPath) -> Result<Self> {
        Err(DecodeError::KeyNotFound {
            key: key.to_string(),
            path: parent.child(key),
        }
        .into())
    }
}

macro_rules! integer_from_column {
    ($($ty:ty),+) => {$(
        impl FromColumn for $ty {
            fn from_column(column: &Column<'_>) -> Result<Self> {
                if column.is_null() {
                    return Err(column.value_not_found(stringify!($ty)));
                }
                let value = column.int64();
                <$ty>::try_from(value).map_err(|_| {
                    column.data_corrupted(format!(
                        "integer value <{value}> does not fit in {}",
                        stringify!($ty)
                    ))
                })
            }
        }
    )+};
}

integer_from_column!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

impl FromColumn for f64 {
    fn from_column(column: &Column<'_>) -> Result<Self> {
        if column.is_null() {
            return Err(column.value_not_found("f64"));
        }
        Ok(column.double())
    }
}

impl FromColumn for f32 {
    fn from_column(column: &Column<'_>) -> Result<Self> {
        if column.is_null() {
            return Err(column.value_not_found("f32"));
        }
        let value = column.double();
        let narrowed = value as f32;
        if f64::from(narrowed) == value || value.is_nan() {
            Ok(narrowed)
        } else {
            Err(column.data_corrupted(format!("floating value <{value}> does not fit in f32")))
        }
    }
}

impl FromColumn for bool {
    fn from_column(column: &Column<'_>) -> Result<Self> {
        if column.is_null() {
            return Err(column.value_not_found("bool"));
        }
        Ok(column.int64() != 0)
    }
}

impl FromColumn for String {
    fn from_column(column: &Column<'_>) -> Result<Self> {
        column
            .text()
            .ok_or_else(|| column.value_not_found("String"))
    }
}

// Blobs read raw bytes directly rather than routing through the numeric or
// text coercions.
impl FromColumn for Vec<u8> {
    fn from_column(column: &Column<'_>) -> Result<Self> {
        column
            .blob()
            .ok_or_else(|| column.value_not_found("Vec<u8>"))
    }
}

impl FromColumn for Value {
    fn from_column(column: &Column<'_>) -> Result<Self> {
        Ok(match column.column_type() {
            ColumnType::Null => Value::Null,
            ColumnType::Integer => Value::Integer(column.int64()),
            ColumnType::Real => Value::Real(column.double()),
            ColumnType::Text => Value::Text(column.text().unwrap_or_default()),
            ColumnType::Blob => Value::Blob(column.blob().unwrap_or_default()),
        })
    }
}

impl<T: FromColumn> FromColumn for Option<T> {
    fn from_column(column: &Column<'_>) -> Result<Self> {
        if column.is_null() {
            Ok(None)
        } else {
            T::from_column(column).map(Some)
        }
    }

    fn absent(_key: &str, _parent: &FieldPath) -> Result<Self> {
        Ok(None)
    }
}

/// Decode the current row into a typed record
///
/// The target type drives its own decoding by requesting named or positional
/// fields from the [`Row`], recursively for nested structures. Implemented
/// out of the box for scalars via the one-column shortcut, so a single-column
/// query decodes straight into `i64`, `String`, `Option<T>`, and friends.
pub trait FromRow: Sized {
    fn from_row(row: &Row<'_>) -> Result<Self>;
}

macro_rules! scalar_from_row {
    ($($ty:ty),+) => {$(
        impl FromRow for $ty {
            fn from_row(row: &Row<'_>) -> Result<Self> {
                row.scalar()
            }
        }
    )+};
}

scalar_from_row!(
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    isize,
    usize,
    f32,
    f64,
    bool,
    String,
    Vec<u8>,
    Value
);

impl<T: FromColumn> FromRow for Option<T> {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        row.scalar()
    }
}
