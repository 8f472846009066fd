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

//! Prepared statement support
//!
//! A [`Statement`] is a compiled, re-executable unit of SQL: bind parameter
//! values, step through result rows, reset, and run again. Resetting keeps
//! the bound values; [`Statement::clear_bindings`] is the separate call that
//! nulls them.
//!
//! # Examples
//!
//! ```ignore
//! use stela::Database;
//!
//! let db = Database::open_in_memory()?;
//! db.execute("CREATE TABLE users (id INTEGER, name TEXT)")?;
//!
//! // Insert repeatedly through one compiled statement
//! let mut insert = db.prepare("INSERT INTO users VALUES (?, ?)")?;
//! for (id, name) in [(1, "Alice"), (2, "Bob"), (3, "Charlie")] {
//!     insert.bind(1, id)?.bind(2, name)?.execute()?;
//!     insert.reset()?;
//! }
//!
//! // Step through a query
//! let mut select = db.prepare("SELECT name FROM users ORDER BY id")?;
//! while select.step()? {
//!     println!("{}", select.text(0).unwrap_or_default());
//! }
//! ```

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};
use std::sync::{Arc, OnceLock};

use libsqlite3_sys as ffi;
use rustc_hash::FxHashMap;

use crate::database::ConnectionHandle;
use crate::error::{
    EngineError, Error, FieldPath, Result, check, check_expected, cstring, text_from_ptr,
};
use crate::params::{Params, ToParam};
use crate::row::{FromRow, Row};
use crate::value::Value;

/// Dynamic type of a result column in the current row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Blob,
    Null,
}

impl ColumnType {
    fn from_code(code: c_int) -> ColumnType {
        match code {
            ffi::SQLITE_INTEGER => ColumnType::Integer,
            ffi::SQLITE_FLOAT => ColumnType::Real,
            ffi::SQLITE_TEXT => ColumnType::Text,
            ffi::SQLITE_BLOB => ColumnType::Blob,
            _ => ColumnType::Null,
        }
    }
}

/// A compiled SQL statement
///
/// Owns the native statement handle and a counted reference to its
/// connection, so the connection cannot close while the statement is alive.
/// The handle is finalized on drop.
///
/// Column readers ([`Statement::int64`], [`Statement::text`], ...) are valid
/// only while the most recent [`Statement::step`] returned `true`. The
/// `*_named` variants resolve through the statement's column-name map and
/// treat unknown names as NULL rather than erroring.
pub struct Statement {
    stmt: *mut ffi::sqlite3_stmt,
    conn: Arc<ConnectionHandle>,
    sql: String,
    names: OnceLock<FxHashMap<String, usize>>,
}

// Movable between threads under the engine's threading contract; see
// ConnectionHandle. Not Sync: a statement is a single-cursor resource.
unsafe impl Send for Statement {}

impl Statement {
    pub(crate) fn new(
        stmt: *mut ffi::sqlite3_stmt,
        conn: Arc<ConnectionHandle>,
        sql: &str,
    ) -> Statement {
        Statement {
            stmt,
            conn,
            sql: sql.to_string(),
            names: OnceLock::new(),
        }
    }

    fn db(&self) -> *mut ffi::sqlite3 {
        self.conn.db
    }

    fn check(&self, code: c_int) -> std::result::Result<(), EngineError> {
        check(code, self.db())
    }

    // ------------------------------------------------------------------
    // Binding
    // ------------------------------------------------------------------

    /// Bind a value to the 1-based parameter slot `index`.
    ///
    /// Rebinding a slot overwrites its previous value. The engine copies the
    /// value during the call, so the caller's storage is free immediately.
    pub fn bind<T: ToParam>(&mut self, index: i32, value: T) -> Result<&mut Statement> {
        self.bind_value(index, &value.to_param())?;
        Ok(self)
    }

    /// Bind a value to a named parameter slot.
    ///
    /// `name` is the full parameter name from the SQL text, including its
    /// prefix (`":id"`, `"$id"`, `"@id"`). Fails with
    /// [`Error::ParameterNotFound`] when the statement has no such
    /// parameter.
    pub fn bind_name<T: ToParam>(&mut self, name: &str, value: T) -> Result<&mut Statement> {
        let index = self
            .parameter_index(name)?
            .ok_or_else(|| Error::ParameterNotFound(name.to_string()))?;
        self.bind_value(index, &value.to_param())?;
        Ok(self)
    }

    /// Bind a collection of positional parameters, first value to slot 1.
    pub fn bind_all<P: Params>(&mut self, params: P) -> Result<&mut Statement> {
        for (offset, value) in params.into_params().iter().enumerate() {
            self.bind_value(offset as i32 + 1, value)?;
        }
        Ok(self)
    }

    fn bind_value(&mut self, index: c_int, value: &Value) -> Result<()> {
        let code = match value {
            Value::Null => unsafe { ffi::sqlite3_bind_null(self.stmt, index) },
            Value::Integer(v) => unsafe { ffi::sqlite3_bind_int64(self.stmt, index, *v) },
            Value::Real(v) => unsafe { ffi::sqlite3_bind_double(self.stmt, index, *v) },
            Value::Text(text) => unsafe {
                ffi::sqlite3_bind_text(
                    self.stmt,
                    index,
                    text.as_ptr() as *const c_char,
                    text.len() as c_int,
                    ffi::SQLITE_TRANSIENT(),
                )
            },
            // An empty Vec has no stable pointer to hand the engine; a
            // zero-length zeroblob stores the same empty BLOB.
            Value::Blob(bytes) if bytes.is_empty() => unsafe {
                ffi::sqlite3_bind_zeroblob(self.stmt, index, 0)
            },
            Value::Blob(bytes) => unsafe {
                ffi::sqlite3_bind_blob(
                    self.stmt,
                    index,
                    bytes.as_ptr() as *const c_void,
                    bytes.len() as c_int,
                    ffi::SQLITE_TRANSIENT(),
                )
            },
        };
        self.check(code)?;
        Ok(())
    }

    /// Number of parameter slots in the compiled SQL.
    pub fn parameter_count(&self) -> i32 {
        unsafe { ffi::sqlite3_bind_parameter_count(self.stmt) }
    }

    /// Name of the 1-based parameter slot `index`, including its prefix.
    /// `None` for nameless (`?`) slots and out-of-range indexes.
    pub fn parameter_name(&self, index: i32) -> Option<String> {
        unsafe { text_from_ptr(ffi::sqlite3_bind_parameter_name(self.stmt, index)) }
    }

    /// 1-based slot of the parameter named `name` (prefix included), or
    /// `None` when absent.
    pub fn parameter_index(&self, name: &str) -> Result<Option<i32>> {
        let c_name = cstring(name)?;
        let index = unsafe { ffi::sqlite3_bind_parameter_index(self.stmt, c_name.as_ptr()) };
        Ok((index != 0).then_some(index))
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Run the statement to completion, expecting no result rows.
    ///
    /// A row-producing result is a contract violation and fails with the
    /// engine's row status translated into an [`EngineError`]; use
    /// [`Statement::step`] for queries.
    pub fn execute(&mut self) -> Result<&mut Statement> {
        let code = unsafe { ffi::sqlite3_step(self.stmt) };
        check_expected(code, ffi::SQLITE_DONE, self.db())?;
        Ok(self)
    }

    /// Advance one row.
    ///
    /// `true` means a new row is available for column access; `false` means
    /// execution completed normally with no more rows.
    pub fn step(&mut self) -> Result<bool> {
        match unsafe { ffi::sqlite3_step(self.stmt) } {
            ffi::SQLITE_ROW => Ok(true),
            ffi::SQLITE_DONE => Ok(false),
            code => Err(EngineError::new(code, self.db()).into()),
        }
    }

    /// Return the statement to its pre-execution state.
    ///
    /// Bound parameter values are retained; use
    /// [`Statement::clear_bindings`] to null them.
    pub fn reset(&mut self) -> Result<&mut Statement> {
        let code = unsafe { ffi::sqlite3_reset(self.stmt) };
        self.check(code)?;
        Ok(self)
    }

    /// Set every parameter slot to NULL.
    pub fn clear_bindings(&mut self) -> Result<&mut Statement> {
        let code = unsafe { ffi::sqlite3_clear_bindings(self.stmt) };
        self.check(code)?;
        Ok(self)
    }

    // ------------------------------------------------------------------
    // Column introspection
    // ------------------------------------------------------------------

    /// Number of result columns; fixed at compile time by the SQL.
    pub fn column_count(&self) -> usize {
        unsafe { ffi::sqlite3_column_count(self.stmt) as usize }
    }

    /// Name of the 0-based result column `index`.
    pub fn column_name(&self, index: usize) -> Option<String> {
        let ptr = unsafe { ffi::sqlite3_column_name(self.stmt, index as c_int) };
        unsafe { text_from_ptr(ptr) }
    }

    /// 0-based index of the result column named `name` (case-sensitive
    /// exact match), or `None` when absent.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.name_map().get(name).copied()
    }

    /// Name-to-index map, built once per statement and cached. The column
    /// shape is immutable post-compile, so the map never invalidates.
    pub(crate) fn name_map(&self) -> &FxHashMap<String, usize> {
        self.names.get_or_init(|| {
            let mut map = FxHashMap::default();
            for index in 0..self.column_count() {
                if let Some(name) = self.column_name(index) {
                    map.insert(name, index);
                }
            }
            map
        })
    }

    // ------------------------------------------------------------------
    // Column readers (current row)
    // ------------------------------------------------------------------

    /// Dynamic type of column `index` in the current row.
    pub fn column_type(&self, index: usize) -> ColumnType {
        ColumnType::from_code(unsafe { ffi::sqlite3_column_type(self.stmt, index as c_int) })
    }

    /// Whether column `index` is NULL in the current row.
    pub fn is_null(&self, index: usize) -> bool {
        self.column_type(index) == ColumnType::Null
    }

    /// Column `index` as a 64-bit integer (engine coercion applies).
    pub fn int64(&self, index: usize) -> i64 {
        unsafe { ffi::sqlite3_column_int64(self.stmt, index as c_int) }
    }

    /// Column `index` as a 64-bit float (engine coercion applies).
    pub fn double(&self, index: usize) -> f64 {
        unsafe { ffi::sqlite3_column_double(self.stmt, index as c_int) }
    }

    /// Column `index` as text, or `None` when NULL.
    pub fn text(&self, index: usize) -> Option<String> {
        let ptr = unsafe { ffi::sqlite3_column_text(self.stmt, index as c_int) };
        if ptr.is_null() {
            return None;
        }
        Some(
            unsafe { CStr::from_ptr(ptr as *const c_char) }
                .to_string_lossy()
                .into_owned(),
        )
    }

    /// Column `index` as raw bytes, or `None` when NULL.
    pub fn blob(&self, index: usize) -> Option<Vec<u8>> {
        if self.is_null(index) {
            return None;
        }
        let ptr = unsafe { ffi::sqlite3_column_blob(self.stmt, index as c_int) };
        let len = unsafe { ffi::sqlite3_column_bytes(self.stmt, index as c_int) } as usize;
        if ptr.is_null() {
            return Some(Vec::new());
        }
        Some(unsafe { std::slice::from_raw_parts(ptr as *const u8, len) }.to_vec())
    }

    /// Like [`Statement::int64`] resolved by column name; `None` when the
    /// name is unknown.
    pub fn int64_named(&self, name: &str) -> Option<i64> {
        self.column_index(name).map(|index| self.int64(index))
    }

    /// Like [`Statement::double`] resolved by column name; `None` when the
    /// name is unknown.
    pub fn double_named(&self, name: &str) -> Option<f64> {
        self.column_index(name).map(|index| self.double(index))
    }

    /// Like [`Statement::text`] resolved by column name; `None` when the
    /// name is unknown or the column is NULL.
    pub fn text_named(&self, name: &str) -> Option<String> {
        self.column_index(name).and_then(|index| self.text(index))
    }

    /// Like [`Statement::blob`] resolved by column name; `None` when the
    /// name is unknown or the column is NULL.
    pub fn blob_named(&self, name: &str) -> Option<Vec<u8>> {
        self.column_index(name).and_then(|index| self.blob(index))
    }

    /// Whether the named column is NULL; unknown names read as NULL.
    pub fn is_null_named(&self, name: &str) -> bool {
        self.column_index(name)
            .is_none_or(|index| self.is_null(index))
    }

    // ------------------------------------------------------------------
    // Decoding
    // ------------------------------------------------------------------

    /// View of the current row; valid only while the most recent
    /// [`Statement::step`] returned `true`.
    pub fn row(&self) -> Row<'_> {
        debug_assert!(
            self.has_row(),
            "row() is only valid after step() returned true"
        );
        Row::new(self, FieldPath::root())
    }

    pub(crate) fn has_row(&self) -> bool {
        unsafe { ffi::sqlite3_data_count(self.stmt) > 0 }
    }

    /// Decode the current row into `T`.
    pub fn decode<T: FromRow>(&self) -> Result<T> {
        T::from_row(&self.row())
    }

    /// Step the statement to exhaustion, decoding every row into `T` in row
    /// order.
    ///
    /// All-or-nothing: the first row that fails to step or decode returns
    /// its error and discards the rows decoded so far. An empty result set
    /// yields an empty vector, never an error.
    pub fn query_as<T: FromRow>(&mut self) -> Result<Vec<T>> {
        let mut records = Vec::new();
        while self.step()? {
            records.push(self.decode()?);
        }
        Ok(records)
    }

    // ------------------------------------------------------------------
    // SQL text
    // ------------------------------------------------------------------

    /// SQL text the statement was compiled from.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// SQL text with bound parameters expanded into literals; useful for
    /// logging and debugging.
    pub fn expanded_sql(&self) -> Option<String> {
        let ptr = unsafe { ffi::sqlite3_expanded_sql(self.stmt) };
        if ptr.is_null() {
            return None;
        }
        let text = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
        unsafe { ffi::sqlite3_free(ptr as *mut c_void) };
        Some(text)
    }
}

impl Drop for Statement {
    fn drop(&mut self) {
        // finalize() reports the most recent step failure, which was already
        // surfaced to the caller; nothing useful to do with it here.
        let _ = unsafe { ffi::sqlite3_finalize(self.stmt) };
    }
}

impl std::fmt::Debug for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Statement").field("sql", &self.sql).finish()
    }
}
