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

//! Error types for Stela
//!
//! Every failed engine call is translated into an [`EngineError`] at the call
//! site; decoding failures carry the full field path from the record root to
//! the failing field.

use std::ffi::{CStr, CString};
use std::fmt;
use std::os::raw::{c_char, c_int};

use libsqlite3_sys as ffi;
use thiserror::Error;

/// Result type alias for Stela operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Stela operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A call into the SQL engine failed
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Decoding a row into a typed record failed
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Named parameter not present in the compiled statement
    #[error("parameter '{0}' not found in statement")]
    ParameterNotFound(String),

    /// Column index past the statement's result shape
    #[error("column index {index} out of range (statement has {count} columns)")]
    ColumnOutOfRange { index: usize, count: usize },

    /// SQL text compiled to nothing (empty or whitespace/comment-only input)
    #[error("SQL input contains no runnable statement")]
    EmptySql,

    /// SQL or parameter text contained an interior nul byte
    #[error("text contains an interior nul byte")]
    NulInText,
}

/// A failed engine call: numeric result code, short description resolvable
/// from the code alone, and an optional longer message from the connection's
/// last-error state.
///
/// `detail` is collapsed to `None` when the connection message is absent,
/// empty, or identical to the code description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    /// Failed result code
    pub code: i32,
    /// Short description resolved from the code
    pub description: String,
    /// Connection-level message, when it adds information
    pub detail: Option<String>,
}

impl EngineError {
    /// Translate a status code, reading the longer message from `db` when a
    /// handle is available.
    pub(crate) fn new(code: c_int, db: *mut ffi::sqlite3) -> EngineError {
        let description = unsafe { text_from_ptr(ffi::sqlite3_errstr(code)) }
            .unwrap_or_else(|| format!("unknown result code {code}"));
        let detail = if db.is_null() {
            None
        } else {
            unsafe { text_from_ptr(ffi::sqlite3_errmsg(db)) }
                .filter(|detail| !detail.is_empty() && *detail != description)
        };
        EngineError {
            code,
            description,
            detail,
        }
    }

    /// Translate a status code with no handle available.
    pub(crate) fn from_code(code: c_int) -> EngineError {
        Self::new(code, std::ptr::null_mut())
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.description, self.code)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EngineError {}

/// Path of field-name segments from a record root to one field.
///
/// Displays as the segments joined with `.` (`"order.total"`); the root path
/// displays as `<root>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub(crate) fn root() -> FieldPath {
        FieldPath(Vec::new())
    }

    /// The path with `key` appended.
    pub(crate) fn child(&self, key: &str) -> FieldPath {
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        FieldPath(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        write!(f, "{}", self.0.join("."))
    }
}

/// Errors produced while decoding a row into a typed record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// No result column matches the requested field key
    #[error("column not found for key '{key}' at '{path}'")]
    KeyNotFound { key: String, path: FieldPath },

    /// Column is NULL but the target is non-optional
    #[error("column value not found for {target} at '{path}'")]
    ValueNotFound {
        target: &'static str,
        path: FieldPath,
    },

    /// The target shape cannot be decoded from this row
    #[error("cannot decode {target} at '{path}'")]
    TypeMismatch {
        target: &'static str,
        path: FieldPath,
    },

    /// The column value exists but does not fit the target
    #[error("{message} at '{path}'")]
    DataCorrupted { path: FieldPath, message: String },
}

/// Succeed iff `code` equals `SQLITE_OK`, translating any other status
/// through the connection's error state.
pub(crate) fn check(code: c_int, db: *mut ffi::sqlite3) -> std::result::Result<(), EngineError> {
    check_expected(code, ffi::SQLITE_OK, db)
}

/// Succeed iff `code` equals `expected`.
pub(crate) fn check_expected(
    code: c_int,
    expected: c_int,
    db: *mut ffi::sqlite3,
) -> std::result::Result<(), EngineError> {
    if code == expected {
        Ok(())
    } else {
        Err(EngineError::new(code, db))
    }
}

/// Copy an engine-owned C string, if present.
pub(crate) unsafe fn text_from_ptr(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }
}

/// Nul-terminate text for the engine.
pub(crate) fn cstring(text: &str) -> Result<CString> {
    CString::new(text).map_err(|_| Error::NulInText)
}
