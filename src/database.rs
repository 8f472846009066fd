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

//! Database connection and open options
//!
//! # Examples
//!
//! ```ignore
//! use stela::{Database, OpenOptions};
//!
//! // In-memory database
//! let db = Database::open_in_memory()?;
//!
//! // File-backed database, created on demand
//! let db = Database::open(
//!     "/tmp/app.db",
//!     OpenOptions::READWRITE | OpenOptions::CREATE,
//! )?;
//!
//! db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")?;
//!
//! let mut stmt = db.prepare("INSERT INTO users (name) VALUES (?)")?;
//! stmt.bind(1, "Alice")?.execute()?;
//! assert_eq!(db.last_insert_rowid(), 1);
//! ```

use std::ops::{BitOr, BitOrAssign};
use std::os::raw::c_int;
use std::ptr;
use std::sync::Arc;

use libsqlite3_sys as ffi;

use crate::error::{EngineError, Error, Result, check, cstring, text_from_ptr};
use crate::statement::Statement;

/// Flags for opening a database connection
///
/// A set of independent boolean options combined with `|`. The set must
/// include at least one of [`OpenOptions::READONLY`],
/// [`OpenOptions::READWRITE`], or [`OpenOptions::READWRITE`] `|`
/// [`OpenOptions::CREATE`]; an empty or conflicting set is passed through
/// unchanged and rejected by the engine with its misuse status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenOptions(c_int);

impl OpenOptions {
    /// Open in read-only mode; the database must already exist.
    pub const READONLY: OpenOptions = OpenOptions(ffi::SQLITE_OPEN_READONLY);

    /// Open for reading and writing if possible, or reading only if the file
    /// is write protected by the operating system.
    pub const READWRITE: OpenOptions = OpenOptions(ffi::SQLITE_OPEN_READWRITE);

    /// Create the database if it does not already exist.
    pub const CREATE: OpenOptions = OpenOptions(ffi::SQLITE_OPEN_CREATE);

    /// Open as an in-process ephemeral store; the path only names the
    /// database for cache-sharing purposes.
    pub const MEMORY: OpenOptions = OpenOptions(ffi::SQLITE_OPEN_MEMORY);

    /// Interpret the path as a URI.
    pub const URI: OpenOptions = OpenOptions(ffi::SQLITE_OPEN_URI);

    /// Reject paths containing a symbolic link.
    pub const NO_FOLLOW: OpenOptions = OpenOptions(ffi::SQLITE_OPEN_NOFOLLOW);

    /// "Multi-thread" threading mode: separate threads may use the engine
    /// concurrently as long as each uses its own connection. Mutually
    /// exclusive with [`OpenOptions::FULL_MUTEX`].
    pub const NO_MUTEX: OpenOptions = OpenOptions(ffi::SQLITE_OPEN_NOMUTEX);

    /// "Serialized" threading mode: multiple threads may share one
    /// connection, serialized internally by the engine's locking. Mutually
    /// exclusive with [`OpenOptions::NO_MUTEX`].
    pub const FULL_MUTEX: OpenOptions = OpenOptions(ffi::SQLITE_OPEN_FULLMUTEX);

    /// Enable shared-cache mode. Mutually exclusive with
    /// [`OpenOptions::PRIVATE_CACHE`].
    pub const SHARED_CACHE: OpenOptions = OpenOptions(ffi::SQLITE_OPEN_SHAREDCACHE);

    /// Disable shared-cache mode. Mutually exclusive with
    /// [`OpenOptions::SHARED_CACHE`].
    pub const PRIVATE_CACHE: OpenOptions = OpenOptions(ffi::SQLITE_OPEN_PRIVATECACHE);

    /// The connection comes up in extended result code mode.
    pub const EXTENDED_RESULT_CODE: OpenOptions = OpenOptions(ffi::SQLITE_OPEN_EXRESCODE);

    /// The raw flag bits passed to the engine.
    pub const fn bits(self) -> i32 {
        self.0
    }

    /// Whether every flag in `other` is set in `self`.
    pub const fn contains(self, other: OpenOptions) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for OpenOptions {
    type Output = OpenOptions;

    fn bitor(self, rhs: OpenOptions) -> OpenOptions {
        OpenOptions(self.0 | rhs.0)
    }
}

impl BitOrAssign for OpenOptions {
    fn bitor_assign(&mut self, rhs: OpenOptions) {
        self.0 |= rhs.0;
    }
}

/// Owner of the native connection handle.
///
/// Shared behind `Arc` by [`Database`] and every [`Statement`] compiled from
/// it, so the native close runs only after the last statement is finalized.
#[derive(Debug)]
pub(crate) struct ConnectionHandle {
    pub(crate) db: *mut ffi::sqlite3,
}

// The handle is freely movable between threads. Sharing one connection
// across threads is sound only when the connection was opened in serialized
// mode (FULL_MUTEX or the engine's default); that discipline is the
// caller's, matching the engine's own threading contract. No locking is
// added on top of the engine's.
unsafe impl Send for ConnectionHandle {}
unsafe impl Sync for ConnectionHandle {}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        let code = unsafe { ffi::sqlite3_close_v2(self.db) };
        debug_assert_eq!(code, ffi::SQLITE_OK, "sqlite3_close_v2: {code}");
    }
}

/// A database connection
///
/// `Database` is a shared handle: cloning it is cheap and every clone talks
/// to the same connection. The native handle stays open until the last
/// `Database` clone *and* the last [`Statement`] compiled from it are
/// dropped.
///
/// # Examples
///
/// ```ignore
/// use stela::Database;
///
/// let db = Database::open_in_memory()?;
/// db.execute("CREATE TABLE kv (k TEXT, v TEXT)")?;
///
/// let mut stmt = db.prepare("SELECT count(*) FROM kv")?;
/// assert!(stmt.step()?);
/// assert_eq!(stmt.int64(0), 0);
/// ```
#[derive(Clone, Debug)]
pub struct Database {
    inner: Arc<ConnectionHandle>,
}

impl Database {
    /// Open a database connection.
    ///
    /// `options` must include one of the required mode combinations
    /// (readonly, readwrite, or readwrite+create); anything else propagates
    /// the engine's misuse error unmodified.
    pub fn open(path: &str, options: OpenOptions) -> Result<Database> {
        let c_path = cstring(path)?;
        let mut db: *mut ffi::sqlite3 = ptr::null_mut();
        let code =
            unsafe { ffi::sqlite3_open_v2(c_path.as_ptr(), &mut db, options.bits(), ptr::null()) };
        if code != ffi::SQLITE_OK {
            // The engine may allocate a handle even on failure; read the
            // message off it before releasing it.
            let err = EngineError::new(code, db);
            if !db.is_null() {
                unsafe {
                    ffi::sqlite3_close_v2(db);
                }
            }
            return Err(err.into());
        }
        Ok(Database {
            inner: Arc::new(ConnectionHandle { db }),
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Database> {
        Self::open(
            ":memory:",
            OpenOptions::READWRITE | OpenOptions::CREATE | OpenOptions::MEMORY,
        )
    }

    /// The resolved filename of the main database, or `None` for temporary
    /// and in-memory databases.
    pub fn filename(&self) -> Option<String> {
        let ptr = unsafe { ffi::sqlite3_db_filename(self.inner.db, c"main".as_ptr()) };
        unsafe { text_from_ptr(ptr) }.filter(|name| !name.is_empty())
    }

    /// Whether the main database was opened read-only.
    pub fn is_read_only(&self) -> bool {
        unsafe { ffi::sqlite3_db_readonly(self.inner.db, c"main".as_ptr()) == 1 }
    }

    /// Run one or more semicolon-separated SQL statements with no parameters
    /// and no result consumption.
    pub fn execute(&self, sql: &str) -> Result<()> {
        let c_sql = cstring(sql)?;
        let code = unsafe {
            ffi::sqlite3_exec(
                self.inner.db,
                c_sql.as_ptr(),
                None,
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
        check(code, self.inner.db)?;
        Ok(())
    }

    /// Compile a SQL statement.
    ///
    /// Only the first statement of `sql` is compiled; trailing text after
    /// its terminator is ignored. Input that compiles to nothing (empty or
    /// comment-only text) fails with [`Error::EmptySql`].
    pub fn prepare(&self, sql: &str) -> Result<Statement> {
        let c_sql = cstring(sql)?;
        let mut stmt: *mut ffi::sqlite3_stmt = ptr::null_mut();
        let code = unsafe {
            ffi::sqlite3_prepare_v2(self.inner.db, c_sql.as_ptr(), -1, &mut stmt, ptr::null_mut())
        };
        check(code, self.inner.db)?;
        if stmt.is_null() {
            return Err(Error::EmptySql);
        }
        Ok(Statement::new(stmt, Arc::clone(&self.inner), sql))
    }

    /// Number of rows changed by the most recent INSERT, UPDATE, or DELETE.
    pub fn changes(&self) -> i64 {
        i64::from(unsafe { ffi::sqlite3_changes(self.inner.db) })
    }

    /// Rowid of the most recent successful INSERT on this connection.
    pub fn last_insert_rowid(&self) -> i64 {
        unsafe { ffi::sqlite3_last_insert_rowid(self.inner.db) }
    }
}
