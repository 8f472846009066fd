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

//! # Stela - Embedded SQLite driver with typed row decoding
//!
//! Stela drives SQLite through a small, explicit core: compile SQL into a
//! [`Statement`], bind typed parameters, step through result rows with typed
//! column access, and decode rows into your own record types through the
//! reflection-free [`FromRow`] protocol.
//!
//! ## Quick Start
//!
//! ```rust
//! use stela::{Database, FromRow, Result, Row};
//!
//! #[derive(Debug, PartialEq)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl FromRow for User {
//!     fn from_row(row: &Row<'_>) -> Result<Self> {
//!         Ok(User {
//!             id: row.get_named("id")?,
//!             name: row.get_named("name")?,
//!         })
//!     }
//! }
//!
//! let db = Database::open_in_memory().unwrap();
//! db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")
//!     .unwrap();
//!
//! let mut insert = db.prepare("INSERT INTO users (id, name) VALUES (:id, :name)").unwrap();
//! insert.bind_name(":id", 1).unwrap().bind_name(":name", "Alice").unwrap();
//! insert.execute().unwrap();
//!
//! let mut select = db.prepare("SELECT id, name FROM users").unwrap();
//! let users: Vec<User> = select.query_as().unwrap();
//! assert_eq!(users, vec![User { id: 1, name: "Alice".to_string() }]);
//!
//! // One-column results decode straight into scalars
//! let mut count = db.prepare("SELECT count(*) FROM users").unwrap();
//! assert_eq!(count.query_as::<i64>().unwrap(), vec![1]);
//! ```
//!
//! ## Modules
//!
//! - [`database`] - Connection handling and open options ([`Database`])
//! - [`statement`] - Compiled statements: binding, stepping, column readers
//! - [`row`] - Row views and the [`FromRow`]/[`FromColumn`] decoding traits
//! - [`params`] - Positional parameter ergonomics ([`ToParam`], [`Params`])
//! - [`value`] - The bindable [`Value`] variants
//! - [`error`] - Error taxonomy ([`EngineError`], [`DecodeError`])
//!
//! ## Ownership
//!
//! A [`Statement`] holds a counted reference to its [`Database`], so the
//! native connection stays open until the last statement referencing it is
//! finalized; dropping the `Database` first is fine.
//!
//! ## Threading
//!
//! All operations are synchronous and blocking. Sharing one connection
//! across threads requires opening it in serialized mode
//! ([`OpenOptions::FULL_MUTEX`]); the crate adds no locking of its own on
//! top of the engine's.

pub mod database;
pub mod error;
pub mod params;
pub mod row;
pub mod statement;
pub mod value;

pub use database::{Database, OpenOptions};
pub use error::{DecodeError, EngineError, Error, FieldPath, Result};
pub use params::{Params, ToParam};
pub use row::{Column, FromColumn, FromRow, Row};
pub use statement::{ColumnType, Statement};
pub use value::Value;
