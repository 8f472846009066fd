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

//! Parameter binding for SQL statements
//!
//! # Examples
//!
//! ```ignore
//! use stela::{params, Database};
//!
//! let db = Database::open_in_memory()?;
//! db.execute("CREATE TABLE users (id INTEGER, name TEXT, age INTEGER)")?;
//!
//! // Tuple syntax (positional, 1-based)
//! db.prepare("INSERT INTO users VALUES (?, ?, ?)")?
//!     .bind_all((1, "Alice", 30))?
//!     .execute()?;
//!
//! // params! macro
//! db.prepare("INSERT INTO users VALUES (?, ?, ?)")?
//!     .bind_all(params![2, "Bob", 25])?
//!     .execute()?;
//!
//! // Optional values bind NULL
//! let age: Option<i64> = None;
//! db.prepare("INSERT INTO users VALUES (?, ?, ?)")?
//!     .bind_all((3, "Carol", age))?
//!     .execute()?;
//! ```

use crate::value::Value;

/// Trait for types that can be converted to SQL parameter values
///
/// Implemented for the common Rust scalar types; enables the `params!`
/// macro and tuple parameter syntax.
pub trait ToParam {
    /// Convert self into a Value for parameter binding
    fn to_param(&self) -> Value;
}

impl ToParam for i64 {
    fn to_param(&self) -> Value {
        Value::Integer(*self)
    }
}

impl ToParam for i32 {
    fn to_param(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl ToParam for i16 {
    fn to_param(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl ToParam for i8 {
    fn to_param(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl ToParam for u32 {
    fn to_param(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl ToParam for u16 {
    fn to_param(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl ToParam for u8 {
    fn to_param(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl ToParam for usize {
    fn to_param(&self) -> Value {
        Value::Integer(*self as i64)
    }
}

impl ToParam for f64 {
    fn to_param(&self) -> Value {
        Value::Real(*self)
    }
}

impl ToParam for f32 {
    fn to_param(&self) -> Value {
        Value::Real(f64::from(*self))
    }
}

impl ToParam for bool {
    fn to_param(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl ToParam for String {
    fn to_param(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl ToParam for &str {
    fn to_param(&self) -> Value {
        Value::Text((*self).to_string())
    }
}

impl ToParam for Vec<u8> {
    fn to_param(&self) -> Value {
        Value::Blob(self.clone())
    }
}

impl ToParam for &[u8] {
    fn to_param(&self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl ToParam for Value {
    fn to_param(&self) -> Value {
        self.clone()
    }
}

impl<T: ToParam> ToParam for Option<T> {
    fn to_param(&self) -> Value {
        match self {
            Some(v) => v.to_param(),
            None => Value::Null,
        }
    }
}

impl<T: ToParam> ToParam for &T {
    fn to_param(&self) -> Value {
        (*self).to_param()
    }
}

/// Trait for collections of positional parameters
///
/// Enables passing tuples, arrays, and slices to
/// [`Statement::bind_all`](crate::Statement::bind_all).
pub trait Params {
    /// Convert into a Vec of Values, in bind order
    fn into_params(self) -> Vec<Value>;
}

// Empty params
impl Params for () {
    fn into_params(self) -> Vec<Value> {
        Vec::new()
    }
}

impl Params for &[Value] {
    fn into_params(self) -> Vec<Value> {
        self.to_vec()
    }
}

impl Params for Vec<Value> {
    fn into_params(self) -> Vec<Value> {
        self
    }
}

impl<const N: usize> Params for [Value; N] {
    fn into_params(self) -> Vec<Value> {
        self.into_iter().collect()
    }
}

// Tuple implementations for 1-12 elements
macro_rules! impl_params_for_tuple {
    ($($idx:tt: $T:ident),+) => {
        impl<$($T: ToParam),+> Params for ($($T,)+) {
            fn into_params(self) -> Vec<Value> {
                vec![$(self.$idx.to_param()),+]
            }
        }
    };
}

impl_params_for_tuple!(0: T0);
impl_params_for_tuple!(0: T0, 1: T1);
impl_params_for_tuple!(0: T0, 1: T1, 2: T2);
impl_params_for_tuple!(0: T0, 1: T1, 2: T2, 3: T3);
impl_params_for_tuple!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4);
impl_params_for_tuple!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5);
impl_params_for_tuple!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5, 6: T6);
impl_params_for_tuple!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5, 6: T6, 7: T7);
impl_params_for_tuple!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5, 6: T6, 7: T7, 8: T8);
impl_params_for_tuple!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5, 6: T6, 7: T7, 8: T8, 9: T9);
impl_params_for_tuple!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5, 6: T6, 7: T7, 8: T8, 9: T9, 10: T10);
impl_params_for_tuple!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5, 6: T6, 7: T7, 8: T8, 9: T9, 10: T10, 11: T11);

/// Create a positional parameter list
///
/// # Examples
///
/// ```ignore
/// use stela::{params, Database};
///
/// let db = Database::open_in_memory()?;
/// db.execute("CREATE TABLE users (id INTEGER, name TEXT)")?;
///
/// db.prepare("INSERT INTO users VALUES (?, ?)")?
///     .bind_all(params![1, "Alice"])?
///     .execute()?;
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ()
    };
    ($($param:expr),+ $(,)?) => {
        ($($param,)+)
    };
}
