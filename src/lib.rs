//! # morm
//!
//! A type-safe SQL statement builder and ORM for [Turso](https://turso.tech).
//!
//! ## Features
//!
//! - Derive macro describing how a struct maps to a table
//! - Composable expression tree compiled to parameterized SQL
//! - Statement builders (Selector, Inserter, Updater, Deleter, RawQuerier)
//! - MySQL and SQLite upserts
//! - Middleware around every statement
//! - Two row mappers: accessor based, and direct memory (`unsafe-value`)
//! - Transactions with automatic rollback
//! - Optional support for chrono, uuid, and JSON types
//!
//! ## Quick Start
//!
//! ```ignore
//! use morm::prelude::*;
//!
//! #[derive(Clone, Debug, Default, Entity)]
//! pub struct User {
//!     pub id:   i64,
//!     #[morm = "column=user_name"]
//!     pub name: String,
//!     pub age:  i64,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let conn = Builder::new_local(":memory:").build().await?.connect()?;
//!     conn.execute("CREATE TABLE user (id INTEGER PRIMARY KEY, user_name TEXT, age INTEGER)", ()).await?;
//!
//!     Inserter::new(&conn).values([User { id: 1, name: "Alice".into(), age: 30 }]).exec().await?;
//!
//!     let adults = Selector::<User>::new(&conn).where_(c("age").gt(18)).get_multi().await?;
//!
//!     Updater::<User>::new(&conn)
//!         .set([assign("age", c("age").add(1))])
//!         .where_(c("id").eq(1))
//!         .exec()
//!         .await?;
//!
//!     conn.do_tx(|tx| async move {
//!         Deleter::<User>::new(&tx).where_(c("id").eq(1)).exec().await?;
//!         Ok(())
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Entity Attributes
//!
//! - `#[morm = "column=..."]` on a field sets its column name (default: the
//!   field name in snake_case)
//! - `#[morm(custom_table_name)]` on the struct takes the table name from its
//!   [`TableName`] implementation (default: the struct name in snake_case)

extern crate self as morm;

pub mod builder;
pub mod connection;
pub mod dialect;
pub mod entity;
pub mod error;
pub mod expr;
pub mod middleware;
pub mod model;
pub mod prelude;
pub mod query;
pub mod session;
pub mod table;
pub mod value;
pub mod valuer;

#[cfg(test)]
mod testing;

pub use connection::Connection;
pub use connection::builder::Builder;
pub use connection::database::Database;
pub use entity::Entity;
pub use entity::EntityDescriptor;
pub use entity::EntityShape;
pub use entity::FieldDescriptor;
pub use entity::RawAccessor;
pub use entity::TableName;
pub use error::Error;
pub use error::Result;
pub use model::Field;
pub use model::Model;
pub use model::ModelOpt;
pub use model::Registry;
pub use model::with_column_name;
pub use model::with_table_name;
// Re-export the derive macro
pub use morm_macros::Entity;
pub use query::Deleter;
pub use query::Inserter;
pub use query::Query;
pub use query::QueryBuilder;
pub use query::RawQuerier;
pub use query::Selector;
pub use query::Updater;
pub use session::Core;
pub use session::Session;
pub use session::Transaction;
pub use session::tx::do_tx;
pub use value::ColumnType;
pub use value::FromValue;
pub use value::IntoValue;
// Re-export optional types
#[cfg(feature = "with-json")]
pub use value::Json;
pub use value::Value;
