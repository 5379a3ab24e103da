//! Prelude module for morm
//!
//! This module re-exports the most commonly used types, traits and expression
//! constructors.
//!
//! ```ignore
//! use morm::prelude::*;
//! ```

// Re-export the derive macro
pub use morm_macros::Entity;
pub use turso::EncryptionOpts;

pub use crate::connection::prelude::*;
pub use crate::dialect::MySql;
pub use crate::dialect::Sqlite;
pub use crate::entity::Entity;
pub use crate::entity::TableName;
pub use crate::error::Error;
pub use crate::error::Result;
pub use crate::expr::all;
pub use crate::expr::any;
pub use crate::expr::assign;
pub use crate::expr::avg;
pub use crate::expr::c;
pub use crate::expr::count;
pub use crate::expr::exists;
pub use crate::expr::max;
pub use crate::expr::min;
pub use crate::expr::not;
pub use crate::expr::raw;
pub use crate::expr::some;
pub use crate::expr::sum;
pub use crate::middleware::query_log::QueryLogBuilder;
pub use crate::query::Deleter;
pub use crate::query::Inserter;
pub use crate::query::RawQuerier;
pub use crate::query::Selector;
pub use crate::query::Updater;
pub use crate::query::asc;
pub use crate::query::desc;
pub use crate::session::Session;
pub use crate::session::Transaction;
pub use crate::table::table_of;
pub use crate::value::FromValue;
pub use crate::value::IntoValue;
// Re-export optional types
#[cfg(feature = "with-json")]
pub use crate::value::Json;
pub use crate::value::Value;
pub use crate::valuer::ValueStrategy;
