//! Data store implementations for different backends

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod sql;

pub use in_memory::{InMemoryStore, Record};
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;
pub use sql::{SqlStatement, render_count, render_select};
