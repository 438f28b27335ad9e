//! Core module: parameter normalization, translation and execution of list queries

pub mod coerce;
pub mod error;
pub mod execute;
pub mod field;
pub mod list_config;
pub mod operator;
pub mod params;
pub mod predicate;
pub mod query;
pub mod store;
pub mod translate;

pub use error::{ConfigError, ListQueryError};
pub use execute::{
    ListOutput, ListRows, ListSource, OutputMode, RunOptions, execute, run_list_envelope,
    run_list_query,
};
pub use field::FieldValue;
pub use list_config::{ColumnFilter, CustomFilter, ListQueryConfig, SortDefault};
pub use operator::{FilterOp, FilterValue};
pub use params::{QueryInput, QueryPairs};
pub use predicate::{Column, OrderBy, Predicate, SortDirection};
pub use query::{ItemEnvelope, ListEnvelope, ListMeta, build_item_envelope, build_list_envelope};
pub use store::{DataStore, SelectQuery};
pub use translate::{ParsedListQuery, translate};
