//! # Database Access
//!
//! Read-only access to the Airflow metadata database over MySQL or PostgreSQL.
//!
//! - [`connection`] - lazily connected pool per backend
//! - [`queries`] - the fixed SQL text, dispatched on the backend dialect
//! - [`source`] - the [`AirflowSource`] trait and its SQL implementation

pub mod connection;
pub mod queries;
pub mod source;

pub use connection::SourcePool;
pub use queries::SourceQuery;
pub use source::{AirflowSource, SqlSource};
