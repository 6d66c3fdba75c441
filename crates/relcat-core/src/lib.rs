//! relcat core - engine-neutral relational table model
//!
//! This crate provides the types and traits every backend crate builds on:
//!
//! - `DataType`, `Column`, `Index`, `Table` - the neutral table model
//! - `TableChange` - closed set of structural change requests
//! - `Connection` / `ConnectionProvider` - the "execute SQL, read rows" seam
//! - `TableOperations` - the public create/load/list/rename/alter/drop surface
//! - `RelcatError` - the engine-independent error taxonomy

mod change;
mod config;
mod connection;
mod data_type;
mod error;
mod model;
mod operations;
mod types;

pub use change::*;
pub use config::*;
pub use connection::*;
pub use data_type::*;
pub use error::*;
pub use model::*;
pub use operations::*;
pub use types::*;
