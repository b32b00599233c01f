//! Data gateway — where the engine's records come from.
//!
//! `DataGateway` is the seam; `SqliteGateway` reads the clinic SQLite store and
//! `InMemoryGateway` serves records already loaded by a batch job or a test.

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod traits;

pub use error::GatewayError;
pub use memory::InMemoryGateway;
pub use sqlite::SqliteGateway;
pub use traits::DataGateway;
