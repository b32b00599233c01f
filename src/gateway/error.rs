//! Gateway transport errors.
//!
//! An empty collection or `None` is the store's explicit "no data" answer and is
//! never reported through this type.

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Gateway task failed: {0}")]
    TaskJoin(String),
}
