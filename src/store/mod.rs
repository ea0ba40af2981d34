// store/mod.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{LookupStatus, Voter};

pub mod memory;
pub mod postgres;

pub use memory::MemoryVoterStore;
pub use postgres::PgVoterStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The call did not finish; whether it took effect is unknown.
    #[error("store call interrupted before completion")]
    Interrupted,

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Snapshot of the whole roster.
#[derive(Debug, Default, Clone)]
pub struct Listing {
    /// Ordered by redemption time ascending, unredeemed last, then insertion order.
    pub voters: Vec<Voter>,
    /// Rows that could not be turned into a [`Voter`].
    pub skipped: usize,
}

/// Durable roster of eligible voters.
#[async_trait]
pub trait VoterStore: Send + Sync {
    async fn lookup(&self, code: &str) -> Result<LookupStatus, StoreError>;

    /// Marks `code` as used with `choice` only if it is currently unused.
    /// Returns the number of rows changed, which is 0 or 1. Exactly one of
    /// any set of concurrent callers for the same code may observe 1.
    async fn redeem(&self, code: &str, choice: &str, now: DateTime<Utc>)
        -> Result<u64, StoreError>;

    async fn exists(&self, code: &str) -> Result<bool, StoreError>;

    /// Reads every voter in one consistent read.
    async fn list_all(&self) -> Result<Listing, StoreError>;
}
