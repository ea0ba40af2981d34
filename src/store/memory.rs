// store/memory.rs
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Listing, StoreError, VoterStore};
use crate::models::{LookupStatus, Redemption, Voter};

/// Roster kept in process memory. The conditional check and the write of
/// `redeem` happen under one lock.
#[derive(Debug, Default)]
pub struct MemoryVoterStore {
    voters: Mutex<Vec<Voter>>,
}

impl MemoryVoterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an unused code. Codes must be unique.
    pub fn insert(&self, code: &str, name: &str) -> Result<(), StoreError> {
        let mut voters = self.lock()?;

        if voters.iter().any(|v| v.code == code) {
            return Err(StoreError::Backend(format!("duplicate code {code:?}")));
        }

        voters.push(Voter {
            code: code.to_string(),
            name: name.to_string(),
            redemption: None,
        });

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Voter>>, StoreError> {
        self.voters
            .lock()
            .map_err(|_| StoreError::Backend("voter roster lock poisoned".to_string()))
    }
}

#[async_trait]
impl VoterStore for MemoryVoterStore {
    async fn lookup(&self, code: &str) -> Result<LookupStatus, StoreError> {
        let voters = self.lock()?;

        Ok(match voters.iter().find(|v| v.code == code) {
            None => LookupStatus::NotFound,
            Some(v) if v.is_used() => LookupStatus::Used(v.name.clone()),
            Some(v) => LookupStatus::Unused(v.name.clone()),
        })
    }

    async fn redeem(
        &self,
        code: &str,
        choice: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut voters = self.lock()?;

        match voters.iter_mut().find(|v| v.code == code && !v.is_used()) {
            Some(voter) => {
                voter.redemption = Some(Redemption {
                    used_at: now,
                    choice: choice.to_string(),
                });
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn exists(&self, code: &str) -> Result<bool, StoreError> {
        Ok(self.lock()?.iter().any(|v| v.code == code))
    }

    async fn list_all(&self) -> Result<Listing, StoreError> {
        let mut voters = self.lock()?.clone();

        // Stable sort keeps insertion order among equal keys.
        voters.sort_by_key(|v| match &v.redemption {
            Some(r) => (false, Some(r.used_at)),
            None => (true, None),
        });

        Ok(Listing { voters, skipped: 0 })
    }
}
