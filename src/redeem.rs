// redeem.rs
use std::{fmt, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::{
    models::LookupStatus,
    store::{StoreError, VoterStore},
    window::{VotePhase, VoteWindow},
};

/// Submission field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Code,
    Choice,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Code => "code",
            Field::Choice => "choice",
        })
    }
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("voting window is closed")]
    WindowClosed,

    #[error("invalid input: {0} is required")]
    InvalidInput(Field),

    #[error("code not found")]
    CodeNotFound,

    #[error("code already used")]
    AlreadyUsed,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validates codes and performs the one-way unused → used transition.
#[derive(Clone)]
pub struct Engine {
    store: Arc<dyn VoterStore>,
    window: VoteWindow,
    redeem_timeout: Option<Duration>,
}

impl Engine {
    pub fn new(store: Arc<dyn VoterStore>, window: VoteWindow) -> Self {
        Self {
            store,
            window,
            redeem_timeout: None,
        }
    }

    /// Bounds how long a single conditional write may take. An expired write
    /// is reported as [`StoreError::Interrupted`].
    pub fn with_redeem_timeout(mut self, limit: Duration) -> Self {
        self.redeem_timeout = Some(limit);
        self
    }

    pub fn window(&self) -> &VoteWindow {
        &self.window
    }

    pub fn store(&self) -> &Arc<dyn VoterStore> {
        &self.store
    }

    pub fn phase(&self, now: DateTime<Utc>) -> VotePhase {
        self.window.phase(now)
    }

    /// Redeems `code` for `choice`. `Ok(())` means this caller won the code.
    ///
    /// On [`StoreError::Interrupted`] the write may or may not have landed;
    /// call [`Engine::lookup`] before trying again.
    pub async fn submit(
        &self,
        code: &str,
        choice: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SubmitError> {
        if !self.window.is_open(now) {
            return Err(SubmitError::WindowClosed);
        }

        let code = code.trim();
        let choice = choice.trim();
        if code.is_empty() {
            return Err(SubmitError::InvalidInput(Field::Code));
        }
        if choice.is_empty() {
            return Err(SubmitError::InvalidInput(Field::Choice));
        }

        let affected = self.redeem(code, choice, now).await?;
        if affected == 1 {
            info!("Vote recorded for code {code}");
            return Ok(());
        }

        // Nothing changed: tell a missing code apart from a used one.
        if self.store.exists(code).await? {
            info!("Rejected vote for already used code {code}");
            Err(SubmitError::AlreadyUsed)
        } else {
            info!("Rejected vote for unknown code {code}");
            Err(SubmitError::CodeNotFound)
        }
    }

    async fn redeem(&self, code: &str, choice: &str, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let write = self.store.redeem(code, choice, now);

        let Some(limit) = self.redeem_timeout else {
            return write.await;
        };

        match timeout(limit, write).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Redemption of code {code} timed out after {limit:?}, outcome unknown");
                Err(StoreError::Interrupted)
            }
        }
    }

    /// Read-only status of `code`. Empty codes are never found.
    pub async fn lookup(&self, code: &str) -> Result<LookupStatus, StoreError> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(LookupStatus::NotFound);
        }

        self.store.lookup(code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Listing, MemoryVoterStore};
    use async_trait::async_trait;
    use chrono::TimeZone;

    fn window() -> VoteWindow {
        VoteWindow::new(
            Utc.with_ymd_and_hms(2025, 9, 1, 1, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 9, 1, 11, 0, 0).unwrap(),
        )
    }

    fn engine() -> Engine {
        let store = MemoryVoterStore::new();
        store.insert("Ht67h", "Budi").unwrap();
        Engine::new(Arc::new(store), window())
    }

    #[tokio::test]
    async fn test_input_is_trimmed() {
        let engine = engine();
        let now = window().start();

        engine.submit("  Ht67h ", " setuju\n", now).await.unwrap();

        let listing = engine.store().list_all().await.unwrap();
        assert_eq!(listing.voters[0].choice(), Some("setuju"));
    }

    #[tokio::test]
    async fn test_blank_input_is_rejected() {
        let engine = engine();
        let now = window().start();

        assert!(matches!(
            engine.submit("   ", "setuju", now).await,
            Err(SubmitError::InvalidInput(Field::Code))
        ));
        assert!(matches!(
            engine.submit("Ht67h", " \t", now).await,
            Err(SubmitError::InvalidInput(Field::Choice))
        ));
        assert_eq!(
            engine.lookup("Ht67h").await.unwrap(),
            LookupStatus::Unused("Budi".into())
        );
    }

    #[tokio::test]
    async fn test_window_is_checked_before_input() {
        let engine = engine();
        let before = window().start() - chrono::Duration::minutes(1);

        assert!(matches!(
            engine.submit("", "", before).await,
            Err(SubmitError::WindowClosed)
        ));
    }

    #[tokio::test]
    async fn test_codes_are_case_sensitive() {
        let engine = engine();
        let now = window().start();

        assert!(matches!(
            engine.submit("HT67H", "setuju", now).await,
            Err(SubmitError::CodeNotFound)
        ));
        assert_eq!(engine.lookup("ht67h").await.unwrap(), LookupStatus::NotFound);
    }

    struct FailingStore;

    #[async_trait]
    impl VoterStore for FailingStore {
        async fn lookup(&self, _: &str) -> Result<LookupStatus, StoreError> {
            Err(StoreError::Backend("down".into()))
        }

        async fn redeem(&self, _: &str, _: &str, _: DateTime<Utc>) -> Result<u64, StoreError> {
            Err(StoreError::Backend("down".into()))
        }

        async fn exists(&self, _: &str) -> Result<bool, StoreError> {
            Err(StoreError::Backend("down".into()))
        }

        async fn list_all(&self) -> Result<Listing, StoreError> {
            Err(StoreError::Backend("down".into()))
        }
    }

    #[tokio::test]
    async fn test_store_failure_aborts_submit() {
        let engine = Engine::new(Arc::new(FailingStore), window());

        assert!(matches!(
            engine.submit("Ht67h", "setuju", window().start()).await,
            Err(SubmitError::Store(StoreError::Backend(_)))
        ));
    }

    struct StalledStore;

    #[async_trait]
    impl VoterStore for StalledStore {
        async fn lookup(&self, _: &str) -> Result<LookupStatus, StoreError> {
            Ok(LookupStatus::NotFound)
        }

        async fn redeem(&self, _: &str, _: &str, _: DateTime<Utc>) -> Result<u64, StoreError> {
            std::future::pending::<Result<u64, StoreError>>().await
        }

        async fn exists(&self, _: &str) -> Result<bool, StoreError> {
            Ok(true)
        }

        async fn list_all(&self) -> Result<Listing, StoreError> {
            Ok(Listing::default())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_redeem_is_reported_as_interrupted() {
        let engine = Engine::new(Arc::new(StalledStore), window())
            .with_redeem_timeout(Duration::from_millis(50));

        assert!(matches!(
            engine.submit("Ht67h", "setuju", window().start()).await,
            Err(SubmitError::Store(StoreError::Interrupted))
        ));
    }
}
