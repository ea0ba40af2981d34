// store/postgres.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::warn;

use super::{Listing, StoreError, VoterStore};
use crate::models::{LookupStatus, Voter, VoterRow};

#[derive(Clone)]
pub struct PgVoterStore {
    pool: PgPool,
}

impl PgVoterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl VoterStore for PgVoterStore {
    async fn lookup(&self, code: &str) -> Result<LookupStatus, StoreError> {
        let row = sqlx::query("SELECT name, used FROM voters WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(LookupStatus::NotFound);
        };

        let name: String = row.try_get("name")?;
        let used: bool = row.try_get("used")?;

        Ok(if used {
            LookupStatus::Used(name)
        } else {
            LookupStatus::Unused(name)
        })
    }

    async fn redeem(
        &self,
        code: &str,
        choice: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        // The guard on `used` makes this a single conditional write; Postgres
        // re-checks it after waiting on a concurrent writer's row lock.
        let result = sqlx::query(
            r#"
            UPDATE voters
            SET used = TRUE, used_at = $3, choice = $1
            WHERE code = $2 AND used = FALSE
            "#,
        )
        .bind(choice)
        .bind(code)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn exists(&self, code: &str) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM voters WHERE code = $1)")
            .bind(code)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn list_all(&self) -> Result<Listing, StoreError> {
        // One statement, so one snapshot.
        let rows = sqlx::query(
            r#"
            SELECT code, name, used, used_at, choice
            FROM voters
            ORDER BY used_at ASC NULLS LAST, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut listing = Listing {
            voters: Vec::with_capacity(rows.len()),
            skipped: 0,
        };

        for row in &rows {
            let voter = VoterRow::from_row(row)
                .map_err(|e| e.to_string())
                .and_then(|row| Voter::try_from(row).map_err(|e| e.to_string()));

            match voter {
                Ok(voter) => listing.voters.push(voter),
                Err(e) => {
                    warn!("Skipping voter row: {e}");
                    listing.skipped += 1;
                }
            }
        }

        Ok(listing)
    }
}
