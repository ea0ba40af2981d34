// models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::window::VotePhase;

/// Raw `voters` row as stored. Converted into [`Voter`] once its columns
/// are known to agree with each other.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VoterRow {
    pub code: String,
    pub name: String,
    pub used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub choice: Option<String>,
}

/// The recorded ballot of a redeemed code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redemption {
    pub used_at: DateTime<Utc>,
    pub choice: String,
}

/// One eligible participant. `redemption` is `Some` iff the code has been used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Voter {
    pub code: String,
    pub name: String,
    pub redemption: Option<Redemption>,
}

impl Voter {
    pub fn is_used(&self) -> bool {
        self.redemption.is_some()
    }

    pub fn choice(&self) -> Option<&str> {
        self.redemption.as_ref().map(|r| r.choice.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("voter row {code:?} is inconsistent: used={used}, used_at set={has_used_at}, choice set={has_choice}")]
pub struct InconsistentRow {
    pub code: String,
    pub used: bool,
    pub has_used_at: bool,
    pub has_choice: bool,
}

impl TryFrom<VoterRow> for Voter {
    type Error = InconsistentRow;

    fn try_from(row: VoterRow) -> Result<Self, Self::Error> {
        let redemption = match (row.used, row.used_at, row.choice) {
            (true, Some(used_at), Some(choice)) => Some(Redemption { used_at, choice }),
            (false, None, None) => None,
            (used, used_at, choice) => {
                return Err(InconsistentRow {
                    code: row.code,
                    used,
                    has_used_at: used_at.is_some(),
                    has_choice: choice.is_some(),
                });
            }
        };

        Ok(Self {
            code: row.code,
            name: row.name,
            redemption,
        })
    }
}

/// What the store knows about a code, without revealing the recorded choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "name", rename_all = "snake_case")]
pub enum LookupStatus {
    NotFound,
    Unused(String),
    Used(String),
}

impl LookupStatus {
    pub fn name(&self) -> Option<&str> {
        match self {
            LookupStatus::NotFound => None,
            LookupStatus::Unused(name) | LookupStatus::Used(name) => Some(name),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub choice: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub code: Option<String>,
    pub success: Option<String>,
}

/// Pre-vote status shown to a participant.
#[derive(Debug, Serialize)]
pub struct StatusView {
    pub code: String,
    pub name: Option<String>,
    pub phase: VotePhase,
    pub start: String,
    pub end: String,
    pub already_used: bool,
    pub success: bool,
    pub message: Option<String>,
}
