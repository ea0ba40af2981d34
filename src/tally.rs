// tally.rs
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::{
    models::Voter,
    store::{Listing, StoreError, VoterStore},
};

/// Point-in-time view of the ballot, derived from a single roster read.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub total: usize,
    pub voted_count: usize,
    pub not_voted_count: usize,
    pub tallies: BTreeMap<String, usize>,
    /// Rows left out because they could not be read.
    pub skipped_rows: usize,
    pub all_voters: Vec<Voter>,
    pub voted_voters: Vec<Voter>,
    pub not_voted_voters: Vec<Voter>,
}

impl Summary {
    /// Builds the summary in one pass, keeping the listing's order.
    pub fn from_listing(listing: Listing) -> Self {
        let mut summary = Summary {
            skipped_rows: listing.skipped,
            ..Default::default()
        };

        for voter in listing.voters {
            match voter.choice() {
                Some(choice) => {
                    *summary.tallies.entry(choice.to_string()).or_default() += 1;
                    summary.voted_voters.push(voter.clone());
                }
                None => summary.not_voted_voters.push(voter.clone()),
            }
            summary.all_voters.push(voter);
        }

        summary.total = summary.all_voters.len();
        summary.voted_count = summary.voted_voters.len();
        summary.not_voted_count = summary.total - summary.voted_count;

        summary
    }

    pub fn count_for(&self, choice: &str) -> usize {
        self.tallies.get(choice).copied().unwrap_or(0)
    }
}

pub async fn summarize(store: &dyn VoterStore) -> Result<Summary, StoreError> {
    let listing = store.list_all().await?;

    if listing.skipped > 0 {
        warn!("Summary is missing {} unreadable voter rows", listing.skipped);
    }

    Ok(Summary::from_listing(listing))
}
