#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use referendum::{
    redeem::Engine,
    store::MemoryVoterStore,
    window::VoteWindow,
};

pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::<FixedOffset>::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

/// `[2025-09-01T08:00+07:00, 2025-09-01T18:00+07:00)`
pub fn window() -> VoteWindow {
    VoteWindow::new(at("2025-09-01T08:00:00+07:00"), at("2025-09-01T18:00:00+07:00"))
}

pub fn roster(voters: &[(&str, &str)]) -> Arc<MemoryVoterStore> {
    let store = MemoryVoterStore::new();
    for (code, name) in voters {
        store.insert(code, name).unwrap();
    }
    Arc::new(store)
}

pub fn engine(voters: &[(&str, &str)]) -> (Engine, Arc<MemoryVoterStore>) {
    let store = roster(voters);
    (Engine::new(store.clone(), window()), store)
}
