// state.rs
use std::sync::Arc;

use crate::{
    auth::AdminCredentials,
    redeem::Engine,
    store::VoterStore,
    window::{Clock, SystemClock, VoteWindow},
};

pub struct AppState {
    pub engine: Engine,
    pub admin: AdminCredentials,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn VoterStore>,
        window: VoteWindow,
        admin: AdminCredentials,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        Arc::new(Self {
            engine: Engine::new(store, window),
            admin,
            clock,
        })
    }

    /// State backed by the wall clock, with a bounded redemption write.
    pub fn from_config(store: Arc<dyn VoterStore>, config: &crate::config::Config) -> Arc<Self> {
        Arc::new(Self {
            engine: Engine::new(store, config.window).with_redeem_timeout(config.redeem_timeout),
            admin: config.admin.clone(),
            clock: Arc::new(SystemClock),
        })
    }
}
