use crate::db::CredentialStore;
use crate::discord::DiscordApi;
use crate::sweep::{SweepRegistry, Sweeper, Throttle};
use std::sync::Arc;

pub(crate) type AppState = Arc<StateRef>;

pub(crate) struct StateRef {
    pub(crate) discord: Arc<dyn DiscordApi>,
    pub(crate) store: Arc<dyn CredentialStore>,
    pub(crate) sweeper: Sweeper,
    pub(crate) sweeps: SweepRegistry,
}

impl StateRef {
    pub(crate) fn new(
        discord: Arc<dyn DiscordApi>,
        store: Arc<dyn CredentialStore>,
        throttle: Arc<dyn Throttle>,
    ) -> Self {
        Self {
            sweeper: Sweeper::new(Arc::clone(&discord), throttle),
            discord,
            store,
            sweeps: SweepRegistry::default(),
        }
    }
}
