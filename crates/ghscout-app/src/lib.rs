mod completion;
pub mod coordinator;
pub mod dispatch;
mod readme;
mod repos;
mod search;
pub mod session;

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{Context, Result};
use ghscout_core::config::LookupSettings;
use ghscout_core::github::LookupClient;
use tracing::debug;

pub use coordinator::{RequestClass, RequestCoordinator, RequestStatus, Ticket};
pub use dispatch::{
    LookupCompletion, LookupDispatcher, LookupJob, LookupOutcome, ThreadLookupDispatcher,
};
pub use session::{ReadmeToggle, SelectionError, SessionPhase, SessionState};

/// Accepts view intents, issues lookups and applies their completions.
///
/// Owned by the single event loop. Completions arrive on an internal channel
/// and only take effect through [`Browser::drain`] or
/// [`Browser::apply_completion`].
pub struct Browser {
    state: SessionState,
    coordinator: RequestCoordinator,
    dispatcher: Arc<dyn LookupDispatcher>,
    sender: Sender<LookupCompletion>,
    receiver: Receiver<LookupCompletion>,
}

impl Browser {
    pub fn new(dispatcher: Arc<dyn LookupDispatcher>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            state: SessionState::new(),
            coordinator: RequestCoordinator::new(),
            dispatcher,
            sender,
            receiver,
        }
    }

    pub fn from_settings(settings: LookupSettings) -> Result<Self> {
        let client =
            LookupClient::with_reqwest(settings).context("failed to initialize GitHub client")?;
        Ok(Self::new(Arc::new(ThreadLookupDispatcher::new(client))))
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> &SessionPhase {
        self.state.phase()
    }

    pub fn request_status(&self, class: RequestClass) -> RequestStatus {
        self.coordinator.status(class)
    }

    pub fn is_loading(&self, class: RequestClass) -> bool {
        self.coordinator.is_live(class)
    }

    fn issue(&mut self, class: RequestClass, job: LookupJob) -> Ticket {
        let ticket = self.coordinator.begin(class);
        debug!(%class, generation = ticket.generation, "request issued");
        self.dispatcher.dispatch(ticket, job, self.sender.clone());
        ticket
    }
}
