use std::sync::mpsc::TryRecvError;

use tracing::debug;

use crate::{Browser, LookupCompletion, LookupOutcome};

impl Browser {
    /// Applies every completion that has arrived so far without blocking.
    /// Returns how many of them changed the session.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(completion) => {
                    if self.apply_completion(completion) {
                        applied += 1;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    pub fn apply_completion(&mut self, completion: LookupCompletion) -> bool {
        let LookupCompletion { ticket, outcome } = completion;

        if outcome.class() != ticket.class {
            debug!(
                class = %ticket.class,
                outcome = %outcome.class(),
                "completion does not match its request class"
            );
            return false;
        }

        if !self.coordinator.settle(ticket) {
            debug!(
                class = %ticket.class,
                generation = ticket.generation,
                "discarding stale completion"
            );
            return false;
        }

        match outcome {
            LookupOutcome::Accounts(accounts) => self.state.finish_search(accounts),
            LookupOutcome::Repositories(repositories) => {
                self.state.finish_repositories(repositories)
            }
            LookupOutcome::Readme(content) => self.state.finish_readme(content),
        }
    }
}
