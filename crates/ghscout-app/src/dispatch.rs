use std::sync::mpsc::Sender;

use ghscout_core::github::{Account, LookupClient, ReadmeContent, Repository};
use tracing::debug;

use crate::coordinator::{RequestClass, Ticket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupJob {
    SearchAccounts { text: String },
    ListRepositories { handle: String },
    FetchReadme { handle: String, repository: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Accounts(Vec<Account>),
    Repositories(Vec<Repository>),
    Readme(ReadmeContent),
}

impl LookupOutcome {
    pub fn class(&self) -> RequestClass {
        match self {
            Self::Accounts(_) => RequestClass::AccountSearch,
            Self::Repositories(_) => RequestClass::RepositoryList,
            Self::Readme(_) => RequestClass::Readme,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupCompletion {
    pub ticket: Ticket,
    pub outcome: LookupOutcome,
}

pub trait LookupDispatcher: Send + Sync {
    fn dispatch(&self, ticket: Ticket, job: LookupJob, reply: Sender<LookupCompletion>);
}

/// Runs every job on its own worker thread. Nothing is cancelled at the
/// network level; stale replies are dropped by the receiver.
#[derive(Clone)]
pub struct ThreadLookupDispatcher {
    client: LookupClient,
}

impl ThreadLookupDispatcher {
    pub fn new(client: LookupClient) -> Self {
        Self { client }
    }
}

impl LookupDispatcher for ThreadLookupDispatcher {
    fn dispatch(&self, ticket: Ticket, job: LookupJob, reply: Sender<LookupCompletion>) {
        debug!(class = %ticket.class, generation = ticket.generation, ?job, "dispatching lookup");

        let client = self.client.clone();
        std::thread::spawn(move || {
            let outcome = run_job(&client, job);
            let _ = reply.send(LookupCompletion { ticket, outcome });
        });
    }
}

pub fn run_job(client: &LookupClient, job: LookupJob) -> LookupOutcome {
    match job {
        LookupJob::SearchAccounts { text } => LookupOutcome::Accounts(client.search_accounts(&text)),
        LookupJob::ListRepositories { handle } => {
            LookupOutcome::Repositories(client.list_repositories(&handle))
        }
        LookupJob::FetchReadme { handle, repository } => {
            LookupOutcome::Readme(client.fetch_readme(&handle, &repository))
        }
    }
}
