use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClass {
    AccountSearch,
    RepositoryList,
    Readme,
}

impl RequestClass {
    pub const ALL: [RequestClass; 3] = [
        RequestClass::AccountSearch,
        RequestClass::RepositoryList,
        RequestClass::Readme,
    ];

    fn index(self) -> usize {
        match self {
            Self::AccountSearch => 0,
            Self::RepositoryList => 1,
            Self::Readme => 2,
        }
    }
}

impl fmt::Display for RequestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccountSearch => write!(f, "account-search"),
            Self::RepositoryList => write!(f, "repository-list"),
            Self::Readme => write!(f, "readme-fetch"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub class: RequestClass,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct RequestSlot {
    generation: u64,
    status: RequestStatus,
}

/// One generation counter per request class. Only the ticket carrying the
/// current generation may settle; everything older is stale.
#[derive(Debug, Default)]
pub struct RequestCoordinator {
    slots: [RequestSlot; 3],
}

impl RequestCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, class: RequestClass) -> Ticket {
        let slot = &mut self.slots[class.index()];
        slot.generation = slot.generation.saturating_add(1);
        slot.status = RequestStatus::Pending;
        Ticket {
            class,
            generation: slot.generation,
        }
    }

    pub fn cancel(&mut self, class: RequestClass) {
        let slot = &mut self.slots[class.index()];
        slot.generation = slot.generation.saturating_add(1);
        slot.status = RequestStatus::Idle;
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        let slot = &self.slots[ticket.class.index()];
        slot.status == RequestStatus::Pending && slot.generation == ticket.generation
    }

    pub fn settle(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        self.slots[ticket.class.index()].status = RequestStatus::Settled;
        true
    }

    pub fn status(&self, class: RequestClass) -> RequestStatus {
        self.slots[class.index()].status
    }

    pub fn is_live(&self, class: RequestClass) -> bool {
        self.status(class) == RequestStatus::Pending
    }
}
