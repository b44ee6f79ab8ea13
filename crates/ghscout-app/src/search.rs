use crate::{Browser, LookupJob, RequestClass};

impl Browser {
    /// Starts a new account search. Blank text is ignored and returns `false`.
    pub fn submit_text(&mut self, text: &str) -> bool {
        if !self.state.begin_search(text) {
            return false;
        }

        self.coordinator.cancel(RequestClass::RepositoryList);
        self.coordinator.cancel(RequestClass::Readme);

        let text = self.state.query_text().to_string();
        self.issue(RequestClass::AccountSearch, LookupJob::SearchAccounts { text });
        true
    }
}
