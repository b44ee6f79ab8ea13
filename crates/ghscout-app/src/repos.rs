use crate::{Browser, LookupJob, RequestClass, SelectionError};

impl Browser {
    pub fn select_account(&mut self, handle: &str) -> Result<(), SelectionError> {
        self.state.select_account(handle)?;
        self.coordinator.cancel(RequestClass::Readme);
        self.load_repos_for(handle);
        Ok(())
    }

    fn load_repos_for(&mut self, handle: &str) {
        self.issue(
            RequestClass::RepositoryList,
            LookupJob::ListRepositories {
                handle: handle.to_string(),
            },
        );
    }
}
