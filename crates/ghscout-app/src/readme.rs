use crate::{Browser, LookupJob, ReadmeToggle, RequestClass, SelectionError};

impl Browser {
    /// Expands, replaces or collapses the README panel. Every expansion
    /// fetches afresh; nothing is kept across a collapse.
    pub fn toggle_readme(&mut self, repository: &str) -> Result<ReadmeToggle, SelectionError> {
        let toggle = self.state.toggle_readme(repository)?;

        match &toggle {
            ReadmeToggle::Expanded(name) => {
                let handle = self.state.active_account().unwrap_or_default().to_string();
                self.issue(
                    RequestClass::Readme,
                    LookupJob::FetchReadme {
                        handle,
                        repository: name.clone(),
                    },
                );
            }
            ReadmeToggle::Collapsed => self.coordinator.cancel(RequestClass::Readme),
        }

        Ok(toggle)
    }
}
