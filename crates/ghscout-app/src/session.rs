use std::collections::HashSet;

use ghscout_core::github::{Account, ReadmeContent, Repository};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("account '{handle}' is not among the current suggestions")]
    UnknownAccount { handle: String },
    #[error("repository '{name}' is not in the current repository list")]
    UnknownRepository { name: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Idle,
    Searching,
    ShowingSuggestions,
    LoadingRepos,
    ShowingRepos,
    ReadmeExpanded {
        repository: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadmeToggle {
    Expanded(String),
    Collapsed,
}

/// What the user is looking at. One value per run, mutated in place.
///
/// Intent transitions (`begin_search`, `select_account`, `toggle_readme`)
/// take effect immediately. Completion transitions (`finish_*`) are only
/// accepted in the phase that is waiting for them and return whether they
/// changed anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    phase: SessionPhase,
    query_text: String,
    suggested_accounts: Vec<Account>,
    active_account: Option<String>,
    repositories: Vec<Repository>,
    expanded_repo: Option<String>,
    readme: Option<ReadmeContent>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn suggested_accounts(&self) -> &[Account] {
        &self.suggested_accounts
    }

    pub fn active_account(&self) -> Option<&str> {
        self.active_account.as_deref()
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn expanded_repo(&self) -> Option<&str> {
        self.expanded_repo.as_deref()
    }

    pub fn readme(&self) -> Option<&ReadmeContent> {
        self.readme.as_ref()
    }

    /// Returns `false` and leaves the state untouched for blank text.
    pub fn begin_search(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        self.query_text = text.to_string();
        self.suggested_accounts.clear();
        self.active_account = None;
        self.repositories.clear();
        self.clear_expansion();
        self.phase = SessionPhase::Searching;
        true
    }

    pub fn finish_search(&mut self, accounts: Vec<Account>) -> bool {
        if self.phase != SessionPhase::Searching {
            return false;
        }

        let mut seen = HashSet::new();
        self.suggested_accounts = accounts
            .into_iter()
            .filter(|account| seen.insert(account.handle.clone()))
            .collect();
        self.phase = SessionPhase::ShowingSuggestions;
        true
    }

    pub fn select_account(&mut self, handle: &str) -> Result<(), SelectionError> {
        if !self
            .suggested_accounts
            .iter()
            .any(|account| account.handle == handle)
        {
            return Err(SelectionError::UnknownAccount {
                handle: handle.to_string(),
            });
        }

        self.suggested_accounts.clear();
        self.active_account = Some(handle.to_string());
        self.repositories.clear();
        self.clear_expansion();
        self.phase = SessionPhase::LoadingRepos;
        Ok(())
    }

    pub fn finish_repositories(&mut self, repositories: Vec<Repository>) -> bool {
        if self.phase != SessionPhase::LoadingRepos {
            return false;
        }

        self.repositories = repositories;
        self.phase = SessionPhase::ShowingRepos;
        true
    }

    pub fn toggle_readme(&mut self, name: &str) -> Result<ReadmeToggle, SelectionError> {
        if !self.repositories.iter().any(|repo| repo.name == name) {
            return Err(SelectionError::UnknownRepository {
                name: name.to_string(),
            });
        }

        if self.expanded_repo.as_deref() == Some(name) {
            self.clear_expansion();
            self.phase = SessionPhase::ShowingRepos;
            return Ok(ReadmeToggle::Collapsed);
        }

        let owner = self.active_account.clone().unwrap_or_default();
        self.expanded_repo = Some(name.to_string());
        self.readme = Some(ReadmeContent::loading(&owner, name));
        self.phase = SessionPhase::ReadmeExpanded {
            repository: name.to_string(),
        };
        Ok(ReadmeToggle::Expanded(name.to_string()))
    }

    pub fn finish_readme(&mut self, content: ReadmeContent) -> bool {
        let matches_expansion = self.expanded_repo.as_deref() == Some(content.repository.as_str())
            && self.active_account.as_deref() == Some(content.owner.as_str());
        if !matches_expansion {
            return false;
        }

        self.readme = Some(content);
        true
    }

    fn clear_expansion(&mut self) {
        self.expanded_repo = None;
        self.readme = None;
    }
}
