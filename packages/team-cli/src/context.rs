//! Application context with shared state and utilities

use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use team_store::{AgentStore, FileStorage, KeyValueStorage, ProxyClient, TeamMemberStore};

/// Application context passed to all commands
pub struct AppContext {
    pub data_dir: PathBuf,
    pub backend_url: String,
    pub assume_yes: bool,
    pub agents: Arc<AgentStore>,
    pub members: TeamMemberStore,
}

impl AppContext {
    pub fn new(data_dir: &Path, backend_url: &str, assume_yes: bool) -> Self {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::new(data_dir));
        Self {
            data_dir: data_dir.to_path_buf(),
            backend_url: backend_url.to_string(),
            assume_yes,
            agents: Arc::new(AgentStore::load(Arc::clone(&storage))),
            members: TeamMemberStore::load(storage),
        }
    }

    pub fn proxy(&self) -> ProxyClient {
        ProxyClient::new(self.backend_url.clone())
    }

    pub fn theme(&self) -> ColorfulTheme {
        ColorfulTheme::default()
    }

    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&self.theme())
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    pub fn print_header(&self, msg: &str) {
        println!();
        println!("{}", style(msg).bold());
    }

    pub fn print_success(&self, msg: &str) {
        println!("{}", style(msg).green());
    }

    pub fn print_warning(&self, msg: &str) {
        println!("{}", style(msg).yellow());
    }
}
