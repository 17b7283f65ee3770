use crate::classify::SignalSet;
use crate::git::commands;

use super::{settle, FlowOutcome, Halt, Orchestrator};

/// Whether `git remote -v` output lists a remote called `name`.
pub fn lists_remote(listing: &str, name: &str) -> bool {
    listing
        .lines()
        .any(|line| line.split_whitespace().next() == Some(name))
}

impl Orchestrator {
    /// Register the upstream remote at `url`.
    ///
    /// The URL is not contacted; a bad URL shows up on the next fetch.
    pub async fn add_remote(&self, url: &str) -> FlowOutcome {
        settle(self.add_remote_steps(url).await)
    }

    async fn add_remote_steps(&self, url: &str) -> Result<FlowOutcome, Halt> {
        let name = &self.context().upstream;

        self.step(
            &format!("Adding remote {name}…"),
            &commands::add_remote(name, url),
        )
        .await?;
        let (listing, _) = self
            .step("Listing remotes…", commands::LIST_REMOTES)
            .await?;

        if lists_remote(&listing.stdout, name) {
            tracing::info!(remote = %name, url, "Remote added");
            self.reporter()
                .success(&format!("Remote {name} now points at {url}"));
            Ok(FlowOutcome::Completed)
        } else {
            self.reporter()
                .failure(&format!("Remote {name} is missing after adding it. Configured remotes:"));
            self.reporter().message(listing.stdout.trim_end());
            Ok(FlowOutcome::Failed(SignalSet::new()))
        }
    }

    /// Remove the upstream remote.
    pub async fn remove_remote(&self) -> FlowOutcome {
        settle(self.remove_remote_steps().await)
    }

    async fn remove_remote_steps(&self) -> Result<FlowOutcome, Halt> {
        let name = &self.context().upstream;

        self.step(
            &format!("Removing remote {name}…"),
            &commands::remove_remote(name),
        )
        .await?;
        let (listing, _) = self
            .step("Listing remotes…", commands::LIST_REMOTES)
            .await?;

        if lists_remote(&listing.stdout, name) {
            self.reporter()
                .failure(&format!("Remote {name} is still configured:"));
            self.reporter().message(listing.stdout.trim_end());
            Ok(FlowOutcome::Failed(SignalSet::new()))
        } else {
            tracing::info!(remote = %name, "Remote removed");
            self.reporter().success(&format!("Remote {name} removed"));
            Ok(FlowOutcome::Completed)
        }
    }
}
