//! Command registration and inbound dispatch.

use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;
use log::{debug, error, info};

use crate::catalog::ComponentCatalog;
use crate::commands::{BotCommand, DispatchPool, SubmitOutcome};
use crate::platform::{AutocompleteEvent, CommandEvent, PlatformClient};

/// Reply sent to the actor when a command handler fails.
const COMMAND_ERROR_REPLY: &str = "An error occurred while executing the command";

/// Registers declared commands with the platform and executes invocations
/// on the [`DispatchPool`].
///
/// The command map is keyed by name. Unlike modules, a later registration
/// with the same name overwrites the earlier one.
pub struct CommandBackend {
    platform: Arc<dyn PlatformClient>,
    catalog: Arc<ComponentCatalog>,
    commands: Arc<DashMap<String, Arc<dyn BotCommand>>>,
    pool: DispatchPool,
}

impl CommandBackend {
    /// Creates a backend with a default-sized [`DispatchPool`].
    ///
    /// Must be constructed inside a Tokio runtime.
    pub fn new(platform: Arc<dyn PlatformClient>, catalog: Arc<ComponentCatalog>) -> Self {
        Self::with_pool(platform, catalog, DispatchPool::new())
    }

    /// Creates a backend executing on the given pool.
    pub fn with_pool(
        platform: Arc<dyn PlatformClient>,
        catalog: Arc<ComponentCatalog>,
        pool: DispatchPool,
    ) -> Self {
        CommandBackend {
            platform,
            catalog,
            commands: Arc::new(DashMap::new()),
            pool,
        }
    }

    /// Builds every command declared in the catalog and upserts its
    /// metadata with the platform.
    ///
    /// A platform registration failure aborts the remaining registrations
    /// and is returned to the caller.
    pub async fn init(&self) -> Result<()> {
        for factory in self.catalog.commands() {
            let command = factory();
            let info = command.info();
            self.commands.insert(info.name.clone(), command);
            self.platform.register_command(&info).await?;
            info!("registered command '{}'", info.name);
        }
        Ok(())
    }

    /// Dispatches a command invocation onto the worker pool.
    ///
    /// The executing task looks the command up by name, runs it and, if the
    /// handler returns an error, logs it and sends the actor one ephemeral
    /// error reply. Invocations of unknown names are dropped.
    pub async fn on_command(&self, event: CommandEvent) -> SubmitOutcome {
        let commands = Arc::clone(&self.commands);
        let platform = Arc::clone(&self.platform);

        self.pool
            .submit(async move {
                let command = commands
                    .get(&event.name)
                    .map(|entry| Arc::clone(entry.value()));
                let Some(command) = command else {
                    debug!("no executor registered for command '{}'", event.name);
                    return;
                };

                let name = event.name.clone();
                let actor = event.actor.clone();
                let target = event.target.clone();

                if let Err(err) = command.on_execute(actor, event).await {
                    error!("error executing command '{name}': {err:#}");
                    if let Err(reply_err) = platform
                        .reply(&target, COMMAND_ERROR_REPLY, &[], true)
                        .await
                    {
                        error!("failed to send error reply for command '{name}': {reply_err:#}");
                    }
                }
            })
            .await
    }

    /// Forwards an autocomplete request to the named command.
    ///
    /// Runs on the delivery task; suggestion lookups are expected to be
    /// cheap. Requests for unknown names are dropped.
    pub async fn on_autocomplete(&self, event: AutocompleteEvent) {
        let command = self
            .commands
            .get(&event.name)
            .map(|entry| Arc::clone(entry.value()));
        if let Some(command) = command {
            command.on_autocomplete(event).await;
        }
    }

    /// Returns the executor registered under a name, if any.
    pub fn command(&self, name: &str) -> Option<Arc<dyn BotCommand>> {
        self.commands.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Shuts down the worker pool, draining in-flight invocations.
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }
}
