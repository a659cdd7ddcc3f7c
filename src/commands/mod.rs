//! Command declaration and dispatch.
//!
//! Commands are named actions invoked by actors through the platform. Each
//! command declares its metadata once as a [`CommandInfo`] and implements
//! its behavior behind the [`BotCommand`] trait. The [`CommandBackend`]
//! registers every declared command with the platform at startup and routes
//! inbound [`CommandEvent`]s onto the bounded [`DispatchPool`] so a slow
//! handler never stalls event delivery.
//!
//! # Error Handling
//!
//! A handler returning `Err` is a recovered, user-visible failure: the error
//! is logged and the actor receives a single ephemeral error reply. Handler
//! errors never escape the worker pool.
//!
//! [`CommandEvent`]: crate::platform::CommandEvent

mod backend;
mod pool;

use anyhow::Result;
use async_trait::async_trait;

use crate::platform::{Actor, AutocompleteEvent, CommandEvent, CommandInfo};

pub use crate::commands::backend::CommandBackend;
pub use crate::commands::pool::{DispatchPool, SubmitOutcome};

/// A named, schema-declaring command executor.
///
/// Implementations are registered through the
/// [`ComponentCatalog`](crate::catalog::ComponentCatalog) and dispatched by
/// the [`CommandBackend`] whenever the platform delivers an invocation of
/// the declared name.
#[async_trait]
pub trait BotCommand: Send + Sync {
    /// Declared metadata pushed to the platform at registration.
    fn info(&self) -> CommandInfo;

    /// Executes the command for the invoking actor.
    ///
    /// Runs on a worker of the [`DispatchPool`]. Returning `Err` produces an
    /// ephemeral error reply for the actor.
    async fn on_execute(&self, actor: Actor, event: CommandEvent) -> Result<()>;

    /// Answers an autocomplete request for this command.
    ///
    /// The default implementation offers no suggestions.
    async fn on_autocomplete(&self, _event: AutocompleteEvent) {}
}
