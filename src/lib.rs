//! Cogwheel - an event dispatch runtime for chat platform bots.
//!
//! Cogwheel turns inbound interaction events from a chat platform into
//! dispatched, stateful handlers. It is an in-process library: the host
//! process owns the platform connection, feeds events into an
//! [`EventRouter`], and implements the narrow [`PlatformClient`] trait for
//! everything flowing back out.
//!
//! # Overview
//!
//! The runtime is built from a handful of cooperating pieces:
//!
//! - [`ButtonRegistry`] - a thread-safe mapping from transient control
//!   identifiers to callbacks, shared by every interactive message
//! - [`DispatchPool`] - a bounded worker pool with caller-runs backpressure
//!   that executes command handlers off the event delivery task
//! - [`ModuleManager`] - registration, enable/disable and reload of
//!   long-lived bot modules
//! - [`ButtonMenu`] - per-session pagination state driving re-renders and
//!   navigation control toggling, with a time-boxed teardown
//! - [`PermissionUtils`] - owner and root permission predicates over the
//!   configured [`Owners`] set
//!
//! # Event Flow
//!
//! ```text
//! Platform event ──> EventRouter::dispatch
//!        ├── command      ──> CommandBackend ──> DispatchPool ──> BotCommand
//!        ├── component    ──> ButtonRegistry ──> ButtonMenu page turn
//!        ├── autocomplete ──> CommandBackend ──> BotCommand suggestions
//!        └── gateway      ──> ModuleManager  ──> every registered BotModule
//! ```
//!
//! # Bootstrap
//!
//! Handlers are declared up front in a [`ComponentCatalog`]: the host
//! registers a factory per module and per command at process initialization,
//! then hands the catalog to [`ModuleManager::init`] and
//! [`CommandBackend::init`]. There is no implicit scanning; the catalog is
//! the single source of discoverable components.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cogwheel::{
//!     CommandBackend, ComponentCatalog, ButtonRegistry, EventRouter,
//!     ModuleManager, PlatformClient,
//! };
//!
//! # async fn bootstrap(platform: Arc<dyn PlatformClient>, catalog: ComponentCatalog) -> Result<(), anyhow::Error> {
//! let catalog = Arc::new(catalog);
//! let buttons = Arc::new(ButtonRegistry::new());
//! let modules = Arc::new(ModuleManager::new(Arc::clone(&catalog)));
//! let commands = Arc::new(CommandBackend::new(
//!     Arc::clone(&platform),
//!     Arc::clone(&catalog),
//! ));
//!
//! modules.init().await?;
//! commands.init().await?;
//!
//! let router = EventRouter::new(buttons, commands, modules);
//! // feed platform events into router.dispatch(event)
//! # Ok(())
//! # }
//! ```

pub mod buttons;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod modules;
pub mod pageable;
pub mod permissions;
pub mod platform;
pub mod router;

pub use crate::{
    buttons::ButtonRegistry,
    catalog::ComponentCatalog,
    commands::{BotCommand, CommandBackend, DispatchPool, SubmitOutcome},
    config::{Activity, Owners, Settings},
    modules::{BotModule, ModuleDescriptor, ModuleEntry, ModuleManager, ModuleMeta},
    pageable::{ButtonMenu, PageProvider},
    permissions::PermissionUtils,
    platform::{
        Actor, AutocompleteEvent, CommandEvent, CommandInfo, ComponentEvent, Control, Event,
        GatewayEvent, PlatformClient, ResponseTarget,
    },
    router::EventRouter,
};
