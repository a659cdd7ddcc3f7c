//! Bot modules: toggleable, independently-lifecycled extension units.
//!
//! A module is a long-lived unit of bot behavior that listens to the
//! platform's gateway event stream and can be switched on and off at
//! runtime without touching the rest of the bot. Behavior lives behind the
//! [`BotModule`] trait; the surrounding bookkeeping (name, description,
//! restriction flags, the enabled state) lives in [`ModuleEntry`] so the
//! [`ModuleManager`] can manage modules it knows nothing else about.

mod manager;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::info;

use crate::platform::GatewayEvent;

pub use crate::modules::manager::ModuleManager;

/// Lifecycle and event hooks implemented by a module.
///
/// All hooks default to no-ops so a module only implements what it needs.
/// Hooks are synchronous; a module reacting to events with real work should
/// spawn it.
pub trait BotModule: Send + Sync {
    /// Called when the module transitions from disabled to enabled.
    fn on_enable(&self) {}

    /// Called when the module transitions from enabled to disabled.
    fn on_disable(&self) {}

    /// Called for every gateway event while the module is registered.
    fn on_event(&self, _event: &GatewayEvent) {}
}

/// Static metadata of a module.
///
/// Two modules are the same module iff they share a name; the manager keys
/// its registry by name and ignores the rest of the metadata for identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMeta {
    /// Unique module name.
    pub name: String,
    /// Human-readable description, shown in module listings.
    pub description: String,
    /// Restricts the module to the configured root user.
    pub dev_only: bool,
    /// Restricts the module to configured bot owners.
    pub bot_owner_only: bool,
}

impl ModuleMeta {
    /// Creates unrestricted metadata with the given name and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        ModuleMeta {
            name: name.into(),
            description: description.into(),
            dev_only: false,
            bot_owner_only: false,
        }
    }
}

/// Declared registration state of a module: its metadata plus whether it
/// starts enabled.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    /// The module's metadata.
    pub meta: ModuleMeta,
    /// Whether the manager enables the module right after registration.
    pub enabled: bool,
}

impl ModuleDescriptor {
    /// Creates a descriptor.
    pub fn new(meta: ModuleMeta, enabled: bool) -> Self {
        ModuleDescriptor { meta, enabled }
    }
}

/// A registered module: metadata, enabled flag and behavior hooks.
///
/// The enabled flag only ever changes through [`enable`](Self::enable) and
/// [`disable`](Self::disable). Both are idempotent and invoke the matching
/// lifecycle hook exactly once per observed transition, also under
/// concurrent calls.
pub struct ModuleEntry {
    meta: ModuleMeta,
    enabled: AtomicBool,
    hooks: Arc<dyn BotModule>,
}

impl ModuleEntry {
    /// Creates a disabled entry around the module's hooks.
    pub fn new(meta: ModuleMeta, hooks: Arc<dyn BotModule>) -> Self {
        ModuleEntry {
            meta,
            enabled: AtomicBool::new(false),
            hooks,
        }
    }

    /// The module's metadata.
    pub fn meta(&self) -> &ModuleMeta {
        &self.meta
    }

    /// The module's name.
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Whether the module is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Enables the module, invoking its enable hook on the transition.
    ///
    /// A no-op when the module is already enabled.
    pub fn enable(&self) {
        if !self.enabled.swap(true, Ordering::SeqCst) {
            self.hooks.on_enable();
            info!("enabled module '{}'", self.meta.name);
        }
    }

    /// Disables the module, invoking its disable hook on the transition.
    ///
    /// A no-op when the module is already disabled.
    pub fn disable(&self) {
        if self.enabled.swap(false, Ordering::SeqCst) {
            self.hooks.on_disable();
            info!("disabled module '{}'", self.meta.name);
        }
    }

    /// Forwards a gateway event to the module's event hook.
    pub fn handle_event(&self, event: &GatewayEvent) {
        self.hooks.on_event(event);
    }
}
