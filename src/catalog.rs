//! Explicit bootstrap registry of discoverable components.
//!
//! Instead of scanning for tagged types at startup, the host declares every
//! module and command once, at process initialization, by registering a
//! factory here. [`ModuleManager::init`](crate::modules::ModuleManager::init)
//! and [`CommandBackend::init`](crate::commands::CommandBackend::init) then
//! consume the catalog, re-invoking the factories on each scan. A factory
//! that clones a captured `Arc` yields singleton semantics; a factory that
//! constructs anew yields a fresh instance per reload.

use std::sync::Arc;

use anyhow::Result;

use crate::commands::BotCommand;
use crate::modules::{BotModule, ModuleDescriptor};

type ModuleFactory = Box<dyn Fn() -> Result<Arc<dyn BotModule>> + Send + Sync>;
type CommandFactory = Box<dyn Fn() -> Arc<dyn BotCommand> + Send + Sync>;

/// A declared module: its descriptor plus the factory building it.
pub struct ModuleRegistration {
    /// Metadata and initial enabled state.
    pub descriptor: ModuleDescriptor,
    /// Builds the module's hooks. May fail, which aborts the scan.
    pub factory: ModuleFactory,
}

/// Registry of `(kind, factory)` pairs populated at bootstrap.
///
/// Build it mutably, then freeze it behind an `Arc` and share it with the
/// manager and the command backend.
#[derive(Default)]
pub struct ComponentCatalog {
    modules: Vec<ModuleRegistration>,
    commands: Vec<CommandFactory>,
}

impl ComponentCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        ComponentCatalog {
            modules: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Declares a module.
    pub fn register_module<F>(&mut self, descriptor: ModuleDescriptor, factory: F) -> &mut Self
    where
        F: Fn() -> Result<Arc<dyn BotModule>> + Send + Sync + 'static,
    {
        self.modules.push(ModuleRegistration {
            descriptor,
            factory: Box::new(factory),
        });
        self
    }

    /// Declares a command.
    pub fn register_command<F>(&mut self, factory: F) -> &mut Self
    where
        F: Fn() -> Arc<dyn BotCommand> + Send + Sync + 'static,
    {
        self.commands.push(Box::new(factory));
        self
    }

    /// The declared modules, in registration order.
    pub fn modules(&self) -> &[ModuleRegistration] {
        &self.modules
    }

    /// The declared command factories, in registration order.
    pub fn commands(&self) -> &[CommandFactory] {
        &self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::ModuleMeta;

    struct NoopModule;

    impl BotModule for NoopModule {}

    #[test]
    fn test_catalog_keeps_registration_order() {
        let mut catalog = ComponentCatalog::new();
        for name in ["first", "second", "third"] {
            catalog.register_module(
                ModuleDescriptor::new(ModuleMeta::new(name, ""), false),
                || Ok(Arc::new(NoopModule) as Arc<dyn BotModule>),
            );
        }

        let names: Vec<&str> = catalog
            .modules()
            .iter()
            .map(|registration| registration.descriptor.meta.name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_factories_can_be_invoked_repeatedly() {
        let mut catalog = ComponentCatalog::new();
        catalog.register_module(
            ModuleDescriptor::new(ModuleMeta::new("ping", ""), true),
            || Ok(Arc::new(NoopModule) as Arc<dyn BotModule>),
        );

        let registration = &catalog.modules()[0];
        assert!((registration.factory)().is_ok());
        assert!((registration.factory)().is_ok());
    }

    #[test]
    fn test_singleton_factory_returns_same_instance() {
        let instance: Arc<dyn BotModule> = Arc::new(NoopModule);
        let captured = Arc::clone(&instance);

        let mut catalog = ComponentCatalog::new();
        catalog.register_module(
            ModuleDescriptor::new(ModuleMeta::new("ping", ""), true),
            move || Ok(Arc::clone(&captured)),
        );

        let built = (catalog.modules()[0].factory)().unwrap();
        assert!(Arc::ptr_eq(&built, &instance));
    }
}
