//! Registration, lifecycle and reload of bot modules.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use log::{debug, info};
use tokio::sync::Mutex;

use crate::catalog::{ComponentCatalog, ModuleRegistration};
use crate::modules::{BotModule, ModuleDescriptor, ModuleEntry};
use crate::platform::GatewayEvent;

/// Owns the registry of bot modules and drives their lifecycle.
///
/// Modules are keyed by name with first-registration-wins semantics: a
/// second module declaring an already-registered name is dropped silently
/// and none of its lifecycle hooks run. Registration and enabling happen in
/// one serialized critical section, so concurrent [`init`](Self::init) and
/// [`add_module`](Self::add_module) calls cannot half-register or
/// double-enable a module.
///
/// # Reload
///
/// [`reload_modules`](Self::reload_modules) disables everything, clears the
/// registry and re-runs the catalog scan. Modules are briefly absent
/// between the clear and the re-scan; reload is an administrative
/// operation, not a steady-state path.
pub struct ModuleManager {
    catalog: Arc<ComponentCatalog>,
    modules: DashMap<String, Arc<ModuleEntry>>,
    registration: Mutex<()>,
}

impl ModuleManager {
    /// Creates a manager over the given catalog with no modules registered.
    pub fn new(catalog: Arc<ComponentCatalog>) -> Self {
        ModuleManager {
            catalog,
            modules: DashMap::new(),
            registration: Mutex::new(()),
        }
    }

    /// Registers every module declared in the catalog.
    ///
    /// For each declaration the factory is invoked, the entry inserted
    /// first-write-wins and, when its descriptor says so, enabled. A factory
    /// error aborts the scan and is returned; modules registered before the
    /// failure stay registered.
    pub async fn init(&self) -> Result<()> {
        let _guard = self.registration.lock().await;
        for registration in self.catalog.modules() {
            self.register_locked(registration)?;
        }
        Ok(())
    }

    /// Registers a single module outside the catalog.
    ///
    /// Applies the same first-write-wins insert and conditional enable as
    /// [`init`](Self::init), serialized against it.
    pub async fn add_module(
        &self,
        descriptor: ModuleDescriptor,
        hooks: Arc<dyn BotModule>,
    ) {
        let _guard = self.registration.lock().await;
        self.insert_locked(descriptor, hooks);
    }

    /// Disables every enabled module, clears the registry and re-runs the
    /// catalog scan.
    pub async fn reload_modules(&self) -> Result<()> {
        info!("reloading modules...");
        {
            let _guard = self.registration.lock().await;
            for entry in self.snapshot() {
                entry.disable();
            }
            self.modules.clear();
        }
        self.init().await?;
        info!("modules reloaded");
        Ok(())
    }

    /// Reloads a single module by name.
    ///
    /// Disables and removes the named module, then re-runs the full catalog
    /// scan to bring it back. A name that is not registered is a no-op.
    pub async fn reload_module(&self, name: &str) -> Result<()> {
        {
            let _guard = self.registration.lock().await;
            match self.modules.remove(name) {
                Some((_, entry)) => entry.disable(),
                None => return Ok(()),
            }
        }
        self.init().await?;
        info!("module '{name}' reloaded");
        Ok(())
    }

    /// Snapshot of all registered modules, keyed by name.
    pub fn modules(&self) -> HashMap<String, Arc<ModuleEntry>> {
        self.modules
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect()
    }

    /// Snapshot of the currently enabled modules, keyed by name.
    pub fn enabled_modules(&self) -> HashMap<String, Arc<ModuleEntry>> {
        self.modules
            .iter()
            .filter(|entry| entry.value().is_enabled())
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect()
    }

    /// Snapshot of all registered modules in stable name order.
    pub fn sorted_modules(&self) -> BTreeMap<String, Arc<ModuleEntry>> {
        self.modules
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect()
    }

    /// The module registered under a name, if any.
    pub fn module(&self, name: &str) -> Option<Arc<ModuleEntry>> {
        self.modules.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Forwards a gateway event to every registered module.
    pub fn broadcast(&self, event: &GatewayEvent) {
        for entry in self.snapshot() {
            entry.handle_event(event);
        }
    }

    /// Collects the current entries so callers can invoke module hooks
    /// without holding any registry shard.
    fn snapshot(&self) -> Vec<Arc<ModuleEntry>> {
        self.modules
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    fn register_locked(&self, registration: &ModuleRegistration) -> Result<()> {
        let name = registration.descriptor.meta.name.clone();
        if self.modules.contains_key(&name) {
            debug!("module '{name}' is already registered, dropping duplicate");
            return Ok(());
        }

        let hooks = (registration.factory)()?;
        self.insert_locked(registration.descriptor.clone(), hooks);
        Ok(())
    }

    fn insert_locked(
        &self,
        descriptor: ModuleDescriptor,
        hooks: Arc<dyn BotModule>,
    ) {
        let name = descriptor.meta.name.clone();
        let inserted = match self.modules.entry(name.clone()) {
            Entry::Occupied(_) => {
                debug!("module '{name}' is already registered, dropping duplicate");
                None
            }
            Entry::Vacant(slot) => {
                let entry = Arc::new(ModuleEntry::new(descriptor.meta, hooks));
                slot.insert(Arc::clone(&entry));
                Some(entry)
            }
        };

        if let Some(entry) = inserted {
            info!("registered module '{name}'");
            if descriptor.enabled {
                entry.enable();
            }
        }
    }
}
