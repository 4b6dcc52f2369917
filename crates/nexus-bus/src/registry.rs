/// Module registry: the canonical `module_id -> descriptor` map.
///
/// Grounded on `src/core/nn_module_registry.c` / `include/nn_module_registry.h`,
/// which carried two overlapping registries (`nn_module_*` and
/// `nn_dev_module_*`); this crate keeps only one top-level registry.
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::BusError;
use crate::mailbox::Mailbox;

/// A registered module's static identity and lifecycle hooks.
pub struct ModuleDescriptor {
    pub module_id: u32,
    pub name: String,
    pub mailbox: Mailbox,
    pub init: Box<dyn Fn() -> i32 + Send + Sync>,
    pub cleanup: Box<dyn Fn() + Send + Sync>,
}

impl std::fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("module_id", &self.module_id)
            .field("name", &self.name)
            .finish()
    }
}

/// Ordered by `module_id` to give deterministic init/shutdown order.
///
/// Populated once at startup; read-only after `init_all` returns.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<u32, Arc<ModuleDescriptor>>,
}

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module. Duplicate `module_id` is a `ConfigError`-class
    /// failure: the caller should abort the process.
    pub fn register(
        &mut self,
        module_id: u32,
        name: impl Into<String>,
        init: impl Fn() -> i32 + Send + Sync + 'static,
        cleanup: impl Fn() + Send + Sync + 'static,
    ) -> Result<Mailbox, BusError> {
        if self.modules.contains_key(&module_id) {
            return Err(BusError::DuplicateModule(module_id));
        }
        let mailbox = Mailbox::create();
        self.modules.insert(
            module_id,
            Arc::new(ModuleDescriptor {
                module_id,
                name: name.into(),
                mailbox: mailbox.clone(),
                init: Box::new(init),
                cleanup: Box::new(cleanup),
            }),
        );
        Ok(mailbox)
    }

    pub fn get(&self, module_id: u32) -> Option<Arc<ModuleDescriptor>> {
        self.modules.get(&module_id).cloned()
    }

    pub fn get_name(&self, module_id: u32) -> String {
        self.modules
            .get(&module_id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Iterates ascending by `module_id`, calling every module's `init`.
    /// A non-zero return is counted but does not abort the process.
    pub fn init_all(&self) -> usize {
        let mut failures = 0;
        for (id, module) in &self.modules {
            let rc = (module.init)();
            if rc != 0 {
                tracing::warn!(module_id = id, rc, "module init returned non-zero");
                failures += 1;
            } else {
                tracing::debug!(module_id = id, name = %module.name, "module initialized");
            }
        }
        failures
    }

    /// Iterates ascending by `module_id`, calling `cleanup` then destroying
    /// the mailbox — cleanup happens-after the module stops receiving.
    pub fn cleanup_all(&self) {
        for (id, module) in &self.modules {
            (module.cleanup)();
            module.mailbox.destroy();
            tracing::debug!(module_id = id, name = %module.name, "module cleaned up");
        }
    }

    pub fn module_ids(&self) -> Vec<u32> {
        self.modules.keys().copied().collect()
    }
}

pub fn request_shutdown() {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

pub fn shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn duplicate_module_id_rejected() {
        let mut reg = ModuleRegistry::new();
        reg.register(1, "cfg", || 0, || {}).unwrap();
        let err = reg.register(1, "other", || 0, || {}).unwrap_err();
        assert!(matches!(err, BusError::DuplicateModule(1)));
    }

    #[test]
    fn unknown_name_is_unknown() {
        let reg = ModuleRegistry::new();
        assert_eq!(reg.get_name(99), "unknown");
    }

    #[test]
    fn init_all_ascending_order() {
        let mut reg = ModuleRegistry::new();
        let order = Arc::new(Mutex_::new(Vec::new()));
        for id in [3u32, 1, 2] {
            let order = order.clone();
            reg.register(id, format!("m{id}"), move || {
                order.lock().unwrap().push(id);
                0
            }, || {})
                .unwrap();
        }
        reg.init_all();
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn init_all_counts_failures_without_aborting() {
        let mut reg = ModuleRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let c1 = calls.clone();
        reg.register(1, "a", move || {
            c1.fetch_add(1, Ordering::SeqCst);
            1
        }, || {})
            .unwrap();
        let c2 = calls.clone();
        reg.register(2, "b", move || {
            c2.fetch_add(1, Ordering::SeqCst);
            0
        }, || {})
            .unwrap();
        let failures = reg.init_all();
        assert_eq!(failures, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    use std::sync::Mutex as Mutex_;
}
