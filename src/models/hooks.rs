//! Lifecycle notifications fired by the employee model.
//!
//! Hooks observe; they get the in-flight record by shared reference and
//! have no way to alter it or the outcome of the operation.

use std::sync::Arc;
use uuid::Uuid;

use crate::models::employee::{Employee, EmployeeChanges, NewEmployee};

#[derive(Debug, Clone, Copy)]
pub enum LifecycleEvent<'a> {
    /// A record was materialized from storage.
    Initialized(&'a Employee),
    /// A create candidate passed validation and is about to be written.
    Validated(&'a NewEmployee),
    /// A partial update passed validation and is about to be written.
    ChangesValidated(Uuid, &'a EmployeeChanges),
    Saved(&'a Employee),
    Removed(&'a Employee),
}

impl LifecycleEvent<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Initialized(_) => "init",
            LifecycleEvent::Validated(_) | LifecycleEvent::ChangesValidated(..) => "validate",
            LifecycleEvent::Saved(_) => "save",
            LifecycleEvent::Removed(_) => "remove",
        }
    }
}

pub trait LifecycleHook: Send + Sync {
    fn on_event(&self, event: &LifecycleEvent<'_>);
}

impl<F> LifecycleHook for F
where
    F: Fn(&LifecycleEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &LifecycleEvent<'_>) {
        self(event)
    }
}

/// Logs every notification through the `log` facade.
pub struct LogHook;

impl LifecycleHook for LogHook {
    fn on_event(&self, event: &LifecycleEvent<'_>) {
        match event {
            LifecycleEvent::Initialized(employee) => {
                log::info!("{} has been initialized from the db", employee.id)
            }
            LifecycleEvent::Validated(candidate) => {
                log::info!("{} has been validated (but not saved yet)", candidate.email)
            }
            LifecycleEvent::ChangesValidated(id, _) => {
                log::info!("{} has been validated (but not saved yet)", id)
            }
            LifecycleEvent::Saved(employee) => log::info!("{} has been saved", employee.id),
            LifecycleEvent::Removed(employee) => log::info!("{} has been removed", employee.id),
        }
    }
}

/// Ordered list of hooks; fired in registration order.
#[derive(Clone, Default)]
pub struct Hooks {
    hooks: Vec<Arc<dyn LifecycleHook>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logging() -> Self {
        Self::new().register(LogHook)
    }

    pub fn register(mut self, hook: impl LifecycleHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn fire(&self, event: LifecycleEvent<'_>) {
        for hook in &self.hooks {
            hook.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee::sample_employee;
    use std::sync::Mutex;

    #[test]
    fn hooks_fire_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let first = seen.clone();
        let second = seen.clone();
        let hooks = Hooks::new()
            .register(move |e: &LifecycleEvent<'_>| first.lock().unwrap().push(format!("a:{}", e.name())))
            .register(move |e: &LifecycleEvent<'_>| second.lock().unwrap().push(format!("b:{}", e.name())));

        let employee = sample_employee();
        hooks.fire(LifecycleEvent::Saved(&employee));

        assert_eq!(*seen.lock().unwrap(), vec!["a:save", "b:save"]);
    }

    #[test]
    fn logging_hook_is_registered_by_default() {
        let hooks = Hooks::with_logging();
        assert_eq!(hooks.hooks.len(), 1);
        hooks.fire(LifecycleEvent::Removed(&sample_employee()));
    }
}
