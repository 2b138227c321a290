use std::sync::Arc;

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

use crate::{
    builtins::{register_builtin_commands, CommandSettings},
    command::{CommandContext, RegisteredCommand},
    error::{ExecuteError, RegistryError},
    registry::CommandRegistry,
    selection::SelectionSet,
    view::View,
};

/// Application context: the command registry plus the state commands run
/// against. One per open view.
pub struct Editor {
    registry: RwLock<CommandRegistry>,
    context: CommandContext,
    running: Mutex<Option<String>>,
}

impl Editor {
    pub fn new(view: Arc<dyn View>) -> Self {
        Self {
            registry: RwLock::new(CommandRegistry::new()),
            context: CommandContext::new(view, Arc::new(SelectionSet::new())),
            running: Mutex::new(None),
        }
    }

    pub fn with_builtins(
        view: Arc<dyn View>,
        settings: &CommandSettings,
    ) -> Result<Self, RegistryError> {
        let editor = Self::new(view);
        register_builtin_commands(&mut editor.registry.write(), settings)?;
        Ok(editor)
    }

    pub fn context(&self) -> &CommandContext {
        &self.context
    }

    pub fn selection(&self) -> &Arc<SelectionSet> {
        &self.context.selection
    }

    pub fn registry(&self) -> RwLockReadGuard<'_, CommandRegistry> {
        self.registry.read()
    }

    pub fn registry_mut(&self) -> RwLockWriteGuard<'_, CommandRegistry> {
        self.registry.write()
    }

    /// Local names first, then global names.
    pub fn resolve(&self, name: &str) -> Option<Arc<RegisteredCommand>> {
        let registry = self.registry.read();
        registry
            .lookup_local(name)
            .or_else(|| registry.lookup_global(name))
    }

    pub fn active_command(&self) -> Option<String> {
        self.running.lock().clone()
    }

    pub async fn execute(&self, name: &str) -> Result<(), ExecuteError> {
        let command = self
            .resolve(name)
            .ok_or_else(|| ExecuteError::UnknownCommand(name.to_string()))?;
        let _running = self.begin(command.global_name())?;

        info!(
            command = command.global_name(),
            group = command.group(),
            "executing command"
        );
        command
            .execute(&self.context)
            .await
            .map_err(|source| ExecuteError::Failed {
                name: command.global_name().to_string(),
                source,
            })?;
        debug!(command = command.global_name(), "command finished");
        Ok(())
    }

    /// Rejects the active jig, if one is running.
    pub fn cancel_active(&self, reason: &str) -> bool {
        let cancelled = self.context.interaction.cancel(reason);
        if !cancelled {
            debug!(reason, "no active jig to cancel");
        }
        cancelled
    }

    fn begin(&self, name: &str) -> Result<RunningGuard<'_>, ExecuteError> {
        let mut running = self.running.lock();
        if let Some(active) = running.as_ref() {
            warn!(active = %active, requested = name, "command rejected while another runs");
            return Err(ExecuteError::Busy {
                active: active.clone(),
            });
        }
        *running = Some(name.to_string());
        Ok(RunningGuard {
            running: &self.running,
        })
    }
}

struct RunningGuard<'a> {
    running: &'a Mutex<Option<String>>,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.running.lock().take();
    }
}

#[cfg(test)]
#[path = "tests/editor_tests.rs"]
mod tests;
