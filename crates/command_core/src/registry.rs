//! Command stack: an ordered list of named command groups.
//!
//! Names are unique inside a group but may repeat across groups; lookups scan
//! the stack front to back and the first group holding the name wins. The
//! system group always sits at position 0 and the user group at position 1.
//! Any other group is appended when first used.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::{
    command::{Command, RegisteredCommand},
    error::RegistryError,
};

pub const SYSTEM_GROUP: &str = "ACAD";
pub const USER_GROUP: &str = "USER";

#[derive(Debug)]
pub struct CommandGroup {
    name: String,
    by_global: IndexMap<String, Arc<RegisteredCommand>>,
    by_local: IndexMap<String, Arc<RegisteredCommand>>,
}

impl CommandGroup {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            by_global: IndexMap::new(),
            by_local: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.by_global.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_global.is_empty()
    }

    pub fn global(&self, name: &str) -> Option<&Arc<RegisteredCommand>> {
        self.by_global.get(name)
    }

    pub fn local(&self, name: &str) -> Option<&Arc<RegisteredCommand>> {
        self.by_local.get(name)
    }

    fn check_free(&self, global_name: &str, local_name: &str) -> Result<(), RegistryError> {
        if self.by_global.contains_key(global_name) {
            return Err(RegistryError::DuplicateGlobalName {
                group: self.name.clone(),
                name: global_name.to_string(),
            });
        }
        if self.by_local.contains_key(local_name) {
            return Err(RegistryError::DuplicateLocalName {
                group: self.name.clone(),
                name: local_name.to_string(),
            });
        }
        Ok(())
    }

    fn insert(&mut self, command: Arc<RegisteredCommand>) {
        self.by_global
            .insert(command.global_name().to_string(), Arc::clone(&command));
        self.by_local
            .insert(command.local_name().to_string(), command);
    }

    fn remove(&mut self, global_name: &str) -> Option<Arc<RegisteredCommand>> {
        let removed = self.by_global.shift_remove(global_name)?;
        self.by_local.shift_remove(removed.local_name());
        Some(removed)
    }
}

#[derive(Debug)]
pub struct CommandRegistry {
    groups: Vec<CommandGroup>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            groups: vec![CommandGroup::new(SYSTEM_GROUP), CommandGroup::new(USER_GROUP)],
        }
    }

    /// Registers `command` in `group`, creating the group at the end of the
    /// stack if needed. An empty `local_name` falls back to `global_name`; an
    /// empty `group` means the user group. Nothing changes on error.
    pub fn add_command(
        &mut self,
        group: &str,
        global_name: &str,
        local_name: &str,
        command: Arc<dyn Command>,
    ) -> Result<Arc<RegisteredCommand>, RegistryError> {
        if global_name.is_empty() {
            return Err(RegistryError::EmptyGlobalName);
        }
        let group = if group.is_empty() { USER_GROUP } else { group };
        let local_name = if local_name.is_empty() {
            global_name
        } else {
            local_name
        };

        let index = match self.position(group) {
            Some(index) => {
                self.groups[index].check_free(global_name, local_name)?;
                index
            }
            None => {
                self.groups.push(CommandGroup::new(group));
                info!(group, "created command group");
                self.groups.len() - 1
            }
        };

        let registered = Arc::new(RegisteredCommand::new(
            group,
            global_name,
            local_name,
            command,
        ));
        self.groups[index].insert(Arc::clone(&registered));
        debug!(group, global = global_name, local = local_name, "registered command");
        Ok(registered)
    }

    pub fn lookup_global(&self, name: &str) -> Option<Arc<RegisteredCommand>> {
        self.groups
            .iter()
            .find_map(|group| group.global(name))
            .cloned()
    }

    pub fn lookup_local(&self, name: &str) -> Option<Arc<RegisteredCommand>> {
        self.groups
            .iter()
            .find_map(|group| group.local(name))
            .cloned()
    }

    /// Removes the command registered under `global_name` in `group`, along
    /// with its local name.
    pub fn remove_command(&mut self, group: &str, global_name: &str) -> bool {
        let Some(index) = self.position(group) else {
            return false;
        };
        match self.groups[index].remove(global_name) {
            Some(removed) => {
                debug!(
                    group,
                    global = global_name,
                    local = removed.local_name(),
                    "removed command"
                );
                true
            }
            None => false,
        }
    }

    /// Drops a whole group. The system and user groups are permanent and are
    /// never removed.
    pub fn remove_group(&mut self, group: &str) -> bool {
        if group == SYSTEM_GROUP || group == USER_GROUP {
            return false;
        }
        let Some(index) = self.position(group) else {
            return false;
        };
        let removed = self.groups.remove(index);
        info!(group, commands = removed.len(), "removed command group");
        true
    }

    pub fn group(&self, name: &str) -> Option<&CommandGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub fn contains_group(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|group| group.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(CommandGroup::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(CommandGroup::is_empty)
    }

    /// Every `(command, group name)` pair, in stack order and then
    /// registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<RegisteredCommand>, &str)> + '_ {
        self.groups.iter().flat_map(|group| {
            group
                .by_global
                .values()
                .map(move |command| (command, group.name.as_str()))
        })
    }

    fn position(&self, group: &str) -> Option<usize> {
        self.groups.iter().position(|existing| existing.name == group)
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
