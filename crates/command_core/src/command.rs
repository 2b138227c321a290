use std::{fmt, sync::Arc};

use async_trait::async_trait;

use crate::{jig::InteractionSlot, selection::SelectionSet, view::View};

/// A unit of behavior invoked by name.
///
/// Implementations carry no names of their own; the registry binds them in a
/// [`RegisteredCommand`]. Re-invocation should behave like a fresh call.
#[async_trait]
pub trait Command: Send + Sync {
    async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()>;
}

/// Everything a command may touch while it runs.
#[derive(Clone)]
pub struct CommandContext {
    pub view: Arc<dyn View>,
    pub selection: Arc<SelectionSet>,
    pub interaction: Arc<InteractionSlot>,
}

impl CommandContext {
    pub fn new(view: Arc<dyn View>, selection: Arc<SelectionSet>) -> Self {
        Self {
            view,
            selection,
            interaction: Arc::new(InteractionSlot::default()),
        }
    }
}

/// A command bound to the names and group it was registered under.
pub struct RegisteredCommand {
    group: String,
    global_name: String,
    local_name: String,
    handler: Arc<dyn Command>,
}

impl RegisteredCommand {
    pub(crate) fn new(
        group: impl Into<String>,
        global_name: impl Into<String>,
        local_name: impl Into<String>,
        handler: Arc<dyn Command>,
    ) -> Self {
        Self {
            group: group.into(),
            global_name: global_name.into(),
            local_name: local_name.into(),
            handler,
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn global_name(&self) -> &str {
        &self.global_name
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn handler(&self) -> &Arc<dyn Command> {
        &self.handler
    }

    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        self.handler.execute(ctx).await
    }
}

impl fmt::Debug for RegisteredCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCommand")
            .field("group", &self.group)
            .field("global_name", &self.global_name)
            .field("local_name", &self.local_name)
            .finish_non_exhaustive()
    }
}
