use serde::{Deserialize, Serialize};

use crate::{
    domain::{CursorKind, EntityId, InteractionMode, Rect},
    error::CommandFailure,
};

/// Payload of a selection notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionChange {
    pub ids: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSummary {
    pub group: String,
    pub global_name: String,
    pub local_name: String,
}

/// Events a viewer host emits to whoever is driving it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ViewerEvent {
    ModeChanged {
        mode: InteractionMode,
    },
    CursorChanged {
        cursor: CursorKind,
    },
    ZoomedTo {
        rect: Rect,
        margin: f64,
    },
    ZoomedToExtents,
    SelectionAdded(SelectionChange),
    SelectionRemoved(SelectionChange),
    Selection {
        ids: Vec<EntityId>,
    },
    CommandFinished {
        name: String,
    },
    CommandFailed {
        name: String,
        error: CommandFailure,
    },
    Commands {
        commands: Vec<CommandSummary>,
    },
}
