//! Command registry, selection set and the interactive jig protocol of the
//! CAD viewer.

pub mod builtins;
pub mod command;
pub mod editor;
pub mod error;
pub mod jig;
pub mod registry;
pub mod selection;
pub mod view;

pub use builtins::{register_builtin_commands, CommandSettings};
pub use command::{Command, CommandContext, RegisteredCommand};
pub use editor::Editor;
pub use error::{ExecuteError, JigError, RegistryError};
pub use jig::{InteractionSlot, Jig, JigBehavior, JigCanceller, JigLoop, JigState};
pub use registry::{CommandGroup, CommandRegistry, SYSTEM_GROUP, USER_GROUP};
pub use selection::SelectionSet;
pub use view::View;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
