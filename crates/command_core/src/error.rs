use shared::error::{CommandFailure, ErrorCode};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("global command name must not be empty")]
    EmptyGlobalName,
    #[error("command '{name}' already registered in group '{group}' as a global name")]
    DuplicateGlobalName { group: String, name: String },
    #[error("command '{name}' already registered in group '{group}' as a local name")]
    DuplicateLocalName { group: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JigError {
    #[error("jig rejected: {0}")]
    Rejected(String),
    #[error("jig sampler failed: {0}")]
    Sampler(String),
    #[error("jig outcome already consumed")]
    Spent,
}

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("command '{active}' is still active")]
    Busy { active: String },
    #[error("command '{name}' failed: {source:#}")]
    Failed {
        name: String,
        source: anyhow::Error,
    },
}

impl ExecuteError {
    /// True when the command ended because its jig was rejected.
    pub fn is_cancellation(&self) -> bool {
        match self {
            Self::Failed { source, .. } => {
                matches!(source.downcast_ref::<JigError>(), Some(JigError::Rejected(_)))
            }
            _ => false,
        }
    }
}

impl From<&ExecuteError> for CommandFailure {
    fn from(value: &ExecuteError) -> Self {
        let code = match value {
            ExecuteError::UnknownCommand(_) => ErrorCode::UnknownCommand,
            ExecuteError::Busy { .. } => ErrorCode::Busy,
            ExecuteError::Failed { .. } if value.is_cancellation() => ErrorCode::Cancelled,
            ExecuteError::Failed { .. } => ErrorCode::Internal,
        };
        CommandFailure::new(code, value.to_string())
    }
}
