use std::path::PathBuf;

use thiserror::Error;

use crate::domain::record::{RecordDraft, RecordId, RecordPatch};

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid command: {details}")]
    InvalidCommand { details: String },
    #[error("Command execution failed: {details}")]
    ExecutionFailed { details: String },
}

#[derive(Debug, Clone)]
pub enum Command {
    Add {
        draft: RecordDraft,
        attachment: Option<PathBuf>,
    },
    List {
        search: Option<String>,
    },
    Update {
        id: RecordId,
        patch: RecordPatch,
    },
    Delete {
        id: RecordId,
    },
    Export {
        output: Option<PathBuf>,
    },
    Replace {
        input: PathBuf,
        confirmed: bool,
    },
    AssignIds,
    HealthCheck,
}

#[async_trait::async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, command: Command) -> error_stack::Result<String, CommandError>;
}
