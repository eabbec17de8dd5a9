//! Turning a polled handle into a command outcome.

use serde::Serialize;

use crate::config::WaitBudget;
use crate::error::{Error, ErrorKind, Result};
use crate::operation::{OperationHandle, OperationStatus};

/// Exit code for a partially successful operation.
pub const PARTIAL_SUCCESS_EXIT_CODE: i32 = 68;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Classification {
    Success,
    PartialSuccess,
    Failure,
    Timeout,
}

impl Classification {
    pub fn exit_code(self) -> i32 {
        match self {
            Classification::Success => 0,
            Classification::PartialSuccess => PARTIAL_SUCCESS_EXIT_CODE,
            Classification::Failure | Classification::Timeout => 1,
        }
    }
}

pub fn classify(handle: &OperationHandle) -> Classification {
    match handle.status {
        OperationStatus::Queued | OperationStatus::InProgress => Classification::Timeout,
        OperationStatus::Succeeded => Classification::Success,
        OperationStatus::SucceededPartial => Classification::PartialSuccess,
        OperationStatus::Failed | OperationStatus::Canceled => Classification::Failure,
    }
}

/// A finished command: what happened and the handle it happened to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub classification: Classification,
    pub handle: OperationHandle,
}

impl CommandOutcome {
    pub fn exit_code(&self) -> i32 {
        self.classification.exit_code()
    }
}

/// Timeouts become errors carrying the wait minutes and the handle; every
/// other class is returned for the formatter.
pub fn conclude(handle: OperationHandle, wait: WaitBudget) -> Result<CommandOutcome> {
    match classify(&handle) {
        Classification::Timeout => Err(Error::new(ErrorKind::Timeout {
            minutes: wait.minutes(),
            handle: Box::new(handle),
        })),
        classification => Ok(CommandOutcome {
            classification,
            handle,
        }),
    }
}
