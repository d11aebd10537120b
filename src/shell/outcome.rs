//! Dispatch results

use std::any::Any;
use std::fmt;
use thiserror::Error;

use crate::error::Error;

/// A handler failure caught by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct HandlerFault {
    /// Short name of the failure, such as `IoError` or `Panic`
    pub kind: String,
    /// Failure message, including its cause chain
    pub message: String,
    /// Request text that triggered the failure
    pub request: String,
}

impl HandlerFault {
    /// Classify an error returned by a handler
    pub fn from_error(error: &anyhow::Error, request: &str) -> Self {
        let kind = if let Some(err) = error.downcast_ref::<Error>() {
            err.kind()
        } else if error.downcast_ref::<std::io::Error>().is_some() {
            "IoError"
        } else {
            "Error"
        };

        Self {
            kind: kind.to_string(),
            message: format!("{:#}", error),
            request: request.to_string(),
        }
    }

    /// Classify a panic payload caught while running a handler
    pub fn from_panic(payload: &(dyn Any + Send), request: &str) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "handler panicked".to_string()
        };

        Self {
            kind: "Panic".to_string(),
            message,
            request: request.to_string(),
        }
    }
}

/// Why a request never reached a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Primary and alternate workers were all busy
    NoThreadAvailable,
    /// No instance of the requested shell type is on the stack
    NoShellInstance,
    /// The operating system refused a new worker thread
    ThreadSpawnFailed,
}

/// What happened to one dispatched request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Blank input; nothing was done
    Empty,
    /// No command by that name in the shell
    NotFound,
    /// Refused by the access policy
    Denied,
    /// Required arguments were missing; usage was printed instead
    UsageShown,
    /// Handler returned normally
    Completed { exit_code: i32 },
    /// Handler was cancelled
    Cancelled,
    /// Handler failed or panicked
    Faulted(HandlerFault),
    /// Request was dropped before execution
    Rejected(RejectReason),
}

impl DispatchOutcome {
    /// Whether the handler ran to completion
    pub fn is_completed(&self) -> bool {
        matches!(self, DispatchOutcome::Completed { .. })
    }

    /// Exit code of a completed handler
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            DispatchOutcome::Completed { exit_code } => Some(*exit_code),
            _ => None,
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::Empty => write!(f, "empty"),
            DispatchOutcome::NotFound => write!(f, "not found"),
            DispatchOutcome::Denied => write!(f, "denied"),
            DispatchOutcome::UsageShown => write!(f, "usage shown"),
            DispatchOutcome::Completed { exit_code } => write!(f, "completed ({})", exit_code),
            DispatchOutcome::Cancelled => write!(f, "cancelled"),
            DispatchOutcome::Faulted(fault) => write!(f, "faulted ({})", fault),
            DispatchOutcome::Rejected(reason) => write!(f, "rejected ({:?})", reason),
        }
    }
}
