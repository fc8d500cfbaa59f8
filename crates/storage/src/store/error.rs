#![forbid(unsafe_code)]

use rl_core::state::{StepState, TransitionError};

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    InvalidInput(&'static str),
    UnknownProject,
    StepNotFound,
    AlertNotFound,
    WorkflowAlreadyInitialized,
    WorkflowComplete,
    StepAlreadyCompleted,
    IllegalTransition {
        from: StepState,
        to: StepState,
    },
    AssigneeRequired,
    RevisionMismatch {
        expected: i64,
        actual: i64,
    },
    NoActiveTemplate,
    PhaseIncomplete {
        remaining: usize,
    },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::UnknownProject => write!(f, "unknown project"),
            Self::StepNotFound => write!(f, "step not found"),
            Self::AlertNotFound => write!(f, "alert not found"),
            Self::WorkflowAlreadyInitialized => {
                write!(f, "project already has a workflow instance")
            }
            Self::WorkflowComplete => write!(f, "workflow is already complete"),
            Self::StepAlreadyCompleted => write!(f, "step already completed"),
            Self::IllegalTransition { from, to } => {
                write!(f, "invalid transition: {} -> {}", from.as_str(), to.as_str())
            }
            Self::AssigneeRequired => {
                write!(f, "transition to IN_PROGRESS requires an assignee")
            }
            Self::RevisionMismatch { expected, actual } => {
                write!(
                    f,
                    "revision mismatch (expected={expected}, actual={actual})"
                )
            }
            Self::NoActiveTemplate => write!(f, "no active template"),
            Self::PhaseIncomplete { remaining } => {
                write!(f, "phase incomplete ({remaining} steps remaining)")
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}

impl From<TransitionError> for StoreError {
    fn from(value: TransitionError) -> Self {
        match value {
            TransitionError::Illegal { from, to } => Self::IllegalTransition { from, to },
            TransitionError::AssigneeRequired => Self::AssigneeRequired,
        }
    }
}
