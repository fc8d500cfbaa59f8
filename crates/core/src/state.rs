#![forbid(unsafe_code)]

//! Step and workflow state machines. `check_transition` is the only
//! legality authority; nothing else may decide whether a state change is
//! allowed.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepState {
    Pending,
    Active,
    InProgress,
    Blocked,
    Skipped,
    Completed,
}

impl StepState {
    pub fn as_str(self) -> &'static str {
        match self {
            StepState::Pending => "PENDING",
            StepState::Active => "ACTIVE",
            StepState::InProgress => "IN_PROGRESS",
            StepState::Blocked => "BLOCKED",
            StepState::Skipped => "SKIPPED",
            StepState::Completed => "COMPLETED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "PENDING" => Some(StepState::Pending),
            "ACTIVE" => Some(StepState::Active),
            "IN_PROGRESS" => Some(StepState::InProgress),
            "BLOCKED" => Some(StepState::Blocked),
            "SKIPPED" => Some(StepState::Skipped),
            "COMPLETED" => Some(StepState::Completed),
            _ => None,
        }
    }

    /// A step in this state is the one the tracker points at.
    pub fn is_current(self) -> bool {
        matches!(self, StepState::Active | StepState::InProgress)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkflowStatus {
    InProgress,
    Complete,
}

impl WorkflowStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStatus::InProgress => "IN_PROGRESS",
            WorkflowStatus::Complete => "COMPLETE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "IN_PROGRESS" => Some(WorkflowStatus::InProgress),
            "COMPLETE" => Some(WorkflowStatus::Complete),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionError {
    Illegal { from: StepState, to: StepState },
    AssigneeRequired,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Illegal { from, to } => {
                write!(f, "invalid transition: {} -> {}", from.as_str(), to.as_str())
            }
            Self::AssigneeRequired => {
                write!(f, "transition to IN_PROGRESS requires an assignee")
            }
        }
    }
}

impl std::error::Error for TransitionError {}

pub fn can_transition(from: StepState, to: StepState) -> bool {
    use StepState::*;
    matches!(
        (from, to),
        (Pending, Active)
            | (Pending, Skipped)
            | (Active, InProgress)
            | (Active, Skipped)
            | (InProgress, Completed)
            | (InProgress, Blocked)
            | (Blocked, Active)
            | (Blocked, InProgress)
            | (Skipped, Active)
            | (Completed, Active)
    )
}

/// Validates a requested transition against the step's true current state.
pub fn check_transition(
    from: StepState,
    to: StepState,
    has_assignee: bool,
) -> Result<(), TransitionError> {
    if !can_transition(from, to) {
        return Err(TransitionError::Illegal { from, to });
    }
    if to == StepState::InProgress && !has_assignee {
        return Err(TransitionError::AssigneeRequired);
    }
    Ok(())
}

/// Completion events fold the ACTIVE -> IN_PROGRESS hop into the completing
/// actor's call: a step may be completed from ACTIVE or IN_PROGRESS. Every
/// other source state fails naming the true pair.
pub fn check_completion(from: StepState) -> Result<(), TransitionError> {
    match from {
        StepState::Active | StepState::InProgress => Ok(()),
        other => Err(TransitionError::Illegal {
            from: other,
            to: StepState::Completed,
        }),
    }
}
