use lp_core::{LoadId, LoadPlanId, OperationId, OperationPlanId, ResourceId};
use lp_timeline::TimelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    /// A start record without its end (or the reverse).  The pairing
    /// invariant was broken elsewhere; the operation is aborted.
    #[error("no matching sibling for load plan {0}")]
    SiblingNotFound(LoadPlanId),

    /// Any other broken structural invariant.
    #[error("plan store corrupt: {0}")]
    Corrupt(String),

    /// Rejected before any mutation; the caller can retry with valid input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("load plan {0} not found")]
    UnknownLoadPlan(LoadPlanId),

    #[error("operation plan {0} not found")]
    UnknownOperationPlan(OperationPlanId),

    #[error("resource {0} not found")]
    UnknownResource(ResourceId),

    #[error("load {0} not found")]
    UnknownLoad(LoadId),

    #[error("operation {0} not found")]
    UnknownOperation(OperationId),

    #[error("timeline error: {0}")]
    Timeline(#[from] TimelineError),

    #[error("model parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlanError {
    /// `true` for internal-consistency failures, which callers must treat as
    /// fatal rather than retry.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            PlanError::SiblingNotFound(_) | PlanError::Corrupt(_) | PlanError::Timeline(_)
        )
    }
}

pub type PlanResult<T> = Result<T, PlanError>;
