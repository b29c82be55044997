use thiserror::Error;

/// Fatal distillation errors. Per-rule load failures are deliberately not
/// represented here: a missing or malformed rule blob only removes that rule
/// from the step set and never aborts a run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DistillError {
    #[error("trace contains no init marker (EXECINIT/REACHINIT)")]
    MissingInit,

    #[error("frontier did not terminate within {0} iterations (non-step cycle?)")]
    NonTerminatingFrontier(usize),
}
