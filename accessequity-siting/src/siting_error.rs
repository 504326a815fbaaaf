use accessequity_metrics::InequalityError;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SitingError {
    #[error("failure evaluating objective: {0}")]
    Metric(#[from] InequalityError),
    #[error("unit '{0}' appears more than once in the baseline distances")]
    DuplicateUnit(String),
    #[error("invalid distance record: {0}")]
    InvalidRecord(String),
    #[error("candidate '{0}' not found in candidate matrix")]
    UnknownCandidate(String),
    #[error("invalid siting configuration: {0}")]
    InvalidConfig(String),
    #[error("{0}")]
    InternalError(String),
}
