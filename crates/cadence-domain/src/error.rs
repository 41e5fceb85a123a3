use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid termination: {0}")]
    InvalidTermination(String),
    #[error("Invalid frequency `{0}`: expected a composite offset such as 1y2mo3w4d")]
    InvalidFrequency(String),
}
