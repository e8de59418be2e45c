//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("No participants configured")]
    NoParticipants,

    #[error("Duplicate participant id: {0}")]
    DuplicateParticipant(String),

    #[error("Invalid participant: {0}")]
    InvalidParticipant(String),

    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("Invalid tier transition: {0}")]
    InvalidTier(String),
}
