//! Core domain concepts shared across all subdomains.
//!
//! - [`participant::Participant`] - an identity contributing to or scoring a phase
//! - [`topic::Topic`] - a validated topic or question driving a run
//! - [`error::DomainError`] - domain-level errors

pub mod error;
pub mod participant;
pub mod topic;
