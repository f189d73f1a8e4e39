//! Deterministic coordination core for automated incident resolution.
//!
//! This crate holds everything that must stay predictable and auditable:
//! - Consensus scoring over agent confidences (variance-penalized mean)
//! - Shared incident types: severity, category playbook, issue payload
//! - The workflow state machine and its fail-safe engine
//!
//! No I/O and no async here — anything that talks to the outside world
//! (ticketing, paging, diagnostics) lives behind the capability and handler
//! seams supplied by the host.

pub mod consensus;
pub mod issue;
pub mod workflow;

pub use consensus::ConsensusCalculator;
pub use issue::{IssueCategory, IssueReport, NotificationChannel, Severity};
pub use workflow::{
    is_legal_transition, EngineConfig, StateHandler, StateTransition, WorkflowContext,
    WorkflowEngine, WorkflowError, WorkflowResult, WorkflowState,
};
