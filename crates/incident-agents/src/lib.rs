//! Agent front for automated incident resolution.
//!
//! Builds on the deterministic `coordination` core:
//! - `Agent` — a role, an explicit capability registry, and an append-only
//!   action history shared across incidents
//! - `ActionRecord` — the immutable audit trail of agent invocations
//! - `IssueResolver` — the fixed diagnose → recommend → ticket → decide
//!   pipeline with confidence-gated escalation
//!
//! Capabilities are the only seam to the outside world: ticketing, paging,
//! and diagnostics are host-supplied functions, never direct integrations.

pub mod action;
pub mod agent;
pub mod capability;
pub mod resolver;

pub use action::ActionRecord;
pub use agent::{Agent, AgentError, AgentRole};
pub use capability::Capability;
pub use resolver::{
    AgentTeam, IssueResolution, IssueResolutionPlan, IssueResolver, ResolutionStatus,
    ResolverConfig,
};
