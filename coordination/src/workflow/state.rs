//! Workflow states and the legal transition graph.
//!
//! The graph is forward-only: Init → Detecting → Analyzing → CreatingTicket
//! → Notifying → Monitoring → Resolved, with two global overrides — any
//! non-terminal state may jump to Escalated or Failed. Once a terminal state
//! is reached no further transitions occur.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflow::context::WorkflowContext;

/// The set of workflow states for one incident run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// Run created, nothing executed yet.
    Init,
    /// Classifying the incident and scoring detection confidence.
    Detecting,
    /// Deriving root cause and remediation from the category playbook.
    Analyzing,
    /// Assigning a ticket reference for the audit trail.
    CreatingTicket,
    /// Selecting notification channels by severity.
    Notifying,
    /// Assigning a resolution ETA and confirming remediation.
    Monitoring,
    /// Incident auto-resolved — terminal.
    Resolved,
    /// Routed to a human — terminal.
    Escalated,
    /// A handler failed or was missing — terminal.
    Failed,
}

impl WorkflowState {
    /// Whether this is a terminal state (no handler runs again).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Escalated | Self::Failed)
    }

    /// The state that follows this one on the happy path.
    pub fn next_on_success(self) -> Option<Self> {
        match self {
            Self::Init => Some(Self::Detecting),
            Self::Detecting => Some(Self::Analyzing),
            Self::Analyzing => Some(Self::CreatingTicket),
            Self::CreatingTicket => Some(Self::Notifying),
            Self::Notifying => Some(Self::Monitoring),
            Self::Monitoring => Some(Self::Resolved),
            Self::Resolved | Self::Escalated | Self::Failed => None,
        }
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Detecting => write!(f, "detecting"),
            Self::Analyzing => write!(f, "analyzing"),
            Self::CreatingTicket => write!(f, "creating_ticket"),
            Self::Notifying => write!(f, "notifying"),
            Self::Monitoring => write!(f, "monitoring"),
            Self::Resolved => write!(f, "resolved"),
            Self::Escalated => write!(f, "escalated"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Whether `from → to` is a legal edge in the transition graph.
pub fn is_legal_transition(from: WorkflowState, to: WorkflowState) -> bool {
    if from.is_terminal() {
        return false;
    }
    // Global overrides: any non-terminal state may escalate or fail.
    if to == WorkflowState::Escalated || to == WorkflowState::Failed {
        return true;
    }
    from.next_on_success() == Some(to)
}

/// A single recorded state transition. Immutable once created; the
/// transition log is append-only and never reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from_state: WorkflowState,
    pub to_state: WorkflowState,
    pub timestamp: DateTime<Utc>,
    /// What caused the transition (`detecting_complete`,
    /// `escalation_override`, `handler_error`, ...).
    pub trigger: String,
    /// Copy of the workflow context at the moment of transition.
    pub context_snapshot: WorkflowContext,
}

#[cfg(test)]
mod tests {
    use super::*;
    use WorkflowState::*;

    const ALL: [WorkflowState; 9] = [
        Init,
        Detecting,
        Analyzing,
        CreatingTicket,
        Notifying,
        Monitoring,
        Resolved,
        Escalated,
        Failed,
    ];

    #[test]
    fn test_forward_chain_is_legal() {
        assert!(is_legal_transition(Init, Detecting));
        assert!(is_legal_transition(Detecting, Analyzing));
        assert!(is_legal_transition(Analyzing, CreatingTicket));
        assert!(is_legal_transition(CreatingTicket, Notifying));
        assert!(is_legal_transition(Notifying, Monitoring));
        assert!(is_legal_transition(Monitoring, Resolved));
    }

    #[test]
    fn test_skips_and_backward_edges_are_illegal() {
        assert!(!is_legal_transition(Init, Analyzing));
        assert!(!is_legal_transition(Detecting, Monitoring));
        assert!(!is_legal_transition(Monitoring, Detecting));
        assert!(!is_legal_transition(Analyzing, Init));
    }

    #[test]
    fn test_global_overrides_from_any_non_terminal() {
        for state in ALL.iter().filter(|s| !s.is_terminal()) {
            assert!(is_legal_transition(*state, Escalated), "from {state}");
            assert!(is_legal_transition(*state, Failed), "from {state}");
        }
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for from in [Resolved, Escalated, Failed] {
            for to in ALL {
                assert!(!is_legal_transition(from, to), "{from} → {to}");
            }
        }
    }

    #[test]
    fn test_terminal_flags() {
        assert!(Resolved.is_terminal());
        assert!(Escalated.is_terminal());
        assert!(Failed.is_terminal());
        assert!(!Monitoring.is_terminal());
    }

    #[test]
    fn test_state_serde_strings() {
        assert_eq!(
            serde_json::to_string(&CreatingTicket).unwrap(),
            "\"creating_ticket\""
        );
        assert_eq!(serde_json::to_string(&Escalated).unwrap(), "\"escalated\"");
        let parsed: WorkflowState = serde_json::from_str("\"monitoring\"").unwrap();
        assert_eq!(parsed, Monitoring);
    }

    #[test]
    fn test_display_matches_serde() {
        for state in ALL {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{state}\""));
        }
    }
}
