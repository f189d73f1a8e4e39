//! Per-incident workflow context, threaded through state handlers.

use serde::{Deserialize, Serialize};

use crate::issue::{IssueCategory, IssueReport, NotificationChannel};

/// Mutable state for one incident's workflow run.
///
/// Created once per incoming incident and owned exclusively by that run —
/// never shared across concurrent executions. Handlers mutate it in place;
/// each recorded transition carries an immutable snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowContext {
    pub issue_id: String,
    pub issue_data: IssueReport,
    /// Category assigned by the detection phase.
    pub category: IssueCategory,
    /// Ordered audit log of what each phase did.
    pub actions_taken: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_eta_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notification_channels: Vec<NotificationChannel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_cause: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommended_actions: Vec<String>,
    pub confidence_score: f64,
    /// Set by any handler to force the run to Escalated.
    pub requires_escalation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl WorkflowContext {
    pub fn new(issue: IssueReport) -> Self {
        Self {
            issue_id: issue.resolved_id(),
            issue_data: issue,
            category: IssueCategory::Unknown,
            actions_taken: Vec::new(),
            ticket_reference: None,
            resolution_eta_minutes: None,
            notification_channels: Vec::new(),
            root_cause: None,
            recommended_actions: Vec::new(),
            confidence_score: 0.0,
            requires_escalation: false,
            error_message: None,
        }
    }

    /// Append an entry to the audit log.
    pub fn record_action(&mut self, action: impl Into<String>) {
        self.actions_taken.push(action.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;

    #[test]
    fn test_new_context_is_clean() {
        let issue = IssueReport::new("video keeps buffering", Severity::Critical);
        let ctx = WorkflowContext::new(issue);
        assert!(ctx.issue_id.starts_with("INC-"));
        assert_eq!(ctx.category, IssueCategory::Unknown);
        assert!(ctx.actions_taken.is_empty());
        assert!(!ctx.requires_escalation);
        assert!(ctx.error_message.is_none());
    }

    #[test]
    fn test_record_action_preserves_order() {
        let mut ctx = WorkflowContext::new(IssueReport::default());
        ctx.record_action("first");
        ctx.record_action("second");
        assert_eq!(ctx.actions_taken, vec!["first", "second"]);
    }

    #[test]
    fn test_context_serde_roundtrip() {
        let mut ctx = WorkflowContext::new(IssueReport::new("latency", Severity::High));
        ctx.ticket_reference = Some("OPS-1".into());
        ctx.confidence_score = 0.82;

        let json = serde_json::to_string(&ctx).unwrap();
        let restored: WorkflowContext = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.ticket_reference.as_deref(), Some("OPS-1"));
        assert!((restored.confidence_score - 0.82).abs() < f64::EPSILON);
    }
}
