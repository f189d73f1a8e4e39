//! Action records — the immutable audit trail of agent invocations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::AgentRole;

/// One agent invocation, as it happened. Immutable once created; histories
/// only ever append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    pub agent_role: AgentRole,
    pub action_type: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    /// Caller-judged reliability of this action, clamped to [0, 1].
    pub confidence: f64,
    /// Capability output, or `None` when no capability was registered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl ActionRecord {
    pub fn new(
        agent_role: AgentRole,
        action_type: impl Into<String>,
        description: impl Into<String>,
        confidence: f64,
        result: Option<Value>,
    ) -> Self {
        Self {
            agent_role,
            action_type: action_type.into(),
            description: description.into(),
            timestamp: Utc::now(),
            confidence: confidence.clamp(0.0, 1.0),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_confidence_is_clamped() {
        let high = ActionRecord::new(AgentRole::Analyzer, "analyze_logs", "x", 1.4, None);
        assert_eq!(high.confidence, 1.0);
        let low = ActionRecord::new(AgentRole::Analyzer, "analyze_logs", "x", -0.2, None);
        assert_eq!(low.confidence, 0.0);
    }

    #[test]
    fn test_serde_roundtrip() {
        let record = ActionRecord::new(
            AgentRole::StreamingExpert,
            "diagnose_qoe",
            "diagnosed playback quality",
            0.9,
            Some(json!({"rebuffer_ratio": 0.31})),
        );
        let json = serde_json::to_string(&record).unwrap();
        let restored: ActionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.agent_role, AgentRole::StreamingExpert);
        assert_eq!(restored.action_type, "diagnose_qoe");
        assert_eq!(restored.result.unwrap()["rebuffer_ratio"], json!(0.31));
    }

    #[test]
    fn test_missing_result_omitted_from_json() {
        let record = ActionRecord::new(AgentRole::Coordinator, "escalate", "x", 1.0, None);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("result").is_none());
    }
}
