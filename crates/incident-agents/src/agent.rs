//! Agents — roles, capability registries, and append-only action histories.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::ActionRecord;
use crate::capability::Capability;

/// The fixed set of reasoning roles in the resolution pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Log and metric analysis.
    Analyzer,
    /// Ticket lifecycle in the issue tracker.
    JiraSpecialist,
    /// Playback-quality diagnosis and remediation for streaming incidents.
    StreamingExpert,
    /// Cross-agent decisions and human escalation.
    Coordinator,
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Analyzer => write!(f, "analyzer"),
            Self::JiraSpecialist => write!(f, "jira_specialist"),
            Self::StreamingExpert => write!(f, "streaming_expert"),
            Self::Coordinator => write!(f, "coordinator"),
        }
    }
}

/// Errors raised by agent execution.
///
/// A missing capability is deliberately not here: it degrades gracefully to
/// an action record without a result.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A registered capability failed. Fatal for the resolver pipeline —
    /// the whole resolution aborts with no partial plan.
    #[error("agent {role} capability '{action_type}' failed: {source}")]
    CapabilityExecution {
        role: AgentRole,
        action_type: String,
        #[source]
        source: anyhow::Error,
    },
}

/// A long-lived reasoning unit: a role, an explicit capability registry, and
/// an append-only action history.
///
/// Agents are shared across concurrently running incidents; the history
/// mutex is the only shared mutable state in the system. Past records are
/// never mutated or removed.
pub struct Agent {
    role: AgentRole,
    description: String,
    capabilities: HashMap<String, Arc<dyn Capability>>,
    history: Mutex<Vec<ActionRecord>>,
}

impl Agent {
    pub fn new(role: AgentRole, description: impl Into<String>) -> Self {
        Self {
            role,
            description: description.into(),
            capabilities: HashMap::new(),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Register a capability under an action type. Builder-style so teams
    /// wire up agents at construction — no naming-convention lookup.
    pub fn with_capability(
        mut self,
        action_type: impl Into<String>,
        capability: Arc<dyn Capability>,
    ) -> Self {
        self.capabilities.insert(action_type.into(), capability);
        self
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn has_capability(&self, action_type: &str) -> bool {
        self.capabilities.contains_key(action_type)
    }

    /// Execute an action and append it to this agent's history.
    ///
    /// `confidence` is judged by the caller, never self-assessed — the unit
    /// that computes an answer is not the one that rates its reliability.
    /// A missing capability is a data-quality gap, not an error: the action
    /// is still recorded, with no result. A failing capability aborts with
    /// `AgentError::CapabilityExecution` and records nothing.
    pub async fn execute_action(
        &self,
        action_type: &str,
        input: &Map<String, Value>,
        confidence: f64,
    ) -> Result<ActionRecord, AgentError> {
        let record = match self.capabilities.get(action_type) {
            Some(capability) => {
                tracing::debug!(role = %self.role, action_type, "invoking capability");
                let output = capability.invoke(input).await.map_err(|source| {
                    AgentError::CapabilityExecution {
                        role: self.role,
                        action_type: action_type.to_string(),
                        source,
                    }
                })?;
                ActionRecord::new(
                    self.role,
                    action_type,
                    format!("{} executed {action_type}", self.role),
                    confidence,
                    Some(output),
                )
            }
            None => {
                tracing::warn!(
                    role = %self.role,
                    action_type,
                    "no capability registered; recording action without result"
                );
                ActionRecord::new(
                    self.role,
                    action_type,
                    format!(
                        "{} has no capability for {action_type}; action recorded without result",
                        self.role
                    ),
                    confidence,
                    None,
                )
            }
        };

        let mut history = self.history.lock().expect("agent history lock poisoned");
        history.push(record.clone());
        Ok(record)
    }

    /// Snapshot of this agent's history, in append order.
    pub fn history(&self) -> Vec<ActionRecord> {
        self.history
            .lock()
            .expect("agent history lock poisoned")
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn analyzer_with_capability() -> Agent {
        Agent::new(AgentRole::Analyzer, "log analysis").with_capability(
            "analyze_logs",
            Arc::new(|_input: &Map<String, Value>| -> anyhow::Result<Value> {
                Ok(json!({"root_cause": "cache miss storm"}))
            }),
        )
    }

    #[tokio::test]
    async fn test_execute_records_result_and_history() {
        let agent = analyzer_with_capability();
        let record = agent
            .execute_action("analyze_logs", &Map::new(), 0.85)
            .await
            .unwrap();

        assert_eq!(record.agent_role, AgentRole::Analyzer);
        assert_eq!(
            record.result.as_ref().unwrap()["root_cause"],
            json!("cache miss storm")
        );
        assert_eq!(record.confidence, 0.85);
        assert_eq!(agent.history().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_capability_degrades_gracefully() {
        let agent = Agent::new(AgentRole::Coordinator, "coordination");
        let record = agent
            .execute_action("escalate", &Map::new(), 1.0)
            .await
            .unwrap();

        assert!(record.result.is_none());
        assert!(record.description.contains("no capability"));
        // Still recorded: the audit trail keeps the gap visible.
        assert_eq!(agent.history().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_capability_is_fatal_and_unrecorded() {
        let agent = Agent::new(AgentRole::JiraSpecialist, "ticketing").with_capability(
            "create_jira_issue",
            Arc::new(|_input: &Map<String, Value>| -> anyhow::Result<Value> {
                anyhow::bail!("tracker API 503")
            }),
        );

        let err = agent
            .execute_action("create_jira_issue", &Map::new(), 0.95)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("create_jira_issue"));
        assert!(err.to_string().contains("jira_specialist"));
        assert!(agent.history().is_empty());
    }

    #[tokio::test]
    async fn test_history_is_append_only_and_ordered() {
        let agent = analyzer_with_capability();
        for i in 0..3 {
            agent
                .execute_action("analyze_logs", &Map::new(), 0.5 + 0.1 * i as f64)
                .await
                .unwrap();
        }
        let history = agent.history();
        assert_eq!(history.len(), 3);
        assert!(history[0].confidence < history[1].confidence);
        assert!(history[1].confidence < history[2].confidence);
    }

    #[tokio::test]
    async fn test_caller_confidence_is_clamped() {
        let agent = analyzer_with_capability();
        let record = agent
            .execute_action("analyze_logs", &Map::new(), 7.0)
            .await
            .unwrap();
        assert_eq!(record.confidence, 1.0);
    }

    #[test]
    fn test_role_serde_strings() {
        assert_eq!(
            serde_json::to_string(&AgentRole::JiraSpecialist).unwrap(),
            "\"jira_specialist\""
        );
        assert_eq!(AgentRole::StreamingExpert.to_string(), "streaming_expert");
    }
}
