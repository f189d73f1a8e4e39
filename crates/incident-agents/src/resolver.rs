//! The fixed 4-agent resolution pipeline.
//!
//! Diagnose → recommend → ticket → decide. The sequence is hard-coded and
//! non-branching; the only decision is the confidence gate at the end. The
//! resolver is fail-fast: any capability failure aborts the whole resolution
//! with no partial plan. Contrast with the workflow engine, which is
//! fail-safe and captures failures in its result.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use coordination::{ConsensusCalculator, IssueReport, Severity};

use crate::agent::{Agent, AgentError, AgentRole};

/// Resolver tuning. Per-step confidences live here because reliability is
/// judged by the caller of each step, not by the agent that ran it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Consensus at or above this may auto-execute remediation.
    pub auto_execute_threshold: f64,
    /// When false, every incident requires human approval regardless of
    /// consensus.
    pub self_healing_enabled: bool,
    /// Reliability assigned to the log-analysis step.
    pub analysis_confidence: f64,
    /// Reliability assigned to the QoE diagnosis step.
    pub diagnosis_confidence: f64,
    /// Reliability assigned to the fix recommendation step.
    pub recommendation_confidence: f64,
    /// Reliability assigned to ticket creation (not part of consensus).
    pub ticket_confidence: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            auto_execute_threshold: 0.85,
            self_healing_enabled: true,
            analysis_confidence: 0.85,
            diagnosis_confidence: 0.90,
            recommendation_confidence: 0.88,
            ticket_confidence: 0.95,
        }
    }
}

/// The four long-lived agents of the pipeline. Shared across incidents;
/// histories accumulate for the life of the resolver.
#[derive(Clone)]
pub struct AgentTeam {
    pub analyzer: Arc<Agent>,
    pub jira_specialist: Arc<Agent>,
    pub streaming_expert: Arc<Agent>,
    pub coordinator: Arc<Agent>,
}

impl AgentTeam {
    /// The standard team with role descriptions and empty capability maps.
    /// Hosts attach capabilities before handing the team to a resolver.
    pub fn standard() -> Self {
        Self {
            analyzer: Arc::new(Agent::new(
                AgentRole::Analyzer,
                "Correlates logs and metrics into a diagnostic hypothesis",
            )),
            jira_specialist: Arc::new(Agent::new(
                AgentRole::JiraSpecialist,
                "Owns the ticket lifecycle in the issue tracker",
            )),
            streaming_expert: Arc::new(Agent::new(
                AgentRole::StreamingExpert,
                "Diagnoses playback quality and recommends remediation",
            )),
            coordinator: Arc::new(Agent::new(
                AgentRole::Coordinator,
                "Gates auto-execution and escalates to humans",
            )),
        }
    }
}

/// The remediation plan assembled from the pipeline's outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueResolutionPlan {
    pub issue_id: String,
    pub severity: Severity,
    pub root_cause_hypothesis: String,
    pub recommended_actions: Vec<String>,
    pub estimated_resolution_minutes: u32,
    pub requires_human_approval: bool,
    pub consensus_score: f64,
}

/// How the incident left the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    /// Routed to a human: low consensus or self-healing disabled.
    Escalated,
    /// Confidence gate passed; remediation may proceed unattended.
    AutoResolved,
}

impl std::fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Escalated => write!(f, "escalated"),
            Self::AutoResolved => write!(f, "auto_resolved"),
        }
    }
}

/// Final, serializable result of one resolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueResolution {
    pub issue_id: String,
    pub status: ResolutionStatus,
    pub plan: IssueResolutionPlan,
    pub consensus_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket: Option<String>,
    /// Ordered audit log of this run — local to the run, never shared.
    pub actions_taken: Vec<String>,
}

/// Fixed pipeline coordinator: diagnoses, recommends, tickets, and decides
/// auto-resolve vs. escalate.
pub struct IssueResolver {
    team: AgentTeam,
    consensus: ConsensusCalculator,
    config: ResolverConfig,
}

impl IssueResolver {
    pub fn new(team: AgentTeam, config: ResolverConfig) -> Self {
        Self {
            team,
            consensus: ConsensusCalculator::default(),
            config,
        }
    }

    pub fn team(&self) -> &AgentTeam {
        &self.team
    }

    /// Resolve one incident. Strictly sequential; each step feeds the next.
    ///
    /// Fail-fast: the first capability failure aborts with no partial
    /// result. No retries, no rollback — executed actions stay executed.
    pub async fn resolve(&self, issue: &IssueReport) -> Result<IssueResolution, AgentError> {
        let issue_id = issue.resolved_id();
        let input = issue_payload(issue);
        let mut actions_taken = Vec::new();

        tracing::info!(issue_id = %issue_id, severity = %issue.severity, "resolution starting");

        // Steps 1-3: diagnosis chain.
        let analysis = self
            .team
            .analyzer
            .execute_action("analyze_logs", &input, self.config.analysis_confidence)
            .await?;
        actions_taken.push(analysis.description.clone());

        let diagnosis = self
            .team
            .streaming_expert
            .execute_action("diagnose_qoe", &input, self.config.diagnosis_confidence)
            .await?;
        actions_taken.push(diagnosis.description.clone());

        // The recommendation step consumes the diagnosis output directly.
        let mut recommend_input = input.clone();
        recommend_input.insert(
            "diagnosis".into(),
            diagnosis.result.clone().unwrap_or(Value::Null),
        );
        let recommendation = self
            .team
            .streaming_expert
            .execute_action(
                "recommend_fix",
                &recommend_input,
                self.config.recommendation_confidence,
            )
            .await?;
        actions_taken.push(recommendation.description.clone());

        // Step 4: consensus over the diagnosis chain.
        let confidences = [
            analysis.confidence,
            diagnosis.confidence,
            recommendation.confidence,
        ];
        let consensus_score = self.consensus.score(&confidences);

        // Step 5: ticket creation always runs — the paper trail exists even
        // when remediation auto-executes.
        let root_cause = extract_string(&analysis.result, "root_cause")
            .unwrap_or_else(|| "undetermined (analysis capability unavailable)".to_string());
        let recommended_actions = extract_string_list(&recommendation.result, "actions");

        let mut ticket_input = input.clone();
        ticket_input.insert("root_cause".into(), Value::String(root_cause.clone()));
        ticket_input.insert(
            "recommended_actions".into(),
            serde_json::to_value(&recommended_actions).unwrap_or(Value::Null),
        );
        ticket_input.insert("consensus".into(), consensus_score.into());
        let ticket_record = self
            .team
            .jira_specialist
            .execute_action(
                "create_jira_issue",
                &ticket_input,
                self.config.ticket_confidence,
            )
            .await?;
        actions_taken.push(ticket_record.description.clone());
        let ticket = extract_string(&ticket_record.result, "ticket");

        // Step 6: confidence gate.
        let requires_human = consensus_score < self.config.auto_execute_threshold
            || !self.config.self_healing_enabled;

        if requires_human {
            let mut reasons = Vec::new();
            if consensus_score < self.config.auto_execute_threshold {
                reasons.push(format!(
                    "consensus {consensus_score:.3} below auto-execute threshold {:.2}",
                    self.config.auto_execute_threshold
                ));
            }
            if !self.config.self_healing_enabled {
                reasons.push("self-healing disabled".to_string());
            }
            let reason = reasons.join("; ");

            let mut escalate_input = input.clone();
            escalate_input.insert("reason".into(), Value::String(reason.clone()));
            let escalation = self
                .team
                .coordinator
                .execute_action("escalate", &escalate_input, 1.0)
                .await?;
            actions_taken.push(format!("{} ({reason})", escalation.description));
            tracing::warn!(issue_id = %issue_id, %reason, "escalating to human");
        } else {
            tracing::info!(issue_id = %issue_id, consensus = consensus_score, "auto-resolving");
        }

        let status = if requires_human {
            ResolutionStatus::Escalated
        } else {
            ResolutionStatus::AutoResolved
        };

        let plan = IssueResolutionPlan {
            issue_id: issue_id.clone(),
            severity: issue.severity,
            root_cause_hypothesis: root_cause,
            recommended_actions,
            estimated_resolution_minutes: issue.severity.eta_minutes(),
            requires_human_approval: requires_human,
            consensus_score,
        };

        Ok(IssueResolution {
            issue_id,
            status,
            plan,
            consensus_score,
            ticket,
            actions_taken,
        })
    }
}

/// Serialize the issue into the structured input handed to capabilities.
fn issue_payload(issue: &IssueReport) -> Map<String, Value> {
    match serde_json::to_value(issue) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn extract_string(result: &Option<Value>, key: &str) -> Option<String> {
    result
        .as_ref()
        .and_then(|v| v.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn extract_string_list(result: &Option<Value>, key: &str) -> Vec<String> {
    result
        .as_ref()
        .and_then(|v| v.get(key))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
