//! Workflow engine — drives one incident through the state graph.
//!
//! The engine is fail-safe: `run` never returns an error and never panics.
//! A handler failure or a missing handler redirects the run to `Failed`
//! with the message captured in the context; an escalation flag set by any
//! handler overrides the proposed next state to `Escalated`. Designed for
//! unattended, long-running operation — every outcome is surfaced
//! explicitly in the returned result.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::issue::IssueReport;
use crate::workflow::context::WorkflowContext;
use crate::workflow::state::{is_legal_transition, StateTransition, WorkflowState};

/// Errors raised by the engine itself. Handler failures are host errors and
/// arrive as `anyhow::Error`; these cover the engine's own misconfiguration.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// No handler registered for a non-terminal state — a configuration
    /// error, reported as an immediate `Failed`.
    #[error("no handler registered for state '{0}'")]
    MissingHandler(WorkflowState),

    /// A handler proposed a state the transition graph does not allow.
    #[error("illegal state transition: {from} -> {to}")]
    IllegalTransition {
        from: WorkflowState,
        to: WorkflowState,
    },
}

/// A per-state handler: mutates the context and proposes the next state,
/// or fails with a host error.
pub type StateHandler =
    Box<dyn Fn(&EngineConfig, &mut WorkflowContext) -> anyhow::Result<WorkflowState> + Send + Sync>;

/// Configuration for the workflow engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Detection confidence below this flags the run for escalation.
    pub escalation_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            escalation_threshold: 0.7,
        }
    }
}

/// Final, serializable result of one workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub issue_id: String,
    pub final_state: WorkflowState,
    /// True only when the run ended in `Resolved`.
    pub success: bool,
    pub context: WorkflowContext,
    /// Append-only transition log, in execution order.
    pub transitions: Vec<StateTransition>,
}

/// Explicit state machine over one incident class.
///
/// Handlers live in a registration map passed at construction — replacing a
/// phase is `register_handler`, not subclassing or naming conventions.
pub struct WorkflowEngine {
    config: EngineConfig,
    handlers: HashMap<WorkflowState, StateHandler>,
}

impl WorkflowEngine {
    /// Engine with the default per-phase handlers and default config.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Engine with the default per-phase handlers.
    pub fn with_config(config: EngineConfig) -> Self {
        let mut engine = Self::bare(config);
        engine.register_handler(WorkflowState::Detecting, Box::new(handle_detecting));
        engine.register_handler(WorkflowState::Analyzing, Box::new(handle_analyzing));
        engine.register_handler(WorkflowState::CreatingTicket, Box::new(handle_creating_ticket));
        engine.register_handler(WorkflowState::Notifying, Box::new(handle_notifying));
        engine.register_handler(WorkflowState::Monitoring, Box::new(handle_monitoring));
        engine
    }

    /// Engine with no handlers registered, for fully custom wiring.
    pub fn bare(config: EngineConfig) -> Self {
        Self {
            config,
            handlers: HashMap::new(),
        }
    }

    /// Install or replace the handler for a state.
    pub fn register_handler(&mut self, state: WorkflowState, handler: StateHandler) {
        self.handlers.insert(state, handler);
    }

    /// Drive one incident to a terminal state.
    ///
    /// Fail-safe: every outcome (resolved, escalated, failed) comes back as
    /// a complete `WorkflowResult`; no error escapes this entry point.
    pub fn run(&self, issue: IssueReport) -> WorkflowResult {
        let mut ctx = WorkflowContext::new(issue);
        let mut transitions: Vec<StateTransition> = Vec::new();
        let mut state = WorkflowState::Init;

        tracing::info!(issue_id = %ctx.issue_id, "workflow run starting");
        state = record_transition(
            &mut transitions,
            state,
            WorkflowState::Detecting,
            "workflow_started",
            &ctx,
        );

        while !state.is_terminal() {
            let Some(handler) = self.handlers.get(&state) else {
                let err = WorkflowError::MissingHandler(state);
                tracing::error!(issue_id = %ctx.issue_id, state = %state, "missing handler");
                ctx.error_message = Some(err.to_string());
                state = record_transition(
                    &mut transitions,
                    state,
                    WorkflowState::Failed,
                    "missing_handler",
                    &ctx,
                );
                break;
            };

            match handler(&self.config, &mut ctx) {
                Ok(proposed) => {
                    if ctx.requires_escalation {
                        // Global override: the escalation flag beats whatever
                        // state the handler proposed.
                        state = record_transition(
                            &mut transitions,
                            state,
                            WorkflowState::Escalated,
                            "escalation_override",
                            &ctx,
                        );
                    } else if !is_legal_transition(state, proposed) {
                        let err = WorkflowError::IllegalTransition {
                            from: state,
                            to: proposed,
                        };
                        ctx.error_message = Some(err.to_string());
                        state = record_transition(
                            &mut transitions,
                            state,
                            WorkflowState::Failed,
                            "illegal_transition",
                            &ctx,
                        );
                    } else {
                        let trigger = format!("{state}_complete");
                        state = record_transition(
                            &mut transitions,
                            state,
                            proposed,
                            &trigger,
                            &ctx,
                        );
                    }
                }
                Err(e) => {
                    tracing::error!(issue_id = %ctx.issue_id, state = %state, error = %e, "handler failed");
                    ctx.error_message = Some(e.to_string());
                    state = record_transition(
                        &mut transitions,
                        state,
                        WorkflowState::Failed,
                        "handler_error",
                        &ctx,
                    );
                }
            }
        }

        let success = state == WorkflowState::Resolved;
        tracing::info!(
            issue_id = %ctx.issue_id,
            final_state = %state,
            success,
            transitions = transitions.len(),
            "workflow run finished"
        );

        WorkflowResult {
            issue_id: ctx.issue_id.clone(),
            final_state: state,
            success,
            context: ctx,
            transitions,
        }
    }
}

impl Default for WorkflowEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Append a transition and return the new state.
fn record_transition(
    transitions: &mut Vec<StateTransition>,
    from: WorkflowState,
    to: WorkflowState,
    trigger: &str,
    ctx: &WorkflowContext,
) -> WorkflowState {
    tracing::debug!(issue_id = %ctx.issue_id, from = %from, to = %to, trigger, "state transition");
    transitions.push(StateTransition {
        from_state: from,
        to_state: to,
        timestamp: Utc::now(),
        trigger: trigger.to_string(),
        context_snapshot: ctx.clone(),
    });
    to
}

/// Detecting: classify the incident and score detection confidence.
fn handle_detecting(
    _config: &EngineConfig,
    ctx: &mut WorkflowContext,
) -> anyhow::Result<WorkflowState> {
    let category = crate::issue::IssueCategory::classify(&ctx.issue_data.description);
    ctx.category = category;
    ctx.confidence_score = category.detection_confidence();
    ctx.record_action(format!(
        "detected category {category} (confidence {:.2})",
        ctx.confidence_score
    ));
    Ok(WorkflowState::Analyzing)
}

/// Analyzing: fixed playbook lookup; low detection confidence flags
/// escalation.
fn handle_analyzing(
    config: &EngineConfig,
    ctx: &mut WorkflowContext,
) -> anyhow::Result<WorkflowState> {
    ctx.root_cause = Some(ctx.category.root_cause_hypothesis().to_string());
    ctx.recommended_actions = ctx.category.remediation_actions();
    ctx.record_action(format!(
        "analysis: {} ({} recommended actions)",
        ctx.category.root_cause_hypothesis(),
        ctx.recommended_actions.len()
    ));

    if ctx.confidence_score < config.escalation_threshold {
        ctx.requires_escalation = true;
        ctx.record_action(format!(
            "confidence {:.2} below escalation threshold {:.2}; routing to human",
            ctx.confidence_score, config.escalation_threshold
        ));
    }
    Ok(WorkflowState::CreatingTicket)
}

/// CreatingTicket: assign a ticket reference for the audit trail.
fn handle_creating_ticket(
    _config: &EngineConfig,
    ctx: &mut WorkflowContext,
) -> anyhow::Result<WorkflowState> {
    let ticket = format!("OPS-{}", ctx.issue_id);
    ctx.record_action(format!("created ticket {ticket}"));
    ctx.ticket_reference = Some(ticket);
    Ok(WorkflowState::Notifying)
}

/// Notifying: select channels by severity.
fn handle_notifying(
    _config: &EngineConfig,
    ctx: &mut WorkflowContext,
) -> anyhow::Result<WorkflowState> {
    let channels = ctx.issue_data.severity.notification_channels();
    let names: Vec<String> = channels.iter().map(|c| c.to_string()).collect();
    ctx.record_action(format!("notified channels: {}", names.join(", ")));
    ctx.notification_channels = channels;
    Ok(WorkflowState::Monitoring)
}

/// Monitoring: assign an ETA by severity and propose resolution.
fn handle_monitoring(
    _config: &EngineConfig,
    ctx: &mut WorkflowContext,
) -> anyhow::Result<WorkflowState> {
    let eta = ctx.issue_data.severity.eta_minutes();
    ctx.resolution_eta_minutes = Some(eta);
    ctx.record_action(format!("monitoring remediation (ETA {eta}m)"));
    Ok(WorkflowState::Resolved)
}
