//! Demo front for the incident resolution core.
//!
//! Reads an issue payload (file or inline flags), wires a baseline
//! capability set derived from the category playbook, and runs either the
//! agent pipeline or the workflow engine, printing the serialized result.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::{json, Map, Value};
use tracing::info;

use coordination::{IssueCategory, IssueReport, Severity, WorkflowEngine};
use incident_agents::{Agent, AgentRole, AgentTeam, IssueResolver, ResolverConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Fixed 4-agent pipeline with consensus gating.
    Resolver,
    /// State-machine workflow with per-phase handlers.
    Workflow,
}

#[derive(Parser, Debug)]
#[command(name = "incident-agents", about = "Automated incident resolution demo")]
struct Args {
    /// Path to an issue JSON file. Overrides the inline flags.
    #[arg(long)]
    issue: Option<PathBuf>,

    /// Inline incident description.
    #[arg(long, default_value = "video keeps buffering on live channels")]
    description: String,

    /// Inline severity (critical|high|medium|low).
    #[arg(long, default_value = "high")]
    severity: String,

    /// Which orchestration to run.
    #[arg(long, value_enum, default_value = "resolver")]
    mode: Mode,

    /// Consensus threshold for unattended remediation.
    #[arg(long, default_value_t = 0.85)]
    auto_execute_threshold: f64,

    /// Disable auto-execution; every incident escalates to a human.
    #[arg(long)]
    no_self_healing: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let issue = load_issue(&args)?;
    info!(id = %issue.resolved_id(), severity = %issue.severity, "incident loaded");

    let output = match args.mode {
        Mode::Resolver => {
            let config = ResolverConfig {
                auto_execute_threshold: args.auto_execute_threshold,
                self_healing_enabled: !args.no_self_healing,
                ..ResolverConfig::default()
            };
            let resolver = IssueResolver::new(baseline_team(), config);
            let resolution = resolver.resolve(&issue).await?;
            serde_json::to_string_pretty(&resolution)?
        }
        Mode::Workflow => {
            let engine = WorkflowEngine::new();
            let result = engine.run(issue);
            serde_json::to_string_pretty(&result)?
        }
    };

    println!("{output}");
    Ok(())
}

fn load_issue(args: &Args) -> Result<IssueReport> {
    match &args.issue {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading issue file {}", path.display()))?;
            serde_json::from_str(&raw).context("parsing issue JSON")
        }
        None => Ok(IssueReport::new(
            args.description.clone(),
            Severity::parse(&args.severity),
        )),
    }
}

/// Baseline capabilities backed by the category playbook. A production host
/// replaces these with real log search, QoE telemetry, and tracker clients.
fn baseline_team() -> AgentTeam {
    let classify = |input: &Map<String, Value>| {
        IssueCategory::classify(
            input
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default(),
        )
    };

    AgentTeam {
        analyzer: Arc::new(
            Agent::new(
                AgentRole::Analyzer,
                "Correlates logs and metrics into a diagnostic hypothesis",
            )
            .with_capability(
                "analyze_logs",
                Arc::new(move |input: &Map<String, Value>| -> Result<Value> {
                    let category = classify(input);
                    Ok(json!({
                        "category": category,
                        "root_cause": category.root_cause_hypothesis(),
                    }))
                }),
            ),
        ),
        streaming_expert: Arc::new(
            Agent::new(
                AgentRole::StreamingExpert,
                "Diagnoses playback quality and recommends remediation",
            )
            .with_capability(
                "diagnose_qoe",
                Arc::new(move |input: &Map<String, Value>| -> Result<Value> {
                    Ok(json!({
                        "category": classify(input),
                        "metrics": input.get("metrics").cloned().unwrap_or(Value::Null),
                    }))
                }),
            )
            .with_capability(
                "recommend_fix",
                Arc::new(move |input: &Map<String, Value>| -> Result<Value> {
                    Ok(json!({ "actions": classify(input).remediation_actions() }))
                }),
            ),
        ),
        jira_specialist: Arc::new(
            Agent::new(
                AgentRole::JiraSpecialist,
                "Owns the ticket lifecycle in the issue tracker",
            )
            .with_capability(
                "create_jira_issue",
                Arc::new(|input: &Map<String, Value>| -> Result<Value> {
                    let id = input.get("id").and_then(Value::as_str).unwrap_or("NEW");
                    Ok(json!({ "ticket": format!("OPS-{id}") }))
                }),
            ),
        ),
        coordinator: Arc::new(
            Agent::new(
                AgentRole::Coordinator,
                "Gates auto-execution and escalates to humans",
            )
            .with_capability(
                "escalate",
                Arc::new(|input: &Map<String, Value>| -> Result<Value> {
                    Ok(json!({
                        "acknowledged": true,
                        "reason": input.get("reason").cloned().unwrap_or(Value::Null),
                    }))
                }),
            ),
        ),
    }
}
