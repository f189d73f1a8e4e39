//! Shared incident types — severity, category classification, and the
//! inbound issue payload.
//!
//! The category playbook is a fixed lookup: no learned models, no NLU.
//! Classification is keyword matching over the issue description, which is
//! enough to route the well-known failure modes of a streaming platform.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Incident severity as reported by the ingesting system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Severity {
    /// Parse leniently: unknown or missing severities fall back to Medium.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Self::Critical,
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Medium,
        }
    }

    /// Estimated resolution time for this severity.
    pub fn eta_minutes(self) -> u32 {
        match self {
            Self::Critical => 15,
            Self::High => 30,
            Self::Medium => 60,
            Self::Low => 120,
        }
    }

    /// Channels to notify for this severity.
    pub fn notification_channels(self) -> Vec<NotificationChannel> {
        match self {
            Self::Critical | Self::High => vec![
                NotificationChannel::Chat,
                NotificationChannel::Pager,
                NotificationChannel::Email,
            ],
            Self::Medium | Self::Low => {
                vec![NotificationChannel::Chat, NotificationChannel::Email]
            }
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Where incident notifications are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Chat,
    Pager,
    Email,
}

impl std::fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chat => write!(f, "chat"),
            Self::Pager => write!(f, "pager"),
            Self::Email => write!(f, "email"),
        }
    }
}

/// Issue category derived from the incident description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// Playback quality degradation (buffering, stutter, lag).
    QoeDegradation,
    /// A service is erroring or crash-looping.
    ServiceFailure,
    /// Elevated latency or timeouts without hard failures.
    PerformanceDegradation,
    /// Description matched no known failure mode.
    Unknown,
}

impl IssueCategory {
    /// Classify an incident description by keyword match.
    ///
    /// Categories are checked in order; the first match wins.
    pub fn classify(description: &str) -> Self {
        let text = description.to_ascii_lowercase();
        let contains_any = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

        if contains_any(&["buffering", "stutter", "lag"]) {
            Self::QoeDegradation
        } else if contains_any(&["error", "crash", "failure"]) {
            Self::ServiceFailure
        } else if contains_any(&["slow", "latency", "timeout"]) {
            Self::PerformanceDegradation
        } else {
            Self::Unknown
        }
    }

    /// Detection confidence for this category.
    ///
    /// Unknown sits below the default escalation threshold so unclassified
    /// incidents route to a human.
    pub fn detection_confidence(self) -> f64 {
        match self {
            Self::QoeDegradation => 0.85,
            Self::ServiceFailure => 0.88,
            Self::PerformanceDegradation => 0.82,
            Self::Unknown => 0.40,
        }
    }

    /// Fixed root-cause hypothesis for this category.
    pub fn root_cause_hypothesis(self) -> &'static str {
        match self {
            Self::QoeDegradation => "CDN edge cache degradation affecting segment delivery",
            Self::ServiceFailure => "Upstream service crash loop after recent deployment",
            Self::PerformanceDegradation => "Capacity saturation on the origin tier",
            Self::Unknown => "Insufficient signal to determine root cause",
        }
    }

    /// Fixed remediation playbook for this category.
    pub fn remediation_actions(self) -> Vec<String> {
        let actions: &[&str] = match self {
            Self::QoeDegradation => &[
                "Failover to backup CDN",
                "Purge affected edge caches",
                "Lower the default ABR ladder ceiling",
            ],
            Self::ServiceFailure => &[
                "Restart affected service instances",
                "Roll back the latest deployment",
                "Scale out healthy replicas",
            ],
            Self::PerformanceDegradation => &[
                "Scale up origin capacity",
                "Enable request shedding for non-critical traffic",
                "Review the slow query log",
            ],
            Self::Unknown => &["Collect additional diagnostics", "Page the on-call engineer"],
        };
        actions.iter().map(|a| a.to_string()).collect()
    }
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QoeDegradation => write!(f, "qoe_degradation"),
            Self::ServiceFailure => write!(f, "service_failure"),
            Self::PerformanceDegradation => write!(f, "performance_degradation"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Inbound incident payload.
///
/// `metrics` and `logs` are opaque to this core — they flow through to
/// capabilities untouched. Unrecognized fields are preserved in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IssueReport {
    /// Caller-supplied identifier. Absent ids are derived from the clock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metrics: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub logs: Value,
    /// Pass-through fields not modeled by this core.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IssueReport {
    pub fn new(description: impl Into<String>, severity: Severity) -> Self {
        Self {
            description: description.into(),
            severity,
            ..Default::default()
        }
    }

    /// The issue id, or a timestamp-derived one when the caller supplied none.
    pub fn resolved_id(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("INC-{}", Utc::now().timestamp_millis()),
        }
    }
}
