//! The capability seam — how host-supplied functionality reaches agents.
//!
//! A capability maps a structured input to a structured output. The host is
//! responsible for bounding its execution time; this core imposes no timeout
//! or cancellation of its own.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Externally supplied structured-input → structured-output function.
///
/// Invocation is the sole suspension point of an incident run: a capability
/// may perform I/O, but the calling step awaits it before moving on, so step
/// ordering stays strictly sequential.
#[async_trait]
pub trait Capability: Send + Sync {
    async fn invoke(&self, input: &Map<String, Value>) -> Result<Value>;
}

/// Plain sync closures are capabilities too — the common case in tests and
/// in hosts whose integrations are already synchronous.
#[async_trait]
impl<F> Capability for F
where
    F: Fn(&Map<String, Value>) -> Result<Value> + Send + Sync,
{
    async fn invoke(&self, input: &Map<String, Value>) -> Result<Value> {
        (self)(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_closure_is_a_capability() {
        let cap = |input: &Map<String, Value>| -> Result<Value> {
            Ok(json!({ "echo": input.get("description").cloned() }))
        };
        let mut input = Map::new();
        input.insert("description".into(), json!("buffering"));
        let out = cap.invoke(&input).await.unwrap();
        assert_eq!(out["echo"], json!("buffering"));
    }

    #[tokio::test]
    async fn test_capability_errors_propagate() {
        let cap = |_input: &Map<String, Value>| -> Result<Value> {
            anyhow::bail!("backend unreachable")
        };
        let err = cap.invoke(&Map::new()).await.unwrap_err();
        assert!(err.to_string().contains("backend unreachable"));
    }
}
