//! Explicit state machine orchestration for one incident class.
//!
//! Coarser-grained than the resolver pipeline: each phase is a named state
//! with its own handler, the full transition log is kept for audit, and the
//! engine never lets an error escape its public entry point.

pub mod context;
pub mod engine;
pub mod state;

pub use context::WorkflowContext;
pub use engine::{EngineConfig, StateHandler, WorkflowEngine, WorkflowError, WorkflowResult};
pub use state::{is_legal_transition, StateTransition, WorkflowState};
