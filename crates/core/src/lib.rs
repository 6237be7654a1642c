//! # AlgoViz Core
//!
//! Domain types, traits, and error definitions for the AlgoViz generation
//! pipeline. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The LLM collaborator is a trait here; implementations live in
//! `algoviz-providers`. This enables:
//! - Swapping backends via configuration
//! - Easy testing with scripted stub providers
//! - Clean dependency graph (all crates depend inward on core)

pub mod artifact;
pub mod error;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use artifact::{
    Highlight, Node, NodeId, QueryResult, StepFrame, VisualizationArtifact, VisualizationKind,
};
pub use error::{ExtractionError, GenerationError, ProviderError, SchemaError};
pub use message::{ConversationTurn, Message, Role, TurnRole};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ResponseFormat, Usage};
