//! LLM Provider implementations for AlgoViz.
//!
//! All providers implement the `algoviz_core::Provider` trait.
//! The router picks and builds the configured backend.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::build_from_config;
