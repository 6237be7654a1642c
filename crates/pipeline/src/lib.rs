//! The AlgoViz generation-recovery pipeline.
//!
//! One query flows through:
//!
//! 1. **History windowing**: keep only the most recent turns
//! 2. **Prompt assembly**: system instructions, history, the query
//! 3. **Model invocation** through the injected `Provider`
//! 4. **Extraction**: recover a JSON value from the raw output
//! 5. **Validation** against the per-kind visualization contract
//!
//! Any failure along the way is replaced by the fallback artifact, so the
//! caller always gets a renderable result.

pub mod extract;
pub mod fallback;
pub mod history;
pub mod orchestrator;
pub mod prompt;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use extract::{Extracted, Extractor, RawResponse, Recovery};
pub use fallback::fallback;
pub use orchestrator::{CREDENTIAL_MISSING_REASON, Disposition, Pipeline, PipelineOutcome, Stage};
pub use validate::{DanglingReference, StepContract, dangling_references, validate};
