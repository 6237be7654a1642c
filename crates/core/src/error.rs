//! Error types for the AlgoViz domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each pipeline stage has its own error type; [`GenerationError`] is the
//! umbrella the orchestrator routes into the fallback path.

use thiserror::Error;

/// Every way a single generation pass can fail.
///
/// None of these ever reach the caller of the pipeline: each one is turned
/// into a fallback artifact whose message embeds the error's `Display` text.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// No usable credential, or the collaborator rejected the one we sent.
    #[error("API key is missing or invalid: {0}")]
    CredentialMissing(String),

    /// The collaborator was unreachable, timed out, or refused the request.
    #[error("model request failed: {0}")]
    Transport(ProviderError),

    /// No JSON could be recovered from the model output.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Recovered JSON does not satisfy the visualization contract.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl From<ProviderError> for GenerationError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::AuthenticationFailed(reason) | ProviderError::NotConfigured(reason) => {
                Self::CredentialMissing(reason)
            }
            other => Self::Transport(other),
        }
    }
}

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// The response extractor gave up.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid JSON format in AI response ({reason}). Extraction failed near: {excerpt:?}")]
pub struct ExtractionError {
    /// Why the last recovery attempt failed.
    pub reason: String,
    /// Truncated copy of the offending text.
    pub excerpt: String,
}

/// A contract violation found by the schema validator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Output is not a valid object")]
    NotAnObject,

    #[error("Missing 'visualization' field in root object")]
    MissingVisualization,

    #[error("'visualization' must be an object")]
    VisualizationNotObject,

    #[error("Visualization is missing required field: '{field}'")]
    MissingField { field: &'static str },

    #[error("Visualization field '{field}' must be a non-empty string")]
    InvalidField { field: &'static str },

    #[error("Visualization 'steps' field must be an array")]
    StepsNotSequence,

    #[error("Visualization has no steps; at least one is required")]
    NoSteps,

    #[error("Step {step} is not an object")]
    StepNotObject { step: usize },

    #[error("Step {step} is missing '{field}' (array) for {kind}")]
    MissingStepField {
        step: usize,
        field: &'static str,
        kind: String,
    },

    #[error("Step {step} node {node} is missing id or val")]
    IncompleteNode { step: usize, node: usize },
}

impl SchemaError {
    /// The field the violation is about.
    pub fn field(&self) -> &str {
        match self {
            Self::NotAnObject => "$",
            Self::MissingVisualization | Self::VisualizationNotObject => "visualization",
            Self::MissingField { field } | Self::InvalidField { field } => *field,
            Self::StepsNotSequence | Self::NoSteps | Self::StepNotObject { .. } => "steps",
            Self::MissingStepField { field, .. } => *field,
            Self::IncompleteNode { .. } => "nodes",
        }
    }

    /// The offending step index, when the violation is inside a step.
    pub fn step(&self) -> Option<usize> {
        match self {
            Self::StepNotObject { step }
            | Self::MissingStepField { step, .. }
            | Self::IncompleteNode { step, .. } => Some(*step),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn auth_failures_become_credential_errors() {
        let err: GenerationError = ProviderError::AuthenticationFailed("bad key".into()).into();
        assert!(matches!(err, GenerationError::CredentialMissing(_)));
        assert!(err.to_string().contains("API key"));

        let err: GenerationError = ProviderError::Network("refused".into()).into();
        assert!(matches!(err, GenerationError::Transport(_)));
    }

    #[test]
    fn schema_error_reports_field_and_step() {
        let err = SchemaError::MissingStepField {
            step: 2,
            field: "nodes",
            kind: "tree".into(),
        };
        assert_eq!(err.field(), "nodes");
        assert_eq!(err.step(), Some(2));
        assert!(err.to_string().contains("Step 2"));

        assert_eq!(SchemaError::NoSteps.step(), None);
        assert!(SchemaError::NoSteps.to_string().contains("no steps"));
    }
}
