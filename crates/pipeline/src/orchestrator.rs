//! One pipeline pass per query.
//!
//! `Idle → Invoking → Extracting → Validating → Success`, with a `Fallback`
//! sink reachable from each of the three middle stages. Nothing is retried
//! and no error escapes: every failure becomes a fallback result.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use algoviz_config::AppConfig;
use algoviz_core::provider::{Provider, ProviderRequest, ResponseFormat};
use algoviz_core::{ConversationTurn, GenerationError, ProviderError, QueryResult};
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::extract::{DEFAULT_EXCERPT_CHARS, Extractor, RawResponse};
use crate::fallback::fallback;
use crate::history::{DEFAULT_HISTORY_WINDOW, window};
use crate::prompt::{SYSTEM_PROMPT, assemble};
use crate::validate::{DanglingReference, dangling_references, validate};

/// Shown when there is no usable credential to call the model with.
pub const CREDENTIAL_MISSING_REASON: &str = "API key is missing or invalid. Please set MISTRAL_API_KEY (or ALGOVIZ_API_KEY) to a real key from https://console.mistral.ai/";

/// Where a pipeline pass is, or where it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Invoking,
    Extracting,
    Validating,
    Success,
    Fallback,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Invoking => "invoking",
            Self::Extracting => "extracting",
            Self::Validating => "validating",
            Self::Success => "success",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a pass ended.
#[derive(Debug, Clone)]
pub enum Disposition {
    Success,
    /// `stage` is the stage that failed.
    Fallback { stage: Stage, error: GenerationError },
}

impl Disposition {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Everything a caller may want to know about one pass.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub request_id: String,
    pub result: QueryResult,
    pub disposition: Disposition,
    /// Stages entered, in order, ending in `Success` or `Fallback`.
    pub trail: Vec<Stage>,
    /// Unresolved node references in a successful result.
    pub warnings: Vec<DanglingReference>,
}

/// The generation-recovery pipeline.
///
/// Holds the one long-lived provider handle; everything else is per call,
/// so a `Pipeline` can be shared across concurrent requests.
pub struct Pipeline {
    /// `None` when no usable credential is configured
    provider: Option<Arc<dyn Provider>>,

    model: String,

    temperature: f32,

    max_tokens: Option<u32>,

    /// Upper bound on the provider call
    timeout: Duration,

    history_window: usize,

    system_prompt: String,

    extractor: Extractor,

    /// Append-only failure log
    error_log: Option<PathBuf>,
}

impl Pipeline {
    /// Create a pipeline with default settings.
    pub fn new(provider: Option<Arc<dyn Provider>>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.2,
            max_tokens: None,
            timeout: Duration::from_secs(60),
            history_window: DEFAULT_HISTORY_WINDOW,
            system_prompt: SYSTEM_PROMPT.to_string(),
            extractor: Extractor::new(DEFAULT_EXCERPT_CHARS),
            error_log: None,
        }
    }

    /// Create a pipeline from loaded configuration.
    pub fn from_config(config: &AppConfig, provider: Option<Arc<dyn Provider>>) -> Self {
        let mut pipeline = Self::new(provider, &config.model)
            .with_temperature(config.temperature as f32)
            .with_timeout(Duration::from_secs(config.request_timeout_secs))
            .with_history_window(config.history_window)
            .with_excerpt_chars(config.diagnostics.excerpt_chars);
        if let Some(max) = config.max_tokens {
            pipeline = pipeline.with_max_tokens(max);
        }
        if let Some(path) = &config.diagnostics.error_log {
            pipeline = pipeline.with_error_log(path);
        }
        pipeline
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Bound the provider call. Exceeding it is a transport failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_history_window(mut self, turns: usize) -> Self {
        self.history_window = turns;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_excerpt_chars(mut self, chars: usize) -> Self {
        self.extractor = Extractor::new(chars);
        self
    }

    /// Append a record of every fallback to `path`.
    pub fn with_error_log(mut self, path: impl AsRef<Path>) -> Self {
        self.error_log = Some(path.as_ref().to_path_buf());
        self
    }

    /// Whether a provider is available to call.
    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answer `query`. Never fails.
    pub async fn process(&self, query: &str, history: &[ConversationTurn]) -> QueryResult {
        self.run(query, history).await.result
    }

    /// Answer `query` and report how the pass went.
    pub async fn run(&self, query: &str, history: &[ConversationTurn]) -> PipelineOutcome {
        let request_id = uuid::Uuid::new_v4().to_string();
        let mut trail = vec![Stage::Idle];

        info!(
            request_id = %request_id,
            history = history.len(),
            "Processing query"
        );

        match self.generate(query, history, &mut trail).await {
            Ok(result) => {
                trail.push(Stage::Success);
                let warnings = dangling_references(&result);
                for warning in &warnings {
                    warn!(request_id = %request_id, "Unresolved node reference: {warning}");
                }
                info!(request_id = %request_id, kind = %result.visualization.kind, "Query succeeded");
                PipelineOutcome {
                    request_id,
                    result,
                    disposition: Disposition::Success,
                    trail,
                    warnings,
                }
            }
            Err(error) => {
                let stage = trail.last().copied().unwrap_or(Stage::Idle);
                trail.push(Stage::Fallback);
                warn!(
                    request_id = %request_id,
                    stage = %stage,
                    query = %query,
                    error = %error,
                    "Pipeline failed, returning fallback"
                );
                self.log_failure(&request_id, stage, query, &error).await;

                PipelineOutcome {
                    request_id,
                    result: fallback(&fallback_reason(stage, &error)),
                    disposition: Disposition::Fallback { stage, error },
                    trail,
                    warnings: Vec::new(),
                }
            }
        }
    }

    async fn generate(
        &self,
        query: &str,
        history: &[ConversationTurn],
        trail: &mut Vec<Stage>,
    ) -> Result<QueryResult, GenerationError> {
        trail.push(Stage::Invoking);
        let Some(provider) = &self.provider else {
            return Err(GenerationError::CredentialMissing(
                "no usable API key configured".into(),
            ));
        };

        let history = window(history, self.history_window);
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: assemble(&self.system_prompt, history, query),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: ResponseFormat::JsonObject,
        };
        debug!(
            provider = provider.name(),
            model = %request.model,
            messages = request.messages.len(),
            "Invoking model"
        );

        let response = tokio::time::timeout(self.timeout, provider.complete(request))
            .await
            .map_err(|_| {
                ProviderError::Timeout(format!("no response within {}s", self.timeout.as_secs()))
            })??;

        trail.push(Stage::Extracting);
        let extracted = self.extractor.extract(RawResponse::from(response))?;
        debug!(recovery = %extracted.recovery, "Extracted model output");

        trail.push(Stage::Validating);
        Ok(validate(&extracted.value)?)
    }

    async fn log_failure(&self, request_id: &str, stage: Stage, query: &str, error: &GenerationError) {
        let Some(path) = &self.error_log else {
            return;
        };

        let record = format!(
            "\n--- ERROR [{}] ---\nRequest: {request_id}\nStage: {stage}\nQuery: {query}\nError: {error}\n------------------\n",
            Utc::now().to_rfc3339()
        );

        let written = async {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await?;
            file.write_all(record.as_bytes()).await
        }
        .await;

        if let Err(e) = written {
            warn!(path = %path.display(), error = %e, "Failed to write error log");
        }
    }
}

/// The human-readable reason embedded in the fallback message.
fn fallback_reason(stage: Stage, error: &GenerationError) -> String {
    match error {
        GenerationError::CredentialMissing(_) => CREDENTIAL_MISSING_REASON.to_string(),
        other => format!("AI generation failed while {stage}: {other}. Showing fallback demo."),
    }
}
