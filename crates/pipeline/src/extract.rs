//! Response extraction: recovering a JSON value from model output.
//!
//! Models asked for JSON still wrap it in code fences, add commentary around
//! it, or leave trailing commas behind. The extractor walks a fixed chain of
//! [`Recovery`] steps, each working on what the previous one left, and stops
//! at the first candidate that parses.
//!
//! It never repairs missing quotes, unbalanced delimiters or reordered
//! content. Anything beyond the chain is an [`ExtractionError`].

use std::borrow::Cow;
use std::sync::LazyLock;

use algoviz_core::{ExtractionError, ProviderResponse};
use regex_lite::Regex;
use serde_json::Value;
use tracing::debug;

/// Default length of the excerpt carried by [`ExtractionError`].
pub const DEFAULT_EXCERPT_CHARS: usize = 200;

static FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").ok());

static TRAILING_COMMA: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").ok());

/// What the collaborator handed back.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    Text(String),
    /// Output the backend already parsed for us.
    Structured(Value),
}

impl From<ProviderResponse> for RawResponse {
    fn from(response: ProviderResponse) -> Self {
        match response.structured {
            Some(value) => Self::Structured(value),
            None => Self::Text(response.message.content),
        }
    }
}

/// One step of the recovery chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// The backend returned a value, not text.
    Passthrough,
    /// The whole text parsed as-is.
    Strict,
    /// Narrow to the inside of a fenced code block, if there is one.
    Unfence,
    /// Narrow to the first `{` through the last `}`.
    BraceSpan,
    /// Drop commas sitting right before `}` or `]`.
    TrailingCommas,
}

impl Recovery {
    /// The text steps, in the order they are tried.
    pub const CHAIN: [Recovery; 4] = [
        Recovery::Strict,
        Recovery::Unfence,
        Recovery::BraceSpan,
        Recovery::TrailingCommas,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passthrough => "passthrough",
            Self::Strict => "strict",
            Self::Unfence => "unfence",
            Self::BraceSpan => "brace_span",
            Self::TrailingCommas => "trailing_commas",
        }
    }

    /// Rewrite the candidate. `None` ends the chain.
    fn rewrite(self, candidate: &str) -> Option<Cow<'_, str>> {
        match self {
            Self::Passthrough | Self::Strict => Some(Cow::Borrowed(candidate)),
            Self::Unfence => Some(Cow::Borrowed(unfence(candidate).unwrap_or(candidate))),
            Self::BraceSpan => brace_span(candidate).map(Cow::Borrowed),
            Self::TrailingCommas => Some(strip_trailing_commas(candidate)),
        }
    }

    /// Whether a parse is attempted after this step's rewrite.
    fn parses(self) -> bool {
        !matches!(self, Self::Unfence)
    }
}

impl std::fmt::Display for Recovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recovered value and the step that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub value: Value,
    pub recovery: Recovery,
}

/// Inner text of the first fenced block (optionally tagged `json`).
pub fn unfence(text: &str) -> Option<&str> {
    let captures = FENCE.as_ref()?.captures(text)?;
    captures.get(1).map(|m| m.as_str())
}

/// The slice from the first `{` to the last `}`, inclusive.
pub fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Remove any comma followed only by whitespace and a closing bracket.
pub fn strip_trailing_commas(text: &str) -> Cow<'_, str> {
    match TRAILING_COMMA.as_ref() {
        Some(re) => re.replace_all(text, "$1"),
        None => Cow::Borrowed(text),
    }
}

/// Walks the recovery chain over raw model output.
#[derive(Debug, Clone)]
pub struct Extractor {
    excerpt_chars: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_EXCERPT_CHARS)
    }
}

impl Extractor {
    pub fn new(excerpt_chars: usize) -> Self {
        Self { excerpt_chars }
    }

    /// Recover a JSON value from `raw`.
    ///
    /// Structured objects and arrays pass through untouched; a structured
    /// string is treated as text; any other scalar is rejected outright.
    pub fn extract(&self, raw: RawResponse) -> Result<Extracted, ExtractionError> {
        match raw {
            RawResponse::Structured(Value::String(text)) | RawResponse::Text(text) => {
                self.extract_text(&text)
            }
            RawResponse::Structured(value @ (Value::Object(_) | Value::Array(_))) => {
                Ok(Extracted {
                    value,
                    recovery: Recovery::Passthrough,
                })
            }
            RawResponse::Structured(other) => Err(ExtractionError {
                reason: format!("expected text or an object, got {}", kind_of(&other)),
                excerpt: self.excerpt(&other.to_string()),
            }),
        }
    }

    fn extract_text(&self, text: &str) -> Result<Extracted, ExtractionError> {
        let mut candidate = Cow::Borrowed(text);
        let mut reason = String::from("empty response");

        for recovery in Recovery::CHAIN {
            let Some(next) = recovery.rewrite(&candidate) else {
                reason = "no JSON object found".into();
                break;
            };
            let next = next.into_owned();

            if recovery.parses() {
                match serde_json::from_str::<Value>(&next) {
                    Ok(value) => {
                        if recovery != Recovery::Strict {
                            debug!(%recovery, "Recovered JSON from model output");
                        }
                        return Ok(Extracted { value, recovery });
                    }
                    Err(e) => reason = e.to_string(),
                }
            }
            candidate = Cow::Owned(next);
        }

        Err(ExtractionError {
            reason,
            excerpt: self.excerpt(text),
        })
    }

    fn excerpt(&self, text: &str) -> String {
        text.chars().take(self.excerpt_chars).collect()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
