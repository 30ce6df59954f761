/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds, echoing the prompt's material
 * - `MockProvider::failing()` - Always fails with a non-retryable error
 * - `MockProvider::rate_limited(n)` - Rate-limits the first `n` calls, then works
 * - `MockProvider::with_responder(..)` - Scripted responses per request
 *
 * Every request is recorded so tests can inspect the exact prompts that were sent.
 */

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{CompletionProvider, CompletionRequest, CompletionResponse, PromptKind};
use crate::errors::ProviderError;
use crate::translation::cost::estimate_tokens;

/// Scripted response function: receives the request and its zero-based call index.
pub type Responder = Arc<dyn Fn(&CompletionRequest, usize) -> Result<String, ProviderError> + Send + Sync>;

/// Behavior mode for the mock provider
#[derive(Clone)]
pub enum MockBehavior {
    /// Always succeeds with a predictable echo
    Working,
    /// Always fails with a server error
    Failing,
    /// Fails with HTTP 429 for the first `failures` calls, then behaves like `Working`
    RateLimited { failures: usize },
    /// Simulates slow response
    Slow { delay_ms: u64 },
    /// Delegates to a scripted responder
    Scripted(Responder),
}

impl fmt::Debug for MockBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Working => write!(f, "Working"),
            Self::Failing => write!(f, "Failing"),
            Self::RateLimited { failures } => write!(f, "RateLimited({})", failures),
            Self::Slow { delay_ms } => write!(f, "Slow({}ms)", delay_ms),
            Self::Scripted(_) => write!(f, "Scripted"),
        }
    }
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    /// Whether the mock claims to hold its own key
    configured_key: bool,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            configured_key: true,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that is rate-limited for its first `failures` calls
    pub fn rate_limited(failures: usize) -> Self {
        Self::new(MockBehavior::RateLimited { failures })
    }

    /// Create a slow mock
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Create a scripted mock
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&CompletionRequest, usize) -> Result<String, ProviderError> + Send + Sync + 'static,
    {
        Self::new(MockBehavior::Scripted(Arc::new(responder)))
    }

    /// Make the mock report that it has no key of its own
    pub fn without_configured_key(mut self) -> Self {
        self.configured_key = false;
        self
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of the recorded requests
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    /// Recorded requests of one kind
    pub fn requests_of(&self, kind: PromptKind) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|request| request.kind == kind)
            .cloned()
            .collect()
    }

    /// Body of the last `"""`-fenced block in a prompt, i.e. the material being worked on
    pub fn last_fenced_block(prompt: &str) -> &str {
        let trimmed = prompt.trim_end();
        let Some(without_close) = trimmed.strip_suffix("\"\"\"") else {
            return trimmed;
        };
        match without_close.rfind("\"\"\"\n") {
            Some(open) => without_close[open + 4..].trim_end_matches('\n'),
            None => without_close,
        }
    }

    /// The echo a working mock produces for a request
    pub fn echo(request: &CompletionRequest) -> String {
        let material = Self::last_fenced_block(&request.prompt);
        match request.kind {
            PromptKind::Translate => format!("[TRANSLATED] {}", material),
            PromptKind::BackTranslate => format!("[BACK] {}", material),
            PromptKind::Evaluate => "No issues found.".to_string(),
        }
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        let text = match &self.behavior {
            MockBehavior::Working => Self::echo(&request),

            MockBehavior::Failing => {
                return Err(ProviderError::ApiError {
                    message: "Simulated provider failure".to_string(),
                    status_code: 500,
                });
            }

            MockBehavior::RateLimited { failures } => {
                if count < *failures {
                    return Err(ProviderError::RateLimitExceeded(format!(
                        "429 RESOURCE_EXHAUSTED (simulated, request #{})",
                        count + 1
                    )));
                }
                Self::echo(&request)
            }

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Self::echo(&request)
            }

            MockBehavior::Scripted(responder) => responder(&request, count)?,
        };

        Ok(CompletionResponse {
            prompt_tokens: Some(estimate_tokens(&request.prompt) as u64),
            completion_tokens: Some(estimate_tokens(&text) as u64),
            text,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn has_configured_key(&self) -> bool {
        self.configured_key
    }
}
