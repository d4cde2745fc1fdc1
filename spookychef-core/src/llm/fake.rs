//! Fake LLM provider for testing.
//!
//! This provider returns deterministic responses, either from a queue of
//! scripted replies or by prompt substring matching, so tests run without
//! network access or API costs.

use super::{CompletionRequest, LlmError, LlmProvider};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

/// A fake LLM provider for testing.
///
/// Queued responses are returned first, in order. After that, responses are
/// matched by checking whether the prompt contains a registered substring,
/// then the default response (if any) is used.
#[derive(Debug)]
pub struct FakeProvider {
    /// Map of prompt substring -> response
    responses: RwLock<HashMap<String, String>>,
    /// Scripted responses consumed one per call
    queued: Mutex<VecDeque<String>>,
    /// Default response if nothing else applies
    default_response: Option<String>,
    /// User prompts seen, in call order
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::new().with_default_response("{}")
    }
}

impl FakeProvider {
    /// Create a new FakeProvider with no registered responses.
    pub fn new() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
            queued: Mutex::new(VecDeque::new()),
            default_response: None,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a FakeProvider that returns a specific response for prompts containing a substring.
    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let provider = Self::new();
        provider.add_response(prompt_contains, response);
        provider
    }

    /// Create a FakeProvider that replies with `responses` in order.
    pub fn with_sequence<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new();
        provider
            .queued
            .lock()
            .unwrap()
            .extend(responses.into_iter().map(Into::into));
        provider
    }

    /// Add a response for prompts containing a specific substring.
    pub fn add_response(&self, prompt_contains: &str, response: &str) {
        self.responses
            .write()
            .unwrap()
            .insert(prompt_contains.to_string(), response.to_string());
    }

    /// Set the default response when no pattern matches.
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    /// Number of `complete` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// User prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.user.clone());

        if let Some(response) = self.queued.lock().unwrap().pop_front() {
            return Ok(response);
        }

        let prompt_lower = format!("{}\n{}", request.system, request.user).to_lowercase();
        {
            let responses = self.responses.read().unwrap();
            for (pattern, response) in responses.iter() {
                if prompt_lower.contains(&pattern.to_lowercase()) {
                    return Ok(response.clone());
                }
            }
        }

        match &self.default_response {
            Some(response) => Ok(response.clone()),
            None => Err(LlmError::RequestFailed(format!(
                "FakeProvider: No response configured for prompt (first 100 chars): {}",
                request.user.chars().take(100).collect::<String>()
            ))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}
