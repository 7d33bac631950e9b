/*!
 * Mock provider implementation for testing.
 *
 * Simulates translation backends with scripted behaviors:
 * - `MockProvider::working()` - echoes each batch line with a tag
 * - `MockProvider::failing()` - always fails with a connection error
 * - `MockProvider::miscounting()` - drops the batch separators so the
 *   response line count no longer matches the request
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::translation::core::BATCH_SEPARATOR;

/// Mock request for testing
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// The batch text to translate, separator-joined
    pub text: String,
}

/// Mock response for testing
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// The translated batch text
    pub text: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Echo each line with a [fr] tag, preserving separators
    Working,
    /// Always fail with a connection error
    Failing,
    /// Fail every Nth request
    Intermittent { fail_every: usize },
    /// Join lines with plain newlines instead of the separator
    Miscounting,
    /// Return fewer lines than requested
    Truncating,
    /// Wrap the response in a markdown code fence
    Fenced,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
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

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a mock whose responses lose the batch separator
    pub fn miscounting() -> Self {
        Self::new(MockBehavior::Miscounting)
    }

    /// Create a mock that returns fewer lines than requested
    pub fn truncating() -> Self {
        Self::new(MockBehavior::Truncating)
    }

    /// Create a mock that wraps responses in a code fence
    pub fn fenced() -> Self {
        Self::new(MockBehavior::Fenced)
    }

    /// Translate one line the mock way
    fn translate_line(line: &str) -> String {
        format!("[fr] {}", line)
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = MockRequest;
    type Response = MockResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;

        match self.behavior {
            MockBehavior::Failing => {
                return Err(ProviderError::ConnectionError(
                    "mock connection refused".to_string(),
                ));
            }
            MockBehavior::Intermittent { fail_every } if fail_every > 0 && count % fail_every == 0 => {
                return Err(ProviderError::Timeout("mock timeout".to_string()));
            }
            _ => {}
        }

        let lines: Vec<String> = request
            .text
            .split(BATCH_SEPARATOR)
            .map(Self::translate_line)
            .collect();

        let text = match self.behavior {
            MockBehavior::Miscounting => lines.join("\n"),
            MockBehavior::Truncating => {
                lines[..lines.len().saturating_sub(1).max(1)].join(BATCH_SEPARATOR)
            }
            MockBehavior::Fenced => format!("```\n{}\n```", lines.join(BATCH_SEPARATOR)),
            _ => lines.join(BATCH_SEPARATOR),
        };

        Ok(MockResponse { text })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "mock connection refused".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response.text.clone()
    }
}
