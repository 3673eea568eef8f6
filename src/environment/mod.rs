//! The pluggable external-text-generation seam
//!
//! One trait defines the seam (`Environment`), one concrete implementation
//! (`LocalEnvironment`) ships in this crate. An external chat-model adapter
//! would implement the same trait; that adapter is out of scope here and
//! documented at the interface only.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by an `Environment` implementation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnvironmentError {
    #[error("environment failure: {0}")]
    External(String),

    #[error("environment call cancelled")]
    Cancelled,
}

/// Per-call context an `Environment` receives alongside the raw input text.
#[derive(Debug, Clone)]
pub struct EnvironmentContext {
    pub aspect_id: String,
    pub system_prompt: String,
    pub history: Vec<String>,
    pub parameters: Option<Value>,
}

impl EnvironmentContext {
    pub fn new(aspect_id: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            aspect_id: aspect_id.into(),
            system_prompt: system_prompt.into(),
            history: Vec::new(),
            parameters: None,
        }
    }
}

/// A pluggable external text generator bound to every registered aspect.
#[async_trait]
pub trait Environment: Send + Sync {
    async fn process(&self, input: &str, context: &EnvironmentContext) -> Result<String, EnvironmentError>;

    fn supports_streaming(&self) -> bool {
        false
    }

    fn stream(
        &self,
        _input: &str,
        _context: &EnvironmentContext,
    ) -> Option<Pin<Box<dyn Stream<Item = Result<String, EnvironmentError>> + Send>>> {
        None
    }

    fn name(&self) -> &str;

    /// An interface flag checked by aspects to route between
    /// `transform_local` and `transform_async` — never a runtime type check.
    fn is_local(&self) -> bool {
        false
    }
}

/// The one built-in backend: echoes input unchanged.
#[derive(Debug, Default)]
pub struct LocalEnvironment;

#[async_trait]
impl Environment for LocalEnvironment {
    async fn process(&self, input: &str, _context: &EnvironmentContext) -> Result<String, EnvironmentError> {
        Ok(input.to_string())
    }

    fn name(&self) -> &str {
        "Local"
    }

    fn is_local(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_environment_echoes_input() {
        let env = LocalEnvironment;
        let ctx = EnvironmentContext::new("analytical", "you are analytical");
        assert_eq!(env.process("hello", &ctx).await.unwrap(), "hello");
    }

    #[test]
    fn local_environment_identifies_as_local() {
        assert!(LocalEnvironment.is_local());
        assert_eq!(LocalEnvironment.name(), "Local");
    }
}
