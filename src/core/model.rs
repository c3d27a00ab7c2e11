use crate::{error::Result, types::TokenUsage};
use async_trait::async_trait;

/// One completion returned by a model endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    /// Text of the first choice, if the endpoint returned one
    pub content: Option<String>,
    pub usage: Option<TokenUsage>,
}

impl Completion {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            usage: None,
        }
    }
}

/// A language model that turns one prompt into one reply
#[async_trait]
pub trait ChatModel: Send + Sync + std::fmt::Debug {
    async fn complete(&self, prompt: &str) -> Result<Completion>;
}
