//! prompt-agent: a two-round LLM agent with a small set of real-world tools
//!
//! The agent asks the model a question together with a description of its
//! tools. The model either answers directly or names tools to call; the
//! agent runs them one after another, folds their results into a context and
//! asks once more for the final answer.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use prompt_agent::{Agent, AgentConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AgentConfig::from_env()?;
//!     let agent = Agent::from_config(&config);
//!
//!     let result = agent.answer("What is the weather in Paris?", None).await?;
//!     println!("{}", result.output());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod schemas;
pub(crate) mod services;
pub mod tools;
pub mod types;

pub use config::AgentConfig;
pub use self::core::{
    build_prompt, Agent, AgentStep, Answer, ChatModel, Completion, Context, RunResult,
    TokenUsage, ToolExecution, ToolInvocation, ToolOutput,
};
pub use error::{AgentError, Result};
pub use schemas::ArgumentValidator;
pub use services::openai_client::OpenAIClient;
pub use services::reply::decode_reply;
pub use tools::{Tool, ToolRegistry, ToolResult};
pub use types::{ModelReply, ReplyError, ReplyFailure};

#[cfg(feature = "cli")]
pub mod cli;
