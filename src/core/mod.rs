pub mod agent;
pub mod context;
pub mod model;
pub mod steps;
pub mod tool_call;
pub(crate) mod trace;

pub use crate::services::prompt::build_prompt;
pub use crate::types::result::{Answer, RunResult, TokenUsage};
pub use agent::Agent;
pub use context::Context;
pub use model::{ChatModel, Completion};
pub use steps::AgentStep;
pub use tool_call::{ToolExecution, ToolInvocation, ToolOutput};
