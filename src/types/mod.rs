pub mod reply;
pub mod result;

pub use reply::{ModelReply, ReplyError, ReplyFailure};
pub use result::{Answer, RunResult, TokenUsage};
