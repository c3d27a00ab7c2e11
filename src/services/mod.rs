pub(crate) mod execution;
pub(crate) mod literal;
pub mod openai_client;
pub mod prompt;
pub mod reply;
