//! Parameter schemas and argument validation for tools

pub mod validator;

pub use validator::{decode_arguments, params_schema, ArgumentValidator};
