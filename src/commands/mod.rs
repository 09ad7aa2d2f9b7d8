// src/commands/mod.rs
pub mod cat;
pub mod cd;
pub mod cp;
pub mod echo;
pub mod help_cmd;
pub mod ls;
pub mod mkdir;
pub mod mv;
pub mod pwd;
pub mod registry;
pub mod rm;
pub mod touch;
pub mod tree_cmd;
pub mod types;

pub use registry::{create_default_registry, CommandRegistry};
pub use types::{fs_error_line, Command, CommandContext, CommandResult};

#[cfg(test)]
pub(crate) use types::test_support;
