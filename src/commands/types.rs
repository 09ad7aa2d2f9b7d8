// src/commands/types.rs
use crate::fs::{FsError, VirtualFilesystem};

/// Result of running one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success(stdout: String) -> Self {
        Self { stdout, stderr: String::new(), exit_code: 0 }
    }

    pub fn error(stderr: String) -> Self {
        Self { stdout: String::new(), stderr, exit_code: 1 }
    }

    pub fn with_exit_code(stdout: String, stderr: String, exit_code: i32) -> Self {
        Self { stdout, stderr, exit_code }
    }
}

/// One line of diagnostics for a filesystem failure, e.g. `cp: /ghost: No such file or directory`.
pub fn fs_error_line(command: &str, err: &FsError) -> String {
    format!("{}: {}\n", command, err)
}

/// Everything a command gets to work with.
pub struct CommandContext<'a> {
    pub args: Vec<String>,
    pub fs: &'a mut VirtualFilesystem,
}

/// A terminal command.
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;
    fn execute(&self, ctx: CommandContext<'_>) -> CommandResult;
}
