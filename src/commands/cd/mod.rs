// src/commands/cd/mod.rs
use crate::commands::{fs_error_line, Command, CommandContext, CommandResult};

pub struct CdCommand;

impl Command for CdCommand {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn execute(&self, ctx: CommandContext) -> CommandResult {
        if ctx.args.iter().any(|a| a == "--help") {
            return CommandResult::success(
                "Usage: cd [DIR]\n\n\
                 Change the current directory to DIR (default: /).\n".to_string()
            );
        }

        let operands: Vec<&String> = ctx.args.iter().filter(|a| a.as_str() != "--").collect();
        if operands.len() > 1 {
            return CommandResult::error("cd: too many arguments\n".to_string());
        }
        let target = operands.first().map(|s| s.as_str()).unwrap_or("/");

        match ctx.fs.change_directory(target) {
            Ok(_) => CommandResult::success(String::new()),
            Err(e) => CommandResult::error(fs_error_line("cd", &e)),
        }
    }
}
