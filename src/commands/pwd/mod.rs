// src/commands/pwd/mod.rs
use crate::commands::{Command, CommandContext, CommandResult};

pub struct PwdCommand;

impl Command for PwdCommand {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn execute(&self, ctx: CommandContext) -> CommandResult {
        // Options and operands are ignored (bash behavior)
        CommandResult::success(format!("{}\n", ctx.fs.cwd()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{run, sample_fs};

    #[test]
    fn test_pwd_root() {
        let mut fs = sample_fs();
        let result = run(&PwdCommand, &mut fs, vec![]);
        assert_eq!(result.stdout, "/\n");
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn test_pwd_follows_cursor() {
        let mut fs = sample_fs();
        fs.change_directory("docs/sub").unwrap();
        let result = run(&PwdCommand, &mut fs, vec!["ignored", "args"]);
        assert_eq!(result.stdout, "/docs/sub\n");
    }
}
