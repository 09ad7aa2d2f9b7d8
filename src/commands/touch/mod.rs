// src/commands/touch/mod.rs
use crate::commands::{fs_error_line, Command, CommandContext, CommandResult};

pub struct TouchCommand;

impl Command for TouchCommand {
    fn name(&self) -> &'static str {
        "touch"
    }

    fn execute(&self, ctx: CommandContext) -> CommandResult {
        if ctx.args.iter().any(|a| a == "--help") {
            return CommandResult::success(
                "Usage: touch [OPTION]... FILE...\n\n\
                 Update the modification time of each FILE to the current time.\n\
                 A FILE argument that does not exist is created empty.\n\n\
                 Options:\n\
                   -c, --no-create    do not create any files\n\
                       --help         display this help and exit\n".to_string()
            );
        }

        let mut no_create = false;
        let mut files: Vec<String> = Vec::new();

        for arg in &ctx.args {
            match arg.as_str() {
                "-c" | "--no-create" => no_create = true,
                _ if !arg.starts_with('-') => files.push(arg.clone()),
                _ => {}
            }
        }

        if files.is_empty() {
            return CommandResult::error("touch: missing file operand\n".to_string());
        }

        let mut stderr = String::new();
        let mut exit_code = 0;

        for file in &files {
            if no_create && !ctx.fs.exists(file) {
                continue;
            }
            // Appending nothing bumps the timestamp and creates missing files.
            if let Err(e) = ctx.fs.write_file(file, "", true) {
                stderr.push_str(&fs_error_line("touch", &e));
                exit_code = 1;
            }
        }

        CommandResult::with_exit_code(String::new(), stderr, exit_code)
    }
}
