// src/commands/mv/mod.rs
use crate::commands::{fs_error_line, Command, CommandContext, CommandResult};

pub struct MvCommand;

impl Command for MvCommand {
    fn name(&self) -> &'static str {
        "mv"
    }

    fn execute(&self, ctx: CommandContext) -> CommandResult {
        if ctx.args.iter().any(|a| a == "--help") {
            return CommandResult::success(
                "Usage: mv [OPTION]... SOURCE... DEST\n\n\
                 Rename SOURCE to DEST, or move SOURCE(s) to DIRECTORY.\n\n\
                 Options:\n\
                   -v, --verbose      explain what is being done\n\
                       --help         display this help and exit\n".to_string()
            );
        }

        let mut verbose = false;
        let mut paths: Vec<String> = Vec::new();

        for arg in &ctx.args {
            match arg.as_str() {
                "-v" | "--verbose" => verbose = true,
                _ if !arg.starts_with('-') => paths.push(arg.clone()),
                _ => {}
            }
        }

        let dest = match paths.pop() {
            Some(dest) if !paths.is_empty() => dest,
            _ => return CommandResult::error("mv: missing destination file operand\n".to_string()),
        };
        let sources = paths;

        if sources.len() > 1 && !ctx.fs.is_directory(&dest) {
            return CommandResult::error(format!("mv: target '{}' is not a directory\n", dest));
        }

        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut exit_code = 0;

        for src in &sources {
            let from = ctx.fs.normalize(src);
            match ctx.fs.rename(src, &dest) {
                Ok(node) => {
                    if verbose {
                        stdout.push_str(&format!("renamed '{}' -> '{}'\n", from, node.path()));
                    }
                }
                Err(e) => {
                    stderr.push_str(&fs_error_line("mv", &e));
                    exit_code = 1;
                }
            }
        }

        CommandResult::with_exit_code(stdout, stderr, exit_code)
    }
}
