// src/commands/cp/mod.rs
use crate::commands::{fs_error_line, Command, CommandContext, CommandResult};

pub struct CpCommand;

impl Command for CpCommand {
    fn name(&self) -> &'static str {
        "cp"
    }

    fn execute(&self, ctx: CommandContext) -> CommandResult {
        if ctx.args.iter().any(|a| a == "--help") {
            return CommandResult::success(
                "Usage: cp [OPTION]... SOURCE... DEST\n\n\
                 Copy SOURCE to DEST, or multiple SOURCE(s) to DIRECTORY.\n\n\
                 Options:\n\
                   -r, -R, --recursive  copy directories recursively\n\
                   -v, --verbose        explain what is being done\n\
                       --help           display this help and exit\n".to_string()
            );
        }

        let mut recursive = false;
        let mut verbose = false;
        let mut paths: Vec<String> = Vec::new();

        for arg in &ctx.args {
            match arg.as_str() {
                "-r" | "-R" | "--recursive" => recursive = true,
                "-v" | "--verbose" => verbose = true,
                _ if !arg.starts_with('-') => paths.push(arg.clone()),
                _ => {}
            }
        }

        let dest = match paths.pop() {
            Some(dest) if !paths.is_empty() => dest,
            _ => return CommandResult::error("cp: missing destination file operand\n".to_string()),
        };
        let sources = paths;

        // Several sources need an existing directory to land in
        if sources.len() > 1 && !ctx.fs.is_directory(&dest) {
            return CommandResult::error(format!("cp: target '{}' is not a directory\n", dest));
        }

        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut exit_code = 0;

        for src in &sources {
            if ctx.fs.is_directory(src) && !recursive {
                stderr.push_str(&format!("cp: -r not specified; omitting directory '{}'\n", src));
                exit_code = 1;
                continue;
            }

            match ctx.fs.copy(src, &dest) {
                Ok(node) => {
                    if verbose {
                        stdout.push_str(&format!("'{}' -> '{}'\n", src, node.path()));
                    }
                }
                Err(e) => {
                    stderr.push_str(&fs_error_line("cp", &e));
                    exit_code = 1;
                }
            }
        }

        CommandResult::with_exit_code(stdout, stderr, exit_code)
    }
}
